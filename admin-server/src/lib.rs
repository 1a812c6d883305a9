//! Admin Server - hierarchical RBAC and data-scope authorization
//!
//! # Module layout
//!
//! ```text
//! admin-server/src/
//! ├── core/          # config, state, server lifecycle
//! ├── auth/          # current user, permission middleware
//! ├── authz/         # hierarchy codec, data scope, permissions, routes
//! ├── cache/         # authorization cache contract and in-process backend
//! ├── db/            # store contracts, SQLite and in-memory stores
//! ├── services/      # grant and hierarchy edits
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # logging, error re-exports
//! ```

pub mod api;
pub mod auth;
pub mod authz;
pub mod cache;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;

// Re-exports
pub use auth::CurrentUser;
pub use authz::AuthzEngine;
pub use core::{Config, Server, ServerState};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
