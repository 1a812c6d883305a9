//! Data models
//!
//! Shared between admin-server and the UI (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod data_scope;
pub mod department;
pub mod menu;
pub mod role;
pub mod route;
pub mod tree_select;
pub mod user;

// Re-exports
pub use data_scope::*;
pub use department::*;
pub use menu::*;
pub use role::*;
pub use route::*;
pub use tree_select::*;
pub use user::*;
