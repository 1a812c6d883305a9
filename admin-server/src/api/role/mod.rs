//! Role API Module
//!
//! Grant edits. Every write clears the affected cache entries before it returns.
//!
//! | Path | Method | Permission |
//! |------|--------|------------|
//! | /system/role/{role_id}/menus | PUT | system:role:edit |
//! | /system/role/{role_id}/depts | PUT | system:role:edit |
//! | /system/role/{role_id}/status | PUT | system:role:edit |

mod handler;

use axum::{Router, middleware, routing::put};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/system/role/{role_id}/menus", put(handler::assign_menus))
        .route("/system/role/{role_id}/depts", put(handler::assign_departments))
        .route("/system/role/{role_id}/status", put(handler::change_status))
        .layer(middleware::from_fn(require_permission("system:role:edit")))
}
