//! User API Module
//!
//! | Path | Method | Permission |
//! |------|--------|------------|
//! | /system/user/list | GET | system:user:list |
//! | /system/user/{user_id}/roles | PUT | system:user:edit |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/system/user/list", get(handler::list))
        .layer(middleware::from_fn(require_permission("system:user:list")));

    let write_routes = Router::new()
        .route("/system/user/{user_id}/roles", put(handler::assign_roles))
        .layer(middleware::from_fn(require_permission("system:user:edit")));

    read_routes.merge(write_routes)
}
