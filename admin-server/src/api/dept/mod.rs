//! Department API Module
//!
//! Reads are narrowed to the caller's data scope.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::api::menu::ROLE_GRANT_READERS;
use crate::auth::{require_any_permission, require_permission};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let list_routes = Router::new()
        .route("/system/dept/list", get(handler::list))
        .layer(middleware::from_fn(require_permission("system:dept:list")));

    let query_routes = Router::new()
        .route("/system/dept/{dept_id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_permission("system:dept:query")));

    let write_routes = Router::new()
        .route("/system/dept/{dept_id}/parent", put(handler::move_department))
        .layer(middleware::from_fn(require_permission("system:dept:edit")));

    let grant_routes = Router::new()
        .route(
            "/system/dept/roleDeptTreeselect/{role_id}",
            get(handler::role_dept_treeselect),
        )
        .layer(middleware::from_fn(require_any_permission(ROLE_GRANT_READERS)));

    Router::new()
        .merge(grant_routes)
        .merge(list_routes)
        .merge(query_routes)
        .merge(write_routes)
}
