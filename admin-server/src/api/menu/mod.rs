//! Menu API Module
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /system/menu/roleMenuTreeselect/{role_id} | GET | menu tree with the role's checked keys (`system:role:query` or `system:role:edit`) |

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_any_permission;
use crate::core::ServerState;

/// Reading a role's grants needs query or edit rights on roles
pub(crate) const ROLE_GRANT_READERS: &[&str] = &["system:role:query", "system:role:edit"];

pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/system/menu/roleMenuTreeselect/{role_id}",
            get(handler::role_menu_treeselect),
        )
        .layer(middleware::from_fn(require_any_permission(ROLE_GRANT_READERS)))
}
