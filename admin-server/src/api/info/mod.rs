//! Current-user info API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /getInfo | GET | user, role keys and permission strings |
//! | /getRouters | GET | navigation route tree |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/getInfo", get(handler::get_info))
        .route("/getRouters", get(handler::get_routers))
}
