//! Current-user info handlers

use axum::extract::State;
use shared::models::{RouteNode, UserInfo};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult};

/// GET /getInfo
pub async fn get_info(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<ApiResponse<UserInfo>> {
    let user = state
        .store
        .find_user(current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {}", current_user.id)))?;

    let roles = state.authz.permissions.role_keys(current_user.id).await;
    let permissions = state.authz.permissions.permissions(current_user.id).await;

    Ok(ApiResponse::success(UserInfo {
        user,
        roles: roles.into_iter().collect(),
        permissions: permissions.into_iter().collect(),
    }))
}

/// GET /getRouters
pub async fn get_routers(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<ApiResponse<Vec<RouteNode>>> {
    let routes = state.authz.routes_for(current_user.id).await?;
    tracing::debug!(user_id = current_user.id, routes = routes.len(), "Built routes");
    Ok(ApiResponse::success(routes))
}
