//! User API Handlers

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use shared::models::User;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

/// GET /system/user/list
///
/// Narrowed by department scope; a `SelfOnly` caller sees only their own row.
pub async fn list(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<ApiResponse<Vec<User>>> {
    let filter = state
        .authz
        .data_scope
        .owned_filter_for::<User>(current_user.id)
        .await;
    if filter.is_reject_all() {
        return Ok(ApiResponse::success(Vec::new()));
    }
    let users = state.store.find_users(&filter).await?;
    Ok(ApiResponse::success(users))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleGrants {
    #[serde(default)]
    pub role_ids: Vec<i64>,
}

/// PUT /system/user/{user_id}/roles
pub async fn assign_roles(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(user_id): Path<i64>,
    Json(payload): Json<RoleGrants>,
) -> AppResult<ApiResponse<()>> {
    let target = state.store.find_user(user_id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::UserNotFound, format!("User {user_id} not found"))
    })?;

    if !current_user.is_admin() {
        let filter = state
            .authz
            .data_scope
            .filter_for::<User>(current_user.id)
            .await;
        if !filter.allows(&target) {
            return Err(AppError::data_scope_denied(format!("user {user_id}")));
        }
    }

    state
        .admin
        .assign_user_roles(user_id, &payload.role_ids)
        .await?;
    tracing::info!(
        operator = current_user.id,
        user_id,
        roles = payload.role_ids.len(),
        "User roles replaced"
    );
    Ok(ApiResponse::ok())
}
