//! Role API Handlers

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuGrants {
    #[serde(default)]
    pub menu_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentGrants {
    #[serde(default)]
    pub dept_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleStatus {
    pub is_active: bool,
}

/// PUT /system/role/{role_id}/menus
pub async fn assign_menus(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(role_id): Path<i64>,
    Json(payload): Json<MenuGrants>,
) -> AppResult<ApiResponse<()>> {
    state
        .admin
        .assign_role_menus(role_id, &payload.menu_ids)
        .await?;
    tracing::info!(
        operator = current_user.id,
        role_id,
        menus = payload.menu_ids.len(),
        "Role menus replaced"
    );
    Ok(ApiResponse::ok())
}

/// PUT /system/role/{role_id}/depts
pub async fn assign_departments(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(role_id): Path<i64>,
    Json(payload): Json<DepartmentGrants>,
) -> AppResult<ApiResponse<()>> {
    state
        .admin
        .assign_role_departments(role_id, &payload.dept_ids)
        .await?;
    tracing::info!(
        operator = current_user.id,
        role_id,
        depts = payload.dept_ids.len(),
        "Role departments replaced"
    );
    Ok(ApiResponse::ok())
}

/// PUT /system/role/{role_id}/status
pub async fn change_status(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(role_id): Path<i64>,
    Json(payload): Json<RoleStatus>,
) -> AppResult<ApiResponse<()>> {
    state
        .admin
        .set_role_status(role_id, payload.is_active)
        .await?;
    tracing::info!(
        operator = current_user.id,
        role_id,
        is_active = payload.is_active,
        "Role status changed"
    );
    Ok(ApiResponse::ok())
}
