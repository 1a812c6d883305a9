//! Department API Handlers

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use shared::models::{CheckedTree, Department};

use crate::auth::CurrentUser;
use crate::authz::hierarchy::ROOT_ID;
use crate::authz::tree::build_dept_tree;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

/// Departments visible to the caller
async fn visible_departments(state: &ServerState, user_id: i64) -> AppResult<Vec<Department>> {
    let filter = state.authz.data_scope.filter_for::<Department>(user_id).await;
    if filter.is_reject_all() {
        return Ok(Vec::new());
    }
    Ok(filter.apply(state.store.list_departments().await?))
}

/// GET /system/dept/list
pub async fn list(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<ApiResponse<Vec<Department>>> {
    let depts = visible_departments(&state, current_user.id).await?;
    Ok(ApiResponse::success(depts))
}

/// GET /system/dept/{dept_id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(dept_id): Path<i64>,
) -> AppResult<ApiResponse<Department>> {
    state
        .authz
        .data_scope
        .ensure_department_accessible(current_user.id, dept_id)
        .await?;

    let dept = state
        .store
        .list_departments()
        .await?
        .into_iter()
        .find(|d| d.id == dept_id)
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::DepartmentNotFound,
                format!("Department {dept_id} not found"),
            )
        })?;
    Ok(ApiResponse::success(dept))
}

/// GET /system/dept/roleDeptTreeselect/{role_id}
pub async fn role_dept_treeselect(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(role_id): Path<i64>,
) -> AppResult<ApiResponse<CheckedTree>> {
    if state.store.find_role(role_id).await?.is_none() {
        return Err(AppError::with_message(
            ErrorCode::RoleNotFound,
            format!("Role {role_id} not found"),
        ));
    }
    let checked = state
        .authz
        .linkage
        .reduce_departments_for_display(role_id)
        .await?;
    let depts = visible_departments(&state, current_user.id).await?;

    Ok(ApiResponse::success(CheckedTree {
        checked_keys: checked.into_iter().collect(),
        tree: build_dept_tree(&depts),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveDepartment {
    pub parent_id: i64,
}

/// PUT /system/dept/{dept_id}/parent
///
/// Both the moved department and the new parent must be in the caller's scope.
pub async fn move_department(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(dept_id): Path<i64>,
    Json(payload): Json<MoveDepartment>,
) -> AppResult<ApiResponse<()>> {
    let scope = &state.authz.data_scope;
    scope
        .ensure_department_accessible(current_user.id, dept_id)
        .await?;
    if payload.parent_id != ROOT_ID {
        scope
            .ensure_department_accessible(current_user.id, payload.parent_id)
            .await?;
    }

    state
        .admin
        .move_department(dept_id, payload.parent_id)
        .await?;

    tracing::info!(
        operator = current_user.id,
        dept_id,
        parent_id = payload.parent_id,
        "Department re-parented"
    );
    Ok(ApiResponse::ok())
}
