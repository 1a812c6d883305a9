//! Menu API Handlers

use axum::extract::{Path, State};
use shared::models::CheckedTree;

use crate::auth::CurrentUser;
use crate::authz::tree::build_menu_tree;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

/// GET /system/menu/roleMenuTreeselect/{role_id}
///
/// The tree only offers menus the caller holds; the superuser sees all of them.
pub async fn role_menu_treeselect(
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
    let checked = state.authz.linkage.reduce_for_display(role_id).await?;
    let menus = state.authz.permissions.granted_menus(current_user.id).await?;

    Ok(ApiResponse::success(CheckedTree {
        checked_keys: checked.into_iter().collect(),
        tree: build_menu_tree(&menus),
    }))
}
