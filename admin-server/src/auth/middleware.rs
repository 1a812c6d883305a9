//! Authentication middleware

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::ErrorCode;

use crate::auth::{CurrentUser, USER_ID_HEADER};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

/// Resolves the current user and injects [`CurrentUser`] into the request
///
/// # Skipped paths
///
/// - `OPTIONS *` (CORS preflight)
/// - `/health`
///
/// # Errors
///
/// | Case | Status |
/// |------|--------|
/// | missing or malformed user id | 401 |
/// | unknown user | 401 |
/// | disabled user | 401 |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS || req.uri().path() == "/health" {
        return Ok(next.run(req).await);
    }

    let user_id = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok());

    let Some(user_id) = user_id else {
        security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
        return Err(AppError::unauthorized());
    };

    let user = state.store.find_user(user_id).await?;
    let Some(user) = user else {
        security_log!("WARN", "auth_unknown_user", user_id = user_id);
        return Err(AppError::unauthorized());
    };
    if !user.is_active {
        security_log!("WARN", "auth_disabled_user", user_id = user_id);
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    let permissions = state.authz.permissions.permissions(user_id).await;
    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        user_name: user.user_name,
        permissions: Arc::new(permissions),
    });
    Ok(next.run(req).await)
}

/// Permission check middleware
///
/// ```ignore
/// Router::new()
///     .route("/system/role/{role_id}/menus", put(handler::assign_menus))
///     .layer(middleware::from_fn(require_permission("system:role:edit")));
/// ```
///
/// Missing permission returns 403.
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or(AppError::unauthorized())?;

            if !user.has_permission(permission) {
                security_log!(
                    "WARN",
                    "permission_denied",
                    user_id = user.id,
                    username = user.user_name.clone(),
                    required_permission = permission
                );
                return Err(AppError::forbidden(permission));
            }

            Ok(next.run(req).await)
        })
    }
}

/// Like [`require_permission`], passing when the user holds any of `permissions`
pub fn require_any_permission(
    permissions: &'static [&'static str],
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or(AppError::unauthorized())?;

            if !user.has_any_permission(permissions) {
                let required = permissions.join(" | ");
                security_log!(
                    "WARN",
                    "permission_denied",
                    user_id = user.id,
                    username = user.user_name.clone(),
                    required_permission = required.as_str()
                );
                return Err(AppError::forbidden(&required));
            }

            Ok(next.run(req).await)
        })
    }
}
