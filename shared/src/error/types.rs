//! API boundary error and response envelope

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Extra context attached to an error response
pub type ErrorDetails = HashMap<String, Value>;

/// Error returned by handlers and middleware
///
/// Serialized through [`ApiResponse`]; the HTTP status follows the code.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<ErrorDetails>,
}

impl AppError {
    /// Error with the code's default message
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// `"{resource} not found"`, with the resource echoed in details
    pub fn not_found(resource: impl Into<String>) -> Self {
        let resource = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{resource} not found"))
            .with_detail("resource", resource)
    }

    /// No (or no valid) user identity on the request
    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    /// The caller lacks `permission`
    pub fn forbidden(permission: &str) -> Self {
        Self::with_message(
            ErrorCode::PermissionDenied,
            format!("Permission denied: {permission}"),
        )
        .with_detail("permission", permission)
    }

    /// The resource lies outside the caller's data scope
    pub fn data_scope_denied(resource: impl Into<String>) -> Self {
        Self::new(ErrorCode::DataScopeDenied).with_detail("resource", resource.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }
}

const OK: &str = "OK";

/// Response envelope shared by every endpoint
///
/// `code` is 0 on success; `data` is only present on success and
/// `details` only on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: Some(ErrorCode::Success.code()),
            message: OK.to_string(),
            data: Some(data),
            details: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(ErrorCode::Success.code())
    }
}

impl ApiResponse<()> {
    /// Success without payload
    pub fn ok() -> Self {
        Self {
            code: Some(ErrorCode::Success.code()),
            message: OK.to_string(),
            data: None,
            details: None,
        }
    }

    pub fn error(err: &AppError) -> Self {
        Self {
            code: Some(err.code.code()),
            message: err.message.clone(),
            data: None,
            details: err.details.clone(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self.code.category() {
            ErrorCategory::System => tracing::error!(
                code = %self.code,
                message = %self.message,
                "System error occurred"
            ),
            ErrorCategory::Auth | ErrorCategory::Permission => tracing::debug!(
                code = %self.code,
                message = %self.message,
                "Request rejected"
            ),
            _ => {}
        }
        (self.http_status(), axum::Json(ApiResponse::error(&self))).into_response()
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        axum::Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_message() {
        let err = AppError::new(ErrorCode::RoleNotFound);
        assert_eq!(err.message, ErrorCode::RoleNotFound.message());
        assert!(err.details.is_none());
    }

    #[test]
    fn test_details_accumulate() {
        let err = AppError::validation("parentId is required")
            .with_detail("field", "parentId")
            .with_detail("reason", "required");

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details["field"], "parentId");
    }

    #[test]
    fn test_status_follows_code() {
        assert_eq!(
            AppError::new(ErrorCode::DepartmentNotFound).http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::unauthorized().http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::data_scope_denied("department 7").http_status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_not_found_carries_resource() {
        let err = AppError::not_found("Department 42");
        assert_eq!(err.message, "Department 42 not found");
        assert_eq!(err.details.unwrap()["resource"], "Department 42");
    }

    #[test]
    fn test_forbidden_envelope() {
        let response = ApiResponse::error(&AppError::forbidden("system:role:edit"));
        assert!(!response.is_success());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["code"], 2001);
        assert_eq!(json["message"], "Permission denied: system:role:edit");
        assert_eq!(json["details"]["permission"], "system:role:edit");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_success_envelope() {
        let response = ApiResponse::success(vec![1, 2, 3]);
        assert!(response.is_success());
        assert_eq!(response.data, Some(vec![1, 2, 3]));

        let json = serde_json::to_value(ApiResponse::ok()).unwrap();
        assert_eq!(json, serde_json::json!({ "code": 0, "message": "OK" }));
    }
}
