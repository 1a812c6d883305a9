//! Error system shared by the server and the UI
//!
//! Every failure reaching a client is an [`AppError`] carrying an [`ErrorCode`].
//! The code's leading digit picks its [`ErrorCategory`], and the category (with a
//! few explicit overrides) picks the HTTP status.
//!
//! | Range | Category |
//! |-------|----------|
//! | 0xxx | general |
//! | 1xxx | authentication |
//! | 2xxx | permission and data scope |
//! | 3xxx | department hierarchy |
//! | 4xxx | menus |
//! | 5xxx-8xxx | users and roles |
//! | 9xxx | system |
//!
//! ```
//! use shared::error::{ApiResponse, AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::DepartmentParentDisabled).with_detail("parentId", 7);
//! let body = ApiResponse::error(&err);
//! assert_eq!(body.code, Some(3002));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult, ErrorDetails};
