//! Database Module
//!
//! The authorization engine reads through [`AuthzStore`]; administrative
//! edits go through [`AdminStore`]. Both are implemented by [`SqliteStore`]
//! (sqlx) and [`MemoryStore`] (tests, embedding).

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use shared::error::{AppError, ErrorCode};
use shared::models::{Department, Menu, Role, User};
use thiserror::Error;

use crate::authz::RowFilter;
use crate::authz::hierarchy::{AncestorsUpdate, HierarchyError};

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{1}")]
    Business(ErrorCode, String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepoError::NotFound("Row not found".into()),
            other => RepoError::Database(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for RepoError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        RepoError::Database(format!("Migration failed: {err}"))
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Business(code, msg) => AppError::with_message(code, msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Hierarchy(err) => {
                let code = match &err {
                    HierarchyError::NodeNotFound(_) | HierarchyError::ParentNotFound(_) => {
                        ErrorCode::DepartmentNotFound
                    }
                    HierarchyError::ParentDisabled(_) => ErrorCode::DepartmentParentDisabled,
                    HierarchyError::InvalidParent { .. } | HierarchyError::Malformed(_) => {
                        ErrorCode::DepartmentParentInvalid
                    }
                };
                AppError::with_message(code, err.to_string())
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Read access needed by the authorization engine
///
/// Lists are returned in display order (`parent_id`, then `order_num`).
/// Role lookups return disabled roles too; callers filter on `is_active`.
#[async_trait]
pub trait AuthzStore: Send + Sync {
    async fn find_user(&self, user_id: i64) -> RepoResult<Option<User>>;

    /// Users the filter allows, narrowed in the query where the backend can
    async fn find_users(&self, filter: &RowFilter<User>) -> RepoResult<Vec<User>>;

    async fn find_role(&self, role_id: i64) -> RepoResult<Option<Role>>;

    async fn roles_of_user(&self, user_id: i64) -> RepoResult<Vec<Role>>;

    async fn user_ids_with_role(&self, role_id: i64) -> RepoResult<Vec<i64>>;

    async fn list_departments(&self) -> RepoResult<Vec<Department>>;

    /// Department grants of the given roles, deduplicated
    async fn role_dept_ids(&self, role_ids: &[i64]) -> RepoResult<Vec<i64>>;

    async fn list_menus(&self) -> RepoResult<Vec<Menu>>;

    /// Menu grants of the given roles, deduplicated
    async fn role_menu_ids(&self, role_ids: &[i64]) -> RepoResult<Vec<i64>>;
}

/// Administrative writes
///
/// Edge replacements are delete-then-insert and atomic per call.
#[async_trait]
pub trait AdminStore: AuthzStore {
    async fn replace_role_menus(&self, role_id: i64, menu_ids: &[i64]) -> RepoResult<()>;

    async fn replace_role_depts(&self, role_id: i64, dept_ids: &[i64]) -> RepoResult<()>;

    async fn replace_user_roles(&self, user_id: i64, role_ids: &[i64]) -> RepoResult<()>;

    async fn set_role_active(&self, role_id: i64, is_active: bool) -> RepoResult<()>;

    /// Moves `dept_id` under `new_parent_id`, rewriting every descendant chain
    ///
    /// Reading the tree, planning the edit and writing it happen under one
    /// write lock, so concurrent moves never plan against a stale tree.
    async fn reparent_department(
        &self,
        dept_id: i64,
        new_parent_id: i64,
    ) -> RepoResult<Vec<AncestorsUpdate>>;
}
