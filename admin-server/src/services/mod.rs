//! Service layer
//!
//! - [`AdminService`] - grant and hierarchy edits with cache invalidation

pub mod admin_service;

pub use admin_service::AdminService;
