//! Shared types for the admin back-office
//!
//! Domain models (users, roles, departments, menus, routes) and the error
//! system used by the server and, through the API, by the UI.

pub mod error;
pub mod models;
