//! HTTP handlers and their request/response DTOs, one module per resource.

pub mod api_keys;
pub mod auth;
pub mod common;
pub mod health;
pub mod user_data;
pub mod users;
