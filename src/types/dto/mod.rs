// API DTOs - Request/response types for endpoints
pub mod admin;
pub mod auth;
pub mod common;
