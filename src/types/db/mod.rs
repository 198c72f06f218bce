// Database entities - SeaORM models
pub mod activity_log;
pub mod permission;
pub mod session;
pub mod user;
