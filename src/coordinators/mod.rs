// Coordinators layer - Workflow orchestration
//
// Coordinators compose providers into the operations the API and CLI expose.
// They decide the order of steps and what gets written to the activity log.

pub mod admin_coordinator;
pub mod login_coordinator;

pub use admin_coordinator::AdminCoordinator;
pub use login_coordinator::LoginCoordinator;
