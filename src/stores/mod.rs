// Stores layer - Data access and repository pattern
pub mod activity_store;
pub mod login_attempt_store;
pub mod permission_store;
pub mod seed;
pub mod session_store;
pub mod user_store;

pub use activity_store::ActivityStore;
pub use login_attempt_store::{LockState, LoginAttemptStore};
pub use permission_store::PermissionStore;
pub use session_store::{DbSessionStore, InMemorySessionStore, SessionRecord, SessionStore};
pub use user_store::{NewUserRecord, UserForAuth, UserForSession, UserStore};
