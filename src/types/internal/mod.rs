// Internal types - Not exposed via API
pub mod account;
pub mod activity;
pub mod auth;
pub mod context;

pub use account::{NewUser, Role, UserProfile, UserSummary};
pub use activity::{ActivityEvent, ActivityLogRecord, ActivityType};
pub use auth::{IssuedSession, LoginInput, LoginResult, SessionInfo, SessionToken};
pub use context::{RequestContext, RequestId, RequestSource};
