use std::net::IpAddr;

use poem::Request;

use super::{request_id::RequestId, request_source::RequestSource};
use crate::types::internal::auth::SessionInfo;

/// Request context that flows through all layers
///
/// Carries the client details every activity log entry needs, plus the
/// validated session once a bearer token has been checked.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    /// IP address of the client making the request
    pub ip_address: Option<IpAddr>,

    /// User-Agent header, if the client sent one
    pub user_agent: Option<String>,

    /// Unique identifier for this request (for tracing across layers)
    pub request_id: RequestId,

    /// Source of the request (API, CLI, or System)
    pub source: RequestSource,

    /// Actor who initiated the operation
    pub actor_id: String,

    /// Validated session, set after bearer authentication
    pub session: Option<SessionInfo>,
}

impl RequestContext {
    /// Create a RequestContext for an unauthenticated API call
    pub fn for_api(ip_address: Option<IpAddr>, user_agent: Option<String>) -> Self {
        Self {
            ip_address,
            user_agent,
            request_id: RequestId::generate(),
            source: RequestSource::API,
            actor_id: "anonymous".to_owned(),
            session: None,
        }
    }

    /// Create a RequestContext for CLI operations
    ///
    /// # Arguments
    /// * `command_name` - Name of the CLI command being executed
    pub fn for_cli(command_name: &str) -> Self {
        Self {
            ip_address: None,
            user_agent: None,
            request_id: RequestId::generate(),
            source: RequestSource::CLI,
            actor_id: format!("cli:{}", command_name),
            session: None,
        }
    }

    /// Create a RequestContext for system operations
    pub fn for_system(operation_name: &str) -> Self {
        Self {
            ip_address: None,
            user_agent: None,
            request_id: RequestId::generate(),
            source: RequestSource::System,
            actor_id: format!("system:{}", operation_name),
            session: None,
        }
    }

    /// Build an API context from the incoming HTTP request
    ///
    /// Client address comes from X-Forwarded-For, then X-Real-IP, then the
    /// socket's remote address.
    pub fn from_request(req: &Request) -> Self {
        let ip_address = Self::extract_ip_address(req);
        let user_agent = req
            .header("User-Agent")
            .map(str::trim)
            .filter(|agent| !agent.is_empty())
            .map(str::to_owned);

        let ctx = Self::for_api(ip_address, user_agent);
        tracing::trace!("Request context created: {:?}", ctx);
        ctx
    }

    fn extract_ip_address(req: &Request) -> Option<IpAddr> {
        if let Some(forwarded) = req.header("X-Forwarded-For") {
            if let Some(ip) = forwarded.split(',').next() {
                return ip.trim().parse().ok();
            }
        }

        if let Some(real_ip) = req.header("X-Real-IP") {
            return real_ip.trim().parse().ok();
        }

        req.remote_addr().as_socket_addr().map(|addr| addr.ip())
    }

    /// Attach a validated session; the actor becomes the session's user
    pub fn with_session(mut self, session: SessionInfo) -> Self {
        self.actor_id = session.user_id.clone();
        self.session = Some(session);
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// IP address rendered for storage
    pub fn ip_string(&self) -> Option<String> {
        self.ip_address.map(|ip| ip.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::internal::Role;

    #[test]
    fn test_forwarded_for_takes_first_address() {
        let req = Request::builder()
            .header("X-Forwarded-For", "203.0.113.7, 10.0.0.1")
            .header("User-Agent", "records-desktop/1.0")
            .finish();

        let ctx = RequestContext::from_request(&req);

        assert_eq!(ctx.ip_address, Some("203.0.113.7".parse().unwrap()));
        assert_eq!(ctx.user_agent.as_deref(), Some("records-desktop/1.0"));
        assert_eq!(ctx.source, RequestSource::API);
        assert!(!ctx.is_authenticated());
    }

    #[test]
    fn test_real_ip_used_without_forwarded_for() {
        let req = Request::builder().header("X-Real-IP", "192.168.1.20").finish();

        let ctx = RequestContext::from_request(&req);

        assert_eq!(ctx.ip_string().as_deref(), Some("192.168.1.20"));
        assert_eq!(ctx.user_agent, None);
    }

    #[test]
    fn test_cli_context_actor() {
        let ctx = RequestContext::for_cli("user unlock");
        assert_eq!(ctx.actor_id, "cli:user unlock");
        assert_eq!(ctx.source, RequestSource::CLI);
        assert!(ctx.ip_address.is_none());
    }

    #[test]
    fn test_with_session_sets_actor() {
        let session = SessionInfo {
            session_id: "s-1".to_owned(),
            user_id: "u-1".to_owned(),
            username: "LVD-CLERK".to_owned(),
            role: Role::User,
            created_at: 0,
            expires_at: 100,
        };

        let ctx = RequestContext::for_api(None, None).with_session(session);

        assert!(ctx.is_authenticated());
        assert_eq!(ctx.actor_id, "u-1");
    }
}
