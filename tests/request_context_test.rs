use lvd_records_backend::types::internal::{RequestContext, RequestSource, Role, SessionInfo};
use poem::Request;

fn session() -> SessionInfo {
    SessionInfo {
        session_id: "s-1".to_string(),
        user_id: "u-1".to_string(),
        username: "LVD-ADMIN".to_string(),
        role: Role::Administrator,
        created_at: 1_700_000_000,
        expires_at: 1_700_086_400,
    }
}

#[test]
fn test_request_context_for_api_is_anonymous() {
    let ctx = RequestContext::for_api(None, None);

    assert_eq!(ctx.source, RequestSource::API);
    assert_eq!(ctx.actor_id, "anonymous");
    assert!(!ctx.is_authenticated());
}

#[test]
fn test_request_context_for_cli() {
    let ctx = RequestContext::for_cli("user unlock");

    assert_eq!(ctx.source, RequestSource::CLI);
    assert_eq!(ctx.actor_id, "cli:user unlock");
    assert!(ctx.ip_address.is_none());
}

#[test]
fn test_request_context_for_system() {
    let ctx = RequestContext::for_system("session_sweep");

    assert_eq!(ctx.source, RequestSource::System);
    assert_eq!(ctx.actor_id, "system:session_sweep");
}

#[test]
fn test_with_session_sets_actor() {
    let ctx = RequestContext::for_api(None, None).with_session(session());

    assert!(ctx.is_authenticated());
    assert_eq!(ctx.actor_id, "u-1");
}

#[test]
fn test_from_request_prefers_forwarded_for() {
    let req = Request::builder()
        .header("X-Forwarded-For", "203.0.113.7, 10.0.0.1")
        .header("X-Real-IP", "198.51.100.2")
        .header("User-Agent", "records-desktop/2.4")
        .finish();

    let ctx = RequestContext::from_request(&req);
    assert_eq!(ctx.ip_string().as_deref(), Some("203.0.113.7"));
    assert_eq!(ctx.user_agent.as_deref(), Some("records-desktop/2.4"));
}

#[test]
fn test_from_request_falls_back_to_real_ip() {
    let req = Request::builder().header("X-Real-IP", "198.51.100.2").finish();

    let ctx = RequestContext::from_request(&req);
    assert_eq!(ctx.ip_string().as_deref(), Some("198.51.100.2"));
    assert!(ctx.user_agent.is_none());
}

#[test]
fn test_each_context_gets_its_own_request_id() {
    let a = RequestContext::for_api(None, None);
    let b = RequestContext::for_api(None, None);
    assert_ne!(a.request_id.to_string(), b.request_id.to_string());
}
