use poem::Request;

use crate::coordinators::LoginCoordinator;
use crate::errors::InternalError;
use crate::types::internal::RequestContext;

/// Context for an authenticated endpoint
///
/// Client details come from the request; the session comes from the bearer
/// token. `None` when the token does not resolve to a valid session.
pub async fn session_context(
    req: &Request,
    token: &str,
    login_coordinator: &LoginCoordinator,
) -> Result<Option<RequestContext>, InternalError> {
    let ctx = RequestContext::from_request(req);

    match login_coordinator.validate_session(token).await? {
        Some(session) => Ok(Some(ctx.with_session(session))),
        None => {
            tracing::debug!("Rejected bearer token from {:?}", ctx.ip_address);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{insert_plain_user, setup_test_app_data};
    use crate::types::internal::{LoginInput, LoginResult};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_session_context_attaches_session() {
        let app_data = setup_test_app_data().await;
        let user_id = insert_plain_user(&app_data.db, "LVD-RECORDS", "password", "User").await;
        let login = LoginCoordinator::new(Arc::clone(&app_data));

        let ctx = RequestContext::for_api(None, None);
        let LoginResult::Accepted { session, .. } =
            login.login(&ctx, LoginInput::new("LVD-RECORDS", "password")).await.unwrap()
        else {
            panic!("expected Accepted");
        };

        let req = Request::builder()
            .header("X-Forwarded-For", "10.1.2.3, 172.16.0.1")
            .header("User-Agent", "records-desktop/2.4")
            .finish();
        let ctx = session_context(&req, session.token.expose(), &login)
            .await
            .unwrap()
            .unwrap();

        assert!(ctx.is_authenticated());
        assert_eq!(ctx.actor_id, user_id);
        assert_eq!(ctx.ip_string().as_deref(), Some("10.1.2.3"));
        assert_eq!(ctx.user_agent.as_deref(), Some("records-desktop/2.4"));
    }

    #[tokio::test]
    async fn test_unknown_token_gives_none() {
        let app_data = setup_test_app_data().await;
        let login = LoginCoordinator::new(app_data);
        let req = Request::builder().finish();

        assert!(session_context(&req, "not-a-token", &login).await.unwrap().is_none());
    }
}
