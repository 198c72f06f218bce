use std::sync::Arc;

use poem::Request;
use poem_openapi::{OpenApi, SecurityScheme, Tags, auth::Bearer, payload::Json};

use crate::api::helpers;
use crate::coordinators::LoginCoordinator;
use crate::errors::AuthError;
use crate::types::dto::auth::{
    ChangePasswordRequest, ChangePasswordResponse, LoginRequest, LoginResponse, LogoutResponse,
    PermissionCheckRequest, PermissionCheckResponse, PermissionsResponse, ResourcePermissions,
    SessionResponse, SessionUser,
};
use crate::types::internal::{LoginInput, LoginResult, RequestContext, SessionInfo};

/// Authentication API endpoints
pub struct AuthApi {
    login_coordinator: Arc<LoginCoordinator>,
}

impl AuthApi {
    pub fn new(login_coordinator: Arc<LoginCoordinator>) -> Self {
        Self { login_coordinator }
    }

    /// Resolve the bearer token to a context carrying its session
    async fn authenticate(
        &self,
        req: &Request,
        auth: &BearerAuth,
    ) -> Result<(RequestContext, SessionInfo), AuthError> {
        let ctx = helpers::session_context(req, &auth.0.token, &self.login_coordinator)
            .await?
            .ok_or_else(AuthError::invalid_session)?;
        let session = ctx.session.clone().ok_or_else(AuthError::invalid_session)?;
        Ok((ctx, session))
    }
}

/// Opaque session token in the Authorization header
#[derive(SecurityScheme)]
#[oai(
    ty = "bearer",
    key_name = "Authorization",
    key_in = "header",
    bearer_format = "opaque"
)]
pub struct BearerAuth(pub Bearer);

/// API tags for authentication endpoints
#[derive(Tags)]
enum AuthTags {
    /// Authentication endpoints
    Authentication,
}

#[OpenApi(prefix_path = "/auth")]
impl AuthApi {
    /// Authenticate with username and password
    ///
    /// Returns a session token for the Authorization header. Sessions last
    /// a fixed time from login and are never extended.
    #[oai(path = "/login", method = "post", tag = "AuthTags::Authentication")]
    async fn login(
        &self,
        req: &Request,
        body: Json<LoginRequest>,
    ) -> Result<Json<LoginResponse>, AuthError> {
        let ctx = RequestContext::from_request(req);
        let Json(body) = body;

        let result = self
            .login_coordinator
            .login(&ctx, LoginInput::new(body.username, body.password))
            .await?;

        match result {
            LoginResult::Accepted {
                session,
                user_id,
                username,
                role,
            } => Ok(Json(LoginResponse {
                session_id: session.session_id,
                token: session.token.into_inner(),
                token_type: "Bearer".to_string(),
                expires_at: session.expires_at,
                user: SessionUser {
                    id: user_id,
                    username,
                    role: role.to_string(),
                },
            })),
            LoginResult::RejectedMissingFields => Err(AuthError::missing_fields()),
            LoginResult::RejectedInvalidCredentials => Err(AuthError::invalid_credentials()),
            LoginResult::RejectedLocked { .. } => Err(AuthError::account_locked()),
            LoginResult::RejectedInactive => Err(AuthError::account_inactive()),
        }
    }

    /// Describe the session behind the bearer token
    #[oai(path = "/session", method = "get", tag = "AuthTags::Authentication")]
    async fn session(
        &self,
        req: &Request,
        auth: BearerAuth,
    ) -> Result<Json<SessionResponse>, AuthError> {
        let (_ctx, session) = self.authenticate(req, &auth).await?;
        Ok(Json(SessionResponse::from(session)))
    }

    /// End the session behind the bearer token
    ///
    /// Safe to repeat: a token that is already logged out gives `logged_out: false`.
    #[oai(path = "/logout", method = "post", tag = "AuthTags::Authentication")]
    async fn logout(
        &self,
        req: &Request,
        auth: BearerAuth,
    ) -> Result<Json<LogoutResponse>, AuthError> {
        let ctx = RequestContext::from_request(req);
        let logged_out = self.login_coordinator.logout(&ctx, &auth.0.token).await?;
        Ok(Json(LogoutResponse { logged_out }))
    }

    /// Change the caller's password
    ///
    /// All other sessions of the caller are ended; this one stays valid.
    #[oai(path = "/change-password", method = "post", tag = "AuthTags::Authentication")]
    async fn change_password(
        &self,
        req: &Request,
        auth: BearerAuth,
        body: Json<ChangePasswordRequest>,
    ) -> Result<Json<ChangePasswordResponse>, AuthError> {
        let (ctx, session) = self.authenticate(req, &auth).await?;

        let sessions_invalidated = self
            .login_coordinator
            .change_password(&ctx, &session, &body.current_password, &body.new_password)
            .await?;

        Ok(Json(ChangePasswordResponse {
            message: "Password changed".to_string(),
            sessions_invalidated,
        }))
    }

    /// Everything the caller's role may do, by resource
    ///
    /// For interface gating only; every protected endpoint checks again.
    #[oai(path = "/permissions", method = "get", tag = "AuthTags::Authentication")]
    async fn permissions(
        &self,
        req: &Request,
        auth: BearerAuth,
    ) -> Result<Json<PermissionsResponse>, AuthError> {
        let (_ctx, session) = self.authenticate(req, &auth).await?;
        let role = session.role.as_str();

        let map = self.login_coordinator.permissions_for(role).await?;
        let permissions = map
            .into_iter()
            .map(|(resource, actions)| ResourcePermissions {
                resource,
                actions: actions.into_iter().collect(),
            })
            .collect();

        Ok(Json(PermissionsResponse {
            role: role.to_string(),
            permissions,
        }))
    }

    /// Check one resource/action pair for the caller's role
    #[oai(path = "/permissions/check", method = "post", tag = "AuthTags::Authentication")]
    async fn check_permission(
        &self,
        req: &Request,
        auth: BearerAuth,
        body: Json<PermissionCheckRequest>,
    ) -> Result<Json<PermissionCheckResponse>, AuthError> {
        let (_ctx, session) = self.authenticate(req, &auth).await?;
        let Json(body) = body;

        let allowed = self
            .login_coordinator
            .check_permission(session.role.as_str(), &body.resource, &body.action)
            .await?;

        Ok(Json(PermissionCheckResponse {
            resource: body.resource,
            action: body.action,
            allowed,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_data::AppData;
    use crate::test::utils::{insert_plain_user, setup_test_app_data};

    async fn setup() -> (Arc<AppData>, AuthApi) {
        let app_data = setup_test_app_data().await;
        insert_plain_user(&app_data.db, "LVD-ADMIN", "password", "Administrator").await;
        insert_plain_user(&app_data.db, "LVD-CLERK", "password", "User").await;
        let api = AuthApi::new(Arc::new(LoginCoordinator::new(app_data.clone())));
        (app_data, api)
    }

    fn request() -> Request {
        Request::builder()
            .header("X-Real-IP", "192.168.10.4")
            .header("User-Agent", "records-desktop/2.4")
            .finish()
    }

    fn credentials(username: &str, password: &str) -> Json<LoginRequest> {
        Json(LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    fn bearer(token: &str) -> BearerAuth {
        BearerAuth(Bearer {
            token: token.to_string(),
        })
    }

    async fn login_token(api: &AuthApi, username: &str) -> String {
        api.login(&request(), credentials(username, "password"))
            .await
            .expect("login should succeed")
            .0
            .token
    }

    #[tokio::test]
    async fn test_login_returns_session() {
        let (_app_data, api) = setup().await;

        let response = api.login(&request(), credentials("LVD-ADMIN", "password")).await.unwrap();

        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.user.username, "LVD-ADMIN");
        assert_eq!(response.user.role, "Administrator");
        assert_ne!(response.token, response.session_id);
    }

    #[tokio::test]
    async fn test_login_status_codes() {
        let (_app_data, api) = setup().await;

        let err = api.login(&request(), credentials("", "password")).await.unwrap_err();
        assert_eq!(err.status_code(), 400);

        let err = api.login(&request(), credentials("LVD-CLERK", "wrong")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials(_)));

        let err = api.login(&request(), credentials("NOBODY", "wrong")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials(_)));
    }

    #[tokio::test]
    async fn test_lockout_reported_as_423() {
        let (_app_data, api) = setup().await;

        for _ in 0..5 {
            let err = api.login(&request(), credentials("LVD-CLERK", "wrong")).await.unwrap_err();
            assert_eq!(err.status_code(), 401);
        }

        let err = api.login(&request(), credentials("LVD-CLERK", "password")).await.unwrap_err();
        assert!(matches!(err, AuthError::AccountLocked(_)));
        assert_eq!(err.status_code(), 423);
        assert!(!err.message().contains("attempt"));
    }

    #[tokio::test]
    async fn test_session_and_logout() {
        let (_app_data, api) = setup().await;
        let token = login_token(&api, "LVD-ADMIN").await;

        let session = api.session(&request(), bearer(&token)).await.unwrap();
        assert_eq!(session.role, "Administrator");

        assert!(api.logout(&request(), bearer(&token)).await.unwrap().logged_out);
        assert!(!api.logout(&request(), bearer(&token)).await.unwrap().logged_out);

        let err = api.session(&request(), bearer(&token)).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidSession(_)));
    }

    #[tokio::test]
    async fn test_change_password_endpoint() {
        let (_app_data, api) = setup().await;
        let token = login_token(&api, "LVD-CLERK").await;
        let other = login_token(&api, "LVD-CLERK").await;

        let response = api
            .change_password(
                &request(),
                bearer(&token),
                Json(ChangePasswordRequest {
                    current_password: "password".to_string(),
                    new_password: "Ledger2024".to_string(),
                }),
            )
            .await
            .unwrap();
        assert_eq!(response.sessions_invalidated, 1);
        assert!(api.session(&request(), bearer(&other)).await.is_err());

        let err = api
            .change_password(
                &request(),
                bearer(&token),
                Json(ChangePasswordRequest {
                    current_password: "password".to_string(),
                    new_password: "Ledger2025".to_string(),
                }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::IncorrectPassword(_)));
    }

    #[tokio::test]
    async fn test_permissions_follow_role() {
        let (_app_data, api) = setup().await;
        let clerk = login_token(&api, "LVD-CLERK").await;
        let admin = login_token(&api, "LVD-ADMIN").await;

        let check = |resource: &str, action: &str| {
            Json(PermissionCheckRequest {
                resource: resource.to_string(),
                action: action.to_string(),
            })
        };

        let denied = api
            .check_permission(&request(), bearer(&clerk), check("entries", "delete"))
            .await
            .unwrap();
        assert!(!denied.allowed);

        let allowed = api
            .check_permission(&request(), bearer(&admin), check("entries", "delete"))
            .await
            .unwrap();
        assert!(allowed.allowed);

        let listing = api.permissions(&request(), bearer(&clerk)).await.unwrap();
        assert_eq!(listing.role, "User");
        let entries = listing
            .permissions
            .iter()
            .find(|p| p.resource == "entries")
            .unwrap();
        assert_eq!(entries.actions, vec!["create", "read", "update"]);
    }
}
