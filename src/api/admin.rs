use std::sync::Arc;

use chrono::Utc;
use poem::Request;
use poem_openapi::{
    OpenApi, Tags,
    param::{Path, Query},
    payload::Json,
};

use crate::api::auth::BearerAuth;
use crate::api::helpers;
use crate::coordinators::{AdminCoordinator, LoginCoordinator};
use crate::errors::AdminError;
use crate::errors::internal::InternalError;
use crate::types::dto::admin::{
    AccountActionResponse, ActivityEntryResponse, ActivityLogResponse, CreateUserRequest,
    CreateUserResponse, LockAccountRequest, SetActiveRequest, UpdateProfileRequest,
    UserListResponse, UserResponse,
};
use crate::types::internal::{NewUser, RequestContext, Role, UserProfile};

/// Account administration endpoints
///
/// Every endpoint validates the bearer session and checks the caller's role
/// against the permission table before doing anything.
pub struct AdminApi {
    admin_coordinator: Arc<AdminCoordinator>,
    login_coordinator: Arc<LoginCoordinator>,
}

impl AdminApi {
    pub fn new(
        admin_coordinator: Arc<AdminCoordinator>,
        login_coordinator: Arc<LoginCoordinator>,
    ) -> Self {
        Self {
            admin_coordinator,
            login_coordinator,
        }
    }

    /// Authenticated context whose role may perform `action` on `resource`
    async fn authorize(
        &self,
        req: &Request,
        auth: &BearerAuth,
        resource: &str,
        action: &str,
    ) -> Result<RequestContext, AdminError> {
        let ctx = helpers::session_context(req, &auth.0.token, &self.login_coordinator)
            .await?
            .ok_or_else(AdminError::unauthorized)?;
        let role = ctx
            .session
            .as_ref()
            .map(|session| session.role)
            .ok_or_else(AdminError::unauthorized)?;

        if !self
            .login_coordinator
            .check_permission(role.as_str(), resource, action)
            .await?
        {
            tracing::warn!("{} ({}) denied {} on {}", ctx.actor_id, role, action, resource);
            return Err(AdminError::forbidden(resource, action));
        }

        Ok(ctx)
    }

    fn action_response(user_id: String, changed: bool, done: &str) -> Json<AccountActionResponse> {
        let message = if changed {
            done.to_string()
        } else {
            "User not found".to_string()
        };
        Json(AccountActionResponse {
            user_id,
            changed,
            message,
        })
    }
}

/// API tags for admin endpoints
#[derive(Tags)]
enum AdminTags {
    /// Account administration
    Admin,
}

#[OpenApi(prefix_path = "/admin")]
impl AdminApi {
    /// List every account
    #[oai(path = "/users", method = "get", tag = "AdminTags::Admin")]
    async fn list_users(
        &self,
        req: &Request,
        auth: BearerAuth,
    ) -> Result<Json<UserListResponse>, AdminError> {
        self.authorize(req, &auth, "users", "read").await?;

        let now = Utc::now().timestamp();
        let users = self
            .admin_coordinator
            .list_users()
            .await?
            .into_iter()
            .map(|summary| UserResponse::from_summary(summary, now))
            .collect();

        Ok(Json(UserListResponse { users }))
    }

    /// Create an account
    ///
    /// Without a password in the request, a random one is generated and
    /// returned in this response only.
    #[oai(path = "/users", method = "post", tag = "AdminTags::Admin")]
    async fn create_user(
        &self,
        req: &Request,
        auth: BearerAuth,
        body: Json<CreateUserRequest>,
    ) -> Result<Json<CreateUserResponse>, AdminError> {
        let ctx = self.authorize(req, &auth, "users", "create").await?;
        let Json(body) = body;

        let role = match body.role.as_deref() {
            Some(role) => role.parse::<Role>().map_err(InternalError::from)?,
            None => Role::User,
        };
        let profile = UserProfile {
            full_name: body.full_name,
            email: body.email,
            department: body.department,
            phone: body.phone,
        };

        let (summary, generated_password) = match body.password {
            Some(password) => {
                let new_user = NewUser {
                    username: body.username,
                    password,
                    role,
                    profile,
                };
                (self.admin_coordinator.create_user(&ctx, new_user).await?, None)
            }
            None => {
                let (summary, password) = self
                    .admin_coordinator
                    .create_user_with_generated_password(&ctx, &body.username, role, profile)
                    .await?;
                (summary, Some(password))
            }
        };

        Ok(Json(CreateUserResponse {
            user: UserResponse::from_summary(summary, Utc::now().timestamp()),
            generated_password,
        }))
    }

    /// Fetch one account
    #[oai(path = "/users/:user_id", method = "get", tag = "AdminTags::Admin")]
    async fn get_user(
        &self,
        req: &Request,
        auth: BearerAuth,
        user_id: Path<String>,
    ) -> Result<Json<UserResponse>, AdminError> {
        self.authorize(req, &auth, "users", "read").await?;

        let summary = self
            .admin_coordinator
            .get_user(&user_id)
            .await?
            .ok_or_else(|| AdminError::user_not_found(&user_id))?;

        Ok(Json(UserResponse::from_summary(summary, Utc::now().timestamp())))
    }

    /// Replace an account's profile fields
    #[oai(path = "/users/:user_id/profile", method = "put", tag = "AdminTags::Admin")]
    async fn update_profile(
        &self,
        req: &Request,
        auth: BearerAuth,
        user_id: Path<String>,
        body: Json<UpdateProfileRequest>,
    ) -> Result<Json<AccountActionResponse>, AdminError> {
        let ctx = self.authorize(req, &auth, "users", "update").await?;

        let changed = self
            .admin_coordinator
            .update_profile(&ctx, &user_id, body.0.into())
            .await?;

        Ok(Self::action_response(user_id.0, changed, "Profile updated"))
    }

    /// Lock an account for a number of minutes
    #[oai(path = "/users/:user_id/lock", method = "post", tag = "AdminTags::Admin")]
    async fn lock_account(
        &self,
        req: &Request,
        auth: BearerAuth,
        user_id: Path<String>,
        body: Json<LockAccountRequest>,
    ) -> Result<Json<AccountActionResponse>, AdminError> {
        let ctx = self.authorize(req, &auth, "users", "update").await?;

        let changed = self
            .admin_coordinator
            .lock_account(&ctx, &user_id, body.minutes)
            .await?;

        Ok(Self::action_response(user_id.0, changed, "Account locked"))
    }

    /// Clear an account's lock and failed-login counter
    #[oai(path = "/users/:user_id/unlock", method = "post", tag = "AdminTags::Admin")]
    async fn unlock_account(
        &self,
        req: &Request,
        auth: BearerAuth,
        user_id: Path<String>,
    ) -> Result<Json<AccountActionResponse>, AdminError> {
        let ctx = self.authorize(req, &auth, "users", "update").await?;

        let changed = self.admin_coordinator.unlock_account(&ctx, &user_id).await?;

        Ok(Self::action_response(user_id.0, changed, "Account unlocked"))
    }

    /// Activate or deactivate an account
    ///
    /// Deactivation ends all of the account's sessions.
    #[oai(path = "/users/:user_id/active", method = "post", tag = "AdminTags::Admin")]
    async fn set_active(
        &self,
        req: &Request,
        auth: BearerAuth,
        user_id: Path<String>,
        body: Json<SetActiveRequest>,
    ) -> Result<Json<AccountActionResponse>, AdminError> {
        let ctx = self.authorize(req, &auth, "users", "update").await?;

        if ctx.actor_id == user_id.0 && !body.is_active {
            return Err(AdminError::bad_request("You cannot deactivate your own account"));
        }

        let changed = self
            .admin_coordinator
            .set_active(&ctx, &user_id, body.is_active)
            .await?;
        let done = if body.is_active {
            "Account activated"
        } else {
            "Account deactivated"
        };

        Ok(Self::action_response(user_id.0, changed, done))
    }

    /// Activity log, newest first
    ///
    /// `limit` defaults to 100 and is capped at 1000.
    #[oai(path = "/activity", method = "get", tag = "AdminTags::Admin")]
    async fn activity(
        &self,
        req: &Request,
        auth: BearerAuth,
        user_id: Query<Option<String>>,
        limit: Query<Option<u64>>,
    ) -> Result<Json<ActivityLogResponse>, AdminError> {
        self.authorize(req, &auth, "activity_log", "read").await?;

        let entries = self
            .admin_coordinator
            .get_activity_log(user_id.0.as_deref(), limit.0)
            .await?
            .into_iter()
            .map(ActivityEntryResponse::from)
            .collect();

        Ok(Json(ActivityLogResponse { entries }))
    }
}
