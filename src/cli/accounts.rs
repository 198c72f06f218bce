// Offline account and session maintenance
// Each command runs with a `cli:<command>` actor and records its outcome in
// the activity log.

use std::error::Error;
use std::sync::Arc;

use crate::app_data::AppData;
use crate::coordinators::AdminCoordinator;
use crate::types::internal::{RequestContext, Role, UserProfile};

type CliResult = Result<(), Box<dyn Error>>;

async fn finish(app_data: &AppData, ctx: &RequestContext, result: &CliResult) {
    let outcome = match result {
        Ok(()) => "completed".to_string(),
        Err(e) => format!("failed: {}", e),
    };
    app_data.activity_logger.log_cli_command(ctx, &outcome).await;
}

/// Insert the default development accounts
pub async fn seed(app_data: &Arc<AppData>) -> CliResult {
    let ctx = RequestContext::for_cli("seed");
    let admin = AdminCoordinator::new(Arc::clone(app_data));

    let result: CliResult = async {
        let created = admin.seed_default_users(&ctx).await?;
        if created.is_empty() {
            println!("Default accounts already present; nothing to do.");
        } else {
            println!("Created default accounts: {}", created.join(", "));
            println!("These accounts use a development password. Change it before production use.");
        }
        Ok(())
    }
    .await;

    finish(app_data, &ctx, &result).await;
    result
}

/// Create an account and print its generated password once
pub async fn create_user(
    app_data: &Arc<AppData>,
    username: &str,
    role: &str,
    full_name: Option<String>,
) -> CliResult {
    let ctx = RequestContext::for_cli("user create");
    let admin = AdminCoordinator::new(Arc::clone(app_data));

    let result: CliResult = async {
        let role: Role = role.parse()?;
        let profile = UserProfile {
            full_name,
            ..UserProfile::default()
        };

        let (user, password) = admin
            .create_user_with_generated_password(&ctx, username, role, profile)
            .await?;

        println!("Created {} ({}) with id {}", user.username, user.role, user.id);
        println!("Password (shown once): {}", password);
        Ok(())
    }
    .await;

    finish(app_data, &ctx, &result).await;
    result
}

/// Clear a lock and the failed-login counter
pub async fn unlock_user(app_data: &Arc<AppData>, username: &str) -> CliResult {
    let ctx = RequestContext::for_cli("user unlock");
    let admin = AdminCoordinator::new(Arc::clone(app_data));

    let result: CliResult = async {
        let user = admin.require_user_by_username(username).await?;
        admin.unlock_account(&ctx, &user.id).await?;
        println!("Unlocked {}", user.username);
        Ok(())
    }
    .await;

    finish(app_data, &ctx, &result).await;
    result
}

/// Activate or deactivate an account by username
pub async fn set_user_active(app_data: &Arc<AppData>, username: &str, is_active: bool) -> CliResult {
    let command = if is_active { "user activate" } else { "user deactivate" };
    let ctx = RequestContext::for_cli(command);
    let admin = AdminCoordinator::new(Arc::clone(app_data));

    let result: CliResult = async {
        let user = admin.require_user_by_username(username).await?;
        if user.is_active == is_active {
            println!("{} is already {}", user.username, if is_active { "active" } else { "inactive" });
            return Ok(());
        }

        admin.set_active(&ctx, &user.id, is_active).await?;
        println!("{} {}", if is_active { "Activated" } else { "Deactivated" }, user.username);
        Ok(())
    }
    .await;

    finish(app_data, &ctx, &result).await;
    result
}

/// Delete logged-out and expired sessions
pub async fn cleanup_sessions(app_data: &Arc<AppData>) -> CliResult {
    let ctx = RequestContext::for_cli("sessions cleanup");
    let admin = AdminCoordinator::new(Arc::clone(app_data));

    let result: CliResult = async {
        let removed = admin.cleanup_expired_sessions(&ctx).await?;
        println!("Removed {} stale sessions", removed);
        Ok(())
    }
    .await;

    finish(app_data, &ctx, &result).await;
    result
}
