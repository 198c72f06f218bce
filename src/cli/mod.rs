// CLI module: server startup plus offline account maintenance

pub mod accounts;
pub mod migrate;
pub mod serve;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::app_data::AppData;

/// Land-records account backend
#[derive(Parser)]
#[command(name = "lvd-records")]
#[command(about = "Land-records office account and session backend", long_about = None)]
pub struct Cli {
    /// Defaults to `serve`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Migrate, optionally seed, then run the HTTP server
    Serve,

    /// Apply database migrations and exit
    Migrate,

    /// Insert the default development accounts (idempotent)
    Seed,

    /// Account maintenance
    #[command(subcommand)]
    User(UserCommands),

    /// Session maintenance
    #[command(subcommand)]
    Sessions(SessionCommands),
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create an account with a generated password, printed once
    Create {
        username: String,

        /// `Administrator` or `User`
        #[arg(long, default_value = "User")]
        role: String,

        #[arg(long)]
        full_name: Option<String>,
    },

    /// Clear the lock and failed-login counter
    Unlock { username: String },

    /// Allow the account to log in again
    Activate { username: String },

    /// Block the account and end its sessions
    Deactivate { username: String },
}

#[derive(Subcommand)]
pub enum SessionCommands {
    /// Delete logged-out and expired sessions
    Cleanup,
}

impl Commands {
    /// Name recorded as the `cli:<name>` actor
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Serve => "serve",
            Commands::Migrate => "migrate",
            Commands::Seed => "seed",
            Commands::User(UserCommands::Create { .. }) => "user create",
            Commands::User(UserCommands::Unlock { .. }) => "user unlock",
            Commands::User(UserCommands::Activate { .. }) => "user activate",
            Commands::User(UserCommands::Deactivate { .. }) => "user deactivate",
            Commands::Sessions(SessionCommands::Cleanup) => "sessions cleanup",
        }
    }
}

/// Execute a CLI command against initialized application data
///
/// Migrations have already run by the time this is called.
pub async fn execute_command(
    command: Commands,
    app_data: Arc<AppData>,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Serve => serve::run_server(app_data).await?,
        Commands::Migrate => {
            println!("Database is up to date.");
        }
        Commands::Seed => accounts::seed(&app_data).await?,
        Commands::User(user_command) => match user_command {
            UserCommands::Create {
                username,
                role,
                full_name,
            } => accounts::create_user(&app_data, &username, &role, full_name).await?,
            UserCommands::Unlock { username } => accounts::unlock_user(&app_data, &username).await?,
            UserCommands::Activate { username } => {
                accounts::set_user_active(&app_data, &username, true).await?
            }
            UserCommands::Deactivate { username } => {
                accounts::set_user_active(&app_data, &username, false).await?
            }
        },
        Commands::Sessions(SessionCommands::Cleanup) => accounts::cleanup_sessions(&app_data).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["lvd-records"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_user_create_arguments() {
        let cli = Cli::try_parse_from([
            "lvd-records",
            "user",
            "create",
            "surveyor",
            "--role",
            "Administrator",
            "--full-name",
            "Field Surveyor",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::User(UserCommands::Create {
                username,
                role,
                full_name,
            })) => {
                assert_eq!(username, "surveyor");
                assert_eq!(role, "Administrator");
                assert_eq!(full_name.as_deref(), Some("Field Surveyor"));
            }
            _ => panic!("expected user create"),
        }
    }

    #[test]
    fn test_command_names() {
        let cli = Cli::try_parse_from(["lvd-records", "sessions", "cleanup"]).unwrap();
        assert_eq!(cli.command.unwrap().name(), "sessions cleanup");
    }
}
