use std::sync::Arc;

use clap::Parser;

use lvd_records_backend::AppData;
use lvd_records_backend::cli::{self, Cli, Commands};
use lvd_records_backend::config::{
    AppSettings, LoggingConfig, SystemEnvironment, init_database, init_logging,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&LoggingConfig::from_env_provider(&SystemEnvironment))?;

    let settings = AppSettings::from_env()?;
    tracing::debug!("Loaded settings: {:?}", settings);

    let db = init_database(&settings.database_url).await?;
    cli::migrate::run_migrations(&db).await?;

    let command = cli.command.unwrap_or(Commands::Serve);
    if matches!(command, Commands::Migrate) {
        return Ok(());
    }

    let app_data = Arc::new(AppData::init(db, settings).await?);
    cli::execute_command(command, app_data).await
}
