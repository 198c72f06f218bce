use std::sync::Arc;
use std::time::Duration;

use poem::{Route, Server, listener::TcpListener};
use poem_openapi::OpenApiService;
use tokio::task::JoinHandle;

use crate::api::{AdminApi, AuthApi, HealthApi};
use crate::app_data::AppData;
use crate::coordinators::{AdminCoordinator, LoginCoordinator};
use crate::types::internal::RequestContext;

/// Build the HTTP routes: the API under `/api`, Swagger UI under `/swagger`
pub fn build_routes(app_data: Arc<AppData>) -> Route {
    let login_coordinator = Arc::new(LoginCoordinator::new(Arc::clone(&app_data)));
    let admin_coordinator = Arc::new(AdminCoordinator::new(Arc::clone(&app_data)));

    let apis = (
        HealthApi::new(app_data.db.clone()),
        AuthApi::new(Arc::clone(&login_coordinator)),
        AdminApi::new(admin_coordinator, login_coordinator),
    );

    let server_url = format!("http://{}/api", app_data.settings.server_address());
    let api_service = OpenApiService::new(apis, "LVD Records API", env!("CARGO_PKG_VERSION"))
        .server(server_url);
    let ui = api_service.swagger_ui();

    Route::new().nest("/api", api_service).nest("/swagger", ui)
}

/// Periodically delete stale sessions; `None` when the interval is 0
pub fn spawn_session_sweep(app_data: Arc<AppData>) -> Option<JoinHandle<()>> {
    let minutes = app_data.settings.session_cleanup_interval_minutes;
    if minutes == 0 {
        tracing::info!("Session sweep disabled");
        return None;
    }

    let admin_coordinator = AdminCoordinator::new(app_data);
    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(minutes * 60));
        // First tick fires immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            let ctx = RequestContext::for_system("session_sweep");
            if let Err(e) = admin_coordinator.cleanup_expired_sessions(&ctx).await {
                tracing::error!("Session sweep failed: {}", e);
            }
        }
    }))
}

/// Seed if configured, start the sweep, then serve until shutdown
pub async fn run_server(app_data: Arc<AppData>) -> Result<(), Box<dyn std::error::Error>> {
    if app_data.settings.seed_default_users {
        let created = AdminCoordinator::new(Arc::clone(&app_data))
            .seed_default_users(&RequestContext::for_system("startup_seed"))
            .await?;
        if !created.is_empty() {
            tracing::warn!("Seeded development accounts: {}", created.join(", "));
        }
    }

    let sweep = spawn_session_sweep(Arc::clone(&app_data));

    let address = app_data.settings.server_address();
    let app = build_routes(Arc::clone(&app_data));

    tracing::info!("Starting server on http://{}", address);
    tracing::info!("Swagger UI available at http://{}/swagger", address);

    let result = Server::new(TcpListener::bind(address)).run(app).await;

    if let Some(sweep) = sweep {
        sweep.abort();
    }
    result?;

    Ok(())
}
