use chrono::Utc;
use poem_openapi::{OpenApi, Tags, payload::Json};
use sea_orm::DatabaseConnection;

use crate::types::dto::common::HealthResponse;

/// Health check API
pub struct HealthApi {
    db: DatabaseConnection,
}

impl HealthApi {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// API tags for health endpoints
#[derive(Tags)]
enum ApiTags {
    /// Health check endpoints
    Health,
}

#[OpenApi]
impl HealthApi {
    /// Health check endpoint
    ///
    /// Reports whether the service and its database are reachable
    #[oai(path = "/health", method = "get", tag = "ApiTags::Health")]
    async fn health(&self) -> Json<HealthResponse> {
        let database_ok = match self.db.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Health check database ping failed: {}", e);
                false
            }
        };

        Json(HealthResponse {
            status: if database_ok { "healthy" } else { "degraded" }.to_string(),
            database: if database_ok { "ok" } else { "unreachable" }.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::setup_test_db;

    #[tokio::test]
    async fn test_health_reports_database() {
        let db = setup_test_db().await;
        let api = HealthApi::new(db.clone());

        let response = api.health().await;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.database, "ok");

        db.close().await.unwrap();
        let response = api.health().await;
        assert_eq!(response.status, "degraded");
        assert_eq!(response.database, "unreachable");
    }
}
