/// Health check endpoint
///
/// ```text
/// GET /health
/// ```
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "pool": { "active_connections": 1, "idle_connections": 4, "total_connections": 5 }
/// }
/// ```
///
/// Responds 503 with `"status": "degraded"` when the database is unreachable.

use crate::app::AppState;
use axum::{extract::State, http::StatusCode, Json};
use projectdesk_shared::db::pool::{get_pool_stats, health_check as database_health_check, PoolStats};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub pool: PoolStats,
}

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status_code, status, database) = match database_health_check(&state.db).await {
        Ok(()) => (StatusCode::OK, "healthy", "connected"),
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", "disconnected")
        }
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: database.to_string(),
            pool: get_pool_stats(&state.db),
        }),
    )
}
