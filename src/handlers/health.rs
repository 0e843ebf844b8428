use crate::{db, handlers::AppState};
use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;
use std::time::Instant;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub latency_ms: u64,
    pub timestamp: String,
}

/// Readiness probe backed by a database ping
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let start = Instant::now();
    let db_ok = db::check_connection(&state.db).await.is_ok();
    let latency_ms = start.elapsed().as_millis() as u64;

    let (code, status, database) = if db_ok {
        (StatusCode::OK, "up", "up")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "down", "down")
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: database.to_string(),
            latency_ms,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }),
    )
}
