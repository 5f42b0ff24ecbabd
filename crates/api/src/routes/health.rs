//! Health probes.

use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use persistence::metrics::record_pool_metrics;
use serde::Serialize;
use sqlx::PgPool;

use crate::app::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: DatabaseHealth,
    pub external_services: ExternalServicesHealth,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseHealth {
    pub connected: bool,
    pub latency_ms: Option<u64>,
    pub pool_size: u32,
    pub pool_idle: usize,
}

/// Configuration state of the upstream APIs. They are not probed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ExternalServicesHealth {
    pub llm_configured: bool,
    pub llm_model: String,
    pub calendar_base_url: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// Round-trip time of `SELECT 1`, or `None` when the database is unreachable.
async fn ping(pool: &PgPool) -> Option<u64> {
    let start = Instant::now();
    sqlx::query("SELECT 1").execute(pool).await.ok()?;
    Some(start.elapsed().as_millis() as u64)
}

/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let latency_ms = ping(&state.pool).await;
    record_pool_metrics(&state.pool);

    let connected = latency_ms.is_some();
    let response = HealthResponse {
        status: if connected { "healthy" } else { "unhealthy" },
        version: env!("CARGO_PKG_VERSION"),
        database: DatabaseHealth {
            connected,
            latency_ms,
            pool_size: state.pool.size(),
            pool_idle: state.pool.num_idle(),
        },
        external_services: ExternalServicesHealth {
            llm_configured: state.summarizer.is_configured(),
            llm_model: state.config.llm.model.clone(),
            calendar_base_url: state.config.calendar.base_url.clone(),
        },
    };

    let status = if connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}

/// GET /api/health/live
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse { status: "alive" })
}

/// GET /api/health/ready. 503 until the database answers.
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, StatusCode> {
    match ping(&state.pool).await {
        Some(_) => Ok(Json(StatusResponse { status: "ready" })),
        None => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}
