//! Liveness and readiness endpoints
//!
//! `/health` reports that the process is up; `/health/ready` additionally
//! round-trips the database pool so load balancers only route plan traffic
//! once Postgres is reachable.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
}

impl HealthReport {
    fn with_status(status: &'static str) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

pub async fn health_check() -> Json<HealthReport> {
    Json(HealthReport::with_status("healthy"))
}

/// Fails with 503 until a `SELECT 1` succeeds against the pool.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthReport>, StatusCode> {
    sqlx::query("SELECT 1")
        .fetch_one(&state.pool)
        .await
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;

    Ok(Json(HealthReport::with_status("ready")))
}
