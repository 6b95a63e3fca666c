//! Health API Module
//!
//! Public liveness endpoint, outside `/api` so it bypasses authentication.

use std::sync::OnceLock;
use std::time::SystemTime;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;

static STARTED_AT: OnceLock<SystemTime> = OnceLock::new();

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub database: &'static str,
}

pub fn router() -> Router<ServerState> {
    // Record process start the first time the router is built
    STARTED_AT.get_or_init(SystemTime::now);

    Router::new().route("/health", get(health))
}

async fn health(State(state): State<ServerState>) -> Json<HealthStatus> {
    let uptime_seconds = STARTED_AT
        .get()
        .and_then(|t| t.elapsed().ok())
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let database = match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&state.pool)
        .await
    {
        Ok(_) => "ok",
        Err(e) => {
            tracing::error!(error = %e, "Health check database ping failed");
            "unavailable"
        }
    };

    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds,
        database,
    })
}
