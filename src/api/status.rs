//! Status Routes
//!
//! Routes:
//! - GET /health - Health check with version, uptime and LLM providers
//! - GET /health/live - Liveness check (server responding)

use std::sync::OnceLock;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::AppState;

static STARTUP_TIME: OnceLock<Instant> = OnceLock::new();

/// Initialize startup time. Call this once at server start.
pub fn init_startup_time() {
    let _ = STARTUP_TIME.get_or_init(Instant::now);
}

fn get_uptime_seconds() -> u64 {
    STARTUP_TIME.get().map(|start| start.elapsed().as_secs()).unwrap_or(0)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness_check))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    /// Configured LLM providers in fallback order.
    pub llm_providers: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// Tools and resources work; dispatching needs an LLM provider.
    Degraded,
}

impl HealthStatus {
    fn from_providers(providers: &[String]) -> Self {
        if providers.is_empty() {
            Self::Degraded
        } else {
            Self::Healthy
        }
    }
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let llm_providers = state.llm.providers().await;
    Json(HealthResponse {
        status: HealthStatus::from_providers(&llm_providers),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        uptime_seconds: get_uptime_seconds(),
        llm_providers,
    })
}

/// GET /health/live
async fn liveness_check() -> impl IntoResponse {
    StatusCode::OK
}
