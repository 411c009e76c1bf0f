//! Dispatch Routes
//!
//! REST surface for a webapp that triggers dispatch runs on behalf of its
//! signed-in tenant. Credentials arrive through the runtime context headers.
//!
//! Routes:
//! - POST /dispatch/jobs/:job_uid - Dispatch one job
//! - POST /dispatch/batch - Dispatch several jobs
//! - GET /dispatch/jobs/:job_uid/recommendation - Deterministic recommendation

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use zuper_client::RuntimeContext;

use crate::services::dispatcher::{self, DispatchReport};
use crate::services::Recommendation;
use crate::{AppState, Error, Result};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/jobs/:job_uid", post(dispatch_job))
        .route("/jobs/:job_uid/recommendation", get(recommend_job))
        .route("/batch", post(dispatch_batch))
}

#[derive(Debug, Default, Deserialize)]
pub struct DispatchJobRequest {
    #[serde(default)]
    pub preferred_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchDispatchRequest {
    pub job_uids: Vec<String>,
    #[serde(default = "default_optimize")]
    pub optimize: bool,
}

fn default_optimize() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    pub success: bool,
    pub assignment: DispatchReport,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub success: bool,
    pub recommendation: Recommendation,
}

fn runtime(extension: Option<Extension<RuntimeContext>>) -> Option<RuntimeContext> {
    extension.map(|Extension(context)| context)
}

/// POST /dispatch/jobs/:job_uid
async fn dispatch_job(
    State(state): State<AppState>,
    context: Option<Extension<RuntimeContext>>,
    Path(job_uid): Path<String>,
    body: Option<Json<DispatchJobRequest>>,
) -> Result<Json<DispatchResponse>> {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    let ctx = state.tool_context(runtime(context));

    let report = state
        .dispatcher
        .dispatch_job(&ctx, &job_uid, request.preferred_date.as_deref())
        .await?;

    let message = if report.assigned {
        format!("Job {} dispatched", job_uid)
    } else {
        format!("Dispatcher finished without assigning job {}", job_uid)
    };

    Ok(Json(DispatchResponse {
        success: true,
        assignment: report,
        message,
    }))
}

/// POST /dispatch/batch
async fn dispatch_batch(
    State(state): State<AppState>,
    context: Option<Extension<RuntimeContext>>,
    Json(request): Json<BatchDispatchRequest>,
) -> Result<Json<DispatchResponse>> {
    if request.job_uids.iter().any(|uid| uid.trim().is_empty()) {
        return Err(Error::InvalidInput("job uids must not be empty".to_string()));
    }
    let ctx = state.tool_context(runtime(context));

    let report = state
        .dispatcher
        .batch_dispatch(&ctx, &request.job_uids, request.optimize)
        .await?;

    Ok(Json(DispatchResponse {
        success: true,
        message: format!("Batch dispatch of {} job(s) finished", request.job_uids.len()),
        assignment: report,
    }))
}

/// GET /dispatch/jobs/:job_uid/recommendation
async fn recommend_job(
    State(state): State<AppState>,
    context: Option<Extension<RuntimeContext>>,
    Path(job_uid): Path<String>,
) -> Result<Json<RecommendationResponse>> {
    let ctx = state.tool_context(runtime(context));
    let recommendation = dispatcher::recommend(&ctx, Some(&job_uid)).await?;

    Ok(Json(RecommendationResponse {
        success: true,
        recommendation,
    }))
}
