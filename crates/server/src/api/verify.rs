//! Verification queue API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use mediashelf_core::{
    queue::{
        BatchEntry, JobOptions, JobRequest, JobStatus, QueueStatus, VerifyJob, DEFAULT_PRIORITY,
    },
    StoredResult,
};

use super::handlers::{api_error, ApiError};
use crate::state::AppState;

/// Jobs returned alongside the queue status
const RECENT_JOBS_LIMIT: usize = 50;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for enqueueing several paths at once
#[derive(Debug, Deserialize)]
pub struct BatchBody {
    pub items: Vec<BatchEntry>,
    #[serde(default)]
    pub options: JobOptions,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default = "default_priority")]
    pub priority: u8,
}

fn default_priority() -> u8 {
    DEFAULT_PRIORITY
}

#[derive(Debug, Serialize)]
pub struct EnqueueResponse {
    pub ok: bool,
    pub job_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub ok: bool,
    pub job_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct QueueResponse {
    pub status: QueueStatus,
    pub jobs: Vec<VerifyJob>,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub ok: bool,
    pub removed: usize,
}

#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub ok: bool,
    pub results: Vec<StoredResult>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/verify/queue
pub async fn enqueue(
    State(state): State<Arc<AppState>>,
    Json(body): Json<JobRequest>,
) -> Result<(StatusCode, Json<EnqueueResponse>), ApiError> {
    if body.path.as_os_str().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "path is required"));
    }

    let job_id = state
        .queue()
        .add_job(
            body.job_type,
            body.path,
            body.options,
            body.metadata,
            body.priority,
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(EnqueueResponse { ok: true, job_id }),
    ))
}

/// POST /api/v1/verify/queue/batch
pub async fn enqueue_batch(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BatchBody>,
) -> Result<(StatusCode, Json<BatchResponse>), ApiError> {
    if body.items.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "items cannot be empty"));
    }
    if body.items.iter().any(|item| item.path.as_os_str().is_empty()) {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "every item needs a path",
        ));
    }

    let job_ids = state
        .queue()
        .add_batch(body.items, body.options, body.metadata, body.priority)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(BatchResponse { ok: true, job_ids }),
    ))
}

/// GET /api/v1/verify/queue
pub async fn get_queue(State(state): State<Arc<AppState>>) -> Json<QueueResponse> {
    let status = state.queue().status().await;
    let jobs = state.queue().recent_jobs(RECENT_JOBS_LIMIT).await;
    Json(QueueResponse { status, jobs })
}

/// GET /api/v1/verify/queue/{id}
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<VerifyJob>, ApiError> {
    state
        .queue()
        .job(id)
        .await
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("Job not found: {}", id)))
}

/// DELETE /api/v1/verify/queue/{id}
///
/// Only queued jobs can be cancelled.
pub async fn cancel_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<OkResponse>, ApiError> {
    if state.queue().cancel_job(id).await {
        return Ok(Json(OkResponse { ok: true }));
    }

    match state.queue().job(id).await {
        Some(job) => Err(api_error(
            StatusCode::CONFLICT,
            format!(
                "Job is {} and can no longer be cancelled",
                status_name(job.status)
            ),
        )),
        None => Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Job not found: {}", id),
        )),
    }
}

/// POST /api/v1/verify/queue/clear
pub async fn clear(State(state): State<Arc<AppState>>) -> Json<ClearResponse> {
    let removed = state.queue().clear_completed().await;
    Json(ClearResponse { ok: true, removed })
}

/// GET /api/v1/verify/queue/results
pub async fn get_results(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ResultsResponse>, ApiError> {
    match state.queue().results().await {
        Ok(results) => Ok(Json(ResultsResponse { ok: true, results })),
        Err(e) => Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

fn status_name(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Queued => "queued",
        JobStatus::Running => "running",
        JobStatus::Completed => "completed",
        JobStatus::Failed => "failed",
    }
}
