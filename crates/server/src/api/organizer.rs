//! File organizer API handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use mediashelf_core::{
    organizer::{
        ConflictResolution, OrganizeOperation, OrganizeOptions, OrganizeProgress, OrganizeResult,
        OrganizeSummary,
    },
    preview_organization, ScannedItem,
};

use super::handlers::{api_error, ApiError};
use super::scanner::{PreviewResponse, StopResponse};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for organizer preview and start.
///
/// Unset fields fall back to the configured defaults; `items` falls back to
/// the result of the last scan.
#[derive(Debug, Default, Deserialize)]
pub struct OrganizeBody {
    pub items: Option<Vec<ScannedItem>>,
    pub operation: Option<OrganizeOperation>,
    pub conflict_resolution: Option<ConflictResolution>,
    pub cleanup_empty_folders: Option<bool>,
    pub verify_checksums: Option<bool>,
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
pub struct StartOrganizeResponse {
    pub ok: bool,
    pub total: usize,
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
pub struct OrganizeStatusResponse {
    pub progress: OrganizeProgress,
    pub summary: OrganizeSummary,
}

// ============================================================================
// Helpers
// ============================================================================

fn options_for(state: &AppState, body: &OrganizeBody) -> OrganizeOptions {
    let mut options = state.config().organize_options(body.dry_run);
    if let Some(operation) = body.operation {
        options.operation = operation;
    }
    if let Some(conflict_resolution) = body.conflict_resolution {
        options.conflict_resolution = conflict_resolution;
    }
    if let Some(cleanup) = body.cleanup_empty_folders {
        options.cleanup_empty_folders = cleanup;
    }
    if let Some(verify) = body.verify_checksums {
        options.verify_checksums = verify;
    }
    options
}

async fn items_for(state: &AppState, body: &mut OrganizeBody) -> Result<Vec<ScannedItem>, ApiError> {
    let items = match body.items.take() {
        Some(items) => items,
        None => state.scanner().scanned_items().await,
    };
    if items.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "No items to organize, run a scan first",
        ));
    }
    Ok(items)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/organizer/preview
pub async fn preview(
    State(state): State<Arc<AppState>>,
    body: Option<Json<OrganizeBody>>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let mut body = body.map(|Json(body)| body).unwrap_or_default();
    let items = items_for(&state, &mut body).await?;
    let options = options_for(&state, &body);

    let results: Vec<OrganizeResult> = preview_organization(&items, &options);
    Ok(Json(PreviewResponse {
        ok: true,
        total: results.len(),
        results,
    }))
}

/// POST /api/v1/organizer/start
///
/// Organizes in the background. Poll `/organizer/status` for progress.
pub async fn start(
    State(state): State<Arc<AppState>>,
    body: Option<Json<OrganizeBody>>,
) -> Result<(StatusCode, Json<StartOrganizeResponse>), ApiError> {
    let mut body = body.map(|Json(body)| body).unwrap_or_default();

    if state.config().organizer.destinations.iter().next().is_none() {
        return Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "No organizer destinations configured",
        ));
    }

    let items = items_for(&state, &mut body).await?;
    let options = options_for(&state, &body);

    let organizer = Arc::clone(state.organizer());
    if organizer.is_organizing().await {
        return Err(api_error(
            StatusCode::CONFLICT,
            "Organization is already in progress",
        ));
    }

    let total = items.len();
    let dry_run = options.dry_run;
    tokio::spawn(async move {
        if let Err(e) = organizer.organize(&items, &options).await {
            warn!(error = %e, "Background organize failed");
        }
    });
    info!(items = total, dry_run, "Organize requested");

    Ok((
        StatusCode::ACCEPTED,
        Json(StartOrganizeResponse {
            ok: true,
            total,
            dry_run,
        }),
    ))
}

/// POST /api/v1/organizer/stop
pub async fn stop(State(state): State<Arc<AppState>>) -> Json<StopResponse> {
    let stopped = state.organizer().abort().await;
    Json(StopResponse { ok: true, stopped })
}

/// GET /api/v1/organizer/status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<OrganizeStatusResponse> {
    let progress = state.organizer().progress().await;
    let results = state.organizer().results().await;
    Json(OrganizeStatusResponse {
        progress,
        summary: OrganizeSummary::from_results(results, 0),
    })
}
