//! Directory scanner API handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use mediashelf_core::{
    organizer::OrganizeResult, preview_organization, scanner::ScanProgress, MediaFolder,
};

use super::handlers::{api_error, ApiError};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for starting a scan
#[derive(Debug, Default, Deserialize)]
pub struct StartScanBody {
    /// Folders to scan instead of the configured library folders
    pub folders: Option<Vec<MediaFolder>>,
}

#[derive(Debug, Serialize)]
pub struct StartScanResponse {
    pub ok: bool,
    pub folders: usize,
}

#[derive(Debug, Serialize)]
pub struct StopResponse {
    pub ok: bool,
    /// False when nothing was running
    pub stopped: bool,
}

#[derive(Debug, Serialize)]
pub struct ScanStatusResponse {
    pub progress: ScanProgress,
    pub items_found: usize,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub ok: bool,
    pub total: usize,
    pub results: Vec<OrganizeResult>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/scanner/start
///
/// Starts a scan in the background. Poll `/scanner/status` for progress.
pub async fn start_scan(
    State(state): State<Arc<AppState>>,
    body: Option<Json<StartScanBody>>,
) -> Result<(StatusCode, Json<StartScanResponse>), ApiError> {
    let body = body.map(|Json(body)| body).unwrap_or_default();
    let folders = body
        .folders
        .unwrap_or_else(|| state.config().library.folders.clone());

    if folders.iter().all(|folder| !folder.enabled) {
        return Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "No media folders configured",
        ));
    }

    let scanner = Arc::clone(state.scanner());
    if scanner.is_scanning().await {
        return Err(api_error(StatusCode::CONFLICT, "A scan is already running"));
    }

    let count = folders.len();
    tokio::spawn(async move {
        if let Err(e) = scanner.scan(&folders).await {
            warn!(error = %e, "Background scan failed");
        }
    });
    info!(folders = count, "Scan requested");

    Ok((
        StatusCode::ACCEPTED,
        Json(StartScanResponse {
            ok: true,
            folders: count,
        }),
    ))
}

/// POST /api/v1/scanner/stop
pub async fn stop_scan(State(state): State<Arc<AppState>>) -> Json<StopResponse> {
    let stopped = state.scanner().abort().await;
    Json(StopResponse { ok: true, stopped })
}

/// GET /api/v1/scanner/status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<ScanStatusResponse> {
    let progress = state.scanner().progress().await;
    let items_found = state.scanner().scanned_items().await.len();
    Json(ScanStatusResponse {
        progress,
        items_found,
    })
}

/// GET /api/v1/scanner/preview
///
/// Where the last scan's items would go with the configured organizer settings.
pub async fn preview(State(state): State<Arc<AppState>>) -> Json<PreviewResponse> {
    let items = state.scanner().scanned_items().await;
    let options = state.config().organize_options(true);
    let results = preview_organization(&items, &options);
    Json(PreviewResponse {
        ok: true,
        total: results.len(),
        results,
    })
}
