//! HTTP request handlers for playback control
//!
//! Shared response types and the error-to-status mapping live here too.

use crate::api::server::AppContext;
use crate::db::tracks;
use crate::error::Error;
use crate::player::{list_audio_devices, AudioDevice};
use crate::playback::{PlayOutcome, StatusReport};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use jukebox_common::db::TrackId;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn new(status: impl Into<String>) -> Json<Self> {
        Json(Self {
            status: status.into(),
        })
    }
}

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<StatusResponse>);

pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// Map an engine error onto an HTTP status
pub fn api_error(e: Error) -> ApiError {
    let code = match &e {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::BadRequest(_) => StatusCode::BAD_REQUEST,
        _ => {
            error!("Request failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (code, StatusResponse::new(format!("error: {}", e)))
}

#[derive(Debug, Deserialize)]
pub struct PlayParams {
    device: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlayResponse {
    status: String,
    device_used: String,
}

#[derive(Debug, Serialize)]
pub struct VolumeResponse {
    volume: u8,
}

#[derive(Debug, Deserialize)]
pub struct CurrentParams {
    #[serde(default)]
    current_id: TrackId,
}

#[derive(Debug, Serialize)]
pub struct NextResponse {
    id: Option<TrackId>,
}

#[derive(Debug, Serialize)]
pub struct DeviceListResponse {
    devices: Vec<AudioDevice>,
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "jukebox".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Playback Control Endpoints
// ============================================================================

/// GET /play/:track_id?device=
pub async fn play(
    State(ctx): State<AppContext>,
    Path(track_id): Path<TrackId>,
    Query(params): Query<PlayParams>,
) -> ApiResult<PlayResponse> {
    info!("Play request: track {} (device {:?})", track_id, params.device);

    match ctx
        .supervisor
        .play(track_id, params.device.as_deref())
        .await
        .map_err(api_error)?
    {
        PlayOutcome::Playing { device, .. } => Ok(Json(PlayResponse {
            status: "playing".to_string(),
            device_used: device,
        })),
        PlayOutcome::NotFound => Err((
            StatusCode::NOT_FOUND,
            StatusResponse::new("error: song not found"),
        )),
    }
}

/// GET /stop
pub async fn stop(State(ctx): State<AppContext>) -> ApiResult<StatusResponse> {
    ctx.supervisor.stop().await.map_err(api_error)?;
    Ok(StatusResponse::new("stopped"))
}

/// GET /pause - toggles
pub async fn toggle_pause(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    ctx.supervisor.toggle_pause().await;
    StatusResponse::new("toggled")
}

/// GET /seek/:seconds - relative
pub async fn seek(State(ctx): State<AppContext>, Path(seconds): Path<f64>) -> Json<StatusResponse> {
    ctx.supervisor.seek(seconds).await;
    StatusResponse::new("moved")
}

/// GET /setpos/:position - absolute
pub async fn set_position(
    State(ctx): State<AppContext>,
    Path(position): Path<f64>,
) -> Json<StatusResponse> {
    ctx.supervisor.set_position(position).await;
    StatusResponse::new("set")
}

/// GET /volume/:level
pub async fn set_volume(
    State(ctx): State<AppContext>,
    Path(level): Path<i64>,
) -> Json<VolumeResponse> {
    let volume = ctx.supervisor.set_volume(level).await;
    Json(VolumeResponse { volume })
}

/// GET /status
pub async fn status(State(ctx): State<AppContext>) -> ApiResult<StatusReport> {
    Ok(Json(ctx.supervisor.status().await.map_err(api_error)?))
}

/// GET /next?current_id=
pub async fn next(
    State(ctx): State<AppContext>,
    Query(params): Query<CurrentParams>,
) -> ApiResult<NextResponse> {
    let id = ctx
        .supervisor
        .next(params.current_id)
        .await
        .map_err(api_error)?;
    Ok(Json(NextResponse { id }))
}

/// GET /previous?current_id=
pub async fn previous(
    State(ctx): State<AppContext>,
    Query(params): Query<CurrentParams>,
) -> ApiResult<NextResponse> {
    let id = ctx
        .supervisor
        .previous(params.current_id)
        .await
        .map_err(api_error)?;
    Ok(Json(NextResponse { id }))
}

// ============================================================================
// Audio Device Endpoints
// ============================================================================

/// GET /audio-devices
pub async fn audio_devices(State(ctx): State<AppContext>) -> Json<DeviceListResponse> {
    let devices = list_audio_devices(&ctx.mpv_path).await;
    Json(DeviceListResponse { devices })
}

// ============================================================================
// Cover Art
// ============================================================================

/// GET /cover/:track_id - image file recorded by the indexer
pub async fn cover(
    State(ctx): State<AppContext>,
    Path(track_id): Path<TrackId>,
) -> Result<Response, ApiError> {
    let Some(cover_path) = tracks::find_cover_path(ctx.supervisor.db(), track_id)
        .await
        .map_err(api_error)?
    else {
        return Err((StatusCode::NOT_FOUND, StatusResponse::new("error: no cover")));
    };

    match tokio::fs::read(&cover_path).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, image_mime(&cover_path))], bytes).into_response()),
        Err(e) => {
            debug!("Cover {} for track {} unreadable: {}", cover_path, track_id, e);
            Err((StatusCode::NOT_FOUND, StatusResponse::new("error: no cover")))
        }
    }
}

fn image_mime(path: &str) -> &'static str {
    let extension = std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "image/jpeg",
    }
}
