//! Shuffle, album override and linear playlist endpoints

use crate::api::handlers::{api_error, ApiResult, StatusResponse};
use crate::api::server::AppContext;
use crate::db::QueuedTrack;
use axum::{
    extract::{Path, State},
    Json,
};
use jukebox_common::db::TrackId;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Serialize)]
pub struct ShuffleEnabledResponse {
    status: String,
    count: usize,
}

#[derive(Debug, Serialize)]
pub struct ShuffleStatusResponse {
    shuffle: bool,
}

#[derive(Debug, Deserialize)]
pub struct AlbumRequest {
    album: String,
    artist: String,
}

#[derive(Debug, Serialize)]
pub struct AlbumResponse {
    status: String,
    first_id: TrackId,
    count: usize,
}

#[derive(Debug, Serialize)]
pub struct PlaylistResponse {
    songs: Vec<QueuedTrack>,
}

// ============================================================================
// Shuffle
// ============================================================================

/// POST /shuffle/enable
pub async fn enable_shuffle(State(ctx): State<AppContext>) -> ApiResult<ShuffleEnabledResponse> {
    let count = ctx.supervisor.enable_shuffle().await.map_err(api_error)?;
    Ok(Json(ShuffleEnabledResponse {
        status: "enabled".to_string(),
        count,
    }))
}

/// POST /shuffle/disable
pub async fn disable_shuffle(State(ctx): State<AppContext>) -> ApiResult<StatusResponse> {
    ctx.supervisor.disable_shuffle().await.map_err(api_error)?;
    Ok(StatusResponse::new("disabled"))
}

/// GET /shuffle/status
pub async fn shuffle_status(State(ctx): State<AppContext>) -> Json<ShuffleStatusResponse> {
    Json(ShuffleStatusResponse {
        shuffle: ctx.supervisor.shuffle_enabled().await,
    })
}

// ============================================================================
// Album override
// ============================================================================

/// POST /api/play_album_now
pub async fn play_album_now(
    State(ctx): State<AppContext>,
    Json(req): Json<AlbumRequest>,
) -> ApiResult<AlbumResponse> {
    info!("Play album now: '{}' by '{}'", req.album, req.artist);

    let queued = ctx
        .supervisor
        .play_album_now(&req.album, &req.artist)
        .await
        .map_err(api_error)?;

    Ok(Json(AlbumResponse {
        status: "success".to_string(),
        first_id: queued.first_id,
        count: queued.count,
    }))
}

/// POST /api/clear_album_table
pub async fn clear_album(State(ctx): State<AppContext>) -> ApiResult<StatusResponse> {
    ctx.supervisor.clear_album().await.map_err(api_error)?;
    Ok(StatusResponse::new("cleared"))
}

// ============================================================================
// Linear playlist
// ============================================================================

/// GET /playlist
pub async fn get_playlist(State(ctx): State<AppContext>) -> ApiResult<PlaylistResponse> {
    let songs = ctx.supervisor.playlist().await.map_err(api_error)?;
    Ok(Json(PlaylistResponse { songs }))
}

/// POST /playlist/add/:track_id
pub async fn add_to_playlist(
    State(ctx): State<AppContext>,
    Path(track_id): Path<TrackId>,
) -> ApiResult<StatusResponse> {
    ctx.supervisor
        .playlist_add(track_id)
        .await
        .map_err(api_error)?;
    Ok(StatusResponse::new("added"))
}

/// DELETE /playlist/remove/:track_id
pub async fn remove_from_playlist(
    State(ctx): State<AppContext>,
    Path(track_id): Path<TrackId>,
) -> ApiResult<StatusResponse> {
    ctx.supervisor
        .playlist_remove(track_id)
        .await
        .map_err(api_error)?;
    Ok(StatusResponse::new("removed"))
}

/// DELETE /playlist/clear
pub async fn clear_playlist(State(ctx): State<AppContext>) -> ApiResult<StatusResponse> {
    ctx.supervisor.playlist_clear().await.map_err(api_error)?;
    Ok(StatusResponse::new("cleared"))
}
