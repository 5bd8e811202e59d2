//! Saved playlist endpoints

use crate::api::handlers::{api_error, ApiResult, StatusResponse};
use crate::api::server::AppContext;
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::NaiveDateTime;
use jukebox_common::db::PlaylistId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct NameRequest {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoadRequest {
    id: PlaylistId,
}

#[derive(Debug, Serialize)]
pub struct SavedResponse {
    status: String,
    id: PlaylistId,
}

#[derive(Debug, Serialize)]
pub struct LoadedResponse {
    status: String,
    name: String,
}

#[derive(Debug, Serialize)]
pub struct SavedPlaylistEntry {
    id: PlaylistId,
    name: String,
    date: NaiveDateTime,
    count: i64,
}

#[derive(Debug, Serialize)]
pub struct PlaylistListResponse {
    playlists: Vec<SavedPlaylistEntry>,
}

#[derive(Debug, Serialize)]
pub struct LibraryVersionResponse {
    library_version: u64,
}

/// GET /api/playlists - newest first
pub async fn list_playlists(State(ctx): State<AppContext>) -> ApiResult<PlaylistListResponse> {
    let playlists = ctx
        .supervisor
        .saved_playlists()
        .await
        .map_err(api_error)?
        .into_iter()
        .map(|p| SavedPlaylistEntry {
            id: p.id,
            name: p.name,
            date: p.created_at,
            count: p.count,
        })
        .collect();

    Ok(Json(PlaylistListResponse { playlists }))
}

/// POST /api/playlists/save {name}
pub async fn save_playlist(
    State(ctx): State<AppContext>,
    Json(req): Json<NameRequest>,
) -> ApiResult<SavedResponse> {
    let id = ctx
        .supervisor
        .save_playlist(&req.name)
        .await
        .map_err(api_error)?;
    Ok(Json(SavedResponse {
        status: "success".to_string(),
        id,
    }))
}

/// POST /api/playlists/create {name}
pub async fn create_playlist(
    State(ctx): State<AppContext>,
    Json(req): Json<NameRequest>,
) -> ApiResult<SavedResponse> {
    let id = ctx
        .supervisor
        .create_playlist(&req.name)
        .await
        .map_err(api_error)?;
    Ok(Json(SavedResponse {
        status: "success".to_string(),
        id,
    }))
}

/// POST /api/playlists/load {id}
pub async fn load_playlist(
    State(ctx): State<AppContext>,
    Json(req): Json<LoadRequest>,
) -> ApiResult<LoadedResponse> {
    let name = ctx
        .supervisor
        .load_playlist(req.id)
        .await
        .map_err(api_error)?;
    Ok(Json(LoadedResponse {
        status: "success".to_string(),
        name,
    }))
}

/// DELETE /api/playlists/:playlist_id
pub async fn delete_playlist(
    State(ctx): State<AppContext>,
    Path(playlist_id): Path<PlaylistId>,
) -> ApiResult<StatusResponse> {
    ctx.supervisor
        .delete_playlist(playlist_id)
        .await
        .map_err(api_error)?;
    Ok(StatusResponse::new("deleted"))
}

/// GET /api/library_version
pub async fn library_version(State(ctx): State<AppContext>) -> Json<LibraryVersionResponse> {
    Json(LibraryVersionResponse {
        library_version: ctx.supervisor.library_version().await,
    })
}
