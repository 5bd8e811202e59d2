//! HTTP server setup and routing

use crate::error::{Error, Result};
use crate::playback::PlaybackSupervisor;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub supervisor: Arc<PlaybackSupervisor>,
    /// Player binary, used for device enumeration
    pub mpv_path: PathBuf,
}

/// Build the router with every endpoint
pub fn build_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(super::handlers::health))

        // Playback control
        .route("/play/:track_id", get(super::handlers::play))
        .route("/stop", get(super::handlers::stop))
        .route("/pause", get(super::handlers::toggle_pause))
        .route("/seek/:seconds", get(super::handlers::seek))
        .route("/setpos/:position", get(super::handlers::set_position))
        .route("/volume/:level", get(super::handlers::set_volume))
        .route("/status", get(super::handlers::status))
        .route("/next", get(super::handlers::next))
        .route("/previous", get(super::handlers::previous))
        .route("/audio-devices", get(super::handlers::audio_devices))
        .route("/cover/:track_id", get(super::handlers::cover))

        // Shuffle and album override
        .route("/shuffle/enable", post(super::queue::enable_shuffle))
        .route("/shuffle/disable", post(super::queue::disable_shuffle))
        .route("/shuffle/status", get(super::queue::shuffle_status))
        .route("/api/play_album_now", post(super::queue::play_album_now))
        .route("/api/clear_album_table", post(super::queue::clear_album))

        // Linear playlist
        .route("/playlist", get(super::queue::get_playlist))
        .route("/playlist/add/:track_id", post(super::queue::add_to_playlist))
        .route("/playlist/remove/:track_id", delete(super::queue::remove_from_playlist))
        .route("/playlist/clear", delete(super::queue::clear_playlist))

        // Saved playlists
        .route("/api/playlists", get(super::library::list_playlists))
        .route("/api/playlists/save", post(super::library::save_playlist))
        .route("/api/playlists/create", post(super::library::create_playlist))
        .route("/api/playlists/load", post(super::library::load_playlist))
        .route("/api/playlists/:playlist_id", delete(super::library::delete_playlist))
        .route("/api/library_version", get(super::library::library_version))

        // SSE event stream
        .route("/events", get(super::sse::event_stream))

        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serve on `listener` until `shutdown` resolves
pub async fn run<F>(listener: TcpListener, ctx: AppContext, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener
        .local_addr()
        .map_err(|e| Error::Http(format!("Failed to read listener address: {}", e)))?;
    info!("Starting HTTP server on {}", addr);

    axum::serve(listener, build_router(ctx))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    info!("HTTP server stopped");
    Ok(())
}
