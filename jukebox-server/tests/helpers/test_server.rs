//! Engine and router wired to an in-memory database and a fake player

use super::fake_player::FakePlayer;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use jukebox_common::db::{init_memory_database, TrackId};
use jukebox_common::events::EventBus;
use jukebox_server::api::{build_router, AppContext};
use jukebox_server::playback::PlaybackSupervisor;
use jukebox_server::player::PlayerControl;
use jukebox_server::PlaybackState;
use serde_json::Value;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

pub struct TestJukebox {
    pub db: SqlitePool,
    pub player: Arc<FakePlayer>,
    pub supervisor: Arc<PlaybackSupervisor>,
}

impl TestJukebox {
    pub async fn start() -> Self {
        let db = init_memory_database().await.expect("in-memory database");
        let player = Arc::new(FakePlayer::new());
        let control: Arc<dyn PlayerControl> = player.clone();

        let supervisor = Arc::new(PlaybackSupervisor::new(
            db.clone(),
            control,
            Arc::new(EventBus::new(64)),
            PlaybackState::new("auto", 70),
        ));

        Self {
            db,
            player,
            supervisor,
        }
    }

    pub fn control(&self) -> Arc<dyn PlayerControl> {
        self.player.clone()
    }

    pub fn router(&self) -> Router {
        build_router(AppContext {
            supervisor: Arc::clone(&self.supervisor),
            mpv_path: PathBuf::from("mpv-not-installed-for-tests"),
        })
    }

    /// Insert catalog tracks; returns their ids in insertion order
    pub async fn seed_tracks(&self, count: usize) -> Vec<TrackId> {
        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            let id: TrackId = sqlx::query_scalar(
                "INSERT INTO tracks (title, artist, album, path) VALUES (?, ?, ?, ?) RETURNING id",
            )
            .bind(format!("Track {}", i + 1))
            .bind("Artist")
            .bind("Album")
            .bind(format!("/music/{:02}.flac", i + 1))
            .fetch_one(&self.db)
            .await
            .expect("seed track");
            ids.push(id);
        }
        ids
    }

    /// Insert one album's tracks under its own title/artist
    pub async fn seed_album(&self, album: &str, artist: &str, count: usize) -> Vec<TrackId> {
        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            let id: TrackId = sqlx::query_scalar(
                "INSERT INTO tracks (title, artist, album, path) VALUES (?, ?, ?, ?) RETURNING id",
            )
            .bind(format!("{} {}", album, i + 1))
            .bind(artist)
            .bind(album)
            .bind(format!("/music/{}/{:02}.flac", album, i + 1))
            .fetch_one(&self.db)
            .await
            .expect("seed album track");
            ids.push(id);
        }
        ids
    }

    /// GET `path` and return the status, content type and raw body
    pub async fn get_raw(&self, path: &str) -> (StatusCode, Option<String>, Vec<u8>) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, content_type, bytes.to_vec())
    }

    /// Issue one request against a fresh router
    pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(path);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}
