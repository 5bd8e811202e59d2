//! Integration tests for the HTTP surface
//!
//! Requests go through the full router (`oneshot`) against an in-memory
//! database and a fake player.

mod helpers;

use axum::http::{Method, StatusCode};
use helpers::TestJukebox;
use serde_json::{json, Value};

#[tokio::test]
async fn test_health() {
    let jukebox = TestJukebox::start().await;

    let (status, body) = jukebox.request(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["module"], "jukebox");
}

#[tokio::test]
async fn test_play_stop_and_status() {
    let jukebox = TestJukebox::start().await;
    let ids = jukebox.seed_tracks(1).await;

    let (status, body) = jukebox
        .request(Method::GET, &format!("/play/{}?device=pulse", ids[0]), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "playing");
    assert_eq!(body["device_used"], "pulse");

    let (_, body) = jukebox.request(Method::GET, "/status", None).await;
    assert_eq!(body["track"]["id"], ids[0]);
    assert_eq!(body["track"]["title"], "Track 1");
    assert_eq!(body["pos"], 42.5);
    assert_eq!(body["device"], "pulse");
    assert_eq!(body["playlist_name"], "Playlist");

    let (status, body) = jukebox.request(Method::GET, "/stop", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "stopped");

    let (_, body) = jukebox.request(Method::GET, "/status", None).await;
    assert_eq!(body["track"], Value::Null);
    assert_eq!(body["pos"], 0.0);
    assert_eq!(body["paused"], false);
}

#[tokio::test]
async fn test_play_unknown_track_is_404() {
    let jukebox = TestJukebox::start().await;

    let (status, _) = jukebox.request(Method::GET, "/play/12345", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(jukebox.player.starts().is_empty());
}

#[tokio::test]
async fn test_volume_and_forwarded_controls() {
    let jukebox = TestJukebox::start().await;

    let (_, body) = jukebox.request(Method::GET, "/volume/250", None).await;
    assert_eq!(body["volume"], 100);

    let (_, body) = jukebox.request(Method::GET, "/pause", None).await;
    assert_eq!(body["status"], "toggled");
    let (_, body) = jukebox.request(Method::GET, "/seek/-10", None).await;
    assert_eq!(body["status"], "moved");
    let (_, body) = jukebox.request(Method::GET, "/setpos/93", None).await;
    assert_eq!(body["status"], "set");

    assert_eq!(jukebox.player.commands().len(), 4);
}

#[tokio::test]
async fn test_playlist_endpoints_and_navigation() {
    let jukebox = TestJukebox::start().await;
    let ids = jukebox.seed_tracks(3).await;

    for id in &ids {
        let (status, body) = jukebox
            .request(Method::POST, &format!("/playlist/add/{}", id), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "added");
    }

    let (_, body) = jukebox.request(Method::GET, "/playlist", None).await;
    let songs = body["songs"].as_array().unwrap();
    assert_eq!(songs.len(), 3);
    assert_eq!(songs[0]["id"], ids[0]);
    assert_eq!(songs[0]["title"], "Track 1");

    let (_, body) = jukebox
        .request(Method::GET, &format!("/next?current_id={}", ids[1]), None)
        .await;
    assert_eq!(body["id"], ids[2]);

    let (_, body) = jukebox.request(Method::GET, "/next", None).await;
    assert_eq!(body["id"], ids[0]);

    let (_, body) = jukebox
        .request(Method::GET, &format!("/next?current_id={}", ids[2]), None)
        .await;
    assert_eq!(body["id"], Value::Null);

    let (_, body) = jukebox.request(Method::GET, "/previous?current_id=0", None).await;
    assert_eq!(body["id"], ids[2]);

    let (_, body) = jukebox
        .request(Method::DELETE, &format!("/playlist/remove/{}", ids[1]), None)
        .await;
    assert_eq!(body["status"], "removed");

    let (_, body) = jukebox.request(Method::DELETE, "/playlist/clear", None).await;
    assert_eq!(body["status"], "cleared");
    let (_, body) = jukebox.request(Method::GET, "/playlist", None).await;
    assert!(body["songs"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_shuffle_endpoints() {
    let jukebox = TestJukebox::start().await;
    let ids = jukebox.seed_tracks(4).await;
    for id in &ids {
        jukebox.supervisor.playlist_add(*id).await.unwrap();
    }

    let (_, body) = jukebox.request(Method::POST, "/shuffle/enable", None).await;
    assert_eq!(body["status"], "enabled");
    assert_eq!(body["count"], 4);

    let (_, body) = jukebox.request(Method::GET, "/shuffle/status", None).await;
    assert_eq!(body["shuffle"], true);

    let (_, body) = jukebox.request(Method::POST, "/shuffle/disable", None).await;
    assert_eq!(body["status"], "disabled");
    assert!(jukebox.supervisor.navigator().shuffled().is_empty().await.unwrap());

    let (_, body) = jukebox.request(Method::GET, "/shuffle/status", None).await;
    assert_eq!(body["shuffle"], false);
}

#[tokio::test]
async fn test_album_endpoints() {
    let jukebox = TestJukebox::start().await;
    let album = jukebox.seed_album("Kind of Blue", "Miles", 3).await;

    let (status, body) = jukebox
        .request(
            Method::POST,
            "/api/play_album_now",
            Some(json!({"album": "Kind of Blue", "artist": "Miles"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_id"], album[0]);
    assert_eq!(body["count"], 3);

    let (status, _) = jukebox
        .request(
            Method::POST,
            "/api/play_album_now",
            Some(json!({"album": "Nope", "artist": "Nobody"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = jukebox.request(Method::POST, "/api/clear_album_table", None).await;
    assert_eq!(body["status"], "cleared");
    assert!(jukebox.supervisor.navigator().album().is_empty().await.unwrap());
}

#[tokio::test]
async fn test_saved_playlist_endpoints() {
    let jukebox = TestJukebox::start().await;
    let ids = jukebox.seed_tracks(2).await;
    for id in &ids {
        jukebox.supervisor.playlist_add(*id).await.unwrap();
    }

    let (status, body) = jukebox
        .request(Method::POST, "/api/playlists/save", Some(json!({"name": "Road"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    let saved_id = body["id"].as_i64().unwrap();

    let (status, _) = jukebox
        .request(Method::POST, "/api/playlists/save", Some(json!({"name": ""})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = jukebox
        .request(Method::POST, "/api/playlists/create", Some(json!({"name": "Empty"})))
        .await;
    assert_eq!(body["status"], "success");

    let (_, body) = jukebox.request(Method::GET, "/api/playlists", None).await;
    let playlists = body["playlists"].as_array().unwrap();
    assert_eq!(playlists.len(), 2);
    let road = playlists.iter().find(|p| p["name"] == "Road").unwrap();
    assert_eq!(road["count"], 2);

    let (_, body) = jukebox.request(Method::GET, "/api/library_version", None).await;
    assert_eq!(body["library_version"], 2);

    jukebox.supervisor.playlist_clear().await.unwrap();
    let (status, body) = jukebox
        .request(Method::POST, "/api/playlists/load", Some(json!({"id": saved_id})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Road");
    assert_eq!(jukebox.supervisor.navigator().linear().list().await.unwrap(), ids);

    let (status, _) = jukebox
        .request(Method::POST, "/api/playlists/load", Some(json!({"id": 999})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = jukebox
        .request(Method::DELETE, &format!("/api/playlists/{}", saved_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "deleted");

    let (status, _) = jukebox
        .request(Method::DELETE, &format!("/api/playlists/{}", saved_id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = jukebox.request(Method::GET, "/api/library_version", None).await;
    assert_eq!(body["library_version"], 3);
}

#[tokio::test]
async fn test_audio_devices_degrade_to_empty() {
    let jukebox = TestJukebox::start().await;

    let (status, body) = jukebox.request(Method::GET, "/audio-devices", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["devices"], json!([]));
}

#[tokio::test]
async fn test_cover_served_from_catalog_path() {
    let jukebox = TestJukebox::start().await;
    let ids = jukebox.seed_tracks(2).await;

    let dir = tempfile::tempdir().unwrap();
    let cover = dir.path().join("front.png");
    std::fs::write(&cover, b"\x89PNG fake image").unwrap();
    sqlx::query("UPDATE tracks SET cover_path = ? WHERE id = ?")
        .bind(cover.to_string_lossy().to_string())
        .bind(ids[0])
        .execute(&jukebox.db)
        .await
        .unwrap();

    let (status, content_type, body) = jukebox.get_raw(&format!("/cover/{}", ids[0])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/png"));
    assert_eq!(body, b"\x89PNG fake image");

    // Status advertises the same URL
    jukebox.supervisor.play(ids[0], None).await.unwrap();
    let (_, status_body) = jukebox.request(Method::GET, "/status", None).await;
    assert_eq!(status_body["track"]["cover_url"], format!("/cover/{}", ids[0]));
}

#[tokio::test]
async fn test_cover_missing_is_404() {
    let jukebox = TestJukebox::start().await;
    let ids = jukebox.seed_tracks(1).await;

    // No cover recorded
    let (status, _, _) = jukebox.get_raw(&format!("/cover/{}", ids[0])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Recorded but gone from disk
    sqlx::query("UPDATE tracks SET cover_path = '/nonexistent/cover.jpg' WHERE id = ?")
        .bind(ids[0])
        .execute(&jukebox.db)
        .await
        .unwrap();
    let (status, _, _) = jukebox.get_raw(&format!("/cover/{}", ids[0])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Unknown track
    let (status, _, _) = jukebox.get_raw("/cover/9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
