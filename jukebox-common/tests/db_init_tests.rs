//! Tests for on-disk database initialization

use jukebox_common::db::init::init_database;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("jukebox.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("jukebox.db");

    let pool1 = init_database(&db_path).await.unwrap();
    sqlx::query("INSERT INTO tracks (title, artist, album, path) VALUES ('Intro', 'Band', 'First', '/music/01.flac')")
        .execute(&pool1)
        .await
        .unwrap();
    pool1.close().await;

    // Reopening keeps existing catalog rows
    let pool2 = init_database(&db_path).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tracks")
        .fetch_one(&pool2)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_deleting_playlist_cascades_to_content() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("jukebox.db")).await.unwrap();

    let id: i64 = sqlx::query_scalar("INSERT INTO saved_playlists_info (name) VALUES ('Evening') RETURNING id")
        .fetch_one(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO saved_playlists_content (playlist_id, track_id, position) VALUES (?, 7, 1)")
        .bind(id)
        .execute(&pool)
        .await
        .unwrap();

    sqlx::query("DELETE FROM saved_playlists_info WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await
        .unwrap();

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM saved_playlists_content")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn test_catalog_without_cover_column_is_upgraded() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("jukebox.db");

    // Catalog as written by an indexer that never recorded covers
    let legacy = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&format!("sqlite://{}?mode=rwc", db_path.display()))
        .await
        .unwrap();
    sqlx::query(
        "CREATE TABLE tracks (id INTEGER PRIMARY KEY AUTOINCREMENT, title TEXT, artist TEXT, album TEXT, path TEXT UNIQUE)",
    )
    .execute(&legacy)
    .await
    .unwrap();
    sqlx::query("INSERT INTO tracks (title, artist, album, path) VALUES ('Old', 'Band', 'First', '/music/old.mp3')")
        .execute(&legacy)
        .await
        .unwrap();
    legacy.close().await;

    let pool = init_database(&db_path).await.unwrap();

    let cover: Option<String> = sqlx::query_scalar("SELECT cover_path FROM tracks WHERE path = '/music/old.mp3'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(cover, None);

    // A second open finds the column and leaves it alone
    pool.close().await;
    assert!(init_database(&db_path).await.is_ok());
}
