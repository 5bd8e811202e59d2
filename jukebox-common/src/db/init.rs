//! Database initialization
//!
//! Opens (or creates) the SQLite database and makes sure every table the
//! engine touches exists. The `tracks` catalog is normally filled by the
//! external indexer; it is created here so a fresh install starts cleanly.

use crate::db::models::QueueKind;
use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, Row, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .min_connections(1)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    // WAL lets status polls read while a queue rewrite commits
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory database with the full schema
///
/// Every connection to `sqlite::memory:` is a separate database, so the pool
/// is pinned to one connection.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    create_schema(&pool).await?;
    Ok(pool)
}

/// Create all tables (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_tracks_table(pool).await?;
    for kind in QueueKind::ALL {
        create_queue_table(pool, kind.table_name()).await?;
    }
    create_saved_playlists_tables(pool).await?;

    Ok(())
}

async fn create_tracks_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tracks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT,
            artist TEXT,
            album TEXT,
            path TEXT NOT NULL UNIQUE,
            cover_path TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Catalogs written by older indexers predate the cover column
    if !table_columns(pool, "tracks").await?.iter().any(|c| c == "cover_path") {
        sqlx::query("ALTER TABLE tracks ADD COLUMN cover_path TEXT")
            .execute(pool)
            .await?;
        info!("Added missing column tracks.cover_path");
    }

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tracks_album_artist ON tracks(album, artist)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Column names of `table`, in declaration order
async fn table_columns(pool: &SqlitePool, table: &str) -> Result<Vec<String>> {
    let query = format!("PRAGMA table_info({})", table);
    let rows = sqlx::query(&query).fetch_all(pool).await?;
    Ok(rows.iter().map(|row| row.get::<String, _>("name")).collect())
}

/// Queue tables share one layout: `(id, track_id, position)`
async fn create_queue_table(pool: &SqlitePool, table: &'static str) -> Result<()> {
    let create = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            track_id INTEGER NOT NULL,
            position INTEGER NOT NULL
        )
        "#
    );
    sqlx::query(&create).execute(pool).await?;

    let index = format!("CREATE INDEX IF NOT EXISTS idx_{table}_position ON {table}(position)");
    sqlx::query(&index).execute(pool).await?;

    Ok(())
}

async fn create_saved_playlists_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS saved_playlists_info (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS saved_playlists_content (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            playlist_id INTEGER NOT NULL
                REFERENCES saved_playlists_info(id) ON DELETE CASCADE,
            track_id INTEGER NOT NULL,
            position INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_saved_content_playlist ON saved_playlists_content(playlist_id, position)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
