//! Saved playlist database queries
//!
//! A saved playlist is an info row `(id, name, created_at)` plus an ordered
//! content list. Names are unique; saving by name upserts.

use crate::db::queues::Queue;
use crate::error::Result;
use jukebox_common::db::{PlaylistId, QueueKind, SavedPlaylistSummary, TrackId};
use sqlx::{Pool, Sqlite};
use tracing::debug;

/// Return the id of the playlist called `name`, creating it if needed
pub async fn upsert_by_name(db: &Pool<Sqlite>, name: &str) -> Result<PlaylistId> {
    let existing: Option<PlaylistId> =
        sqlx::query_scalar("SELECT id FROM saved_playlists_info WHERE name = ?")
            .bind(name)
            .fetch_optional(db)
            .await?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let id: PlaylistId = sqlx::query_scalar(
        r#"
        INSERT INTO saved_playlists_info (name) VALUES (?)
        ON CONFLICT(name) DO UPDATE SET name = excluded.name
        RETURNING id
        "#,
    )
    .bind(name)
    .fetch_one(db)
    .await?;

    debug!("Created saved playlist '{}' with id {}", name, id);
    Ok(id)
}

/// Replace the content of playlist `id` with `track_ids` (positions `0..N-1`)
pub async fn overwrite_content(
    db: &Pool<Sqlite>,
    id: PlaylistId,
    track_ids: &[TrackId],
) -> Result<()> {
    let mut tx = db.begin().await?;

    sqlx::query("DELETE FROM saved_playlists_content WHERE playlist_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    for (position, track_id) in track_ids.iter().enumerate() {
        sqlx::query(
            "INSERT INTO saved_playlists_content (playlist_id, track_id, position) VALUES (?, ?, ?)",
        )
        .bind(id)
        .bind(track_id)
        .bind(position as i64)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    debug!("Saved playlist {} now holds {} tracks", id, track_ids.len());
    Ok(())
}

/// All saved playlists, newest first, with track counts
pub async fn list_all(db: &Pool<Sqlite>) -> Result<Vec<SavedPlaylistSummary>> {
    let rows = sqlx::query_as::<_, SavedPlaylistSummary>(
        r#"
        SELECT info.id, info.name, info.created_at, COUNT(content.id) AS count
        FROM saved_playlists_info info
        LEFT JOIN saved_playlists_content content ON info.id = content.playlist_id
        GROUP BY info.id
        ORDER BY info.created_at DESC, info.id DESC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn name_of(db: &Pool<Sqlite>, id: PlaylistId) -> Result<Option<String>> {
    Ok(
        sqlx::query_scalar("SELECT name FROM saved_playlists_info WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await?,
    )
}

/// Ordered content of playlist `id`
pub async fn content(db: &Pool<Sqlite>, id: PlaylistId) -> Result<Vec<TrackId>> {
    Ok(sqlx::query_scalar(
        "SELECT track_id FROM saved_playlists_content WHERE playlist_id = ? ORDER BY position ASC, id ASC",
    )
    .bind(id)
    .fetch_all(db)
    .await?)
}

/// Replace `target` with the content of playlist `id`
///
/// Returns the playlist name, or `None` (target untouched) if `id` is unknown.
pub async fn load_into(
    db: &Pool<Sqlite>,
    id: PlaylistId,
    target: QueueKind,
) -> Result<Option<String>> {
    let Some(name) = name_of(db, id).await? else {
        return Ok(None);
    };

    let track_ids = content(db, id).await?;
    Queue::new(db.clone(), target).replace_all(&track_ids).await?;

    debug!("Loaded playlist '{}' ({} tracks) into {:?}", name, track_ids.len(), target);
    Ok(Some(name))
}

/// Delete playlist `id` and its content; returns false if it did not exist
pub async fn delete(db: &Pool<Sqlite>, id: PlaylistId) -> Result<bool> {
    let mut tx = db.begin().await?;

    sqlx::query("DELETE FROM saved_playlists_content WHERE playlist_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let removed = sqlx::query("DELETE FROM saved_playlists_info WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;
    Ok(removed > 0)
}
