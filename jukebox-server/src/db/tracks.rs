//! Catalog queries
//!
//! The `tracks` table is owned by the external indexer; the engine only reads it.

use crate::error::Result;
use jukebox_common::db::{Track, TrackId};
use sqlx::{Pool, Sqlite};

/// File path of a track, `None` if the id is not in the catalog
pub async fn find_track_path(db: &Pool<Sqlite>, id: TrackId) -> Result<Option<String>> {
    Ok(sqlx::query_scalar("SELECT path FROM tracks WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?)
}

/// Full catalog row of a track
pub async fn find_track(db: &Pool<Sqlite>, id: TrackId) -> Result<Option<Track>> {
    Ok(sqlx::query_as::<_, Track>(
        "SELECT id, title, artist, album, path, cover_path FROM tracks WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await?)
}

/// Cover image path recorded by the indexer, if any
pub async fn find_cover_path(db: &Pool<Sqlite>, id: TrackId) -> Result<Option<String>> {
    let cover: Option<Option<String>> =
        sqlx::query_scalar("SELECT cover_path FROM tracks WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await?;
    Ok(cover.flatten())
}

/// Track ids of one album by one artist, in catalog order
pub async fn album_track_ids(
    db: &Pool<Sqlite>,
    album: &str,
    artist: &str,
) -> Result<Vec<TrackId>> {
    Ok(
        sqlx::query_scalar("SELECT id FROM tracks WHERE album = ? AND artist = ? ORDER BY id ASC")
            .bind(album)
            .bind(artist)
            .fetch_all(db)
            .await?,
    )
}
