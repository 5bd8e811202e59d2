//! Queue Store
//!
//! Position-ordered track queues backed by the `playlist`, `shuffled_playlist`
//! and `playlist_album` tables. All three share one contract; [`QueueKind`]
//! picks the table once per handle instead of per query.
//!
//! Positions are dense `0..N-1` after every full rewrite; single appends use
//! `max(position) + 1`. A track id may appear more than once; lookups use its
//! lowest position.

use crate::error::Result;
use jukebox_common::db::{QueueEntry, QueueKind, TrackId};
use serde::Serialize;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

/// Queue entry joined with its catalog metadata
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct QueuedTrack {
    pub id: TrackId,
    pub title: Option<String>,
    pub artist: Option<String>,
}

/// Handle to one queue table
#[derive(Clone)]
pub struct Queue {
    db: SqlitePool,
    kind: QueueKind,
}

impl Queue {
    pub fn new(db: SqlitePool, kind: QueueKind) -> Self {
        Self { db, kind }
    }

    pub fn linear(db: SqlitePool) -> Self {
        Self::new(db, QueueKind::Linear)
    }

    pub fn shuffled(db: SqlitePool) -> Self {
        Self::new(db, QueueKind::Shuffled)
    }

    pub fn album(db: SqlitePool) -> Self {
        Self::new(db, QueueKind::Album)
    }

    pub fn kind(&self) -> QueueKind {
        self.kind
    }

    fn table(&self) -> &'static str {
        self.kind.table_name()
    }

    /// Track ids in play order
    pub async fn list(&self) -> Result<Vec<TrackId>> {
        let sql = format!("SELECT track_id FROM {} ORDER BY position ASC, id ASC", self.table());
        Ok(sqlx::query_scalar(&sql).fetch_all(&self.db).await?)
    }

    /// Entries with their positions, in play order
    pub async fn entries(&self) -> Result<Vec<QueueEntry>> {
        let sql = format!(
            "SELECT track_id, position FROM {} ORDER BY position ASC, id ASC",
            self.table()
        );
        Ok(sqlx::query_as::<_, QueueEntry>(&sql).fetch_all(&self.db).await?)
    }

    /// Entries that resolve to a catalog track, in play order
    pub async fn tracks(&self) -> Result<Vec<QueuedTrack>> {
        let sql = format!(
            r#"
            SELECT q.track_id AS id, t.title, t.artist
            FROM {} q
            JOIN tracks t ON q.track_id = t.id
            ORDER BY q.position ASC, q.id ASC
            "#,
            self.table()
        );
        Ok(sqlx::query_as::<_, QueuedTrack>(&sql).fetch_all(&self.db).await?)
    }

    pub async fn count(&self) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table());
        Ok(sqlx::query_scalar(&sql).fetch_one(&self.db).await?)
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.count().await? == 0)
    }

    /// Append at `max(position) + 1` and return the assigned position
    pub async fn append(&self, track_id: TrackId) -> Result<i64> {
        let sql = format!(
            r#"
            INSERT INTO {table} (track_id, position)
            SELECT ?, COALESCE(MAX(position), -1) + 1 FROM {table}
            RETURNING position
            "#,
            table = self.table()
        );
        let position: i64 = sqlx::query_scalar(&sql)
            .bind(track_id)
            .fetch_one(&self.db)
            .await?;

        debug!("Appended track {} to {:?} at position {}", track_id, self.kind, position);
        Ok(position)
    }

    /// Remove every entry referencing `track_id`; returns the number removed
    pub async fn remove_track(&self, track_id: TrackId) -> Result<u64> {
        let sql = format!("DELETE FROM {} WHERE track_id = ?", self.table());
        let removed = sqlx::query(&sql)
            .bind(track_id)
            .execute(&self.db)
            .await?
            .rows_affected();

        debug!("Removed {} entries of track {} from {:?}", removed, track_id, self.kind);
        Ok(removed)
    }

    /// Unconditional truncation
    pub async fn clear(&self) -> Result<()> {
        let sql = format!("DELETE FROM {}", self.table());
        sqlx::query(&sql).execute(&self.db).await?;
        debug!("Cleared {:?}", self.kind);
        Ok(())
    }

    /// Replace the whole queue with `track_ids`, positions `0..N-1`
    pub async fn replace_all(&self, track_ids: &[TrackId]) -> Result<()> {
        let mut tx = self.db.begin().await?;
        self.replace_all_in(&mut tx, track_ids).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Same as [`Queue::replace_all`] inside a caller-owned transaction
    pub async fn replace_all_in(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        track_ids: &[TrackId],
    ) -> Result<()> {
        let delete = format!("DELETE FROM {}", self.table());
        sqlx::query(&delete).execute(&mut **tx).await?;

        let insert = format!("INSERT INTO {} (track_id, position) VALUES (?, ?)", self.table());
        for (position, track_id) in track_ids.iter().enumerate() {
            sqlx::query(&insert)
                .bind(track_id)
                .bind(position as i64)
                .execute(&mut **tx)
                .await?;
        }

        debug!("Rewrote {:?} with {} tracks", self.kind, track_ids.len());
        Ok(())
    }

    /// Lowest position of `track_id`, if present
    pub async fn position_of(&self, track_id: TrackId) -> Result<Option<i64>> {
        let sql = format!("SELECT MIN(position) FROM {} WHERE track_id = ?", self.table());
        Ok(sqlx::query_scalar::<_, Option<i64>>(&sql)
            .bind(track_id)
            .fetch_one(&self.db)
            .await?)
    }

    /// Track with the smallest position strictly greater than `position`
    pub async fn next_after(&self, position: i64) -> Result<Option<TrackId>> {
        let sql = format!(
            "SELECT track_id FROM {} WHERE position > ? ORDER BY position ASC, id ASC LIMIT 1",
            self.table()
        );
        Ok(sqlx::query_scalar(&sql)
            .bind(position)
            .fetch_optional(&self.db)
            .await?)
    }

    /// Track with the greatest position strictly less than `position`
    pub async fn previous_before(&self, position: i64) -> Result<Option<TrackId>> {
        let sql = format!(
            "SELECT track_id FROM {} WHERE position < ? ORDER BY position DESC, id DESC LIMIT 1",
            self.table()
        );
        Ok(sqlx::query_scalar(&sql)
            .bind(position)
            .fetch_optional(&self.db)
            .await?)
    }

    pub async fn first(&self) -> Result<Option<TrackId>> {
        let sql = format!(
            "SELECT track_id FROM {} ORDER BY position ASC, id ASC LIMIT 1",
            self.table()
        );
        Ok(sqlx::query_scalar(&sql).fetch_optional(&self.db).await?)
    }

    pub async fn last(&self) -> Result<Option<TrackId>> {
        let sql = format!(
            "SELECT track_id FROM {} ORDER BY position DESC, id DESC LIMIT 1",
            self.table()
        );
        Ok(sqlx::query_scalar(&sql).fetch_optional(&self.db).await?)
    }
}
