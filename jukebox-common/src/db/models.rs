//! Database models

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Catalog row id of a track
pub type TrackId = i64;

/// Catalog row id of a saved playlist
pub type PlaylistId = i64;

/// Track as stored in the catalog (read-only for the engine)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Track {
    pub id: TrackId,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    #[sqlx(rename = "path")]
    pub file_path: String,
    pub cover_path: Option<String>,
}

/// One row of a queue table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct QueueEntry {
    pub track_id: TrackId,
    pub position: i64,
}

/// Saved playlist listing row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SavedPlaylistSummary {
    pub id: PlaylistId,
    pub name: String,
    pub created_at: NaiveDateTime,
    pub count: i64,
}

/// The three track queues the navigation engine reads
///
/// Each variant maps to one table with the `(id, track_id, position)` layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueKind {
    /// User-edited play order
    Linear,
    /// Permutation of the linear queue, present while shuffle is on
    Shuffled,
    /// One-shot "play album now" override
    Album,
}

impl QueueKind {
    pub const ALL: [QueueKind; 3] = [QueueKind::Linear, QueueKind::Shuffled, QueueKind::Album];

    /// Backing table name
    pub fn table_name(self) -> &'static str {
        match self {
            QueueKind::Linear => "playlist",
            QueueKind::Shuffled => "shuffled_playlist",
            QueueKind::Album => "playlist_album",
        }
    }
}
