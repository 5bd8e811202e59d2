//! Process-wide playback state
//!
//! One [`PlaybackState`] lives for the whole process, owned by the
//! [`crate::playback::PlaybackSupervisor`] behind a single mutex. Nothing else
//! holds a copy; readers take a [`PlaybackSnapshot`].

use jukebox_common::db::TrackId;
use serde::Serialize;

/// Name shown until a saved playlist is created, saved or loaded
pub const DEFAULT_PLAYLIST_NAME: &str = "Playlist";

/// Mutable playback state
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    /// Track the player was last started with; `None` when idle
    pub current_track_id: Option<TrackId>,

    pub shuffle_enabled: bool,

    /// 0-100, survives track changes
    pub volume: u8,

    /// Device used for the last start (and the next one if none is given)
    pub active_device: String,

    pub current_playlist_name: String,

    /// Bumped on every saved-playlist mutation
    pub library_version: u64,

    /// Bumped on every start/stop so stale monitor decisions can be detected
    pub generation: u64,
}

impl PlaybackState {
    pub fn new(default_device: impl Into<String>, default_volume: u8) -> Self {
        Self {
            current_track_id: None,
            shuffle_enabled: false,
            volume: default_volume.min(100),
            active_device: default_device.into(),
            current_playlist_name: DEFAULT_PLAYLIST_NAME.to_string(),
            library_version: 0,
            generation: 0,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.current_track_id.is_none()
    }

    /// Record a freshly started track
    pub fn mark_playing(&mut self, track_id: TrackId, device: &str) {
        self.current_track_id = Some(track_id);
        self.active_device = device.to_string();
        self.generation += 1;
    }

    /// Return to idle
    pub fn mark_idle(&mut self) {
        self.current_track_id = None;
        self.generation += 1;
    }

    pub fn bump_library_version(&mut self) -> u64 {
        self.library_version += 1;
        self.library_version
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            current_track_id: self.current_track_id,
            shuffle_enabled: self.shuffle_enabled,
            volume: self.volume,
            active_device: self.active_device.clone(),
            current_playlist_name: self.current_playlist_name.clone(),
            library_version: self.library_version,
            generation: self.generation,
        }
    }
}

/// Point-in-time copy of [`PlaybackState`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    pub current_track_id: Option<TrackId>,
    pub shuffle_enabled: bool,
    pub volume: u8,
    pub active_device: String,
    pub current_playlist_name: String,
    pub library_version: u64,
    #[serde(skip)]
    pub generation: u64,
}
