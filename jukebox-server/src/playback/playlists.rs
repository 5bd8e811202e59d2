//! Queue and saved-playlist management
//!
//! Second half of [`PlaybackSupervisor`]: every operation that rewrites a
//! queue or the saved-playlist catalog. Each takes the state lock so queue
//! rewrites never interleave with navigation or auto-advance.

use jukebox_common::db::{PlaylistId, QueueKind, SavedPlaylistSummary, TrackId};
use jukebox_common::events::JukeboxEvent;
use serde::Serialize;
use tracing::info;

use super::supervisor::PlaybackSupervisor;
use crate::db::{playlists, tracks, QueuedTrack};
use crate::error::{Error, Result};
use crate::state::PlaybackState;

/// Album override queued by "play album now"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlbumQueued {
    pub first_id: TrackId,
    pub count: usize,
}

impl PlaybackSupervisor {
    // ------------------------------------------------------------------
    // Shuffle
    // ------------------------------------------------------------------

    /// Turn shuffle on with a fresh permutation; returns its length
    pub async fn enable_shuffle(&self) -> Result<usize> {
        let mut state = self.state.lock().await;
        let count = self.navigator.regenerate_shuffle().await?;
        state.shuffle_enabled = true;

        info!("Shuffle enabled ({} tracks)", count);
        self.events.emit(JukeboxEvent::ShuffleChanged { enabled: true });
        self.events.emit(JukeboxEvent::QueueChanged {
            queue: QueueKind::Shuffled,
        });
        Ok(count)
    }

    pub async fn disable_shuffle(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        self.navigator.shuffled().clear().await?;
        state.shuffle_enabled = false;

        info!("Shuffle disabled");
        self.events.emit(JukeboxEvent::ShuffleChanged { enabled: false });
        Ok(())
    }

    pub async fn shuffle_enabled(&self) -> bool {
        self.state.lock().await.shuffle_enabled
    }

    // ------------------------------------------------------------------
    // Album override
    // ------------------------------------------------------------------

    /// Replace the album override with one album, in catalog order
    ///
    /// Does not start playback; the caller plays `first_id`.
    pub async fn play_album_now(&self, album: &str, artist: &str) -> Result<AlbumQueued> {
        let _state = self.state.lock().await;

        let track_ids = tracks::album_track_ids(&self.db, album, artist).await?;
        let Some(&first_id) = track_ids.first() else {
            return Err(Error::NotFound(format!("album '{}' by '{}'", album, artist)));
        };

        self.navigator.album().replace_all(&track_ids).await?;
        info!(
            "Album '{}' by '{}' queued ({} tracks)",
            album,
            artist,
            track_ids.len()
        );
        self.events.emit(JukeboxEvent::QueueChanged {
            queue: QueueKind::Album,
        });

        Ok(AlbumQueued {
            first_id,
            count: track_ids.len(),
        })
    }

    pub async fn clear_album(&self) -> Result<()> {
        let _state = self.state.lock().await;
        self.navigator.album().clear().await?;
        self.events.emit(JukeboxEvent::QueueChanged {
            queue: QueueKind::Album,
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Linear playlist
    // ------------------------------------------------------------------

    /// Append to the linear queue; returns the assigned position
    ///
    /// With shuffle on the track is also slotted into the shuffled queue.
    pub async fn playlist_add(&self, track_id: TrackId) -> Result<i64> {
        let state = self.state.lock().await;
        let position = self.navigator.linear().append(track_id).await?;
        if state.shuffle_enabled {
            self.navigator.shuffle_in(track_id).await?;
        }
        self.emit_linear_changed(&state);
        Ok(position)
    }

    /// Remove every occurrence of `track_id`; returns how many were removed
    pub async fn playlist_remove(&self, track_id: TrackId) -> Result<u64> {
        let state = self.state.lock().await;
        let removed = self.navigator.linear().remove_track(track_id).await?;
        if state.shuffle_enabled {
            self.navigator.shuffled().remove_track(track_id).await?;
        }
        self.emit_linear_changed(&state);
        Ok(removed)
    }

    pub async fn playlist_clear(&self) -> Result<()> {
        let state = self.state.lock().await;
        self.navigator.linear().clear().await?;
        self.navigator.shuffled().clear().await?;
        self.emit_linear_changed(&state);
        Ok(())
    }

    pub async fn playlist(&self) -> Result<Vec<QueuedTrack>> {
        self.navigator.linear().tracks().await
    }

    fn emit_linear_changed(&self, state: &PlaybackState) {
        self.events.emit(JukeboxEvent::QueueChanged {
            queue: QueueKind::Linear,
        });
        if state.shuffle_enabled {
            self.events.emit(JukeboxEvent::QueueChanged {
                queue: QueueKind::Shuffled,
            });
        }
    }

    // ------------------------------------------------------------------
    // Saved playlists
    // ------------------------------------------------------------------

    /// Snapshot the linear queue under `name` (overwriting an existing one)
    pub async fn save_playlist(&self, name: &str) -> Result<PlaylistId> {
        let name = validate_name(name)?;
        let mut state = self.state.lock().await;

        let id = playlists::upsert_by_name(&self.db, name).await?;
        let track_ids = self.navigator.linear().list().await?;
        playlists::overwrite_content(&self.db, id, &track_ids).await?;

        info!("Saved playlist '{}' ({} tracks)", name, track_ids.len());
        state.current_playlist_name = name.to_string();
        self.library_changed(&mut state);
        Ok(id)
    }

    /// Register `name` in the catalog without touching the live queue
    ///
    /// An existing playlist of that name keeps its content.
    pub async fn create_playlist(&self, name: &str) -> Result<PlaylistId> {
        let name = validate_name(name)?;
        let mut state = self.state.lock().await;

        let id = playlists::upsert_by_name(&self.db, name).await?;

        info!("Created playlist '{}' (id {})", name, id);
        state.current_playlist_name = name.to_string();
        self.library_changed(&mut state);
        Ok(id)
    }

    /// Replace the linear queue with a saved playlist
    ///
    /// The shuffled and album queues are emptied. Shuffle mode is kept; the
    /// navigator regenerates the permutation on first use.
    pub async fn load_playlist(&self, id: PlaylistId) -> Result<String> {
        let mut state = self.state.lock().await;

        let Some(name) = playlists::load_into(&self.db, id, QueueKind::Linear).await? else {
            return Err(Error::NotFound(format!("playlist {}", id)));
        };
        self.navigator.shuffled().clear().await?;
        self.navigator.album().clear().await?;

        info!("Loaded playlist '{}'", name);
        state.current_playlist_name = name.clone();
        for queue in QueueKind::ALL {
            self.events.emit(JukeboxEvent::QueueChanged { queue });
        }
        Ok(name)
    }

    pub async fn saved_playlists(&self) -> Result<Vec<SavedPlaylistSummary>> {
        playlists::list_all(&self.db).await
    }

    pub async fn delete_playlist(&self, id: PlaylistId) -> Result<()> {
        let mut state = self.state.lock().await;

        if !playlists::delete(&self.db, id).await? {
            return Err(Error::NotFound(format!("playlist {}", id)));
        }

        info!("Deleted playlist {}", id);
        self.library_changed(&mut state);
        Ok(())
    }

    pub async fn library_version(&self) -> u64 {
        self.state.lock().await.library_version
    }

    fn library_changed(&self, state: &mut PlaybackState) {
        let library_version = state.bump_library_version();
        self.events
            .emit(JukeboxEvent::LibraryChanged { library_version });
    }
}

fn validate_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::BadRequest("playlist name is required".to_string()));
    }
    Ok(name)
}
