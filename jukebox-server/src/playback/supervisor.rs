//! Playback Supervisor
//!
//! Owns [`PlaybackState`] and the player handle. Every mutation (start,
//! stop, queue rewrites, shuffle regeneration) runs under one mutex, so two
//! overlapping `play` calls can never leave two player instances alive.
//! Property queries happen outside the lock.

use std::sync::Arc;

use jukebox_common::db::TrackId;
use jukebox_common::events::{EventBus, JukeboxEvent, StopReason};
use serde::Serialize;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::db::tracks;
use crate::error::Result;
use crate::player::{PlayerCommand, PlayerControl, Property, StartRequest};
use crate::playback::navigator::Navigator;
use crate::state::{PlaybackSnapshot, PlaybackState};

/// Result of a play request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    Playing { track_id: TrackId, device: String },
    /// Track id is not in the catalog; nothing changed
    NotFound,
}

/// What the monitor's advance request turned into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Next track started
    Advanced(TrackId),
    /// Nothing left to play; now idle
    Exhausted,
    /// State changed since the decision was taken; nothing done
    Stale,
}

/// Track metadata as shown to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackInfo {
    pub id: TrackId,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub cover_url: String,
}

/// Composite status for polling clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub pos: f64,
    pub duration: f64,
    pub paused: bool,
    pub track: Option<TrackInfo>,
    pub volume: u8,
    pub device: String,
    pub shuffle: bool,
    pub playlist_name: String,
    pub library_version: u64,
}

/// Single owner of playback state and the external player
pub struct PlaybackSupervisor {
    pub(super) db: SqlitePool,
    pub(super) player: Arc<dyn PlayerControl>,
    pub(super) navigator: Navigator,
    pub(super) state: Mutex<PlaybackState>,
    pub(super) events: Arc<EventBus>,
}

impl PlaybackSupervisor {
    pub fn new(
        db: SqlitePool,
        player: Arc<dyn PlayerControl>,
        events: Arc<EventBus>,
        initial: PlaybackState,
    ) -> Self {
        Self {
            navigator: Navigator::new(db.clone()),
            db,
            player,
            state: Mutex::new(initial),
            events,
        }
    }

    pub fn db(&self) -> &SqlitePool {
        &self.db
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub async fn snapshot(&self) -> PlaybackSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Start `track_id`, replacing whatever is playing
    ///
    /// Without `device` the last active device is used.
    pub async fn play(&self, track_id: TrackId, device: Option<&str>) -> Result<PlayOutcome> {
        let mut state = self.state.lock().await;
        self.start_locked(&mut state, track_id, device).await
    }

    pub(super) async fn start_locked(
        &self,
        state: &mut PlaybackState,
        track_id: TrackId,
        device: Option<&str>,
    ) -> Result<PlayOutcome> {
        let Some(file_path) = tracks::find_track_path(&self.db, track_id).await? else {
            warn!("Play requested for unknown track {}", track_id);
            return Ok(PlayOutcome::NotFound);
        };

        let device = device
            .filter(|d| !d.is_empty())
            .unwrap_or(state.active_device.as_str())
            .to_string();

        let request = StartRequest {
            file_path,
            device: device.clone(),
            volume: state.volume,
        };

        if let Err(e) = self.player.start(&request).await {
            error!("Failed to start track {}: {}", track_id, e);
            state.mark_idle();
            self.events.emit(JukeboxEvent::PlaybackStopped {
                reason: StopReason::PlayerError,
            });
            return Err(e);
        }

        state.mark_playing(track_id, &device);
        info!("Playing track {} on '{}'", track_id, device);
        self.events.emit(JukeboxEvent::TrackStarted {
            track_id,
            device: device.clone(),
        });

        Ok(PlayOutcome::Playing { track_id, device })
    }

    /// Stop playback; harmless when already idle
    pub async fn stop(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        self.player.stop().await?;

        if !state.is_idle() {
            info!("Playback stopped");
            self.events.emit(JukeboxEvent::PlaybackStopped {
                reason: StopReason::User,
            });
        }
        state.mark_idle();
        Ok(())
    }

    /// Store the volume (clamped to 0-100) and forward it to the running player
    pub async fn set_volume(&self, level: i64) -> u8 {
        let volume = level.clamp(0, 100) as u8;
        {
            let mut state = self.state.lock().await;
            state.volume = volume;
        }

        self.player.send_command(PlayerCommand::SetVolume(volume)).await;
        self.events.emit(JukeboxEvent::VolumeChanged { volume });
        volume
    }

    pub async fn toggle_pause(&self) {
        self.player.send_command(PlayerCommand::TogglePause).await;
    }

    /// Relative seek in seconds
    pub async fn seek(&self, seconds: f64) {
        self.player.send_command(PlayerCommand::Seek(seconds)).await;
    }

    /// Absolute position in seconds
    pub async fn set_position(&self, seconds: f64) {
        self.player
            .send_command(PlayerCommand::SetPosition(seconds))
            .await;
    }

    /// Compose live player properties with the mirrored state
    ///
    /// Unavailable or failed properties fall back to zero/false.
    pub async fn status(&self) -> Result<StatusReport> {
        let snapshot = self.snapshot().await;

        let pos = self.player.query_property(Property::TimePos).await;
        let duration = self.player.query_property(Property::Duration).await;
        let paused = self.player.query_property(Property::Pause).await;

        let track = match snapshot.current_track_id {
            Some(id) => tracks::find_track(&self.db, id).await?.map(|t| TrackInfo {
                id: t.id,
                title: t.title,
                artist: t.artist,
                album: t.album,
                cover_url: format!("/cover/{}", t.id),
            }),
            None => None,
        };

        Ok(StatusReport {
            pos: pos.as_f64().unwrap_or(0.0),
            duration: duration.as_f64().unwrap_or(0.0),
            paused: paused.as_bool().unwrap_or(false),
            track,
            volume: snapshot.volume,
            device: snapshot.active_device,
            shuffle: snapshot.shuffle_enabled,
            playlist_name: snapshot.current_playlist_name,
            library_version: snapshot.library_version,
        })
    }

    /// Resolve the track after `current` (0 = nothing playing)
    pub async fn next(&self, current: TrackId) -> Result<Option<TrackId>> {
        let state = self.state.lock().await;
        self.navigator.next(current, state.shuffle_enabled).await
    }

    /// Resolve the track before `current` (0 = nothing playing)
    pub async fn previous(&self, current: TrackId) -> Result<Option<TrackId>> {
        let state = self.state.lock().await;
        self.navigator.previous(current, state.shuffle_enabled).await
    }

    /// Auto-advance after the monitor confirmed `expected_track` ended
    ///
    /// The decision was taken outside the lock; if a user action changed the
    /// state in the meantime (`generation` moved) it is dropped.
    pub async fn advance_after(
        &self,
        expected_track: TrackId,
        expected_generation: u64,
    ) -> Result<AdvanceOutcome> {
        let mut state = self.state.lock().await;

        if state.current_track_id != Some(expected_track)
            || state.generation != expected_generation
        {
            debug!(
                "Discarding stale advance from track {} (generation {} != {})",
                expected_track, expected_generation, state.generation
            );
            return Ok(AdvanceOutcome::Stale);
        }

        let next = self
            .navigator
            .next(expected_track, state.shuffle_enabled)
            .await?;

        if let Some(next_id) = next {
            if let PlayOutcome::Playing { .. } =
                self.start_locked(&mut state, next_id, None).await?
            {
                info!("Auto-advanced from track {} to {}", expected_track, next_id);
                self.events.emit(JukeboxEvent::AutoAdvanced {
                    from: expected_track,
                    to: Some(next_id),
                });
                return Ok(AdvanceOutcome::Advanced(next_id));
            }

            warn!("Next track {} vanished from the catalog, going idle", next_id);
            state.mark_idle();
            self.events.emit(JukeboxEvent::PlaybackStopped {
                reason: StopReason::TrackNotFound,
            });
            return Ok(AdvanceOutcome::Exhausted);
        }

        info!("Queue exhausted after track {}, going idle", expected_track);
        state.mark_idle();
        self.events.emit(JukeboxEvent::AutoAdvanced {
            from: expected_track,
            to: None,
        });
        self.events.emit(JukeboxEvent::PlaybackStopped {
            reason: StopReason::QueueExhausted,
        });
        Ok(AdvanceOutcome::Exhausted)
    }
}
