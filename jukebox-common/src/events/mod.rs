//! Event types for the jukebox event system
//!
//! Provides the shared event definitions and the EventBus used to fan state
//! changes out to SSE clients.

use crate::db::models::{QueueKind, TrackId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Why playback went idle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Explicit stop request
    User,
    /// Auto-advance found nothing left to play
    QueueExhausted,
    /// Requested track is not in the catalog
    TrackNotFound,
    /// Player process failed to start
    PlayerError,
}

/// Jukebox event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JukeboxEvent {
    /// A player instance was started for a track
    TrackStarted {
        track_id: TrackId,
        device: String,
    },

    /// The monitor detected end-of-track and moved on
    AutoAdvanced {
        from: TrackId,
        to: Option<TrackId>,
    },

    /// Playback went idle
    PlaybackStopped {
        reason: StopReason,
    },

    /// Remembered volume changed (0-100)
    VolumeChanged {
        volume: u8,
    },

    /// Shuffle mode toggled
    ShuffleChanged {
        enabled: bool,
    },

    /// Contents of a queue changed
    QueueChanged {
        queue: QueueKind,
    },

    /// Saved playlist catalog changed (clients should refetch)
    LibraryChanged {
        library_version: u64,
    },
}

impl JukeboxEvent {
    /// Event name used for the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            JukeboxEvent::TrackStarted { .. } => "TrackStarted",
            JukeboxEvent::AutoAdvanced { .. } => "AutoAdvanced",
            JukeboxEvent::PlaybackStopped { .. } => "PlaybackStopped",
            JukeboxEvent::VolumeChanged { .. } => "VolumeChanged",
            JukeboxEvent::ShuffleChanged { .. } => "ShuffleChanged",
            JukeboxEvent::QueueChanged { .. } => "QueueChanged",
            JukeboxEvent::LibraryChanged { .. } => "LibraryChanged",
        }
    }
}

/// One-to-many event broadcaster
pub struct EventBus {
    tx: broadcast::Sender<JukeboxEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// Slow subscribers lose the oldest events once `capacity` is exceeded.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<JukeboxEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Having no subscribers is normal (no SSE client connected) and is not
    /// reported as an error.
    pub fn emit(&self, event: JukeboxEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Event dropped, no subscribers");
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
