//! Database access layer
//!
//! Provides queries for the track queues, saved playlists and the read-only catalog.

pub mod playlists;
pub mod queues;
pub mod tracks;

pub use queues::{Queue, QueuedTrack};
