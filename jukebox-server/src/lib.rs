//! # Jukebox Server Library
//!
//! Playback queue and auto-advance engine for a personal jukebox. Audio is
//! decoded and output by an external mpv process; this crate decides what it
//! plays, keeps exactly one instance alive, and advances through the queues
//! when a track ends.
//!
//! **Layout:**
//! - [`db`]: Queue Store, saved playlists and catalog reads
//! - [`player`]: Player Control Channel (mpv JSON IPC)
//! - [`playback`]: Navigation Resolver, Playback Supervisor, Auto-Advance Monitor
//! - [`api`]: HTTP and SSE surface

pub mod api;
pub mod db;
pub mod error;
pub mod playback;
pub mod player;
pub mod state;

pub use error::{Error, Result};
pub use state::PlaybackState;
