//! Playback queue and auto-advance engine
//!
//! - [`navigator`]: next/previous resolution across the queues
//! - [`supervisor`]: the single owner of playback state and the player
//! - [`playlists`]: queue and saved-playlist mutations on the supervisor
//! - [`monitor`]: background completion detection and auto-advance
//! - [`keep_awake`]: host sleep prevention

pub mod keep_awake;
pub mod monitor;
pub mod navigator;
pub mod playlists;
pub mod supervisor;

pub use keep_awake::{HostKeepAwake, KeepAwake, NoopKeepAwake, SleepPolicy};
pub use monitor::{AutoAdvanceMonitor, MonitorSettings, PlayerProbe};
pub use navigator::Navigator;
pub use playlists::AlbumQueued;
pub use supervisor::{AdvanceOutcome, PlayOutcome, PlaybackSupervisor, StatusReport, TrackInfo};
