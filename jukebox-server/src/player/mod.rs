//! Player Control Channel
//!
//! Capability interface to the external media player process. The engine only
//! talks to the player through [`PlayerControl`], so the transport can be
//! swapped (mpv over a local socket/named pipe in production, a fake in tests).

pub mod devices;
pub mod ipc;
pub mod mpv;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::Result;

pub use devices::{list_audio_devices, AudioDevice};
pub use mpv::{MpvPlayer, MpvSettings};

/// Everything needed to start one player instance
#[derive(Debug, Clone, PartialEq)]
pub struct StartRequest {
    pub file_path: String,
    pub device: String,
    /// 0-100
    pub volume: u8,
}

/// Fire-and-forget commands understood by the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerCommand {
    /// Absolute volume, 0-100
    SetVolume(u8),
    TogglePause,
    /// Relative seek in seconds (negative goes back)
    Seek(f64),
    /// Absolute position in seconds
    SetPosition(f64),
    Quit,
}

impl PlayerCommand {
    /// `command` array as sent on the wire
    pub fn to_args(self) -> Vec<Value> {
        match self {
            PlayerCommand::SetVolume(volume) => vec![json!("set_property"), json!("volume"), json!(volume)],
            PlayerCommand::TogglePause => vec![json!("cycle"), json!("pause")],
            PlayerCommand::Seek(seconds) => vec![json!("seek"), json!(seconds)],
            PlayerCommand::SetPosition(seconds) => {
                vec![json!("set_property"), json!("time-pos"), json!(seconds)]
            }
            PlayerCommand::Quit => vec![json!("quit")],
        }
    }
}

/// Properties the engine reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    TimePos,
    Duration,
    Pause,
}

impl Property {
    pub fn name(self) -> &'static str {
        match self {
            Property::TimePos => "time-pos",
            Property::Duration => "duration",
            Property::Pause => "pause",
        }
    }
}

/// Result of a property query
///
/// `Unavailable` means no player instance could be reached at all. It is the
/// end-of-track signal and must not be confused with a zero or false value.
/// `Failed` means an instance answered but could not provide the value (for
/// example `time-pos` while a file is still loading).
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyReply {
    Value(Value),
    Unavailable,
    Failed(String),
}

impl PropertyReply {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, PropertyReply::Unavailable)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyReply::Value(value) => value.as_f64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyReply::Value(value) => value.as_bool(),
            _ => None,
        }
    }
}

/// Control surface of the external player
#[async_trait]
pub trait PlayerControl: Send + Sync {
    /// Start playing a file
    ///
    /// Must guarantee that any previous instance is gone before the new one
    /// is spawned.
    async fn start(&self, request: &StartRequest) -> Result<()>;

    /// Terminate the running instance; succeeds when none is running
    async fn stop(&self) -> Result<()>;

    /// Submit a command to the running instance; failures are logged, not returned
    async fn send_command(&self, command: PlayerCommand);

    /// Read one property from the running instance
    async fn query_property(&self, property: Property) -> PropertyReply;
}
