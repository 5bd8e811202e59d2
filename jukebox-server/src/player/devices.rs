//! Audio output device enumeration
//!
//! Asks the player binary for its device list (`--audio-device=help`) and
//! parses lines of the form `  'alsa/default' (Default ALSA Output)`.

use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

const ENUMERATION_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioDevice {
    /// Value to pass as `--audio-device`
    pub name: String,
    pub description: String,
}

/// List output devices; any failure yields an empty list
pub async fn list_audio_devices(mpv_path: &Path) -> Vec<AudioDevice> {
    let output = Command::new(mpv_path)
        .arg("--audio-device=help")
        .kill_on_drop(true)
        .output();

    match timeout(ENUMERATION_TIMEOUT, output).await {
        Ok(Ok(output)) => {
            let devices = parse_device_list(&String::from_utf8_lossy(&output.stdout));
            debug!("Found {} audio devices", devices.len());
            devices
        }
        Ok(Err(e)) => {
            warn!("Could not run {} for device list: {}", mpv_path.display(), e);
            Vec::new()
        }
        Err(_) => {
            warn!("Device enumeration timed out after {:?}", ENUMERATION_TIMEOUT);
            Vec::new()
        }
    }
}

/// Parse the player's device listing
pub fn parse_device_list(text: &str) -> Vec<AudioDevice> {
    text.lines().filter_map(parse_device_line).collect()
}

fn parse_device_line(line: &str) -> Option<AudioDevice> {
    let rest = line.trim().strip_prefix('\'')?;
    let (name, rest) = rest.split_once('\'')?;
    if name.is_empty() {
        return None;
    }

    let description = rest
        .trim()
        .strip_prefix('(')
        .and_then(|d| d.strip_suffix(')'))
        .unwrap_or(name)
        .to_string();

    Some(AudioDevice {
        name: name.to_string(),
        description,
    })
}
