//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "JUKEBOX_ROOT";

/// Database file name used when the config does not name one
pub const DEFAULT_DATABASE_NAME: &str = "jukebox.db";

#[cfg(windows)]
const DEFAULT_IPC_PATH: &str = r"\\.\pipe\mpv-juke";
#[cfg(not(windows))]
const DEFAULT_IPC_PATH: &str = "/tmp/mpv-jukebox.sock";

/// Jukebox configuration as read from `config.toml`
///
/// Every key is optional; missing keys take the compiled defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct JukeboxConfig {
    /// Root folder holding the database (overridden by CLI and environment)
    pub root_folder: Option<PathBuf>,
    /// Explicit database path (defaults to `<root>/jukebox.db`)
    pub database: Option<PathBuf>,
    /// Media player executable
    pub mpv_path: PathBuf,
    /// Local socket (unix) or named pipe (windows) for player IPC
    pub ipc_path: String,
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Audio device used until a client picks another one
    pub default_device: String,
    /// Volume (0-100) applied before any client changes it
    pub default_volume: u8,
    /// Auto-advance monitor tick
    pub poll_interval_ms: u64,
    /// Re-query delay before an unreachable player counts as finished
    pub confirm_delay_ms: u64,
    /// Whether to hold a sleep inhibitor while music plays
    pub keep_awake: bool,
    /// How long sleep stays inhibited after playback stops
    pub keep_awake_grace_secs: u64,
    /// Timeout for a single IPC round trip
    pub ipc_timeout_ms: u64,
    /// Upper bound for waiting on a terminated player to disappear
    pub terminate_timeout_ms: u64,
    /// Poll step while waiting on a terminated player
    pub terminate_poll_ms: u64,
}

impl Default for JukeboxConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            database: None,
            mpv_path: PathBuf::from("mpv"),
            ipc_path: DEFAULT_IPC_PATH.to_string(),
            bind_addr: "0.0.0.0".to_string(),
            default_device: "auto".to_string(),
            default_volume: 70,
            poll_interval_ms: 5000,
            confirm_delay_ms: 2000,
            keep_awake: true,
            keep_awake_grace_secs: 300,
            ipc_timeout_ms: 500,
            terminate_timeout_ms: 400,
            terminate_poll_ms: 25,
        }
    }
}

impl JukeboxConfig {
    /// Parse a TOML document and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration
    ///
    /// An explicit path must exist and parse. Without one, the platform config
    /// file is used when present; otherwise compiled defaults apply.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => match default_config_file() {
                Some(path) if path.exists() => path,
                _ => {
                    warn!("No config file found, using compiled defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = std::fs::read_to_string(&path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.default_volume > 100 {
            return Err(Error::Config(format!(
                "default_volume must be 0-100, got {}",
                self.default_volume
            )));
        }
        if self.poll_interval_ms == 0 || self.ipc_timeout_ms == 0 || self.terminate_poll_ms == 0 {
            return Err(Error::Config(
                "poll_interval_ms, ipc_timeout_ms and terminate_poll_ms must be non-zero".to_string(),
            ));
        }
        if self.ipc_path.trim().is_empty() {
            return Err(Error::Config("ipc_path must not be empty".to_string()));
        }
        Ok(())
    }

    /// Database location for the given root folder
    pub fn database_path(&self, root_folder: &Path) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| root_folder.join(DEFAULT_DATABASE_NAME))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn confirm_delay(&self) -> Duration {
        Duration::from_millis(self.confirm_delay_ms)
    }

    pub fn keep_awake_grace(&self) -> Duration {
        Duration::from_secs(self.keep_awake_grace_secs)
    }

    pub fn ipc_timeout(&self) -> Duration {
        Duration::from_millis(self.ipc_timeout_ms)
    }

    pub fn terminate_timeout(&self) -> Duration {
        Duration::from_millis(self.terminate_timeout_ms)
    }

    pub fn terminate_poll(&self) -> Duration {
        Duration::from_millis(self.terminate_poll_ms)
    }
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. `root_folder` key of the TOML config
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    config: &JukeboxConfig,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Platform config file location (`<config dir>/jukebox/config.toml`)
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("jukebox").join("config.toml"))
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("jukebox"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\jukebox"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("jukebox"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/jukebox"))
    } else {
        dirs::data_local_dir()
            .map(|d| d.join("jukebox"))
            .unwrap_or_else(|| PathBuf::from("./jukebox_data"))
    }
}
