//! mpv process driver
//!
//! Owns at most one mpv child process and talks to it over its JSON IPC
//! endpoint. Starting a new track always tears the previous instance down
//! and waits for it to disappear before spawning.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use jukebox_common::config::JukeboxConfig;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use super::ipc::{IpcClient, IpcError};
use super::{PlayerCommand, PlayerControl, Property, PropertyReply, StartRequest};
use crate::error::{Error, Result};

/// Grace delay used when the old instance could not be confirmed gone
const FALLBACK_GRACE: Duration = Duration::from_millis(500);

/// Process and IPC settings for [`MpvPlayer`]
#[derive(Debug, Clone)]
pub struct MpvSettings {
    pub mpv_path: PathBuf,
    pub ipc_path: String,
    pub ipc_timeout: Duration,
    pub terminate_timeout: Duration,
    pub terminate_poll: Duration,
}

impl MpvSettings {
    pub fn from_config(config: &JukeboxConfig) -> Self {
        Self {
            mpv_path: config.mpv_path.clone(),
            ipc_path: config.ipc_path.clone(),
            ipc_timeout: config.ipc_timeout(),
            terminate_timeout: config.terminate_timeout(),
            terminate_poll: config.terminate_poll(),
        }
    }
}

/// [`PlayerControl`] backed by an mpv child process
pub struct MpvPlayer {
    settings: MpvSettings,
    ipc: IpcClient,
    child: Mutex<Option<Child>>,
}

impl MpvPlayer {
    pub fn new(settings: MpvSettings) -> Self {
        let ipc = IpcClient::new(settings.ipc_path.clone(), settings.ipc_timeout);
        Self {
            settings,
            ipc,
            child: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &MpvSettings {
        &self.settings
    }

    fn spawn_args(&self, request: &StartRequest) -> Vec<String> {
        vec![
            "--no-video".to_string(),
            "--force-window=no".to_string(),
            "--no-terminal".to_string(),
            format!("--audio-device={}", request.device),
            format!("--input-ipc-server={}", self.settings.ipc_path),
            format!("--volume={}", request.volume),
            request.file_path.clone(),
        ]
    }

    /// Terminate whatever is running and wait until it is gone
    ///
    /// Also asks an orphaned instance (one left by an earlier server run that
    /// still listens on the IPC endpoint) to quit.
    async fn terminate(&self, child: &mut Option<Child>) {
        let _ = self.ipc.request(&PlayerCommand::Quit.to_args()).await;

        if let Some(process) = child.as_mut() {
            if let Err(e) = process.start_kill() {
                debug!("Kill of previous mpv failed (already exited?): {}", e);
            }
        }

        let deadline = Instant::now() + self.settings.terminate_timeout;
        loop {
            let exited = match child.as_mut() {
                Some(process) => matches!(process.try_wait(), Ok(Some(_))),
                None => true,
            };

            if exited && !self.ipc.is_reachable().await {
                break;
            }

            if Instant::now() >= deadline {
                warn!(
                    "Previous mpv instance not confirmed gone after {:?}, waiting {:?}",
                    self.settings.terminate_timeout, FALLBACK_GRACE
                );
                sleep(FALLBACK_GRACE).await;
                break;
            }

            sleep(self.settings.terminate_poll).await;
        }

        if let Some(mut process) = child.take() {
            // Reap so no zombie is left behind
            let _ = process.try_wait();
        }
    }
}

#[async_trait]
impl PlayerControl for MpvPlayer {
    async fn start(&self, request: &StartRequest) -> Result<()> {
        let mut child = self.child.lock().await;
        self.terminate(&mut child).await;

        let args = self.spawn_args(request);
        debug!("Spawning {} {:?}", self.settings.mpv_path.display(), args);

        let process = Command::new(&self.settings.mpv_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Error::Player(format!(
                    "failed to spawn {}: {}",
                    self.settings.mpv_path.display(),
                    e
                ))
            })?;

        info!(
            "mpv started (pid {:?}) on device '{}' at volume {}",
            process.id(),
            request.device,
            request.volume
        );
        *child = Some(process);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let mut child = self.child.lock().await;
        self.terminate(&mut child).await;
        Ok(())
    }

    async fn send_command(&self, command: PlayerCommand) {
        match self.ipc.request(&command.to_args()).await {
            Ok(reply) if reply.is_success() => debug!("mpv accepted {:?}", command),
            Ok(reply) => debug!("mpv rejected {:?}: {}", command, reply.error),
            Err(e) => debug!("Command {:?} not delivered: {}", command, e),
        }
    }

    async fn query_property(&self, property: Property) -> PropertyReply {
        let args = [
            serde_json::Value::from("get_property"),
            serde_json::Value::from(property.name()),
        ];

        match self.ipc.request(&args).await {
            Ok(reply) if reply.is_success() => PropertyReply::Value(reply.data),
            Ok(reply) => PropertyReply::Failed(reply.error),
            Err(IpcError::Unreachable(_)) => PropertyReply::Unavailable,
            Err(e) => PropertyReply::Failed(e.to_string()),
        }
    }
}
