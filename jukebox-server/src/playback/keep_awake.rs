//! Host sleep prevention
//!
//! [`SleepPolicy`] decides when the host must stay awake; [`KeepAwake`]
//! backends apply the decision. Backends are edge-triggered: repeating the
//! current state does not touch the OS.

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Capability to hold or release a host-level "stay awake" assertion
pub trait KeepAwake: Send {
    fn set(&mut self, awake: bool);
}

/// Backend used when keep-awake is disabled
#[derive(Debug, Default)]
pub struct NoopKeepAwake;

impl KeepAwake for NoopKeepAwake {
    fn set(&mut self, _awake: bool) {}
}

/// Stay-awake policy with a grace window after playback stops
///
/// Brief gaps between tracks must not let the host fall asleep, so the
/// assertion is held for `grace` after the last moment audio was playing.
#[derive(Debug, Clone)]
pub struct SleepPolicy {
    grace: Duration,
    last_active: Instant,
}

impl SleepPolicy {
    /// `now` counts as the last active moment, so a fresh process stays
    /// awake for one grace window
    pub fn new(grace: Duration, now: Instant) -> Self {
        Self {
            grace,
            last_active: now,
        }
    }

    /// Whether the host should be kept awake at `now`
    pub fn evaluate(&mut self, is_playing: bool, now: Instant) -> bool {
        if is_playing {
            self.last_active = now;
            return true;
        }
        now.saturating_duration_since(self.last_active) < self.grace
    }
}

/// Keep-awake backed by the host OS
///
/// Windows: `SetThreadExecutionState` on a dedicated thread.
/// Linux: a `systemd-inhibit` child holding a sleep lock.
/// macOS: a `caffeinate -i` child.
pub struct HostKeepAwake {
    asserted: bool,
    backend: platform::Backend,
}

impl HostKeepAwake {
    pub fn new() -> Self {
        Self {
            asserted: false,
            backend: platform::Backend::new(),
        }
    }

    pub fn is_asserted(&self) -> bool {
        self.asserted
    }
}

impl Default for HostKeepAwake {
    fn default() -> Self {
        Self::new()
    }
}

impl KeepAwake for HostKeepAwake {
    fn set(&mut self, awake: bool) {
        if awake == self.asserted {
            return;
        }

        let applied = if awake {
            self.backend.acquire()
        } else {
            self.backend.release();
            true
        };

        if applied {
            self.asserted = awake;
            info!("System sleep {}", if awake { "prevented" } else { "allowed" });
        }
    }
}

impl Drop for HostKeepAwake {
    fn drop(&mut self) {
        if self.asserted {
            self.backend.release();
        }
    }
}

#[cfg(unix)]
mod platform {
    use super::*;
    use std::process::Stdio;
    use tokio::process::{Child, Command};

    #[cfg(target_os = "macos")]
    fn inhibitor() -> Command {
        let mut command = Command::new("caffeinate");
        command.arg("-i");
        command
    }

    #[cfg(not(target_os = "macos"))]
    fn inhibitor() -> Command {
        let mut command = Command::new("systemd-inhibit");
        command.args([
            "--what=sleep:idle",
            "--who=jukebox",
            "--why=Audio playback",
            "--mode=block",
            "sleep",
            "infinity",
        ]);
        command
    }

    /// Holds the inhibitor child; tokio reaps it after the kill
    pub struct Backend {
        child: Option<Child>,
    }

    impl Backend {
        pub fn new() -> Self {
            Self { child: None }
        }

        pub fn acquire(&mut self) -> bool {
            match inhibitor()
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .kill_on_drop(true)
                .spawn()
            {
                Ok(child) => {
                    debug!("Sleep inhibitor running (pid {:?})", child.id());
                    self.child = Some(child);
                    true
                }
                Err(e) => {
                    warn!("Could not start sleep inhibitor: {}", e);
                    false
                }
            }
        }

        pub fn release(&mut self) {
            if let Some(mut child) = self.child.take() {
                if let Err(e) = child.start_kill() {
                    debug!("Sleep inhibitor already gone: {}", e);
                }
            }
        }
    }
}

#[cfg(windows)]
mod platform {
    use super::*;
    use std::sync::mpsc;
    use windows_sys::Win32::System::Power::{
        SetThreadExecutionState, ES_CONTINUOUS, ES_SYSTEM_REQUIRED,
    };

    /// The execution state belongs to the calling thread, so one thread owns it
    pub struct Backend {
        tx: Option<mpsc::Sender<bool>>,
    }

    impl Backend {
        pub fn new() -> Self {
            let (tx, rx) = mpsc::channel::<bool>();
            let spawned = std::thread::Builder::new()
                .name("keep-awake".to_string())
                .spawn(move || {
                    for awake in rx {
                        let flags = if awake {
                            ES_CONTINUOUS | ES_SYSTEM_REQUIRED
                        } else {
                            ES_CONTINUOUS
                        };
                        // SAFETY: plain flag word, no pointers involved
                        if unsafe { SetThreadExecutionState(flags) } == 0 {
                            warn!("SetThreadExecutionState failed");
                        }
                    }
                });

            match spawned {
                Ok(_) => Self { tx: Some(tx) },
                Err(e) => {
                    warn!("Could not start keep-awake thread: {}", e);
                    Self { tx: None }
                }
            }
        }

        fn send(&self, awake: bool) -> bool {
            match &self.tx {
                Some(tx) => tx.send(awake).is_ok(),
                None => false,
            }
        }

        pub fn acquire(&mut self) -> bool {
            self.send(true)
        }

        pub fn release(&mut self) {
            self.send(false);
        }
    }
}

#[cfg(not(any(unix, windows)))]
mod platform {
    pub struct Backend;

    impl Backend {
        pub fn new() -> Self {
            Self
        }

        pub fn acquire(&mut self) -> bool {
            false
        }

        pub fn release(&mut self) {}
    }
}
