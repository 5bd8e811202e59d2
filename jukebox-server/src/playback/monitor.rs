//! Auto-Advance Monitor
//!
//! Background loop that polls the player, keeps the host awake while music
//! plays, and moves to the next track once the player has gone away on its
//! own. It only stops on cancellation; every error is logged and the loop
//! carries on.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::{interval, sleep, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::keep_awake::{KeepAwake, SleepPolicy};
use super::supervisor::{AdvanceOutcome, PlaybackSupervisor};
use crate::player::{PlayerControl, Property, PropertyReply};

/// Monitor timing
#[derive(Debug, Clone, Copy)]
pub struct MonitorSettings {
    pub poll_interval: Duration,
    /// Wait before re-checking an unreachable player
    pub confirm_delay: Duration,
    pub keep_awake_grace: Duration,
}

/// One consistent reading of the player per tick
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerProbe {
    pub time_pos: PropertyReply,
    pub pause: PropertyReply,
}

impl PlayerProbe {
    pub async fn take(player: &dyn PlayerControl) -> Self {
        Self {
            time_pos: player.query_property(Property::TimePos).await,
            pause: player.query_property(Property::Pause).await,
        }
    }

    /// Position is readable and the player is not paused
    pub fn is_playing(&self) -> bool {
        matches!(self.time_pos, PropertyReply::Value(_)) && self.pause.as_bool() == Some(false)
    }
}

pub struct AutoAdvanceMonitor {
    supervisor: Arc<PlaybackSupervisor>,
    player: Arc<dyn PlayerControl>,
    keep_awake: Box<dyn KeepAwake>,
    policy: SleepPolicy,
    settings: MonitorSettings,
}

impl AutoAdvanceMonitor {
    pub fn new(
        supervisor: Arc<PlaybackSupervisor>,
        player: Arc<dyn PlayerControl>,
        keep_awake: Box<dyn KeepAwake>,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            supervisor,
            player,
            keep_awake,
            policy: SleepPolicy::new(settings.keep_awake_grace, Instant::now()),
            settings,
        }
    }

    /// Poll until `cancel` fires, then release keep-awake
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(
            "Auto-advance monitor started (every {:?})",
            self.settings.poll_interval
        );

        let mut ticker = interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = self.tick() => {}
            }
        }

        self.keep_awake.set(false);
        info!("Auto-advance monitor stopped");
    }

    /// One polling round
    pub async fn tick(&mut self) -> Option<AdvanceOutcome> {
        let probe = PlayerProbe::take(self.player.as_ref()).await;

        let awake = self
            .policy
            .evaluate(probe.is_playing(), Instant::now());
        self.keep_awake.set(awake);

        if !probe.time_pos.is_unavailable() {
            return None;
        }

        let snapshot = self.supervisor.snapshot().await;
        let current = snapshot.current_track_id?;

        debug!(
            "Player unreachable while track {} is current, confirming in {:?}",
            current, self.settings.confirm_delay
        );
        sleep(self.settings.confirm_delay).await;

        if !self
            .player
            .query_property(Property::TimePos)
            .await
            .is_unavailable()
        {
            debug!("Player came back, not advancing");
            return None;
        }

        match self
            .supervisor
            .advance_after(current, snapshot.generation)
            .await
        {
            Ok(outcome) => {
                debug!("Advance after track {} resolved: {:?}", current, outcome);
                Some(outcome)
            }
            Err(e) => {
                warn!("Auto-advance after track {} failed: {}", current, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_probe_is_playing() {
        let playing = PlayerProbe {
            time_pos: PropertyReply::Value(json!(12.0)),
            pause: PropertyReply::Value(json!(false)),
        };
        assert!(playing.is_playing());

        let paused = PlayerProbe {
            time_pos: PropertyReply::Value(json!(12.0)),
            pause: PropertyReply::Value(json!(true)),
        };
        assert!(!paused.is_playing());

        let loading = PlayerProbe {
            time_pos: PropertyReply::Failed("property unavailable".into()),
            pause: PropertyReply::Value(json!(false)),
        };
        assert!(!loading.is_playing());

        let gone = PlayerProbe {
            time_pos: PropertyReply::Unavailable,
            pause: PropertyReply::Unavailable,
        };
        assert!(!gone.is_playing());
    }

    #[test]
    fn test_position_zero_counts_as_playing() {
        let probe = PlayerProbe {
            time_pos: PropertyReply::Value(json!(0.0)),
            pause: PropertyReply::Value(json!(false)),
        };
        assert!(probe.is_playing());
    }
}
