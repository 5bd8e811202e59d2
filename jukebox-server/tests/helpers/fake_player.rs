//! In-process stand-in for the external player
//!
//! Counts live "instances" so tests can assert that two never overlap, and
//! lets a test end the current track as if the process had exited.

use async_trait::async_trait;
use jukebox_server::player::{PlayerCommand, PlayerControl, Property, PropertyReply, StartRequest};
use jukebox_server::{Error, Result};
use serde_json::json;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Default)]
struct Inner {
    live: usize,
    max_live: usize,
    paused: bool,
    starts: Vec<StartRequest>,
    commands: Vec<PlayerCommand>,
    fail_next_start: bool,
    /// Reply forced for every time-pos query, overriding the live state
    time_pos_override: Option<PropertyReply>,
}

#[derive(Debug, Default)]
pub struct FakePlayer {
    inner: Mutex<Inner>,
}

impl FakePlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_instances(&self) -> usize {
        self.inner.lock().unwrap().live
    }

    /// Highest number of simultaneously live instances ever observed
    pub fn max_live_instances(&self) -> usize {
        self.inner.lock().unwrap().max_live
    }

    pub fn starts(&self) -> Vec<StartRequest> {
        self.inner.lock().unwrap().starts.clone()
    }

    pub fn commands(&self) -> Vec<PlayerCommand> {
        self.inner.lock().unwrap().commands.clone()
    }

    /// The running instance exits on its own (end of track)
    pub fn finish_track(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.live = 0;
        inner.paused = false;
    }

    pub fn fail_next_start(&self) {
        self.inner.lock().unwrap().fail_next_start = true;
    }

    pub fn force_time_pos(&self, reply: Option<PropertyReply>) {
        self.inner.lock().unwrap().time_pos_override = reply;
    }
}

#[async_trait]
impl PlayerControl for FakePlayer {
    async fn start(&self, request: &StartRequest) -> Result<()> {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.live = 0;
        }

        // Widen the window between terminate and spawn so unserialized
        // callers would overlap
        tokio::time::sleep(Duration::from_millis(5)).await;

        let mut inner = self.inner.lock().unwrap();
        if inner.fail_next_start {
            inner.fail_next_start = false;
            return Err(Error::Player("spawn failed".to_string()));
        }

        inner.live += 1;
        inner.max_live = inner.max_live.max(inner.live);
        inner.paused = false;
        inner.starts.push(request.clone());
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.live = 0;
        inner.paused = false;
        Ok(())
    }

    async fn send_command(&self, command: PlayerCommand) {
        let mut inner = self.inner.lock().unwrap();
        if inner.live > 0 && command == PlayerCommand::TogglePause {
            inner.paused = !inner.paused;
        }
        inner.commands.push(command);
    }

    async fn query_property(&self, property: Property) -> PropertyReply {
        let inner = self.inner.lock().unwrap();

        if property == Property::TimePos {
            if let Some(reply) = &inner.time_pos_override {
                return reply.clone();
            }
        }
        if inner.live == 0 {
            return PropertyReply::Unavailable;
        }

        match property {
            Property::TimePos => PropertyReply::Value(json!(42.5)),
            Property::Duration => PropertyReply::Value(json!(180.0)),
            Property::Pause => PropertyReply::Value(json!(inner.paused)),
        }
    }
}
