//! Test helper modules for jukebox integration tests
//!
//! - FakePlayer: in-process player that counts live instances
//! - TestJukebox: supervisor + router over an in-memory database

#![allow(dead_code)]

pub mod fake_player;
pub mod test_server;

pub use fake_player::FakePlayer;
pub use test_server::TestJukebox;
