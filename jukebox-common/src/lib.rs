//! # Jukebox Common Library
//!
//! Shared code for the jukebox controller:
//! - Database bootstrap, schema and row models
//! - Event types (JukeboxEvent enum) and the EventBus
//! - Configuration loading and root folder resolution

pub mod config;
pub mod db;
pub mod error;
pub mod events;

pub use error::{Error, Result};
