//! Errors raised while bootstrapping configuration and storage

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure in shared setup code (config file, database file, schema)
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Root folder or database directory could not be created or read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unreadable config file or a value out of range
    #[error("Configuration error: {0}")]
    Config(String),
}
