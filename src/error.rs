use thiserror::Error;

/// Errors surfaced by the command engine and its collaborators.
///
/// Dispatch itself never fails: an unmatched line is reported on the
/// session's output. These variants cover registration mistakes and the
/// I/O of sinks, history storage and configuration files.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid command name: {0:?}")]
    InvalidName(String),

    #[error("Menu not found")]
    UnknownMenu,

    #[error("History storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
