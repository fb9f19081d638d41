//! Crate-level error type.
//!
//! Only *fatal* conditions surface through this enum: configuration
//! problems, tracker transport failures, and local IO. Per-finding
//! submission failures are deliberately **not** errors — they are
//! collected as [`ErrorRecord`](crate::finding::ErrorRecord) values on
//! the run outcome so that one bad finding never aborts the batch.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid tracker target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for a [`Error::Config`] with a formatted message.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}
