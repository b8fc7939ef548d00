//! Core error taxonomy
//!
//! File-level failures (I/O, parse) are recovered by the analyzer and
//! never abort a batch; store failures on cache reads degrade to misses.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// File unreadable or removed mid-scan.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Structured-language source is not syntactically valid.
    #[error("parse error: {0}")]
    Parse(String),

    /// Persistent store unavailable or a row failed to round-trip.
    #[error("store error: {0}")]
    Store(String),

    /// AI backend unreachable, timed out, or returned garbage.
    #[error("backend error: {0}")]
    Backend(String),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Store(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Store(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
