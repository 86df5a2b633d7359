//! Error handling for parfetch.
//!
//! Every failure a download can hit is one variant of [`Error`]. Chunk-level
//! failures (`Network`, `ShortRead`, `Write`) are produced by a single fetcher
//! and surfaced to the coordinator, which turns the first one it observes into
//! the result of the whole download.

use std::io;
use thiserror::Error;

/// Errors that can happen while planning, fetching or finalizing a download.
#[derive(Error, Debug)]
pub enum Error {
    /// The size or range support of the remote resource could not be determined.
    ///
    /// Returned when the probe request fails, answers with an error status, or
    /// claims partial-content support without reporting a usable total size.
    #[error("Probe failed: {0}")]
    Probe(String),

    /// The concurrency or chunk-size configuration cannot produce a plan.
    #[error("Invalid download plan: {0}")]
    Planning(String),

    /// Transport failure while a chunk was being requested or streamed.
    #[error("Network error: {0}")]
    Network(String),

    /// The response stream ended before the expected number of bytes arrived.
    #[error("Short read: expected {expected} bytes, received {received}")]
    ShortRead {
        /// Bytes the chunk should have contained.
        expected: u64,
        /// Bytes actually received before the stream ended.
        received: u64,
    },

    /// I/O failure on the destination file.
    ///
    /// Covers creating, pre-sizing, seeking, writing, flushing and renaming the
    /// temporary file.
    #[error("Write error: {source}")]
    Write {
        #[from]
        source: io::Error,
    },

    /// The download was cancelled before it could finish.
    #[error("Download cancelled")]
    Cancelled,

    /// The provided URL cannot be parsed or carries no file name.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Error from an underlying system, e.g. a background task that panicked.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the coordinator may re-request the failed chunk.
    ///
    /// Only transport failures and truncated streams are worth another
    /// attempt; destination I/O errors and cancellation are final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Network(_) | Error::ShortRead { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Network(e.to_string())
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(e: reqwest_middleware::Error) -> Self {
        Error::Network(e.to_string())
    }
}

/// Result type alias for operations that can fail with a parfetch error.
pub type Result<T> = std::result::Result<T, Error>;
