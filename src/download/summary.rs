//! Download lifecycle phases and the result of a finished download.
//!
//! A [`Download`](super::Download) moves through
//! `Planning -> Allocating -> Fetching -> Finalizing -> Done`, or ends in
//! `Failed` from any non-terminal phase. A successful run returns a
//! [`Summary`].
//!
//! # Examples
//!
//! ```rust
//! use parfetch::download::Phase;
//!
//! assert!(Phase::Done.is_terminal());
//! assert!(Phase::Failed.is_terminal());
//! assert!(!Phase::Fetching.is_terminal());
//! ```

use crate::utils::format_bytes;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Lifecycle phase of a download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    /// Not run yet.
    Idle = 0,
    /// Probing the resource and computing chunk ranges.
    Planning = 1,
    /// Creating and pre-sizing the temporary file.
    Allocating = 2,
    /// Chunks are being retrieved.
    Fetching = 3,
    /// Renaming the temporary file and emitting the final line.
    Finalizing = 4,
    /// The destination file is complete.
    Done = 5,
    /// The download failed or was cancelled.
    Failed = 6,
}

impl Phase {
    /// Whether no further transition can happen within the current run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Done | Phase::Failed)
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => Phase::Planning,
            2 => Phase::Allocating,
            3 => Phase::Fetching,
            4 => Phase::Finalizing,
            5 => Phase::Done,
            6 => Phase::Failed,
            _ => Phase::Idle,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Represents the outcome of a successful download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Final destination of the file.
    path: PathBuf,
    /// Bytes written.
    size: u64,
    /// Wall-clock duration of the transfer.
    elapsed: Duration,
    /// Average speed in bytes per second.
    average_speed: u64,
    /// Number of chunks the download was split into.
    chunks: usize,
    /// Whether the server accepted byte-range requests.
    rangeable: bool,
}

impl Summary {
    /// Create a new [`Summary`].
    pub fn new(
        path: PathBuf,
        size: u64,
        elapsed: Duration,
        average_speed: u64,
        chunks: usize,
        rangeable: bool,
    ) -> Self {
        Self {
            path,
            size,
            elapsed,
            average_speed,
            chunks,
            rangeable,
        }
    }

    /// Get the destination path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the number of bytes written.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Get the transfer duration.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Get the average speed in bytes per second.
    pub fn average_speed(&self) -> u64 {
        self.average_speed
    }

    /// Get the number of chunks.
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Get whether the download used byte ranges.
    #[must_use]
    pub fn rangeable(&self) -> bool {
        self.rangeable
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) in {:?} at {}/s",
            self.path.display(),
            format_bytes(self.size),
            self.elapsed,
            format_bytes(self.average_speed)
        )
    }
}
