//! The download handle.
//!
//! A [`Download`] describes one file to fetch and owns everything the run
//! produces: the probed [`Info`], the planned chunks and the shared
//! [`ProgressState`]. It is driven by [`Download::run`], implemented in the
//! coordinator.
//!
//! # Examples
//!
//! ```rust
//! use parfetch::download::Download;
//! use std::convert::TryFrom;
//!
//! // File name derived from the URL, default configuration.
//! let download = Download::try_from("https://example.com/archive.tar.gz")?;
//! assert_eq!(download.filename(), "archive.tar.gz");
//! assert_eq!(download.transferred_size(), 0);
//! # Ok::<(), parfetch::Error>(())
//! ```

use super::chunk::Chunk;
use super::summary::Phase;
use crate::downloader::{DownloadBuilder, DownloadConfig};
use crate::error::{Error, Result};
use crate::http::RangeSource;
use crate::progress::ProgressState;

use reqwest::Url;
use std::convert::TryFrom;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Remote resource metadata, fetched once before planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Info {
    /// Total size in bytes, `0` when unknown.
    pub size: u64,
    /// Whether the server answers byte-range requests with partial content.
    pub rangeable: bool,
}

/// Represents a file to be downloaded.
pub struct Download {
    pub(crate) url: Url,
    pub(crate) filename: String,
    pub(crate) config: DownloadConfig,
    pub(crate) source: Arc<dyn RangeSource>,
    pub(crate) info: OnceLock<Info>,
    pub(crate) chunks: Mutex<Vec<Arc<Chunk>>>,
    pub(crate) progress: Arc<ProgressState>,
    phase: AtomicU8,
}

impl fmt::Debug for Download {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Download")
            .field("url", &self.url.as_str())
            .field("filename", &self.filename)
            .field("config", &self.config)
            .field("info", &self.info.get())
            .field("phase", &self.phase())
            .finish()
    }
}

impl Download {
    /// Creates a new [`Download`] over HTTP.
    ///
    /// `chunk_size_bounds` is the `(min, max)` chunk length in bytes and
    /// `interval` overrides the progress refresh period. Each cookie is a
    /// `(name, value)` pair sent with every request.
    ///
    /// ```rust
    /// use parfetch::download::Download;
    /// use std::time::Duration;
    ///
    /// let download = Download::new(
    ///     "https://example.com/file.iso",
    ///     "downloads",
    ///     "image.iso",
    ///     4,
    ///     (1 << 20, 16 << 20),
    ///     Some(Duration::from_millis(250)),
    ///     vec![("session".into(), "abc".into())],
    /// )?;
    /// assert_eq!(download.destination(), std::path::Path::new("downloads/image.iso"));
    /// # Ok::<(), parfetch::Error>(())
    /// ```
    pub fn new(
        url: &str,
        directory: impl Into<PathBuf>,
        filename: &str,
        concurrency: usize,
        chunk_size_bounds: (u64, u64),
        interval: Option<Duration>,
        cookies: Vec<(String, String)>,
    ) -> Result<Self> {
        let mut builder = DownloadBuilder::new(url)
            .directory(directory.into())
            .filename(filename)
            .concurrency(concurrency)
            .chunk_size_bounds(chunk_size_bounds.0, chunk_size_bounds.1)
            .cookies(cookies);
        if let Some(interval) = interval {
            builder = builder.interval(interval);
        }
        builder.build()
    }

    pub(crate) fn from_parts(
        url: Url,
        filename: String,
        config: DownloadConfig,
        source: Arc<dyn RangeSource>,
    ) -> Self {
        let progress = Arc::new(ProgressState::new(config.effective_interval()));
        Self {
            url,
            filename,
            config,
            source,
            info: OnceLock::new(),
            chunks: Mutex::new(Vec::new()),
            progress,
            phase: AtomicU8::new(Phase::Idle as u8),
        }
    }

    /// URL of the file to download.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// File name used to save the file on disk.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The configuration this download runs with.
    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Final path of the downloaded file.
    pub fn destination(&self) -> PathBuf {
        self.config.directory.join(&self.filename)
    }

    /// Path written to while the download is in progress.
    pub fn temp_path(&self) -> PathBuf {
        let mut path = self.destination().into_os_string();
        path.push(".downloading");
        PathBuf::from(path)
    }

    /// Resource metadata, once probed.
    pub fn info(&self) -> Option<Info> {
        self.info.get().copied()
    }

    /// Total size in bytes, `0` if unknown or not probed yet.
    pub fn total_size(&self) -> u64 {
        self.progress.total()
    }

    /// Bytes transferred so far.
    pub fn transferred_size(&self) -> u64 {
        self.progress.transferred()
    }

    /// Bytes per second over the last reporting interval.
    pub fn instantaneous_speed(&self) -> u64 {
        self.progress.instantaneous_speed()
    }

    /// Bytes per second since the transfer started.
    pub fn average_speed(&self) -> u64 {
        self.progress.average_speed()
    }

    /// Time spent transferring, frozen once the download finishes.
    pub fn elapsed(&self) -> Duration {
        self.progress.elapsed()
    }

    /// Whether the server supports partial content, `false` until probed.
    pub fn is_rangeable(&self) -> bool {
        self.info().is_some_and(|info| info.rangeable)
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// The chunks planned by the latest run.
    pub fn chunks(&self) -> Vec<Arc<Chunk>> {
        self.chunks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Shared progress counters, e.g. for a custom renderer.
    pub fn progress(&self) -> Arc<ProgressState> {
        self.progress.clone()
    }

    pub(crate) fn set_phase(&self, phase: Phase) {
        debug!(filename = %self.filename, "{}", phase);
        self.phase.store(phase as u8, Ordering::Release);
    }

    pub(crate) fn set_chunks(&self, chunks: Vec<Arc<Chunk>>) {
        *self.chunks.lock().unwrap_or_else(PoisonError::into_inner) = chunks;
    }
}

/// Extract the percent-decoded file name from the last URL path segment.
pub(crate) fn filename_from_url(url: &Url) -> Result<String> {
    let segment = url
        .path_segments()
        .ok_or_else(|| {
            Error::InvalidUrl(format!("The url \"{}\" does not contain a valid path", url))
        })?
        .next_back()
        .unwrap_or_default();

    let filename: String = form_urlencoded::parse(segment.as_bytes())
        .map(|(key, val)| [key, val].concat())
        .collect();

    if filename.is_empty() {
        return Err(Error::InvalidUrl(format!(
            "The url \"{}\" does not contain a filename",
            url
        )));
    }
    Ok(filename)
}

impl TryFrom<&Url> for Download {
    type Error = Error;

    fn try_from(value: &Url) -> Result<Self> {
        DownloadBuilder::new(value.as_str()).build()
    }
}

impl TryFrom<&str> for Download {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        DownloadBuilder::new(value).build()
    }
}
