//! Configuration structures and defaults for a download.
//!
//! # Examples
//!
//! ```rust
//! use parfetch::downloader::DownloadConfig;
//!
//! let config = DownloadConfig::default();
//! assert_eq!(config.concurrency, 8);
//! assert_eq!(config.min_chunk_size, 256 * 1024);
//! assert!(config.effective_interval().as_millis() >= 1);
//! ```

use crate::http::HttpClientConfig;
use crate::progress::RenderStyle;

use reqwest::header::HeaderMap;
use std::env::current_dir;
use std::path::PathBuf;
use std::thread::available_parallelism;
use std::time::Duration;

/// Default number of chunks fetched at the same time.
pub const DEFAULT_CONCURRENCY: usize = 8;
/// Default lower bound of a chunk, 256 KiB.
pub const DEFAULT_MIN_CHUNK_SIZE: u64 = 256 * 1024;
/// Default upper bound of a chunk, 64 MiB.
pub const DEFAULT_MAX_CHUNK_SIZE: u64 = 64 * 1024 * 1024;
/// Refresh budget shared across cores when no interval is configured.
const BASE_INTERVAL: Duration = Duration::from_millis(400);

/// Configuration structure for a download.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Directory where the file is stored.
    pub directory: PathBuf,
    /// Number of chunks fetched in parallel.
    pub concurrency: usize,
    /// Smallest chunk the planner produces, except for a trailing remainder.
    pub min_chunk_size: u64,
    /// Largest chunk the planner produces.
    pub max_chunk_size: u64,
    /// Progress refresh period, derived from the core count when unset.
    pub interval: Option<Duration>,
    /// How many times a failed chunk is re-requested.
    pub chunk_retries: u32,
    /// Number of retries per HTTP request.
    pub retries: u32,
    /// Optional proxy configuration.
    pub proxy: Option<reqwest::Proxy>,
    /// Custom HTTP headers.
    pub headers: Option<HeaderMap>,
    /// Cookies sent with every request, as `(name, value)` pairs.
    pub cookies: Vec<(String, String)>,
    /// How progress is drawn.
    pub render_style: RenderStyle,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            directory: current_dir().unwrap_or_default(),
            concurrency: DEFAULT_CONCURRENCY,
            min_chunk_size: DEFAULT_MIN_CHUNK_SIZE,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            interval: None,
            chunk_retries: 2,
            retries: 3,
            proxy: None,
            headers: None,
            cookies: Vec::new(),
            render_style: RenderStyle::default(),
        }
    }
}

impl DownloadConfig {
    /// The progress refresh period actually used.
    ///
    /// Without an explicit interval, 400 ms are divided by the available
    /// parallelism. Never shorter than 1 ms.
    pub fn effective_interval(&self) -> Duration {
        let interval = self.interval.unwrap_or_else(|| {
            let cores = available_parallelism().map(|n| n.get()).unwrap_or(1);
            BASE_INTERVAL / cores as u32
        });
        interval.max(Duration::from_millis(1))
    }

    /// The HTTP client settings derived from this configuration.
    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            retries: self.retries,
            proxy: self.proxy.clone(),
            headers: self.headers.clone(),
            ..HttpClientConfig::default()
        }
    }
}
