//! Builder for [`Download`] instances.
//!
//! # Examples
//!
//! ```rust
//! use parfetch::downloader::DownloadBuilder;
//! use std::path::PathBuf;
//! use std::time::Duration;
//!
//! let download = DownloadBuilder::new("https://example.com/dataset.csv")
//!     .directory(PathBuf::from("./downloads"))
//!     .concurrency(4)
//!     .chunk_size_bounds(1 << 20, 32 << 20)
//!     .interval(Duration::from_millis(200))
//!     .cookie("session", "abc123")
//!     .build()?;
//! assert_eq!(download.filename(), "dataset.csv");
//! # Ok::<(), parfetch::Error>(())
//! ```

use super::config::DownloadConfig;
use crate::download::download::{filename_from_url, Download};
use crate::error::{Error, Result};
use crate::http::{create_http_client, HttpSource, RangeSource};
use crate::progress::RenderStyle;

use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName};
use reqwest::Url;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// A builder used to create a [`Download`].
#[derive(Debug)]
pub struct DownloadBuilder {
    url: String,
    filename: Option<String>,
    config: DownloadConfig,
}

impl DownloadBuilder {
    /// Creates a builder for `url` with the default options.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            filename: None,
            config: DownloadConfig::default(),
        }
    }

    /// Sets the directory where to store the file.
    pub fn directory(mut self, directory: PathBuf) -> Self {
        self.config.directory = directory;
        self
    }

    /// Sets the file name; derived from the URL when not set.
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Set the number of chunks fetched in parallel.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    /// Set the minimum and maximum chunk size in bytes.
    pub fn chunk_size_bounds(mut self, min: u64, max: u64) -> Self {
        self.config.min_chunk_size = min;
        self.config.max_chunk_size = max;
        self
    }

    /// Set the progress refresh period.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.interval = Some(interval);
        self
    }

    /// Set how many times a failed chunk is re-requested.
    pub fn chunk_retries(mut self, retries: u32) -> Self {
        self.config.chunk_retries = retries;
        self
    }

    /// Set the number of retries per HTTP request.
    pub fn retries(mut self, retries: u32) -> Self {
        self.config.retries = retries;
        self
    }

    /// Route requests through a proxy.
    pub fn proxy(mut self, proxy: reqwest::Proxy) -> Self {
        self.config.proxy = Some(proxy);
        self
    }

    /// Add the http headers, merged with any added before.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.config
            .headers
            .get_or_insert_with(HeaderMap::new)
            .extend(headers);
        self
    }

    /// Add one http header.
    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.config
            .headers
            .get_or_insert_with(HeaderMap::new)
            .insert(name, value);
        self
    }

    /// Add one cookie.
    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.cookies.push((name.into(), value.into()));
        self
    }

    /// Add several cookies.
    pub fn cookies(mut self, cookies: impl IntoIterator<Item = (String, String)>) -> Self {
        self.config.cookies.extend(cookies);
        self
    }

    /// Set how progress is drawn.
    pub fn render_style(mut self, style: RenderStyle) -> Self {
        self.config.render_style = style;
        self
    }

    /// Convenience function to hide the progress output.
    pub fn hidden(self) -> Self {
        self.render_style(RenderStyle::Hidden)
    }

    /// Get the configuration assembled so far.
    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Create the [`Download`], fetching over HTTP.
    pub fn build(self) -> Result<Download> {
        let client = create_http_client(self.config.http_client_config())
            .map_err(|e| Error::Internal(format!("cannot build HTTP client: {}", e)))?;
        let source = Arc::new(HttpSource::new(client, &self.config.cookies));
        self.build_with_source(source)
    }

    /// Create the [`Download`] with a custom network collaborator.
    pub fn build_with_source(self, source: Arc<dyn RangeSource>) -> Result<Download> {
        let url = Url::parse(&self.url).map_err(|e| {
            Error::InvalidUrl(format!("The url \"{}\" cannot be parsed: {}", self.url, e))
        })?;
        let filename = match self.filename {
            Some(filename) if !filename.is_empty() => filename,
            Some(_) => {
                return Err(Error::InvalidUrl(format!(
                    "empty file name for \"{}\"",
                    url
                )))
            }
            None => filename_from_url(&url)?,
        };
        Ok(Download::from_parts(url, filename, self.config, source))
    }
}
