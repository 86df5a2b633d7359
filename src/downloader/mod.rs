//! Configuration and execution of a download.
//!
//! - `builder` - [`DownloadBuilder`] to assemble a [`Download`](crate::Download)
//! - `config` - [`DownloadConfig`] and its defaults
//! - `coordinator` - the lifecycle behind [`Download::run`](crate::Download::run)
//! - `fetcher` - retrieval of a single chunk
//!
//! # Examples
//!
//! ```rust,no_run
//! use parfetch::downloader::DownloadBuilder;
//! use std::path::PathBuf;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), parfetch::Error> {
//! let download = DownloadBuilder::new("https://example.com/file.tar.zst")
//!     .directory(PathBuf::from("./downloads"))
//!     .concurrency(6)
//!     .chunk_retries(3)
//!     .build()?;
//!
//! let summary = download.run(CancellationToken::new()).await?;
//! assert_eq!(summary.path(), download.destination());
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
mod coordinator;
pub(crate) mod fetcher;

pub use builder::DownloadBuilder;
pub use config::{
    DownloadConfig, DEFAULT_CONCURRENCY, DEFAULT_MAX_CHUNK_SIZE, DEFAULT_MIN_CHUNK_SIZE,
};
