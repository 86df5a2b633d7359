//! Parfetch downloads a single file over HTTP(S) by splitting it into byte
//! ranges fetched concurrently into one pre-sized file.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use parfetch::{download::Download, Error};
//! use std::convert::TryFrom;
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Error> {
//! let reqwest_rs = "https://github.com/seanmonstar/reqwest/archive/refs/tags/v0.11.9.zip";
//! let download = Download::try_from(reqwest_rs)?;
//! let summary = download.run(CancellationToken::new()).await?;
//! println!("{} chunks, {} B/s", summary.chunks(), summary.average_speed());
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`download`] - The `Download` handle, chunk planning and run summaries
//! - [`downloader`] - `DownloadBuilder`, configuration and the fetch lifecycle
//! - [`error`] - Centralized error handling with the `Error` enum
//! - [`http`] - HTTP client and the `RangeSource` network seam
//! - [`progress`] - Progress counters and rendering
//! - [`utils`] - Shared utility functions

pub mod download;
pub mod downloader;
pub mod error;
pub mod http;
pub mod progress;
pub mod utils;

pub use download::{plan_chunks, ByteRange, Chunk, Download, Info, Phase, Summary};
pub use downloader::{DownloadBuilder, DownloadConfig};
pub use error::{Error, Result};
pub use http::{create_http_client, ByteStream, HttpClientConfig, HttpSource, RangeSource};
pub use progress::{ProgressBarOpts, ProgressRenderer, ProgressState, RenderStyle};
pub use tokio_util::sync::CancellationToken;
pub use utils::format_bytes;
