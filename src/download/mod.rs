//! Download data model.
//!
//! - [`download`] - The [`Download`] handle and probed [`Info`]
//! - [`chunk`] - Byte ranges, per-chunk cursors and the chunk planner
//! - [`summary`] - Lifecycle [`Phase`]s and the [`Summary`] of a finished run
//!
//! # Examples
//!
//! ```rust
//! use parfetch::download::{plan_chunks, Download};
//! use std::convert::TryFrom;
//!
//! let download = Download::try_from("https://example.com/file.zip")?;
//! let config = download.config();
//! let ranges = plan_chunks(
//!     64 << 20,
//!     true,
//!     config.concurrency,
//!     config.min_chunk_size,
//!     config.max_chunk_size,
//! )?;
//! assert_eq!(ranges.len(), config.concurrency);
//! # Ok::<(), parfetch::Error>(())
//! ```

pub mod chunk;
pub mod download;
pub mod summary;

pub use chunk::{plan_chunks, ByteRange, Chunk};
pub use download::{Download, Info};
pub use summary::{Phase, Summary};
