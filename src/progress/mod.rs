//! Progress tracking and rendering.
//!
//! - `state` - [`ProgressState`], atomic counters shared by every fetcher
//! - `display` - [`ProgressRenderer`], the fixed-interval drawing loop
//! - `style` - [`RenderStyle`] and indicatif [`ProgressBarOpts`]
//!
//! # Examples
//!
//! ## Reading progress from another task
//!
//! ```rust
//! use parfetch::progress::ProgressState;
//! use std::time::Duration;
//!
//! let state = ProgressState::new(Duration::from_millis(100));
//! state.start(2048);
//! state.add(512);
//! assert_eq!(state.percent(), Some(25));
//! ```
//!
//! ## Using an indicatif bar
//!
//! ```rust
//! use parfetch::downloader::DownloadBuilder;
//! use parfetch::progress::{ProgressBarOpts, RenderStyle};
//!
//! let download = DownloadBuilder::new("https://example.com/file.zip")
//!     .render_style(RenderStyle::Bar(ProgressBarOpts::with_pip_style()))
//!     .build()?;
//! # Ok::<(), parfetch::Error>(())
//! ```

pub(crate) mod display;
pub(crate) mod state;
pub(crate) mod style;

pub use display::{render_line, ProgressRenderer};
pub use state::ProgressState;
pub use style::{ProgressBarOpts, RenderStyle};
