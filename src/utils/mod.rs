//! Shared utility functions.
//!
//! - [`bytes`] - Human-readable byte counts used by the progress line
//! - [`content_length`] - Size extraction from HTTP response headers
//!
//! # Examples
//!
//! ```rust
//! use parfetch::utils::{format_bytes, parse_content_range_total};
//!
//! assert_eq!(format_bytes(1_500_000), "1.50 MB");
//! assert_eq!(parse_content_range_total("bytes 0-0/2048"), Some(2048));
//! ```

pub mod bytes;
pub mod content_length;

pub use bytes::format_bytes;
pub use content_length::{get_content_length, parse_content_range_total};
