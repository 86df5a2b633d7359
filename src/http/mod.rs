//! HTTP access to the remote resource.
//!
//! - [`client`] - Middleware client construction (retries, tracing, proxy, headers)
//! - [`source`] - The [`RangeSource`] seam and its HTTP implementation
//!
//! # Examples
//!
//! ## Probing a resource
//!
//! ```rust,no_run
//! use parfetch::http::{create_http_client, HttpClientConfig, HttpSource, RangeSource};
//! use reqwest::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = create_http_client(HttpClientConfig::default())?;
//! let source = HttpSource::new(client, &[("session".into(), "abc".into())]);
//! let info = source.probe(&Url::parse("https://example.com/file.iso")?).await?;
//! println!("{} bytes, rangeable: {}", info.size, info.rangeable);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod source;

pub use client::{create_http_client, HttpClientConfig};
pub use source::{ByteStream, HttpSource, RangeSource};
