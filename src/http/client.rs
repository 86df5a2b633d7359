//! HTTP client construction.
//!
//! Every request goes through a `reqwest-middleware` stack: tracing spans for
//! each request, then transient-failure retries with exponential backoff.
//! Those retries only cover sending a request; a stream that breaks midway is
//! handled by the coordinator's chunk retries.
//!
//! # Examples
//!
//! ```rust
//! use parfetch::http::{create_http_client, HttpClientConfig};
//! use reqwest::header::{HeaderMap, USER_AGENT};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut headers = HeaderMap::new();
//! headers.insert(USER_AGENT, "MyDownloader/1.0".parse()?);
//!
//! let config = HttpClientConfig {
//!     retries: 5,
//!     headers: Some(headers),
//!     connect_timeout: Some(Duration::from_secs(5)),
//!     ..HttpClientConfig::default()
//! };
//! let client = create_http_client(config)?;
//! # Ok(())
//! # }
//! ```

use reqwest::{header::HeaderMap, Proxy};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use reqwest_tracing::TracingMiddleware;
use std::time::Duration;

/// User agent sent unless the headers override it.
pub const DEFAULT_USER_AGENT: &str = concat!("parfetch/", env!("CARGO_PKG_VERSION"));

/// Configuration for HTTP client setup.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Number of retries for requests failing with a transient error.
    pub retries: u32,
    /// Optional proxy configuration.
    pub proxy: Option<Proxy>,
    /// Default headers to include with all requests.
    pub headers: Option<HeaderMap>,
    /// Maximum time to establish a connection.
    pub connect_timeout: Option<Duration>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            proxy: None,
            headers: None,
            connect_timeout: Some(Duration::from_secs(10)),
        }
    }
}

/// Creates an HTTP client with tracing and retry middleware.
///
/// Headers from the configuration are merged over the defaults, so a
/// `User-Agent` there replaces [`DEFAULT_USER_AGENT`].
pub fn create_http_client(
    config: HttpClientConfig,
) -> Result<ClientWithMiddleware, reqwest::Error> {
    let HttpClientConfig {
        retries,
        proxy,
        headers,
        connect_timeout,
    } = config;

    let mut inner = reqwest::Client::builder()
        .user_agent(DEFAULT_USER_AGENT)
        .default_headers(headers.unwrap_or_default());
    if let Some(proxy) = proxy {
        inner = inner.proxy(proxy);
    }
    if let Some(timeout) = connect_timeout {
        inner = inner.connect_timeout(timeout);
    }

    let backoff = ExponentialBackoff::builder().build_with_max_retries(retries);
    Ok(ClientBuilder::new(inner.build()?)
        .with(TracingMiddleware::default())
        .with(RetryTransientMiddleware::new_with_policy(backoff))
        .build())
}
