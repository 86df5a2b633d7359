//! The network collaborator.
//!
//! The coordinator never talks to HTTP directly: it asks a [`RangeSource`]
//! for the resource [`Info`] once, then opens one byte stream per chunk.
//! [`HttpSource`] is the production implementation; tests plug in their own.

use crate::download::{ByteRange, Info};
use crate::error::{Error, Result};
use crate::utils::content_length::{get_content_length, parse_content_range_total};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use reqwest::{
    header::{CONTENT_RANGE, COOKIE, RANGE},
    StatusCode, Url,
};
use reqwest_middleware::ClientWithMiddleware;
use std::fmt;
use tracing::debug;

/// Body of a ranged response, yielded piece by piece.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Something that can describe a remote resource and stream parts of it.
#[async_trait]
pub trait RangeSource: Send + Sync {
    /// Determine the total size and partial-content support of `url`.
    ///
    /// Fails with [`Error::Probe`].
    async fn probe(&self, url: &Url) -> Result<Info>;

    /// Open a stream over `range` of `url`.
    ///
    /// A [`ByteRange::Full`] range requests the whole resource. Fails with
    /// [`Error::Network`].
    async fn open(&self, url: &Url, range: &ByteRange) -> Result<ByteStream>;
}

/// [`RangeSource`] backed by the middleware HTTP client.
#[derive(Clone)]
pub struct HttpSource {
    client: ClientWithMiddleware,
    cookie: Option<String>,
}

impl fmt::Debug for HttpSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpSource")
            .field("cookie", &self.cookie.is_some())
            .finish()
    }
}

impl HttpSource {
    /// Creates a source sending `cookies` as `(name, value)` pairs with every
    /// request.
    pub fn new(client: ClientWithMiddleware, cookies: &[(String, String)]) -> Self {
        let cookie = (!cookies.is_empty()).then(|| {
            cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; ")
        });
        Self { client, cookie }
    }

    fn get(&self, url: &Url) -> reqwest_middleware::RequestBuilder {
        let request = self.client.get(url.clone());
        match &self.cookie {
            Some(cookie) => request.header(COOKIE, cookie),
            None => request,
        }
    }
}

#[async_trait]
impl RangeSource for HttpSource {
    /// Requests the first byte only. A `206` reply proves range support and
    /// carries the total in `Content-Range`; anything else falls back to
    /// `Content-Length` without range support.
    async fn probe(&self, url: &Url) -> Result<Info> {
        debug!("Probing {}", url);
        let response = self
            .get(url)
            .header(RANGE, "bytes=0-0")
            .send()
            .await
            .map_err(|e| Error::Probe(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Probe(format!("{} answered {}", url, status)));
        }

        let info = if status == StatusCode::PARTIAL_CONTENT {
            let size = response
                .headers()
                .get(CONTENT_RANGE)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_content_range_total)
                .filter(|size| *size > 0)
                .ok_or_else(|| {
                    Error::Probe(format!(
                        "{} supports ranges but reported no total size",
                        url
                    ))
                })?;
            Info {
                size,
                rangeable: true,
            }
        } else {
            Info {
                size: get_content_length(&response).unwrap_or(0),
                rangeable: false,
            }
        };

        debug!(size = info.size, rangeable = info.rangeable, "Probed {}", url);
        Ok(info)
    }

    async fn open(&self, url: &Url, range: &ByteRange) -> Result<ByteStream> {
        let mut request = self.get(url);
        if let ByteRange::Span { start, end } = range {
            request = request.header(RANGE, format!("bytes={}-{}", start, end));
        }

        let response = request.send().await?.error_for_status()?;

        // A server answering 200 to a ranged request sends the whole body,
        // which would land at this chunk's offset.
        if matches!(range, ByteRange::Span { .. })
            && response.status() != StatusCode::PARTIAL_CONTENT
        {
            return Err(Error::Network(format!(
                "{} ignored the range request for bytes {} ({})",
                url,
                range,
                response.status()
            )));
        }

        Ok(response
            .bytes_stream()
            .map(|item| item.map_err(Error::from))
            .boxed())
    }
}
