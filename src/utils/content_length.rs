//! Content length extraction utilities.
//!
//! A probe answered with `206 Partial Content` carries the full resource size
//! in `Content-Range`; a plain `200` only carries `Content-Length`.

use reqwest::{header::CONTENT_RANGE, Response};

/// Extract the total resource size from a response.
///
/// The `Content-Range` total wins when present, since `Content-Length` of a
/// ranged reply only describes the returned slice. Falls back to
/// `Content-Length`, and returns `None` when neither header is usable.
pub fn get_content_length(response: &Response) -> Option<u64> {
    match response.headers().get(CONTENT_RANGE) {
        Some(content_range) => content_range
            .to_str()
            .ok()
            .and_then(parse_content_range_total),
        None => response.content_length(),
    }
}

/// Parse a Content-Range header to extract the total size.
///
/// Content-Range header format: "bytes start-end/total". An unknown total
/// (`*`) yields `None`.
///
/// # Example
///
/// ```rust
/// use parfetch::utils::parse_content_range_total;
///
/// assert_eq!(parse_content_range_total("bytes 0-1023/2048"), Some(2048));
/// assert_eq!(parse_content_range_total("bytes 0-1023/*"), None);
/// ```
pub fn parse_content_range_total(content_range: &str) -> Option<u64> {
    let (_, total) = content_range.rsplit_once('/')?;
    total.trim().parse::<u64>().ok()
}
