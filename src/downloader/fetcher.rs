//! Retrieval of a single chunk.
//!
//! The fetcher streams its chunk's remaining bytes into the temporary file at
//! the chunk's own offset, advancing the chunk cursor and the shared progress
//! counter as each piece is written. It never retries; the coordinator
//! decides what to do with a failure.

use crate::download::Chunk;
use crate::error::{Error, Result};
use crate::http::RangeSource;
use crate::progress::ProgressState;

use futures::StreamExt;
use reqwest::Url;
use std::io::SeekFrom;
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncSeekExt, AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Write buffer per fetcher.
const WRITE_BUFFER: usize = 256 * 1024;

/// Fetch what is left of `chunk` into the file at `path`.
///
/// The file must already exist. Cancellation is checked before the request
/// and on every read, including while waiting for the next piece of the body.
pub(crate) async fn fetch_chunk(
    source: &dyn RangeSource,
    url: &Url,
    chunk: &Chunk,
    path: &Path,
    progress: &ProgressState,
    token: &CancellationToken,
) -> Result<()> {
    if token.is_cancelled() {
        return Err(Error::Cancelled);
    }
    if chunk.remaining() == Some(0) {
        chunk.mark_complete();
        return Ok(());
    }

    let range = chunk.range().resume_from(chunk.written()).ok_or_else(|| {
        Error::Internal(format!(
            "chunk {} restarted after {} bytes of an unresumable stream",
            chunk.index(),
            chunk.written()
        ))
    })?;
    debug!(chunk = chunk.index(), "Requesting bytes {}", range);

    let mut stream = tokio::select! {
        biased;
        _ = token.cancelled() => return Err(Error::Cancelled),
        stream = source.open(url, &range) => stream?,
    };

    let mut file = OpenOptions::new().write(true).open(path).await?;
    file.seek(SeekFrom::Start(range.start())).await?;
    let mut writer = BufWriter::with_capacity(WRITE_BUFFER, file);

    loop {
        let item = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(Error::Cancelled),
            item = stream.next() => item,
        };

        let mut bytes = match item {
            Some(Ok(bytes)) => bytes,
            Some(Err(e)) => {
                // Keep the cursor truthful for a resumed attempt.
                writer.flush().await?;
                return Err(e);
            }
            None => break,
        };

        if let Some(remaining) = chunk.remaining() {
            if remaining == 0 {
                break;
            }
            if bytes.len() as u64 > remaining {
                bytes.truncate(remaining as usize);
            }
        }

        writer.write_all(&bytes).await?;
        let n = bytes.len() as u64;
        chunk.advance(n);
        progress.add(n);
        if chunk.remaining() == Some(0) {
            break;
        }
    }

    writer.flush().await?;

    if let Some(expected) = chunk.range().len() {
        let received = chunk.written();
        if received < expected {
            return Err(Error::ShortRead { expected, received });
        }
    }

    chunk.mark_complete();
    debug!(chunk = chunk.index(), bytes = chunk.written(), "Chunk complete");
    Ok(())
}
