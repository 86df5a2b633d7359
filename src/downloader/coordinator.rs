//! Drives a [`Download`] through its lifecycle.
//!
//! `Idle -> Planning -> Allocating -> Fetching -> Finalizing -> Done`, or
//! `Failed` from any phase. The coordinator probes the resource once, plans
//! the chunks, pre-sizes the temporary file, fetches the chunks with bounded
//! concurrency and renames the temporary file into place. The first chunk
//! error cancels the remaining chunks and is the one returned.

use super::fetcher::fetch_chunk;
use crate::download::{plan_chunks, Chunk, Download, Info, Phase, Summary};
use crate::error::{Error, Result};
use crate::progress::ProgressRenderer;
use crate::utils::format_bytes;

use futures::stream::{self, StreamExt};
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Delay before the first chunk retry, doubled on each further attempt.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(100);

impl Download {
    /// Fetch the file, returning once it is saved at [`Download::destination`]
    /// or the download has failed.
    ///
    /// Cancelling `ctx` stops every fetcher at its next read and makes this
    /// return [`Error::Cancelled`]. On any error the temporary file is removed
    /// and the destination is left untouched.
    ///
    /// ```rust,no_run
    /// use parfetch::downloader::DownloadBuilder;
    /// use tokio_util::sync::CancellationToken;
    ///
    /// # async fn example() -> Result<(), parfetch::Error> {
    /// let download = DownloadBuilder::new("https://example.com/big.iso")
    ///     .concurrency(4)
    ///     .build()?;
    /// let summary = download.run(CancellationToken::new()).await?;
    /// println!("{}", summary);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run(&self, ctx: CancellationToken) -> Result<Summary> {
        match self.run_inner(&ctx).await {
            Ok(summary) => {
                self.set_phase(Phase::Done);
                Ok(summary)
            }
            Err(e) => {
                self.set_phase(Phase::Failed);
                self.remove_temp().await;
                warn!("Download of {} failed: {}", self.url, e);
                Err(e)
            }
        }
    }

    async fn run_inner(&self, ctx: &CancellationToken) -> Result<Summary> {
        self.set_phase(Phase::Planning);
        let info = self.resolve_info(ctx).await?;
        let chunks: Vec<Arc<Chunk>> = plan_chunks(
            info.size,
            info.rangeable,
            self.config.concurrency,
            self.config.min_chunk_size,
            self.config.max_chunk_size,
        )?
        .into_iter()
        .enumerate()
        .map(|(index, range)| Arc::new(Chunk::new(index, range)))
        .collect();
        self.set_chunks(chunks.clone());
        info!(
            "Fetching {} ({}) in {} chunk(s)",
            self.url,
            if info.size > 0 {
                format_bytes(info.size)
            } else {
                "unknown size".to_string()
            },
            chunks.len()
        );

        self.set_phase(Phase::Allocating);
        let temp = self.temp_path();
        self.allocate(&temp, info.size).await?;

        self.set_phase(Phase::Fetching);
        self.progress.start(info.size);
        let token = ctx.child_token();
        let stop = token.child_token();
        let renderer = tokio::spawn(
            ProgressRenderer::new(self.progress.clone(), self.config.render_style.clone())
                .run(stop.clone()),
        );

        let fetched = self.fetch_all(&chunks, &temp, &token).await;
        stop.cancel();
        let mut renderer = renderer
            .await
            .map_err(|e| Error::Internal(format!("progress renderer failed: {}", e)))?;

        if let Err(e) = fetched {
            renderer.abandon();
            return Err(e);
        }
        if ctx.is_cancelled() {
            renderer.abandon();
            return Err(Error::Cancelled);
        }

        self.set_phase(Phase::Finalizing);
        let destination = self.destination();
        fs::rename(&temp, &destination).await?;
        self.progress.finish();
        renderer.finish();

        let summary = Summary::new(
            destination,
            self.progress.transferred(),
            self.progress.elapsed(),
            self.progress.average_speed(),
            chunks.len(),
            info.rangeable,
        );
        info!("Saved as {}", summary);
        Ok(summary)
    }

    /// Probe the resource, or reuse what an earlier run found.
    async fn resolve_info(&self, ctx: &CancellationToken) -> Result<Info> {
        if let Some(info) = self.info.get() {
            debug!("Reusing probed info for {}", self.url);
            return Ok(*info);
        }

        let info = tokio::select! {
            biased;
            _ = ctx.cancelled() => return Err(Error::Cancelled),
            info = self.source.probe(&self.url) => info?,
        };
        if info.rangeable && info.size == 0 {
            return Err(Error::Probe(format!(
                "{} supports ranges but reported no total size",
                self.url
            )));
        }
        Ok(*self.info.get_or_init(|| info))
    }

    /// Create the temporary file and reserve `size` bytes for it.
    async fn allocate(&self, temp: &Path, size: u64) -> Result<()> {
        if let Some(parent) = temp.parent() {
            fs::create_dir_all(parent).await?;
        }
        let file = fs::File::create(temp).await?;
        if size > 0 {
            file.set_len(size).await?;
        }
        debug!("Allocated {} for {}", format_bytes(size), temp.display());
        Ok(())
    }

    /// Fetch every chunk, at most `concurrency` at a time.
    async fn fetch_all(
        &self,
        chunks: &[Arc<Chunk>],
        temp: &Path,
        token: &CancellationToken,
    ) -> Result<()> {
        let mut results = stream::iter(chunks.iter().cloned())
            .map(|chunk| self.fetch_with_retries(chunk, temp, token))
            .buffer_unordered(self.config.concurrency.max(1));

        let mut first_error = None;
        while let Some(result) = results.next().await {
            if let Err(e) = result {
                if first_error.is_none() {
                    debug!("Cancelling remaining chunks after: {}", e);
                    token.cancel();
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Fetch one chunk, re-requesting what is left of it after a transient
    /// failure.
    async fn fetch_with_retries(
        &self,
        chunk: Arc<Chunk>,
        temp: &Path,
        token: &CancellationToken,
    ) -> Result<()> {
        let mut attempt: u32 = 0;
        loop {
            let err = match fetch_chunk(
                self.source.as_ref(),
                &self.url,
                &chunk,
                temp,
                &self.progress,
                token,
            )
            .await
            {
                Ok(()) => return Ok(()),
                Err(e) => e,
            };

            let resumable = chunk.range().resume_from(chunk.written()).is_some();
            if !err.is_retryable()
                || !resumable
                || attempt >= self.config.chunk_retries
                || token.is_cancelled()
            {
                return Err(err);
            }

            let delay = RETRY_BASE_DELAY * (1u32 << attempt.min(5));
            attempt += 1;
            warn!(
                chunk = chunk.index(),
                attempt, "Chunk failed: {}. Retrying in {:?}", err, delay
            );
            tokio::select! {
                biased;
                _ = token.cancelled() => return Err(Error::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    async fn remove_temp(&self) {
        let temp = self.temp_path();
        match fs::remove_file(&temp).await {
            Ok(()) => debug!("Removed {}", temp.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => debug!("Cannot remove {}: {}", temp.display(), e),
        }
    }
}
