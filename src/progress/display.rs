//! The progress renderer.
//!
//! [`ProgressRenderer::run`] is spawned next to the fetchers and redraws on a
//! fixed interval from the shared [`ProgressState`]. It stops when its token
//! is cancelled (completion, failure or external cancellation), when the
//! transfer reaches 100%, or immediately if the total size is unknown. The
//! pinned 100% line is drawn afterwards by the coordinator through
//! [`ProgressRenderer::finish`].
//!
//! # Examples
//!
//! ```rust
//! use parfetch::progress::render_line;
//! use std::time::Duration;
//!
//! let line = render_line(50, 500, 1000, 250, Duration::from_secs(2));
//! assert!(line.starts_with("\r50%[========================>"));
//! assert!(line.ends_with("]  500 B/1.00 KB  250 B/s    in 2s"));
//! ```

use super::state::ProgressState;
use super::style::RenderStyle;
use crate::utils::format_bytes;

use indicatif::ProgressBar;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Number of cells between the brackets of the text bar.
const BAR_WIDTH: usize = 50;

/// Render one progress line.
///
/// `\r<pct>%[<bar>]  <transferred>/<total>  <speed>/s    in <elapsed>`, where
/// the bar is [`BAR_WIDTH`] cells: `=` proportional to `percent`, a `>`
/// head, then padding.
pub fn render_line(
    percent: u64,
    transferred: u64,
    total: u64,
    speed: u64,
    elapsed: Duration,
) -> String {
    let filled = (percent.min(100) as usize) * (BAR_WIDTH - 1) / 100;
    let bar = format!(
        "{:=<filled$}>{:pad$}",
        "",
        "",
        filled = filled,
        pad = BAR_WIDTH - 1 - filled
    );
    format!(
        "\r{}%[{}]  {}/{}  {}/s    in {:?}",
        percent,
        bar,
        format_bytes(transferred),
        format_bytes(total),
        format_bytes(speed),
        elapsed
    )
}

/// Periodically draws the progress of a download.
pub struct ProgressRenderer {
    state: Arc<ProgressState>,
    style: RenderStyle,
    out: Box<dyn Write + Send>,
    bar: Option<ProgressBar>,
}

impl fmt::Debug for ProgressRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressRenderer")
            .field("state", &self.state)
            .field("style", &self.style)
            .finish()
    }
}

impl ProgressRenderer {
    /// Create a renderer drawing text lines to stdout.
    pub fn new(state: Arc<ProgressState>, style: RenderStyle) -> Self {
        Self::with_writer(state, style, Box::new(io::stdout()))
    }

    /// Create a renderer drawing text lines to `out`.
    pub fn with_writer(
        state: Arc<ProgressState>,
        style: RenderStyle,
        out: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            state,
            style,
            out,
            bar: None,
        }
    }

    /// Redraw every interval until `stop` is cancelled or there is nothing
    /// left to draw, then hand the renderer back for the final line.
    pub async fn run(mut self, stop: CancellationToken) -> Self {
        let interval = self.state.interval();
        debug!("progress renderer started, interval {:?}", interval);

        loop {
            if stop.is_cancelled() {
                break;
            }
            let Some(percent) = self.state.percent() else {
                debug!("total size unknown, nothing to render");
                break;
            };
            if percent >= 100 {
                break;
            }
            self.tick(percent);

            tokio::select! {
                _ = stop.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }

        self
    }

    /// Draw one frame and advance the speed sample.
    fn tick(&mut self, percent: u64) {
        let speed = self.state.sample();
        let transferred = self.state.transferred();
        let total = self.state.total();

        match &self.style {
            RenderStyle::Line => {
                let line = render_line(percent, transferred, total, speed, self.state.elapsed());
                draw(&mut *self.out, &line);
            }
            RenderStyle::Bar(opts) => {
                let bar = self.bar.get_or_insert_with(|| opts.to_progress_bar(total));
                bar.set_length(total);
                bar.set_position(transferred);
            }
            RenderStyle::Hidden => {}
        }
    }

    /// Draw the final line pinned at 100%, with the average speed.
    pub fn finish(&mut self) {
        let transferred = self.state.transferred();
        let total = match self.state.total() {
            0 => transferred,
            total => total,
        };

        match &self.style {
            RenderStyle::Line => {
                let line = render_line(
                    100,
                    transferred,
                    total,
                    self.state.average_speed(),
                    self.state.elapsed(),
                );
                draw(&mut *self.out, &line);
                draw(&mut *self.out, "\n");
            }
            RenderStyle::Bar(opts) => {
                let bar = self.bar.get_or_insert_with(|| opts.to_progress_bar(total));
                bar.set_length(total);
                bar.set_position(transferred);
                if opts.clear {
                    bar.finish_and_clear();
                } else {
                    bar.finish();
                }
            }
            RenderStyle::Hidden => {}
        }
    }

    /// Leave the display as is after a failure.
    pub fn abandon(&mut self) {
        match &self.style {
            RenderStyle::Line => draw(&mut *self.out, "\n"),
            RenderStyle::Bar(_) => {
                if let Some(bar) = self.bar.take() {
                    bar.abandon();
                }
            }
            RenderStyle::Hidden => {}
        }
    }
}

fn draw(out: &mut dyn Write, text: &str) {
    if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
        debug!("failed to draw progress: {}", e);
    }
}
