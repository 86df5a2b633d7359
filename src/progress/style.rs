//! Progress rendering styles.
//!
//! The default [`RenderStyle::Line`] prints the classic single-line report
//! (`\r42%[====>   ]  1.23 MB/2.93 MB  512 KB/s    in 2.4s`). An indicatif bar
//! can be used instead, or nothing at all.
//!
//! # Examples
//!
//! ```rust
//! use parfetch::progress::{ProgressBarOpts, RenderStyle};
//!
//! let pip = RenderStyle::Bar(ProgressBarOpts::with_pip_style());
//! assert!(pip.is_enabled());
//! assert!(!RenderStyle::Hidden.is_enabled());
//! ```

use indicatif::{ProgressBar, ProgressStyle};

/// How the renderer reports progress.
#[derive(Debug, Clone, Default)]
pub enum RenderStyle {
    /// Carriage-return refreshed text line on stdout.
    #[default]
    Line,
    /// An indicatif progress bar.
    Bar(ProgressBarOpts),
    /// No output.
    Hidden,
}

impl RenderStyle {
    /// Return `false` if nothing will be drawn.
    pub fn is_enabled(&self) -> bool {
        match self {
            RenderStyle::Line => true,
            RenderStyle::Bar(opts) => opts.enabled,
            RenderStyle::Hidden => false,
        }
    }
}

/// Define the options for a progress bar.
#[derive(Debug, Clone)]
pub struct ProgressBarOpts {
    /// Progress bar template string.
    template: Option<String>,
    /// Progression characters set.
    ///
    /// There must be at least 3 characters for the following states:
    /// "filled", "current", and "to do".
    progress_chars: Option<String>,
    /// Enable or disable the progress bar.
    pub(crate) enabled: bool,
    /// Clear the progress bar once completed.
    pub(crate) clear: bool,
}

impl Default for ProgressBarOpts {
    fn default() -> Self {
        Self {
            template: Some(ProgressBarOpts::TEMPLATE_BYTES.into()),
            progress_chars: Some(ProgressBarOpts::CHARS_FINE.into()),
            enabled: true,
            clear: false,
        }
    }
}

impl ProgressBarOpts {
    /// Template showing transferred bytes, speed and elapsed time.
    ///
    /// `████████████▍            12.00 MiB/30.00 MiB (40%) 4.10 MiB/s in 00:00:03`
    pub const TEMPLATE_BYTES: &'static str =
        "{bar:40.blue} {bytes}/{total_bytes} ({percent}%) {bytes_per_sec} in {elapsed_precise}";
    /// Template which looks like the Python package installer pip.
    ///
    /// `━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━ 211.23 KiB/211.23 KiB 1008.31 KiB/s eta 0s`
    pub const TEMPLATE_PIP: &'static str =
        "{bar:40.green/black} {bytes:>11.green}/{total_bytes:<11.green} {bytes_per_sec:>13.red} eta {eta:.blue}";
    /// Use fine blocks as progress characters: `"█▉▊▋▌▍▎▏  "`.
    pub const CHARS_FINE: &'static str = "█▉▊▋▌▍▎▏  ";
    /// Use a line as progress characters: `"━╾─"`.
    pub const CHARS_LINE: &'static str = "━╾╴─";

    /// Create a new [`ProgressBarOpts`].
    pub fn new(
        template: Option<String>,
        progress_chars: Option<String>,
        enabled: bool,
        clear: bool,
    ) -> Self {
        Self {
            template,
            progress_chars,
            enabled,
            clear,
        }
    }

    /// Create a [`ProgressStyle`] based on the provided options.
    ///
    /// An invalid template falls back to indicatif's default bar.
    pub fn to_progress_style(&self) -> ProgressStyle {
        let mut style = ProgressStyle::default_bar();
        if let Some(template) = &self.template {
            match ProgressStyle::default_bar().template(template) {
                Ok(templated) => style = templated,
                Err(e) => tracing::warn!("ignoring invalid progress template: {}", e),
            }
        }
        if let Some(progress_chars) = &self.progress_chars {
            style = style.progress_chars(progress_chars);
        }
        style
    }

    /// Create a [`ProgressBar`] based on the provided options.
    pub fn to_progress_bar(&self, len: u64) -> ProgressBar {
        // Return a hidden Progress bar if we disabled it.
        if !self.enabled {
            return ProgressBar::hidden();
        }

        ProgressBar::new(len).with_style(self.to_progress_style())
    }

    /// Create a new [`ProgressBarOpts`] which looks like Python pip.
    pub fn with_pip_style() -> Self {
        Self {
            template: Some(ProgressBarOpts::TEMPLATE_PIP.into()),
            progress_chars: Some(ProgressBarOpts::CHARS_LINE.into()),
            enabled: true,
            clear: true,
        }
    }

    /// Create a new [`ProgressBarOpts`] which hides the progress bar.
    pub fn hidden() -> Self {
        Self {
            enabled: false,
            ..ProgressBarOpts::default()
        }
    }
}
