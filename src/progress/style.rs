//! Progress bar styling.
//!
//! A download shows one bar for the whole task, fed by polling the shared
//! [`Progress`](super::Progress) counter, and optionally one bar per
//! partition.
//!
//! ```rust
//! use pdl::progress::{ProgressBarOpts, StyleOptions};
//!
//! // Show the partition bars as well, cleared once each partition is done.
//! let mut style = StyleOptions::default();
//! style.set_partition(ProgressBarOpts::with_pip_style());
//! assert!(style.is_enabled());
//!
//! let hidden = StyleOptions::new(ProgressBarOpts::hidden(), ProgressBarOpts::hidden());
//! assert!(!hidden.is_enabled());
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

/// Style options of the task bar and the partition bars.
///
/// By default only the task bar is shown and it stays on screen once complete.
#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub(crate) task: ProgressBarOpts,
    pub(crate) partition: ProgressBarOpts,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            task: ProgressBarOpts {
                template: Some(ProgressBarOpts::TEMPLATE_TASK.into()),
                progress_chars: Some(ProgressBarOpts::CHARS_FINE.into()),
                enabled: true,
                clear: false,
            },
            partition: ProgressBarOpts::hidden(),
        }
    }
}

impl StyleOptions {
    /// Create new [`StyleOptions`].
    pub fn new(task: ProgressBarOpts, partition: ProgressBarOpts) -> Self {
        Self { task, partition }
    }

    /// Set the options for the task bar.
    pub fn set_task(&mut self, task: ProgressBarOpts) {
        self.task = task;
    }

    /// Set the options for the partition bars.
    pub fn set_partition(&mut self, partition: ProgressBarOpts) {
        self.partition = partition;
    }

    /// Return `false` if no bar is enabled.
    pub fn is_enabled(&self) -> bool {
        self.task.is_enabled() || self.partition.is_enabled()
    }

    pub fn task(&self) -> &ProgressBarOpts {
        &self.task
    }

    pub fn partition(&self) -> &ProgressBarOpts {
        &self.partition
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
            template: None,
            progress_chars: None,
            enabled: true,
            clear: true,
        }
    }
}

impl ProgressBarOpts {
    /// Bytes, throughput and eta of a whole task, prefixed by the file name.
    ///
    /// `file.iso ███████████▌      1.20 GiB/2.00 GiB 48.10 MiB/s eta 17s`
    pub const TEMPLATE_TASK: &'static str =
        "{msg} {bar:40.blue} {bytes}/{total_bytes} {bytes_per_sec} eta {eta:.blue}";
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
    /// An invalid template falls back to the default bar.
    pub fn to_progress_style(self) -> ProgressStyle {
        let mut style = ProgressStyle::default_bar();
        if let Some(template) = self.template {
            match ProgressStyle::default_bar().template(&template) {
                Ok(s) => style = s,
                Err(e) => warn!("Ignoring invalid progress template: {}", e),
            }
        }
        if let Some(progress_chars) = self.progress_chars {
            style = style.progress_chars(&progress_chars);
        }
        style
    }

    /// Create a [`ProgressBar`] based on the provided options.
    pub fn to_progress_bar(self, len: u64) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }
        let style = self.to_progress_style();
        ProgressBar::new(len).with_style(style)
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

    /// Whether the bar is drawn at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the bar is cleared once completed.
    pub fn is_cleared(&self) -> bool {
        self.clear
    }

    /// Set to `true` to clear the progress bar upon completion.
    pub fn set_clear(&mut self, clear: bool) {
        self.clear = clear;
    }

    /// Create a new [`ProgressBarOpts`] which hides the progress bars.
    pub fn hidden() -> Self {
        Self {
            enabled: false,
            ..ProgressBarOpts::default()
        }
    }
}
