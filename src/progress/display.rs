//! Terminal rendering of a task's progress.
//!
//! The task bar is driven by a background poller reading the shared
//! [`Progress`] counter at a fixed interval, so workers never touch it. The
//! poller is stopped by [`ProgressDisplay::finish`] once every worker has
//! terminated. Partition bars, when enabled, are advanced by their worker.

use super::{Progress, StyleOptions};

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Progress display of one download task.
pub struct ProgressDisplay {
    multi: MultiProgress,
    task: ProgressBar,
    style_options: StyleOptions,
    poller: Option<JoinHandle<()>>,
}

impl ProgressDisplay {
    /// Create the display. Nothing is drawn until [`ProgressDisplay::start`].
    pub fn new(style_options: StyleOptions) -> Self {
        let multi = match style_options.is_enabled() {
            true => MultiProgress::new(),
            false => MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
        };
        let task = multi.add(style_options.task().clone().to_progress_bar(0));

        Self {
            multi,
            task,
            style_options,
            poller: None,
        }
    }

    /// Start polling `progress` every `interval`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, progress: Progress, label: &str, interval: Duration) {
        self.task.set_length(progress.total());
        self.task.set_message(label.to_string());

        let bar = self.task.clone();
        self.poller = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                bar.set_position(progress.downloaded());
            }
        }));
    }

    /// Create the bar of one partition.
    pub fn create_partition_progress(&self, size: u64) -> ProgressBar {
        self.multi
            .add(self.style_options.partition().clone().to_progress_bar(size))
    }

    /// Finish a partition bar based on configuration.
    pub fn finish_partition(&self, pb: &ProgressBar) {
        if self.style_options.partition().clear {
            pb.finish_and_clear();
        } else {
            pb.finish();
        }
    }

    /// Stop the poller and render the final position.
    pub fn finish(mut self, progress: &Progress) {
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
        self.task.set_position(progress.downloaded());
        if self.style_options.task().clear {
            self.task.finish_and_clear();
        } else {
            self.task.finish();
        }
    }

    /// Whether the poller is currently running.
    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|p| !p.is_finished())
    }
}

impl Drop for ProgressDisplay {
    fn drop(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ProgressBarOpts;

    fn hidden() -> StyleOptions {
        StyleOptions::new(ProgressBarOpts::hidden(), ProgressBarOpts::hidden())
    }

    #[tokio::test]
    async fn test_poller_starts_and_stops() {
        let progress = Progress::new();
        progress.set_total(10);

        let mut display = ProgressDisplay::new(hidden());
        assert!(!display.is_polling());
        display.start(progress.clone(), "file.bin", Duration::from_millis(5));
        assert!(display.is_polling());

        progress.add(10);
        display.finish(&progress);
    }

    #[test]
    fn test_partition_bar_hidden_by_default() {
        let display = ProgressDisplay::new(StyleOptions::default());
        let pb = display.create_partition_progress(100);
        assert!(pb.is_hidden());
        display.finish_partition(&pb);
    }
}
