//! Console progress bars for frame-by-frame work

use indicatif::{ProgressBar, ProgressStyle};
use log::warn;

pub struct ProgressTracker {
    bar: ProgressBar,
}

impl ProgressTracker {
    pub fn new(total: u64, description: &str) -> Self {
        let bar = ProgressBar::new(total);
        match ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames {msg}")
        {
            Ok(style) => bar.set_style(style.progress_chars("#>-")),
            Err(e) => warn!("Invalid progress template: {}", e),
        }
        bar.set_message(description.to_string());

        ProgressTracker {
            bar,
        }
    }

    /// A tracker that draws nothing
    pub fn hidden() -> Self {
        ProgressTracker {
            bar: ProgressBar::hidden(),
        }
    }

    /// Sets the number of frames the bar counts up to
    pub fn set_total(&self, total: u64) {
        self.bar.set_length(total);
    }

    pub fn increment(&self, amount: u64) {
        self.bar.inc(amount);
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("Completed");
    }

    /// Removes the bar from the terminal, leaving the last position drawn
    pub fn abandon(&self) {
        self.bar.abandon();
    }

    pub fn set_message(&self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}
