//! Spinner shown while dependencies are fetched

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress display for dependency fetches
pub struct ProgressDisplay {
    bar: ProgressBar,
}

impl Default for ProgressDisplay {
    fn default() -> Self {
        Self::hidden()
    }
}

impl ProgressDisplay {
    /// Spinner on stderr, or nothing when stderr is not a terminal
    pub fn new() -> Self {
        if !console::Term::stderr().is_term() {
            return Self::hidden();
        }

        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let bar = ProgressBar::new_spinner();
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Show which dependency is being fetched
    pub fn fetching(&self, name: &str, version: &str) {
        self.bar.set_message(format!("Fetching {name} ({version})"));
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for ProgressDisplay {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
