//! Spinner feedback while probes are in flight.

use super::render;
use indicatif::{ProgressBar, ProgressStyle};
use modelprobe_core::{BatchObserver, LlmProvider, ProbeOutcome};
use std::time::Duration;

/// Prints each outcome to stdout above a stderr spinner naming the model being probed.
pub struct SpinnerObserver {
    pb: ProgressBar,
}

impl SpinnerObserver {
    pub fn new(total: u64) -> Self {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        Self { pb }
    }

    pub fn finish(self) {
        self.pb.finish_and_clear();
    }
}

impl BatchObserver for SpinnerObserver {
    fn on_start(&mut self, provider: &dyn LlmProvider) {
        self.pb
            .set_message(format!("probing {}/{}...", provider.name(), provider.model()));
    }

    fn on_retry(&mut self, outcome: &ProbeOutcome, attempt: u32, wait: Duration) {
        self.pb.set_message(format!(
            "{} returned {}, retry {attempt} in {:.1}s",
            outcome.display_name(),
            outcome.status,
            wait.as_secs_f64()
        ));
    }

    fn on_outcome(&mut self, outcome: &ProbeOutcome) {
        let block = render::status_block(outcome);
        self.pb.suspend(|| println!("{block}"));
        self.pb.inc(1);
    }
}
