// Batch metrics
//
// Tallies job outcomes over one run for the closing summary.

use crate::services::muxing::{JobOutcome, SkipReason};
use std::time::{Duration, Instant};

/// Per-run counters.
#[derive(Debug, Clone)]
pub struct BatchMetrics {
    /// Files remuxed and renamed successfully
    pub muxed: usize,

    /// Files whose names did not parse
    pub skipped_unrecognized: usize,

    /// Files with no sidecars to add
    pub skipped_no_sidecars: usize,

    /// Files where mkvmerge or file handling failed
    pub failed: usize,

    /// Warnings reported by mkvmerge across all successful files
    pub warnings: usize,

    start_time: Instant,
}

impl BatchMetrics {
    pub fn new() -> Self {
        Self {
            muxed: 0,
            skipped_unrecognized: 0,
            skipped_no_sidecars: 0,
            failed: 0,
            warnings: 0,
            start_time: Instant::now(),
        }
    }

    pub fn record(&mut self, outcome: &JobOutcome) {
        match outcome {
            JobOutcome::Muxed(muxed) => {
                self.muxed += 1;
                self.warnings += muxed.warnings.len();
            }
            JobOutcome::Skipped(SkipReason::UnrecognizedName) => self.skipped_unrecognized += 1,
            JobOutcome::Skipped(SkipReason::NoSidecars) => self.skipped_no_sidecars += 1,
            JobOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped_unrecognized + self.skipped_no_sidecars
    }

    pub fn total(&self) -> usize {
        self.muxed + self.skipped() + self.failed
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// One-line summary, e.g. `3 muxed, 1 skipped, 0 failed (2 warnings)`.
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} muxed, {} skipped, {} failed",
            self.muxed,
            self.skipped(),
            self.failed
        );
        if self.warnings > 0 {
            summary.push_str(&format!(" ({} warnings)", self.warnings));
        }
        summary
    }

    pub fn log_summary(&self) {
        tracing::info!(
            "Batch finished in {:.2}s: {} of {} files muxed, {} unrecognized, {} without sidecars, {} failed, {} warnings",
            self.elapsed().as_secs_f32(),
            self.muxed,
            self.total(),
            self.skipped_unrecognized,
            self.skipped_no_sidecars,
            self.failed,
            self.warnings
        );
    }
}

impl Default for BatchMetrics {
    fn default() -> Self {
        Self::new()
    }
}
