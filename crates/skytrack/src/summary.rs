use std::fmt;

use serde::{Deserialize, Serialize};

use crate::FrameRecord;

/// Per-run counters. Skipped (unreadable) frames are not part of `total`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub detected: usize,
    pub predicted: usize,
    pub skipped: usize,
}

impl RunSummary {
    pub fn record(&mut self, record: &FrameRecord) {
        self.total += 1;
        if record.outcome.is_detected() {
            self.detected += 1;
        } else {
            self.predicted += 1;
        }
    }

    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    /// Fraction of processed frames with a detection, 0 for an empty run.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.detected as f64 / self.total as f64
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frames: {}, detected: {}, predicted: {}, skipped: {}, success rate: {:.2}%",
            self.total,
            self.detected,
            self.predicted,
            self.skipped,
            100.0 * self.success_rate()
        )
    }
}
