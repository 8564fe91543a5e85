//! Detect-or-predict tracking loop.
//!
//! One call to [`Tracker::process`] per frame, in frame order. Each step
//! searches a window derived from the last known center, then either
//! corrects the motion model with the detection center or falls back to its
//! prediction. Exactly one of `correct`/`predict` runs per step.

mod params;
mod record;
mod window;

pub use params::{CompanionParams, TrackerParams};
pub use record::{FrameRecord, Outcome};
pub use window::search_window;

use std::time::Instant;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use skytrack_core::GrayImageView;
use skytrack_detect::Detector;
use skytrack_kalman::{ConstantVelocityKalman, MotionModel};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Whether the tracker has any center to search around.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackPhase {
    /// Nothing seen or predicted yet: full-frame search.
    Initial,
    /// A center (detected or predicted) drives a windowed search.
    Tracking,
}

/// Single-target tracker over a detector strategy and a motion model.
#[derive(Debug)]
pub struct Tracker<D, M = ConstantVelocityKalman> {
    detector: D,
    motion: M,
    params: TrackerParams,
    last_center: Option<Point2<f64>>,
    coasting: usize,
}

impl<D: Detector, M: MotionModel> Tracker<D, M> {
    pub fn new(detector: D, motion: M, params: TrackerParams) -> Self {
        Self {
            detector,
            motion,
            params,
            last_center: None,
            coasting: 0,
        }
    }

    pub fn state(&self) -> TrackPhase {
        if self.last_center.is_some() {
            TrackPhase::Tracking
        } else {
            TrackPhase::Initial
        }
    }

    /// Last detected center, or the raw prediction after a miss. Never
    /// clamped to the frame.
    pub fn last_center(&self) -> Option<Point2<f64>> {
        self.last_center
    }

    /// Consecutive frames handled by prediction alone.
    pub fn coasting_frames(&self) -> usize {
        self.coasting
    }

    pub fn params(&self) -> &TrackerParams {
        &self.params
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn motion(&self) -> &M {
        &self.motion
    }

    /// Window the next call to [`Tracker::process`] will search on a
    /// `width x height` frame. Always a non-empty sub-rectangle of the
    /// frame when the frame itself is non-empty.
    pub fn search_window(&self, width: usize, height: usize) -> skytrack_core::PixelRect {
        let lost = self
            .params
            .max_coasting_frames
            .is_some_and(|limit| self.coasting > limit);
        let center = if lost { None } else { self.last_center };
        search_window(
            center,
            self.params.search_radius,
            self.detector.window_extent(),
            width,
            height,
        )
    }

    /// Run one step on `frame` and report what happened.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, frame), fields(width = frame.width, height = frame.height))
    )]
    pub fn process(&mut self, index: usize, frame: &GrayImageView<'_>) -> FrameRecord {
        let start = Instant::now();
        let full = frame.bounds();
        let window = self.search_window(frame.width, frame.height);

        let mut found = self.detector.detect(frame, window);
        let mut retried = false;
        if found.is_none() && self.params.retry_full_frame && window != full {
            found = self.detector.detect(frame, full);
            retried = found.is_some();
        }

        let outcome = match found {
            Some(candidate) => {
                let c = candidate.center();
                let z = Point2::new(c.x as f64, c.y as f64);
                self.motion.correct(z);
                self.last_center = Some(z);
                self.coasting = 0;
                Outcome::Detected {
                    bbox: candidate.bbox,
                    score: candidate.score,
                    used_full_frame_retry: retried,
                }
            }
            None => {
                let p = self.motion.predict();
                self.last_center = Some(p);
                self.coasting += 1;
                if self
                    .params
                    .max_coasting_frames
                    .is_some_and(|limit| self.coasting == limit + 1)
                {
                    log::warn!(
                        "{} frames without detection, widening search to the full frame",
                        self.coasting
                    );
                }
                Outcome::Predicted { center: p }
            }
        };

        let companion = match (&outcome, &self.params.companion) {
            (Outcome::Detected { bbox, .. }, Some(cp)) => {
                cp.estimate(bbox, frame.width, frame.height)
            }
            _ => None,
        };

        FrameRecord {
            index,
            window,
            outcome,
            companion,
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        }
    }
}
