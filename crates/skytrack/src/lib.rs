//! ROI-gated detect-or-predict tracking of a single small target through an
//! image sequence.
//!
//! This crate provides:
//! - [`Tracker`], the per-frame loop: windowed detection around the last
//!   known center, constant-velocity Kalman correction on success and
//!   prediction on failure,
//! - re-exports of the detector strategies (`skytrack::detect`) and motion
//!   model (`skytrack::kalman`),
//! - the frame source, annotated-output sinks, JSON configuration and run
//!   report used by the `skytrack` binary (feature `cli`).
//!
//! ## Quickstart
//!
//! ```no_run
//! use skytrack::{frames, run_sequence, RecordCollector, TrackerConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = TrackerConfig::load_json("skytrack.json")?;
//! let mut tracker = cfg.build_tracker()?;
//! let paths = frames::list_frames(cfg.frames_dir())?;
//! let mut records = RecordCollector::default();
//! let summary = run_sequence(&mut tracker, frames::read_frames(paths), &mut records);
//! println!("{summary}");
//! # Ok(())
//! # }
//! ```

pub use skytrack_core as core;
pub use skytrack_detect as detect;
pub use skytrack_kalman as kalman;

pub use skytrack_detect::{Candidate, Detector};
pub use skytrack_kalman::{ConstantVelocityKalman, KalmanParams, MotionModel};

mod annotate;
pub mod frames;
mod io;
mod run;
mod sink;
mod summary;
mod tracker;

pub use annotate::{annotate, COMPANION_COLOR, DETECTION_COLOR, PREDICTION_COLOR};
pub use frames::FrameError;
pub use io::{ConfigError, ConfigIoError, DetectorConfig, RunReport, TrackerConfig};
pub use run::run_sequence;
pub use sink::{DirectorySink, FrameEntry, FrameSink, RecordCollector, SinkError, TimeLog};
pub use summary::RunSummary;
pub use tracker::{
    search_window, CompanionParams, FrameRecord, Outcome, TrackPhase, Tracker, TrackerParams,
};
