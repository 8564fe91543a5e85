//! Windowed single-target detectors.
//!
//! Every strategy implements [`Detector`]: given a frame and a search window
//! (already clamped to the frame) it returns the best [`Candidate`] in frame
//! coordinates, or `None`. The tracking loop in the `skytrack` crate is
//! written against the trait only, so strategies are interchangeable:
//!
//! - [`ContourDetector`]: blur, Canny, external contours, then a
//!   quadrilateral shape filter scored by bounding-box area.
//! - [`TemplateDetector`]: zero-mean normalized cross-correlation against a
//!   reference patch.
//! - [`BlobGate`]: narrows the window to the largest bright blob before
//!   delegating to an inner detector.
//! - [`BoxListDetector`]: adapts any external box producer (for example a
//!   cascade classifier) to the trait.

mod contour;
mod detector;
mod error;
mod external;
mod gate;
mod template;

pub use contour::{ContourDetector, ContourParams};
pub use detector::{Candidate, Detector};
pub use error::DetectError;
pub use external::BoxListDetector;
pub use gate::{BlobGate, BlobGateParams};
pub use template::{TemplateDetector, TemplateParams};
