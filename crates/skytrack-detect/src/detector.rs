use serde::{Deserialize, Serialize};
use skytrack_core::{GrayImageView, PixelPoint, PixelRect};

/// Best detection of a frame, in frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub bbox: PixelRect,
    /// Strategy-specific confidence; always positive for a returned candidate.
    pub score: f64,
}

impl Candidate {
    /// Measurement fed to the motion model: `(x + w / 2, y + h / 2)`.
    #[inline]
    pub fn center(&self) -> PixelPoint {
        self.bbox.center()
    }
}

/// A strategy that finds at most one target inside a search window.
pub trait Detector {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &str;

    /// Search `window` (a sub-rectangle of `frame`) and return the best
    /// candidate, or `None` when nothing passes the strategy's filter.
    fn detect(&self, frame: &GrayImageView<'_>, window: PixelRect) -> Option<Candidate>;

    /// Extra width/height a windowed search needs on top of the tracking
    /// radius (e.g. the template size for a sliding-window matcher).
    fn window_extent(&self) -> (u32, u32) {
        (0, 0)
    }
}

impl<D: Detector + ?Sized> Detector for Box<D> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn detect(&self, frame: &GrayImageView<'_>, window: PixelRect) -> Option<Candidate> {
        (**self).detect(frame, window)
    }

    fn window_extent(&self) -> (u32, u32) {
        (**self).window_extent()
    }
}

impl<D: Detector + ?Sized> Detector for &D {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn detect(&self, frame: &GrayImageView<'_>, window: PixelRect) -> Option<Candidate> {
        (**self).detect(frame, window)
    }

    fn window_extent(&self) -> (u32, u32) {
        (**self).window_extent()
    }
}

/// Clamp `window` to the frame, `None` when nothing is left to search.
pub(crate) fn clamp_window(frame: &GrayImageView<'_>, window: PixelRect) -> Option<PixelRect> {
    window.intersect(&frame.bounds())
}

/// Keep the largest box (first on ties).
pub(crate) fn largest_box<I>(boxes: I) -> Option<PixelRect>
where
    I: IntoIterator<Item = PixelRect>,
{
    let mut best: Option<PixelRect> = None;
    for r in boxes {
        if r.area() > best.map_or(0, |b| b.area()) {
            best = Some(r);
        }
    }
    best
}
