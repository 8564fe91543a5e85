use skytrack_core::{GrayImageView, PixelRect};

use crate::detector::{clamp_window, largest_box};
use crate::{Candidate, Detector};

/// Adapter for opaque box producers such as a cascade classifier.
///
/// `F` receives the frame and the clamped window and returns boxes in
/// window-local coordinates. Boxes are clipped to the window; the largest
/// one wins and is scored by its area.
pub struct BoxListDetector<F> {
    name: String,
    boxes: F,
}

impl<F> BoxListDetector<F>
where
    F: Fn(&GrayImageView<'_>, PixelRect) -> Vec<PixelRect>,
{
    pub fn new(name: impl Into<String>, boxes: F) -> Self {
        Self {
            name: name.into(),
            boxes,
        }
    }
}

impl<F> Detector for BoxListDetector<F>
where
    F: Fn(&GrayImageView<'_>, PixelRect) -> Vec<PixelRect>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&self, frame: &GrayImageView<'_>, window: PixelRect) -> Option<Candidate> {
        let window = clamp_window(frame, window)?;
        let raw = (self.boxes)(frame, window);
        let best = largest_box(
            raw.iter()
                .filter_map(|b| b.translate(window.x, window.y).intersect(&window)),
        )?;
        Some(Candidate {
            bbox: best,
            score: best.area() as f64,
        })
    }
}

impl<F> std::fmt::Debug for BoxListDetector<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxListDetector")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skytrack_core::GrayImage;

    #[test]
    fn boxes_are_translated_clipped_and_ranked() {
        let img = GrayImage::new(100, 80);
        let view = img.view();
        let det = BoxListDetector::new("cascade", |_f: &GrayImageView<'_>, _w: PixelRect| {
            vec![
                PixelRect::new(0, 0, 10, 10),
                PixelRect::new(35, 35, 30, 30),
                PixelRect::new(2, 2, 12, 12),
            ]
        });
        let c = det
            .detect(&view, PixelRect::new(20, 10, 40, 40))
            .expect("box");
        // (35,35,30,30) lands at (55,45) and is clipped to 5x5
        assert_eq!(c.bbox, PixelRect::new(22, 12, 12, 12));
        assert_eq!(c.score, 144.0);
        assert_eq!(det.name(), "cascade");
    }

    #[test]
    fn no_boxes_means_no_candidate() {
        let img = GrayImage::new(10, 10);
        let det = BoxListDetector::new("none", |_f: &GrayImageView<'_>, _w: PixelRect| Vec::new());
        assert!(det.detect(&img.view(), img.view().bounds()).is_none());
    }
}
