use serde::{Deserialize, Serialize};
use skytrack_core::{
    approx_closed, canny, find_external_contours, gaussian_blur, is_convex, GrayImageView,
    PixelRect,
};

use crate::detector::clamp_window;
use crate::{Candidate, Detector};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Edge/contour pipeline settings and the quadrilateral shape prior.
///
/// The size and aspect bounds describe the expected apparent size of the
/// target at the camera's working distance; they are strict (open) bounds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourParams {
    /// Gaussian kernel side (odd).
    pub blur_kernel: usize,
    pub blur_sigma: f32,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Douglas-Peucker tolerance as a fraction of the contour perimeter.
    pub approx_epsilon_frac: f64,
    pub min_aspect: f64,
    pub max_aspect: f64,
    pub min_area: f64,
    pub max_area: f64,
}

impl Default for ContourParams {
    fn default() -> Self {
        Self {
            blur_kernel: 5,
            blur_sigma: 1.5,
            canny_low: 50.0,
            canny_high: 150.0,
            approx_epsilon_frac: 0.02,
            min_aspect: 0.8,
            max_aspect: 1.2,
            min_area: 3000.0,
            max_area: 10000.0,
        }
    }
}

impl ContourParams {
    /// Strict aspect/area gate applied to a candidate bounding box.
    pub fn accepts(&self, bbox: &PixelRect) -> bool {
        let aspect = bbox.aspect_ratio();
        let area = bbox.area() as f64;
        aspect > self.min_aspect
            && aspect < self.max_aspect
            && area > self.min_area
            && area < self.max_area
    }
}

/// Detector that looks for a bright/dark convex quadrilateral.
#[derive(Clone, Debug, Default)]
pub struct ContourDetector {
    params: ContourParams,
}

impl ContourDetector {
    pub fn new(params: ContourParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ContourParams {
        &self.params
    }

    /// Every box in `window` that passes the shape filter, in frame
    /// coordinates and contour order.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, frame))
    )]
    pub fn candidates(&self, frame: &GrayImageView<'_>, window: PixelRect) -> Vec<Candidate> {
        let Some(window) = clamp_window(frame, window) else {
            return Vec::new();
        };
        let p = &self.params;
        let roi = frame.sub_image(window);
        let blurred = gaussian_blur(&roi.view(), p.blur_kernel, p.blur_sigma);
        let edges = canny(&blurred, p.canny_low, p.canny_high);
        let contours = find_external_contours(&edges);

        let mut out = Vec::new();
        for contour in &contours {
            let poly = approx_closed(&contour.points, p.approx_epsilon_frac);
            if poly.len() != 4 || !is_convex(&poly) {
                continue;
            }
            let Some(local) = PixelRect::bounding(poly.as_slice()) else {
                continue;
            };
            let bbox = local.translate(window.x, window.y);
            if p.accepts(&bbox) {
                out.push(Candidate {
                    bbox,
                    score: bbox.area() as f64,
                });
            }
        }
        log::debug!(
            "contour detector: {} contours, {} accepted in {:?}",
            contours.len(),
            out.len(),
            window
        );
        out
    }
}

impl Detector for ContourDetector {
    fn name(&self) -> &str {
        "contour"
    }

    fn detect(&self, frame: &GrayImageView<'_>, window: PixelRect) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;
        for c in self.candidates(frame, window) {
            if c.score > best.map_or(0.0, |b| b.score) {
                best = Some(c);
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skytrack_core::GrayImage;

    fn frame_with(width: usize, height: usize, rects: &[PixelRect]) -> GrayImage {
        let mut img = GrayImage::new(width, height);
        for r in rects {
            img.fill_rect(*r, 255);
        }
        img
    }

    #[test]
    fn finds_square_on_full_frame() {
        let img = frame_with(320, 240, &[PixelRect::new(40, 80, 80, 80)]);
        let view = img.view();
        let c = ContourDetector::default()
            .detect(&view, view.bounds())
            .expect("square");
        assert_eq!(c.bbox, PixelRect::new(40, 80, 80, 80));
        assert_eq!(c.score, 6400.0);
        assert_eq!(c.center().x, 80);
    }

    #[test]
    fn windowed_result_is_in_frame_coordinates() {
        let img = frame_with(200, 160, &[PixelRect::new(60, 40, 60, 60)]);
        let view = img.view();
        let c = ContourDetector::default()
            .detect(&view, PixelRect::new(50, 30, 90, 90))
            .expect("square");
        assert_eq!(c.bbox, PixelRect::new(60, 40, 60, 60));
        assert_eq!(c.score, 3600.0);
    }

    #[test]
    fn rejects_small_and_elongated_shapes() {
        let det = ContourDetector::default();
        let small = frame_with(200, 160, &[PixelRect::new(60, 40, 40, 40)]);
        assert!(det.detect(&small.view(), small.view().bounds()).is_none());

        let wide = frame_with(200, 160, &[PixelRect::new(40, 40, 100, 60)]);
        assert!(det.detect(&wide.view(), wide.view().bounds()).is_none());
    }

    #[test]
    fn largest_accepted_box_wins() {
        let img = frame_with(
            200,
            160,
            &[PixelRect::new(10, 10, 60, 60), PixelRect::new(110, 50, 70, 70)],
        );
        let view = img.view();
        let det = ContourDetector::default();
        assert_eq!(det.candidates(&view, view.bounds()).len(), 2);
        let c = det.detect(&view, view.bounds()).expect("two squares");
        assert_eq!(c.bbox, PixelRect::new(110, 50, 70, 70));

        let c = det
            .detect(&view, PixelRect::new(0, 0, 90, 90))
            .expect("left square");
        assert_eq!(c.bbox, PixelRect::new(10, 10, 60, 60));
    }

    #[test]
    fn black_frame_and_empty_window_yield_nothing() {
        let img = GrayImage::new(64, 48);
        let view = img.view();
        let det = ContourDetector::default();
        assert!(det.detect(&view, view.bounds()).is_none());
        assert!(det.detect(&view, PixelRect::new(100, 100, 10, 10)).is_none());
    }

    #[test]
    fn shape_gate_bounds_are_strict() {
        let p = ContourParams {
            min_area: 100.0,
            ..ContourParams::default()
        };
        assert!(!p.accepts(&PixelRect::new(0, 0, 10, 10)));
        assert!(p.accepts(&PixelRect::new(0, 0, 11, 11)));
        assert!(!p.accepts(&PixelRect::new(0, 0, 12, 10)));
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let p: ContourParams = serde_json::from_str(r#"{"canny_low": 20.0}"#).unwrap();
        assert_eq!(p.canny_low, 20.0);
        assert_eq!(p.blur_kernel, 5);
        assert_eq!(p.max_area, 10000.0);
    }
}
