use serde::{Deserialize, Serialize};
use skytrack_core::{close_rect, find_external_contours, threshold_binary, GrayImageView, PixelRect};

use crate::detector::{clamp_window, largest_box};
use crate::{Candidate, Detector};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobGateParams {
    /// Pixels strictly brighter than this are foreground.
    pub threshold: u8,
    /// Side of the square closing element.
    pub close_kernel: usize,
    /// Padding added around the blob box before delegating, clipped to the
    /// window. Edge-based inner detectors need a few background pixels
    /// around the target.
    pub margin: u32,
}

impl Default for BlobGateParams {
    fn default() -> Self {
        Self {
            threshold: 80,
            close_kernel: 5,
            margin: 4,
        }
    }
}

/// Narrows the search to the largest bright blob, then runs `inner` there.
///
/// When the window holds no blob the inner detector sees the whole window.
#[derive(Clone, Debug)]
pub struct BlobGate<D> {
    inner: D,
    params: BlobGateParams,
}

impl<D: Detector> BlobGate<D> {
    pub fn new(inner: D, params: BlobGateParams) -> Self {
        Self { inner, params }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    /// Sub-window the inner detector will search, in frame coordinates.
    pub fn gate_window(&self, frame: &GrayImageView<'_>, window: PixelRect) -> Option<PixelRect> {
        let window = clamp_window(frame, window)?;
        let roi = frame.sub_image(window);
        let binary = close_rect(
            &threshold_binary(&roi.view(), self.params.threshold),
            self.params.close_kernel,
        );
        let blobs = find_external_contours(&binary);
        let Some(blob) = largest_box(blobs.iter().filter_map(|c| c.bounding_rect())) else {
            return Some(window);
        };
        let m = self.params.margin as i32;
        let padded = PixelRect::new(
            blob.x - m,
            blob.y - m,
            blob.width + 2 * m,
            blob.height + 2 * m,
        )
        .translate(window.x, window.y);
        Some(padded.intersect(&window).unwrap_or(window))
    }
}

impl<D: Detector> Detector for BlobGate<D> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn detect(&self, frame: &GrayImageView<'_>, window: PixelRect) -> Option<Candidate> {
        let gated = self.gate_window(frame, window)?;
        log::debug!("blob gate: {window:?} -> {gated:?}");
        self.inner.detect(frame, gated)
    }

    fn window_extent(&self) -> (u32, u32) {
        self.inner.window_extent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ContourDetector;
    use skytrack_core::GrayImage;
    use std::cell::Cell;

    /// Records the window it was asked to search.
    #[derive(Default)]
    struct Probe {
        seen: Cell<Option<PixelRect>>,
    }

    impl Detector for Probe {
        fn name(&self) -> &str {
            "probe"
        }

        fn detect(&self, _frame: &GrayImageView<'_>, window: PixelRect) -> Option<Candidate> {
            self.seen.set(Some(window));
            None
        }
    }

    #[test]
    fn inner_detector_sees_padded_blob_box() {
        let mut img = GrayImage::new(120, 100);
        img.fill_rect(PixelRect::new(30, 20, 40, 30), 200);
        img.fill_rect(PixelRect::new(100, 80, 5, 5), 200);
        let view = img.view();

        let gate = BlobGate::new(
            Probe::default(),
            BlobGateParams {
                margin: 0,
                ..BlobGateParams::default()
            },
        );
        gate.detect(&view, view.bounds());
        assert_eq!(gate.inner().seen.get(), Some(PixelRect::new(30, 20, 40, 30)));

        let gate = BlobGate::new(Probe::default(), BlobGateParams::default());
        gate.detect(&view, view.bounds());
        assert_eq!(gate.inner().seen.get(), Some(PixelRect::new(26, 16, 48, 38)));
    }

    #[test]
    fn dim_frame_passes_whole_window() {
        let img = GrayImage::filled(60, 40, 80);
        let view = img.view();
        let gate = BlobGate::new(Probe::default(), BlobGateParams::default());
        let window = PixelRect::new(10, 5, 30, 20);
        gate.detect(&view, window);
        assert_eq!(gate.inner().seen.get(), Some(window));
    }

    #[test]
    fn gated_contour_detector_finds_square() {
        let mut img = GrayImage::new(320, 240);
        img.fill_rect(PixelRect::new(40, 80, 80, 80), 255);
        let view = img.view();
        let gate = BlobGate::new(ContourDetector::default(), BlobGateParams::default());
        assert_eq!(
            gate.gate_window(&view, view.bounds()),
            Some(PixelRect::new(36, 76, 88, 88))
        );
        let c = gate.detect(&view, view.bounds()).expect("square");
        assert_eq!(c.bbox, PixelRect::new(40, 80, 80, 80));
        assert_eq!(gate.name(), "contour");
    }
}
