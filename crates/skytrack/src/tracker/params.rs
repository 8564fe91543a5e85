use serde::{Deserialize, Serialize};
use skytrack_core::PixelRect;

/// Search-window and fallback policy of the tracking loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerParams {
    /// Half side of the windowed search, in pixels.
    pub search_radius: u32,
    /// Consecutive predictions after which the next search covers the whole
    /// frame again. `None` keeps windowed search forever.
    pub max_coasting_frames: Option<usize>,
    /// Retry a windowed miss on the full frame before predicting.
    pub retry_full_frame: bool,
    /// Secondary rectangle derived from each detection.
    pub companion: Option<CompanionParams>,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            search_radius: 40,
            max_coasting_frames: Some(8),
            retry_full_frame: false,
            companion: None,
        }
    }
}

/// Fixed geometric relation between the target and a second object.
///
/// The companion center is the detection center offset by `(dx, dy)`; its
/// size is the detection size scaled by `(scale_w, scale_h)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionParams {
    pub dx: f64,
    pub dy: f64,
    pub scale_w: f64,
    pub scale_h: f64,
}

impl Default for CompanionParams {
    fn default() -> Self {
        Self {
            dx: 0.86,
            dy: 187.57,
            scale_w: 0.17,
            scale_h: 0.53,
        }
    }
}

impl CompanionParams {
    /// Companion rectangle for `bbox`, or `None` when it is empty or not
    /// fully inside a `width x height` frame.
    pub fn estimate(&self, bbox: &PixelRect, width: usize, height: usize) -> Option<PixelRect> {
        let c = bbox.center();
        let cx = (c.x as f64 + self.dx) as i32;
        let cy = (c.y as f64 + self.dy) as i32;
        let w = (bbox.width as f64 * self.scale_w) as i32;
        let h = (bbox.height as f64 * self.scale_h) as i32;
        let rect = PixelRect::new(cx - w / 2, cy - h / 2, w, h);
        (!rect.is_empty() && PixelRect::full(width, height).contains_rect(&rect)).then_some(rect)
    }
}
