use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use skytrack_core::PixelRect;

/// Result of one tracking step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// The detector produced a candidate; its center corrected the motion
    /// model.
    Detected {
        bbox: PixelRect,
        score: f64,
        /// The windowed search missed and the full-frame retry found it.
        used_full_frame_retry: bool,
    },
    /// No candidate; the motion model's prediction stands in.
    Predicted { center: Point2<f64> },
}

impl Outcome {
    pub fn is_detected(&self) -> bool {
        matches!(self, Outcome::Detected { .. })
    }
}

/// Everything the loop reports about one processed frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub index: usize,
    /// Window the detector searched first.
    pub window: PixelRect,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub companion: Option<PixelRect>,
    pub elapsed_ms: f64,
}

impl FrameRecord {
    /// One-line status used by the run driver.
    pub fn status_line(&self) -> String {
        match &self.outcome {
            Outcome::Detected {
                bbox,
                score,
                used_full_frame_retry,
            } => format!(
                "frame {} | box at ({}, {}) {}x{} score {:.0}{} | {:.2} ms",
                self.index,
                bbox.x,
                bbox.y,
                bbox.width,
                bbox.height,
                score,
                if *used_full_frame_retry {
                    " (full-frame retry)"
                } else {
                    ""
                },
                self.elapsed_ms
            ),
            Outcome::Predicted { center } => format!(
                "frame {} | prediction used at ({:.1}, {:.1}) | {:.2} ms",
                self.index, center.x, center.y, self.elapsed_ms
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_with_kind_tag() {
        let o = Outcome::Predicted {
            center: Point2::new(1.5, -2.0),
        };
        let json = serde_json::to_value(o).unwrap();
        assert_eq!(json["kind"], "predicted");
        assert_eq!(json["center"], serde_json::json!([1.5, -2.0]));
    }

    #[test]
    fn status_line_mentions_outcome() {
        let rec = FrameRecord {
            index: 3,
            window: PixelRect::new(0, 0, 10, 10),
            outcome: Outcome::Detected {
                bbox: PixelRect::new(1, 2, 3, 4),
                score: 12.0,
                used_full_frame_retry: false,
            },
            companion: None,
            elapsed_ms: 1.234,
        };
        assert_eq!(
            rec.status_line(),
            "frame 3 | box at (1, 2) 3x4 score 12 | 1.23 ms"
        );
    }
}
