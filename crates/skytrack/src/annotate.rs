//! Overlay drawing for annotated output frames.

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_cross_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use skytrack_core::{GrayImage, PixelRect};

use crate::{FrameRecord, Outcome};

pub const DETECTION_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const PREDICTION_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
pub const COMPANION_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

/// Grayscale frame as RGB with the step's outcome drawn on top: the
/// detection box in green, or a `2 * radius` box around the predicted
/// center in yellow; the companion box (if any) in blue. Lines are 2 px.
pub fn annotate(frame: &GrayImage, record: &FrameRecord, radius: u32) -> RgbImage {
    let mut canvas = DynamicImage::ImageLuma8(frame.view().to_luma()).to_rgb8();
    let bounds = PixelRect::full(frame.width, frame.height);

    match &record.outcome {
        Outcome::Detected { bbox, .. } => draw_box(&mut canvas, bbox, DETECTION_COLOR),
        Outcome::Predicted { center } => {
            let r = radius as i64;
            let cx = (center.x.trunc() as i64).clamp(i32::MIN as i64 / 2, i32::MAX as i64 / 2);
            let cy = (center.y.trunc() as i64).clamp(i32::MIN as i64 / 2, i32::MAX as i64 / 2);
            let side = (2 * r).min(i32::MAX as i64) as i32;
            let rect = PixelRect::new((cx - r) as i32, (cy - r) as i32, side, side);
            if rect.intersect(&bounds).is_some() {
                draw_box(&mut canvas, &rect, PREDICTION_COLOR);
            }
            if bounds.contains_rect(&PixelRect::new(cx as i32, cy as i32, 1, 1)) {
                draw_cross_mut(&mut canvas, PREDICTION_COLOR, cx as i32, cy as i32);
            }
        }
    }
    if let Some(companion) = &record.companion {
        draw_box(&mut canvas, companion, COMPANION_COLOR);
    }
    canvas
}

fn draw_box(canvas: &mut RgbImage, rect: &PixelRect, color: Rgb<u8>) {
    for inset in 0..2 {
        let w = rect.width - 2 * inset;
        let h = rect.height - 2 * inset;
        if w <= 0 || h <= 0 {
            break;
        }
        let r = Rect::at(rect.x + inset, rect.y + inset).of_size(w as u32, h as u32);
        draw_hollow_rect_mut(canvas, r, color);
    }
}
