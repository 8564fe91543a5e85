//! Canny edge detection on a pre-smoothed raster.

use crate::{FloatImage, GrayImage};

#[cfg(feature = "tracing")]
use tracing::instrument;

const TAN_22_5: f32 = 0.414_213_57;
const TAN_67_5: f32 = 2.414_213_6;
/// Relative tolerance under which two gradient magnitudes count as equal.
const NMS_TIE_TOLERANCE: f32 = 1e-3;

/// Sobel derivatives and L2 magnitude.
#[derive(Clone, Debug)]
pub struct Gradients {
    pub width: usize,
    pub height: usize,
    pub gx: Vec<f32>,
    pub gy: Vec<f32>,
    pub magnitude: Vec<f32>,
}

/// 3x3 Sobel derivatives with replicated borders.
pub fn sobel_gradients(src: &FloatImage) -> Gradients {
    let (w, h) = (src.width, src.height);
    let mut gx = vec![0f32; w * h];
    let mut gy = vec![0f32; w * h];
    let mut magnitude = vec![0f32; w * h];
    for y in 0..h as i64 {
        for x in 0..w as i64 {
            let p = |dx: i64, dy: i64| src.get_clamped(x + dx, y + dy);
            let sx = (p(1, -1) + 2.0 * p(1, 0) + p(1, 1)) - (p(-1, -1) + 2.0 * p(-1, 0) + p(-1, 1));
            let sy = (p(-1, 1) + 2.0 * p(0, 1) + p(1, 1)) - (p(-1, -1) + 2.0 * p(0, -1) + p(1, -1));
            let i = y as usize * w + x as usize;
            gx[i] = sx;
            gy[i] = sy;
            magnitude[i] = sx.hypot(sy);
        }
    }
    Gradients {
        width: w,
        height: h,
        gx,
        gy,
        magnitude,
    }
}

/// Binary edge map (255 = edge) of an already smoothed raster.
///
/// Non-maximum suppression compares each pixel with its two neighbours along
/// the quantized gradient direction. When the magnitudes tie, the pixel on
/// the brighter side is kept, so the edge of a bright blob lands on the blob
/// itself. Pixels on the outer one-pixel frame are never edges.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(src), fields(width = src.width, height = src.height))
)]
pub fn canny(src: &FloatImage, low: f32, high: f32) -> GrayImage {
    let (w, h) = (src.width, src.height);
    let mut edges = GrayImage::new(w, h);
    if w < 3 || h < 3 {
        return edges;
    }
    let g = sobel_gradients(src);
    let suppressed = non_maximum_suppression(&g, low);
    hysteresis(&suppressed, &mut edges, low, high);
    edges
}

fn non_maximum_suppression(g: &Gradients, low: f32) -> Vec<f32> {
    let (w, h) = (g.width, g.height);
    let mut out = vec![0f32; w * h];
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let i = y * w + x;
            let m = g.magnitude[i];
            if m < low || m <= 0.0 {
                continue;
            }
            let (ax, ay) = (g.gx[i].abs(), g.gy[i].abs());
            let sx: isize = if g.gx[i] >= 0.0 { 1 } else { -1 };
            let sy: isize = if g.gy[i] >= 0.0 { 1 } else { -1 };
            let (dx, dy) = if ay <= ax * TAN_22_5 {
                (sx, 0)
            } else if ay >= ax * TAN_67_5 {
                (0, sy)
            } else {
                (sx, sy)
            };
            // `ahead` points towards increasing intensity.
            let ahead = g.magnitude[(y as isize + dy) as usize * w + (x as isize + dx) as usize];
            let behind = g.magnitude[(y as isize - dy) as usize * w + (x as isize - dx) as usize];
            let tol = NMS_TIE_TOLERANCE * m;
            if m > ahead + tol && m + tol >= behind {
                out[i] = m;
            }
        }
    }
    out
}

fn hysteresis(suppressed: &[f32], edges: &mut GrayImage, low: f32, high: f32) {
    let (w, h) = (edges.width, edges.height);
    let weak = |v: f32| v > 0.0 && v >= low;
    let mut stack = Vec::new();
    for start in 0..w * h {
        if suppressed[start] < high || suppressed[start] <= 0.0 || edges.data[start] != 0 {
            continue;
        }
        edges.data[start] = 255;
        stack.push(start);
        while let Some(i) = stack.pop() {
            let (x, y) = ((i % w) as isize, (i / w) as isize);
            for dy in -1..=1isize {
                for dx in -1..=1isize {
                    let (xx, yy) = (x + dx, y + dy);
                    if xx < 0 || yy < 0 || xx >= w as isize || yy >= h as isize {
                        continue;
                    }
                    let k = yy as usize * w + xx as usize;
                    if edges.data[k] == 0 && weak(suppressed[k]) {
                        edges.data[k] = 255;
                        stack.push(k);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{gaussian_blur, GrayImage, PixelRect};

    fn bright_square(w: usize, h: usize, rect: PixelRect) -> GrayImage {
        let mut img = GrayImage::new(w, h);
        img.fill_rect(rect, 255);
        img
    }

    #[test]
    fn flat_image_has_no_edges() {
        let img = GrayImage::filled(20, 20, 77);
        let blurred = gaussian_blur(&img.view(), 5, 1.5);
        let edges = canny(&blurred, 50.0, 150.0);
        assert!(edges.data.iter().all(|&v| v == 0));
    }

    #[test]
    fn bright_square_edges_sit_on_square_border() {
        let img = bright_square(200, 160, PixelRect::new(33, 41, 70, 70));
        let blurred = gaussian_blur(&img.view(), 5, 1.5);
        let edges = canny(&blurred, 50.0, 150.0);

        let row = 75;
        let cols: Vec<usize> = (0..200).filter(|&x| edges.get(x, row) != 0).collect();
        assert_eq!(cols, vec![33, 102]);

        let col = 60;
        let rows: Vec<usize> = (0..160).filter(|&y| edges.get(col, y) != 0).collect();
        assert_eq!(rows, vec![41, 110]);
    }

    #[test]
    fn gradient_points_towards_brighter_side() {
        let img = bright_square(20, 20, PixelRect::new(10, 0, 10, 20));
        let blurred = gaussian_blur(&img.view(), 5, 1.5);
        let g = sobel_gradients(&blurred);
        let i = 10 * 20 + 9;
        assert!(g.gx[i] > 0.0);
        assert!(g.gy[i].abs() < 1e-3);
    }
}
