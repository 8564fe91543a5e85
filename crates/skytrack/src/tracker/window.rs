use nalgebra::Point2;
use skytrack_core::PixelRect;

/// Search window around `center` for a `width x height` frame.
///
/// The nominal window has side `2 * radius + extent` on each axis and is
/// centred on the truncated center. A window hanging over the left or top
/// edge starts at 0 and keeps its full side; the right and bottom edges clip
/// it. A window starting at or past the far edge falls back to the full
/// frame, as does a missing center.
pub fn search_window(
    center: Option<Point2<f64>>,
    radius: u32,
    extent: (u32, u32),
    width: usize,
    height: usize,
) -> PixelRect {
    let full = PixelRect::full(width, height);
    let Some(center) = center else {
        return full;
    };
    let Some((x0, x1)) = clamp_span(center.x, radius, extent.0, width) else {
        return full;
    };
    let Some((y0, y1)) = clamp_span(center.y, radius, extent.1, height) else {
        return full;
    };
    PixelRect::new(x0, y0, x1 - x0, y1 - y0)
}

/// Start at `max(c - r - e/2, 0)`, length `2r + e`, clipped at `len`.
fn clamp_span(c: f64, radius: u32, extent: u32, len: usize) -> Option<(i32, i32)> {
    // `as` saturates, and NaN maps to 0.
    let c = c.trunc() as i64;
    let lo = c.saturating_sub(radius as i64 + (extent / 2) as i64).max(0);
    let hi = lo
        .saturating_add(2 * radius as i64 + extent as i64)
        .min(len as i64);
    (hi > lo).then_some((lo as i32, hi as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_center_means_full_frame() {
        assert_eq!(
            search_window(None, 40, (0, 0), 320, 240),
            PixelRect::new(0, 0, 320, 240)
        );
    }

    #[test]
    fn window_is_centred_and_clamped() {
        let c = Some(Point2::new(80.0, 120.0));
        assert_eq!(
            search_window(c, 40, (0, 0), 320, 240),
            PixelRect::new(40, 80, 80, 80)
        );
        let corner = Some(Point2::new(10.7, 5.2));
        assert_eq!(
            search_window(corner, 40, (0, 0), 320, 240),
            PixelRect::new(0, 0, 80, 80)
        );
        let edge = Some(Point2::new(300.0, 230.0));
        assert_eq!(
            search_window(edge, 40, (0, 0), 320, 240),
            PixelRect::new(260, 190, 60, 50)
        );
    }

    #[test]
    fn extent_widens_the_window() {
        let c = Some(Point2::new(100.0, 100.0));
        assert_eq!(
            search_window(c, 20, (30, 10), 320, 240),
            PixelRect::new(65, 75, 70, 50)
        );
    }

    #[test]
    fn left_and_top_overhang_keeps_the_full_side() {
        for (c, expected) in [
            (Point2::new(-500.0, 100.0), PixelRect::new(0, 60, 80, 80)),
            (Point2::new(-40.0, -40.0), PixelRect::new(0, 0, 80, 80)),
            (Point2::new(5.0, 200.0), PixelRect::new(0, 160, 80, 80)),
            (Point2::new(f64::NEG_INFINITY, 0.0), PixelRect::new(0, 0, 80, 80)),
        ] {
            assert_eq!(search_window(Some(c), 40, (0, 0), 320, 240), expected, "{c:?}");
        }
    }

    #[test]
    fn window_past_the_far_edge_falls_back_to_full_frame() {
        let full = PixelRect::new(0, 0, 320, 240);
        for c in [
            Point2::new(100.0, 1e12),
            Point2::new(f64::INFINITY, 0.0),
            Point2::new(400.0, 100.0),
        ] {
            assert_eq!(search_window(Some(c), 40, (0, 0), 320, 240), full, "{c:?}");
        }
    }

    #[test]
    fn frame_narrower_than_the_window() {
        assert_eq!(
            search_window(Some(Point2::new(30.0, 30.0)), 40, (0, 0), 50, 60),
            PixelRect::new(0, 0, 50, 60)
        );
    }

    #[test]
    fn window_at_origin() {
        assert_eq!(
            search_window(Some(Point2::origin()), 40, (0, 0), 320, 240),
            PixelRect::new(0, 0, 80, 80)
        );
    }
}
