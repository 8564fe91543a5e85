//! Polygon simplification and convexity on traced contours.

use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;

/// Douglas-Peucker approximation of a closed contour, with a tolerance of
/// `epsilon_frac` times its perimeter. The result does not repeat its first
/// vertex. Contours too short to simplify come back unchanged.
pub fn approx_closed(points: &[Point<i32>], epsilon_frac: f64) -> Vec<Point<i32>> {
    let epsilon = epsilon_frac * arc_length(points, true);
    if points.len() < 3 || !epsilon.is_finite() || epsilon <= 0.0 {
        return points.to_vec();
    }
    approximate_polygon_dp(points, epsilon, true)
}

/// `true` when every non-collinear turn of the closed polygon has the same
/// orientation. Polygons with no turn at all are not convex.
pub fn is_convex(points: &[Point<i32>]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0i64;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        let cross = (b.x - a.x) as i64 * (c.y - b.y) as i64 - (b.y - a.y) as i64 * (c.x - b.x) as i64;
        if cross == 0 {
            continue;
        }
        let s = cross.signum();
        if sign == 0 {
            sign = s;
        } else if s != sign {
            return false;
        }
    }
    sign != 0
}
