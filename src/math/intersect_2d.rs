use super::{Point2, TOLERANCE};

/// Intersection of the infinite lines through `a0`-`a1` and `b0`-`b1`,
/// with the parameter along the first line clamped to `[0, 1]`.
///
/// Returns `None` for parallel lines.
#[must_use]
pub fn segment_intersect_point(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
) -> Option<Point2> {
    let dy1 = a1.y - a0.y;
    let dx1 = a1.x - a0.x;
    let dy2 = b1.y - b0.y;
    let dx2 = b1.x - b0.x;
    let det = dy1 * dx2 - dy2 * dx1;
    if det == 0.0 {
        return None;
    }
    let t = ((a0.x - b0.x) * dy2 - (a0.y - b0.y) * dx2) / det;
    if t <= 0.0 {
        Some(*a0)
    } else if t >= 1.0 {
        Some(*a1)
    } else {
        Some(Point2::new(a0.x + t * dx1, a0.y + t * dy1))
    }
}

/// Closest point to `pt` on segment `a`-`b`.
#[must_use]
pub fn closest_point_on_segment(pt: &Point2, a: &Point2, b: &Point2) -> Point2 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    if dx == 0.0 && dy == 0.0 {
        return *a;
    }
    let q = ((pt.x - a.x) * dx + (pt.y - a.y) * dy) / (dx * dx + dy * dy);
    let q = q.clamp(0.0, 1.0);
    Point2::new(a.x + q * dx, a.y + q * dy)
}

/// Intersection of two infinite lines given by point pairs, using slope form.
///
/// Returns the origin when the lines are parallel.
#[must_use]
pub fn line_intersect_point(a0: &Point2, a1: &Point2, b0: &Point2, b1: &Point2) -> Point2 {
    let a_vertical = (a0.x - a1.x).abs() < TOLERANCE;
    let b_vertical = (b0.x - b1.x).abs() < TOLERANCE;
    match (a_vertical, b_vertical) {
        (true, true) => Point2::origin(),
        (true, false) => {
            let m2 = (b1.y - b0.y) / (b1.x - b0.x);
            let c2 = b0.y - m2 * b0.x;
            Point2::new(a0.x, m2 * a0.x + c2)
        }
        (false, true) => {
            let m1 = (a1.y - a0.y) / (a1.x - a0.x);
            let c1 = a0.y - m1 * a0.x;
            Point2::new(b0.x, m1 * b0.x + c1)
        }
        (false, false) => {
            let m1 = (a1.y - a0.y) / (a1.x - a0.x);
            let c1 = a0.y - m1 * a0.x;
            let m2 = (b1.y - b0.y) / (b1.x - b0.x);
            let c2 = b0.y - m2 * b0.x;
            if (m1 - m2).abs() < TOLERANCE {
                return Point2::origin();
            }
            let x = (c2 - c1) / (m1 - m2);
            Point2::new(x, m1 * x + c1)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn crossing_diagonals() {
        let ip = segment_intersect_point(
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 2.0),
            &Point2::new(0.0, 2.0),
            &Point2::new(2.0, 0.0),
        )
        .unwrap();
        assert_abs_diff_eq!(ip.x, 1.0, epsilon = TOLERANCE);
        assert_abs_diff_eq!(ip.y, 1.0, epsilon = TOLERANCE);
    }

    #[test]
    fn parallel_segments_have_no_intersection() {
        let ip = segment_intersect_point(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(0.0, 1.0),
            &Point2::new(1.0, 1.0),
        );
        assert!(ip.is_none());
    }

    #[test]
    fn intersection_is_clamped_to_first_segment() {
        let ip = segment_intersect_point(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(3.0, -1.0),
            &Point2::new(3.0, 1.0),
        )
        .unwrap();
        assert_eq!(ip, Point2::new(1.0, 0.0));
    }

    #[test]
    fn closest_point_projects_and_clamps() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(10.0, 0.0);
        let p = closest_point_on_segment(&Point2::new(4.0, 3.0), &a, &b);
        assert_abs_diff_eq!(p.x, 4.0, epsilon = TOLERANCE);
        let q = closest_point_on_segment(&Point2::new(-4.0, 3.0), &a, &b);
        assert_eq!(q, a);
    }

    #[test]
    fn line_intersection_with_vertical() {
        let p = line_intersect_point(
            &Point2::new(1.0, -5.0),
            &Point2::new(1.0, 5.0),
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 2.0),
        );
        assert_abs_diff_eq!(p.x, 1.0, epsilon = TOLERANCE);
        assert_abs_diff_eq!(p.y, 1.0, epsilon = TOLERANCE);
    }
}
