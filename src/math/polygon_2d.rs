use super::{Path, Paths, Point2, Vector2, TOLERANCE};

/// Location of a point relative to a closed contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointInPolygon {
    Inside,
    Outside,
    OnBoundary,
}

/// Computes the signed area of a closed contour (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Sum of the signed areas of every contour.
///
/// Holes wound opposite to their outer ring subtract from the total.
#[must_use]
pub fn area_of_paths(paths: &[Path]) -> f64 {
    paths.iter().map(|p| signed_area(p)).sum()
}

/// Returns `true` when the contour has non-negative signed area.
#[must_use]
pub fn is_positive(points: &[Point2]) -> bool {
    signed_area(points) >= 0.0
}

/// Cross product of `(b - a)` and `(c - b)`.
///
/// Positive for a left (counter-clockwise) turn at `b`.
#[must_use]
pub fn cross_product(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x)
}

/// Sign of [`cross_product`] as -1, 0 or 1.
#[must_use]
pub fn cross_product_sign(a: &Point2, b: &Point2, c: &Point2) -> i32 {
    let cross = cross_product(a, b, c);
    if cross > 0.0 {
        1
    } else if cross < 0.0 {
        -1
    } else {
        0
    }
}

/// Dot product of `(b - a)` and `(c - b)`.
#[must_use]
pub fn dot_product(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    (b.x - a.x) * (c.x - b.x) + (b.y - a.y) * (c.y - b.y)
}

/// Cross product of two vectors in the engine's normal convention
/// (`v1.y * v2.x - v2.y * v1.x`).
#[must_use]
pub fn cross_vec(v1: &Vector2, v2: &Vector2) -> f64 {
    v1.y * v2.x - v2.y * v1.x
}

/// Winding-parity point-in-polygon test against a closed contour.
#[must_use]
pub fn point_in_polygon(pt: &Point2, polygon: &[Point2]) -> PointInPolygon {
    let n = polygon.len();
    if n < 3 {
        return PointInPolygon::Outside;
    }
    let mut inside = false;
    for i in 0..n {
        let a = &polygon[i];
        let b = &polygon[(i + 1) % n];
        if on_segment(pt, a, b) {
            return PointInPolygon::OnBoundary;
        }
        if (a.y > pt.y) != (b.y > pt.y) {
            let x = a.x + (pt.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if pt.x < x {
                inside = !inside;
            }
        }
    }
    if inside {
        PointInPolygon::Inside
    } else {
        PointInPolygon::Outside
    }
}

/// Returns `true` when `pt` lies on segment `a`-`b` (within [`TOLERANCE`]).
#[must_use]
pub fn on_segment(pt: &Point2, a: &Point2, b: &Point2) -> bool {
    let cross = (b.x - a.x) * (pt.y - a.y) - (b.y - a.y) * (pt.x - a.x);
    if cross.abs() > TOLERANCE {
        return false;
    }
    pt.x >= a.x.min(b.x) - TOLERANCE
        && pt.x <= a.x.max(b.x) + TOLERANCE
        && pt.y >= a.y.min(b.y) - TOLERANCE
        && pt.y <= a.y.max(b.y) + TOLERANCE
}

/// Majority test: most vertices of `inner` (ignoring those on the boundary)
/// lie inside `outer`.
#[must_use]
pub fn path_inside_path(inner: &[Point2], outer: &[Point2]) -> bool {
    let mut inside = 0_usize;
    let mut outside = 0_usize;
    for pt in inner {
        match point_in_polygon(pt, outer) {
            PointInPolygon::Inside => inside += 1,
            PointInPolygon::Outside => outside += 1,
            PointInPolygon::OnBoundary => {}
        }
    }
    inside > outside
}

/// Returns the contour with its point order reversed.
#[must_use]
pub fn reverse_path(path: &[Point2]) -> Path {
    path.iter().rev().copied().collect()
}

/// Reverses every contour.
#[must_use]
pub fn reverse_paths(paths: &[Path]) -> Paths {
    paths.iter().map(|p| reverse_path(p)).collect()
}

/// Removes consecutive duplicate points; for closed contours also drops
/// trailing points equal to the first.
#[must_use]
pub fn strip_duplicates(path: &[Point2], is_closed: bool) -> Path {
    let mut result: Path = Vec::with_capacity(path.len());
    for pt in path {
        if result.last() != Some(pt) {
            result.push(*pt);
        }
    }
    if is_closed {
        while result.len() > 1 && result.first() == result.last() {
            result.pop();
        }
    }
    result
}

/// Axis-aligned bounds `(min, max)` of a point set, or `None` when empty.
#[must_use]
pub fn bounds(points: &[Point2]) -> Option<(Point2, Point2)> {
    let first = points.first()?;
    let mut min = *first;
    let mut max = *first;
    for pt in &points[1..] {
        min.x = min.x.min(pt.x);
        min.y = min.y.min(pt.y);
        max.x = max.x.max(pt.x);
        max.y = max.y.max(pt.y);
    }
    Some((min, max))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Path {
        vec![
            Point2::new(x0, y0),
            Point2::new(x1, y0),
            Point2::new(x1, y1),
            Point2::new(x0, y1),
        ]
    }

    #[test]
    fn signed_area_ccw_square() {
        let area = signed_area(&square(0.0, 0.0, 1.0, 1.0));
        assert!((area - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_cw_square() {
        let pts = reverse_path(&square(0.0, 0.0, 1.0, 1.0));
        assert!((signed_area(&pts) + 1.0).abs() < TOLERANCE);
        assert!(!is_positive(&pts));
    }

    #[test]
    fn signed_area_degenerate() {
        assert!(signed_area(&[Point2::new(0.0, 0.0)]).abs() < TOLERANCE);
        assert!(signed_area(&[]).abs() < TOLERANCE);
    }

    #[test]
    fn area_of_paths_subtracts_holes() {
        let paths = vec![
            square(0.0, 0.0, 10.0, 10.0),
            reverse_path(&square(2.0, 2.0, 8.0, 8.0)),
        ];
        assert!((area_of_paths(&paths) - 64.0).abs() < TOLERANCE);
    }

    #[test]
    fn cross_product_turns() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        assert_eq!(cross_product_sign(&a, &b, &Point2::new(1.0, 1.0)), 1);
        assert_eq!(cross_product_sign(&a, &b, &Point2::new(1.0, -1.0)), -1);
        assert_eq!(cross_product_sign(&a, &b, &Point2::new(2.0, 0.0)), 0);
    }

    #[test]
    fn point_in_polygon_classifies() {
        let sq = square(0.0, 0.0, 4.0, 4.0);
        assert_eq!(point_in_polygon(&Point2::new(2.0, 2.0), &sq), PointInPolygon::Inside);
        assert_eq!(point_in_polygon(&Point2::new(5.0, 2.0), &sq), PointInPolygon::Outside);
        assert_eq!(
            point_in_polygon(&Point2::new(4.0, 1.0), &sq),
            PointInPolygon::OnBoundary
        );
    }

    #[test]
    fn nested_path_is_inside() {
        let outer = square(0.0, 0.0, 10.0, 10.0);
        let inner = square(2.0, 2.0, 8.0, 8.0);
        assert!(path_inside_path(&inner, &outer));
        assert!(!path_inside_path(&outer, &inner));
    }

    #[test]
    fn strip_duplicates_closed() {
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 0.0),
        ];
        let stripped = strip_duplicates(&pts, true);
        assert_eq!(stripped.len(), 3);
        let open = strip_duplicates(&pts, false);
        assert_eq!(open.len(), 4);
    }

    #[test]
    fn bounds_of_square() {
        let (min, max) = bounds(&square(-1.0, 2.0, 3.0, 5.0)).unwrap();
        assert_eq!(min, Point2::new(-1.0, 2.0));
        assert_eq!(max, Point2::new(3.0, 5.0));
        assert!(bounds(&[]).is_none());
    }
}
