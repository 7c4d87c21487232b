mod group;
mod join;

use tracing::debug;

use crate::error::{Result, UsageError};
use crate::geometry::PolyTree;
use crate::math::{Path, Paths, Point2, TOLERANCE};
use crate::operations::boolean::{ClipType, Clipper, FillRule};

use group::OffsetGroup;
use join::PathOffsetter;

/// Corner treatment where two offset edges meet on the convex side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    /// Bevelled at a distance of `|delta|` from the vertex.
    Square,
    /// Arc of radius `|delta|`.
    Round,
    /// Extended to a point, falling back to `Square` beyond the miter limit.
    Miter,
}

/// How path ends are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndType {
    /// Closed polygon; outers grow for positive delta, holes shrink.
    ClosedPolygon,
    /// Open path offset on both sides and joined as if closed.
    OpenJoined,
    /// Open path with flat ends at the end points.
    OpenButt,
    /// Open path with ends extended by `|delta|`.
    OpenSquare,
    /// Open path with semicircular ends.
    OpenRound,
}

/// Inflates or deflates closed polygons and strokes open paths.
///
/// Paths are added in groups sharing a join and end type. Each vertex is
/// offset along its edge normals, and the raw contours are then unioned so
/// the result has no self-intersections.
///
/// # Examples
///
/// ```
/// use sweepclip::{ClipperOffset, EndType, JoinType, Point2};
///
/// let square = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(1.0, 1.0), Point2::new(0.0, 1.0)];
/// let mut offset = ClipperOffset::default();
/// offset.add_path(&square, JoinType::Miter, EndType::ClosedPolygon);
/// let grown = offset.execute(1.0).unwrap();
/// assert_eq!(grown.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ClipperOffset {
    groups: Vec<OffsetGroup>,
    miter_limit: f64,
    arc_tolerance: f64,
    preserve_collinear: bool,
    reverse_solution: bool,
}

impl Default for ClipperOffset {
    fn default() -> Self {
        Self::new(2.0, 0.0)
    }
}

impl ClipperOffset {
    /// Creates an offsetter.
    ///
    /// `miter_limit` is the largest miter distance as a multiple of `|delta|`.
    /// `arc_tolerance` is the largest distance round joins may deviate from
    /// the true arc; 0 picks a fraction of `|delta|`.
    #[must_use]
    pub fn new(miter_limit: f64, arc_tolerance: f64) -> Self {
        Self {
            groups: Vec::new(),
            miter_limit,
            arc_tolerance,
            preserve_collinear: false,
            reverse_solution: false,
        }
    }

    #[must_use]
    pub fn with_preserve_collinear(mut self, preserve: bool) -> Self {
        self.preserve_collinear = preserve;
        self
    }

    #[must_use]
    pub fn with_reverse_solution(mut self, reverse: bool) -> Self {
        self.reverse_solution = reverse;
        self
    }

    #[must_use]
    pub fn miter_limit(&self) -> f64 {
        self.miter_limit
    }

    #[must_use]
    pub fn arc_tolerance(&self) -> f64 {
        self.arc_tolerance
    }

    pub fn add_path(&mut self, path: &[Point2], join_type: JoinType, end_type: EndType) {
        self.add_paths(&[path.to_vec()], join_type, end_type);
    }

    /// Adds a group of paths offset together with one join and end type.
    pub fn add_paths(&mut self, paths: &[Path], join_type: JoinType, end_type: EndType) {
        if paths.is_empty() {
            return;
        }
        self.groups.push(OffsetGroup::new(paths, join_type, end_type));
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }

    /// Offsets every group by `delta` and returns the unioned contours.
    ///
    /// Positive `delta` grows closed polygons; open paths are always stroked
    /// by `|delta|` on both sides. A `delta` below [`TOLERANCE`] returns the
    /// input unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::InvalidParameter`] for a non-finite `delta`,
    /// miter limit or arc tolerance.
    pub fn execute(&mut self, delta: f64) -> Result<Paths> {
        self.validate(delta)?;
        if delta.abs() < TOLERANCE {
            return Ok(self.groups.iter().flat_map(OffsetGroup::original_paths).collect());
        }
        let Some(mut clipper) = self.union_of_raw_offsets(delta) else {
            return Ok(Vec::new());
        };
        let paths = clipper
            .execute(ClipType::Union, FillRule::Positive)?
            .unwrap_or_default();
        debug!(delta, groups = self.groups.len(), contours = paths.len(), "offset finished");
        Ok(paths)
    }

    /// Like [`ClipperOffset::execute`], returning the result nested by
    /// containment.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::InvalidParameter`] for a non-finite `delta`,
    /// miter limit or arc tolerance.
    pub fn execute_tree(&mut self, delta: f64, tree: &mut PolyTree) -> Result<()> {
        tree.clear();
        self.validate(delta)?;
        let mut open = Vec::new();
        if delta.abs() < TOLERANCE {
            let mut clipper = Clipper::new().with_preserve_collinear(self.preserve_collinear);
            for group in &self.groups {
                clipper.add_subject(&group.original_paths());
            }
            clipper.execute_tree(ClipType::Union, FillRule::NonZero, tree, &mut open)?;
            return Ok(());
        }
        if let Some(mut clipper) = self.union_of_raw_offsets(delta) {
            clipper.execute_tree(ClipType::Union, FillRule::Positive, tree, &mut open)?;
        }
        debug!(delta, groups = self.groups.len(), contours = tree.len(), "offset tree finished");
        Ok(())
    }

    fn validate(&self, delta: f64) -> Result<()> {
        for (name, value) in [
            ("delta", delta),
            ("miter_limit", self.miter_limit),
            ("arc_tolerance", self.arc_tolerance),
        ] {
            if !value.is_finite() {
                return Err(UsageError::InvalidParameter { name, value }.into());
            }
        }
        Ok(())
    }

    /// Offsets every group and loads the raw contours into a clipper.
    fn union_of_raw_offsets(&self, delta: f64) -> Option<Clipper> {
        let mut raw: Paths = Vec::new();
        for group in &self.groups {
            let mut offsetter = PathOffsetter::new(group, delta, self.miter_limit, self.arc_tolerance);
            offsetter.offset_group(group, &mut raw);
        }
        if raw.is_empty() {
            return None;
        }
        let mut clipper = Clipper::new()
            .with_preserve_collinear(self.preserve_collinear)
            .with_reverse_solution(self.reverse_solution);
        clipper.add_subject(&raw);
        Some(clipper)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::polygon_2d::{area_of_paths, bounds, reverse_path, signed_area};
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Path {
        vec![
            Point2::new(x0, y0),
            Point2::new(x1, y0),
            Point2::new(x1, y1),
            Point2::new(x0, y1),
        ]
    }

    fn offset_area(path: &[Point2], join: JoinType, end: EndType, delta: f64) -> f64 {
        let mut offset = ClipperOffset::default();
        offset.add_path(path, join, end);
        area_of_paths(&offset.execute(delta).unwrap())
    }

    #[test]
    fn miter_inflate_unit_square() {
        let mut offset = ClipperOffset::default();
        offset.add_path(&rect(0.0, 0.0, 1.0, 1.0), JoinType::Miter, EndType::ClosedPolygon);
        let result = offset.execute(1.0).unwrap();
        assert_eq!(result.len(), 1);
        assert_abs_diff_eq!(signed_area(&result[0]), 9.0, epsilon = 1e-9);
        let (min, max) = bounds(&result[0]).unwrap();
        assert_abs_diff_eq!(min.x, -1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(max.y, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn clockwise_input_inflates_the_same() {
        let ccw = offset_area(&rect(0.0, 0.0, 1.0, 1.0), JoinType::Miter, EndType::ClosedPolygon, 1.0);
        let cw = offset_area(
            &reverse_path(&rect(0.0, 0.0, 1.0, 1.0)),
            JoinType::Miter,
            EndType::ClosedPolygon,
            1.0,
        );
        assert_abs_diff_eq!(ccw, cw, epsilon = 1e-9);
    }

    #[test]
    fn deflate_past_half_width_is_empty() {
        let mut offset = ClipperOffset::default();
        offset.add_path(&rect(0.0, 0.0, 1.0, 1.0), JoinType::Miter, EndType::ClosedPolygon);
        assert!(offset.execute(-1.0).unwrap().is_empty());
    }

    #[test]
    fn deflate_shrinks_each_side() {
        let area = offset_area(&rect(0.0, 0.0, 10.0, 10.0), JoinType::Miter, EndType::ClosedPolygon, -1.0);
        assert_abs_diff_eq!(area, 64.0, epsilon = 1e-9);
    }

    #[test]
    fn round_join_approximates_quarter_circles() {
        let area = offset_area(&rect(0.0, 0.0, 1.0, 1.0), JoinType::Round, EndType::ClosedPolygon, 1.0);
        assert!(area > 5.0 + PI * 0.99, "area {area}");
        assert!(area < 5.0 + PI, "area {area}");
    }

    #[test]
    fn square_join_cuts_corners() {
        let area = offset_area(&rect(0.0, 0.0, 1.0, 1.0), JoinType::Square, EndType::ClosedPolygon, 1.0);
        // each corner loses a triangle with legs 2 - sqrt(2)
        let corner = (2.0 - 2.0_f64.sqrt()).powi(2) / 2.0;
        assert_abs_diff_eq!(area, 9.0 - 4.0 * corner, epsilon = 1e-9);
    }

    #[test]
    fn sharp_corner_beyond_miter_limit_is_squared() {
        let spike = vec![Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), Point2::new(0.0, 1.0)];
        let mitered = offset_area(&spike, JoinType::Miter, EndType::ClosedPolygon, 0.5);
        let mut unlimited = ClipperOffset::new(100.0, 0.0);
        unlimited.add_path(&spike, JoinType::Miter, EndType::ClosedPolygon);
        let long_miter = area_of_paths(&unlimited.execute(0.5).unwrap());
        assert!(long_miter > mitered);
    }

    #[test]
    fn acute_tip_grows_with_every_join() {
        let spike = vec![Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), Point2::new(0.0, 1.0)];
        for join in [JoinType::Miter, JoinType::Square, JoinType::Round] {
            let mut offset = ClipperOffset::default();
            offset.add_path(&spike, join, EndType::ClosedPolygon);
            let result = offset.execute(0.5).unwrap();
            assert_eq!(result.len(), 1, "{join:?}");
            let (min, max) = bounds(&result[0]).unwrap();
            assert!(max.x > 10.3, "{join:?} reaches only x = {}", max.x);
            assert!(min.y < -0.45, "{join:?}");
            assert!(area_of_paths(&result) > signed_area(&spike), "{join:?}");
        }
    }

    #[test]
    fn open_line_end_caps() {
        let line = vec![Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)];
        let butt = offset_area(&line, JoinType::Square, EndType::OpenButt, 1.0);
        let square = offset_area(&line, JoinType::Square, EndType::OpenSquare, 1.0);
        let round = offset_area(&line, JoinType::Round, EndType::OpenRound, 1.0);
        assert_abs_diff_eq!(butt, 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(square, 24.0, epsilon = 1e-9);
        assert!(round > 20.0 + PI * 0.99 && round < 20.0 + PI, "round {round}");
    }

    #[test]
    fn negative_delta_strokes_open_paths_too() {
        let line = vec![Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)];
        let area = offset_area(&line, JoinType::Square, EndType::OpenButt, -1.0);
        assert_abs_diff_eq!(area, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn single_point_becomes_square_or_circle() {
        let point = vec![Point2::new(5.0, 5.0)];
        let square = offset_area(&point, JoinType::Square, EndType::OpenSquare, 1.0);
        assert_abs_diff_eq!(square, 4.0, epsilon = 1e-9);
        let circle = offset_area(&point, JoinType::Round, EndType::OpenRound, 1.0);
        assert!(circle > PI * 0.99 && circle < PI, "circle {circle}");
    }

    #[test]
    fn open_joined_outlines_both_sides() {
        let zigzag = vec![Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), Point2::new(10.0, 10.0)];
        let mut offset = ClipperOffset::default();
        offset.add_path(&zigzag, JoinType::Miter, EndType::OpenJoined);
        let result = offset.execute(0.5).unwrap();
        assert!(!result.is_empty());
        assert!(area_of_paths(&result) > 0.0);
    }

    #[test]
    fn tiny_delta_returns_input() {
        let mut offset = ClipperOffset::default();
        offset.add_path(&reverse_path(&rect(0.0, 0.0, 1.0, 1.0)), JoinType::Miter, EndType::ClosedPolygon);
        let result = offset.execute(0.0).unwrap();
        assert_eq!(result.len(), 1);
        assert_abs_diff_eq!(signed_area(&result[0]), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn hole_shrinks_when_outer_grows() {
        let mut offset = ClipperOffset::default();
        offset.add_paths(
            &[rect(0.0, 0.0, 10.0, 10.0), reverse_path(&rect(3.0, 3.0, 7.0, 7.0))],
            JoinType::Miter,
            EndType::ClosedPolygon,
        );
        let mut tree = PolyTree::new();
        offset.execute_tree(1.0, &mut tree).unwrap();
        assert_eq!(tree.len(), 2);
        assert_abs_diff_eq!(tree.area(), 144.0 - 4.0, epsilon = 1e-9);
    }

    #[test]
    fn non_finite_delta_is_rejected() {
        let mut offset = ClipperOffset::default();
        offset.add_path(&rect(0.0, 0.0, 1.0, 1.0), JoinType::Miter, EndType::ClosedPolygon);
        let err = offset.execute(f64::NAN).unwrap_err();
        assert!(matches!(
            err,
            crate::error::ClipError::Usage(UsageError::InvalidParameter { name: "delta", .. })
        ));
    }

    #[test]
    fn cleared_offsetter_yields_nothing() {
        let mut offset = ClipperOffset::default();
        offset.add_path(&rect(0.0, 0.0, 1.0, 1.0), JoinType::Round, EndType::ClosedPolygon);
        offset.clear();
        assert!(offset.execute(1.0).unwrap().is_empty());
    }
}
