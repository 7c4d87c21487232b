use std::f64::consts::PI;

use crate::math::intersect_2d::line_intersect_point;
use crate::math::polygon_2d::{cross_vec, reverse_path};
use crate::math::{Path, Paths, Point2, Vector2, TOLERANCE};

use super::group::OffsetGroup;
use super::{EndType, JoinType};

/// Below this cosine a concave corner turns back on itself and collapses
/// to its vertex. Convex corners that sharp still get their join.
const SPIKE_COS: f64 = -0.99;

/// Above this cosine a join is treated as straight.
const STRAIGHT_COS: f64 = 0.999;

/// Default arc tolerance as a fraction of `|delta|`.
const DEFAULT_ARC_FRACTION: f64 = 0.0025;

/// Upper bound on the segments of a full circle.
const MAX_ARC_STEPS: f64 = 1024.0;

/// Offsets the paths of one group.
///
/// All vertex positions are `path[j] + delta * normal`; joins differ only in
/// the points they emit between the two neighbouring normals.
#[derive(Debug)]
pub(super) struct PathOffsetter {
    join_type: JoinType,
    delta: f64,
    mit_lim_sqr: f64,
    step_sin: f64,
    step_cos: f64,
    steps_per_rad: f64,
    normals: Vec<Vector2>,
    out: Path,
}

impl PathOffsetter {
    pub(super) fn new(group: &OffsetGroup, delta: f64, miter_limit: f64, arc_tolerance: f64) -> Self {
        // open paths are stroked on both sides regardless of sign
        let delta = if group.end_type == EndType::ClosedPolygon {
            delta
        } else {
            delta.abs()
        };
        let abs_delta = delta.abs();
        let mit_lim_sqr = if miter_limit <= 1.0 {
            2.0
        } else {
            2.0 / (miter_limit * miter_limit)
        };

        let arc_tol = if arc_tolerance > TOLERANCE {
            arc_tolerance.min(abs_delta)
        } else {
            abs_delta * DEFAULT_ARC_FRACTION
        };
        let steps_per_360 = if abs_delta > TOLERANCE {
            (PI / (1.0 - arc_tol / abs_delta).acos()).clamp(4.0, MAX_ARC_STEPS)
        } else {
            4.0
        };
        let (mut step_sin, step_cos) = (2.0 * PI / steps_per_360).sin_cos();
        if delta < 0.0 {
            step_sin = -step_sin;
        }

        Self {
            join_type: group.join_type,
            delta,
            mit_lim_sqr,
            step_sin,
            step_cos,
            steps_per_rad: steps_per_360 / (2.0 * PI),
            normals: Vec::new(),
            out: Vec::new(),
        }
    }

    /// Appends the raw offset contours of every path in `group` to `solution`.
    pub(super) fn offset_group(&mut self, group: &OffsetGroup, solution: &mut Paths) {
        for path in &group.paths {
            let mut end_type = group.end_type;
            match path.len() {
                0 => continue,
                1 => {
                    if self.delta > 0.0 {
                        let round = self.join_type == JoinType::Round || end_type == EndType::OpenRound;
                        solution.push(self.point_shape(path[0], round));
                    }
                    continue;
                }
                2 if end_type == EndType::OpenJoined => {
                    end_type = if self.join_type == JoinType::Round {
                        EndType::OpenRound
                    } else {
                        EndType::OpenSquare
                    };
                }
                _ => {}
            }

            self.build_normals(path);
            match end_type {
                EndType::ClosedPolygon => self.offset_polygon(path),
                EndType::OpenJoined => self.offset_open_joined(path, solution),
                _ => self.offset_open_path(path, end_type),
            }
            self.flush(solution);
        }
    }

    fn flush(&mut self, solution: &mut Paths) {
        if self.out.len() > 2 {
            solution.push(std::mem::take(&mut self.out));
        } else {
            self.out.clear();
        }
    }

    /// Circle or square of radius `delta` around a lone point.
    fn point_shape(&self, pt: Point2, round: bool) -> Path {
        let r = self.delta;
        if !round {
            return vec![
                Point2::new(pt.x - r, pt.y - r),
                Point2::new(pt.x + r, pt.y - r),
                Point2::new(pt.x + r, pt.y + r),
                Point2::new(pt.x - r, pt.y + r),
            ];
        }
        let steps = (self.steps_per_rad * 2.0 * PI).ceil().max(4.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let count = steps as usize;
        (0..count)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let angle = 2.0 * PI * (i as f64) / steps;
                Point2::new(pt.x + r * angle.cos(), pt.y + r * angle.sin())
            })
            .collect()
    }

    /// Normal `i` belongs to the edge from `path[i]` to `path[i + 1]`,
    /// the last one to the closing edge.
    fn build_normals(&mut self, path: &[Point2]) {
        self.normals.clear();
        self.normals.extend(path.windows(2).map(|w| unit_normal(&w[0], &w[1])));
        if let (Some(last), Some(first)) = (path.last(), path.first()) {
            self.normals.push(unit_normal(last, first));
        }
    }

    fn perpendicular(&self, pt: Point2, normal: Vector2) -> Point2 {
        pt + normal * self.delta
    }

    /// Emits the offset of vertex `j` whose incoming edge has normal `k`.
    fn offset_point(&mut self, path: &[Point2], j: usize, k: &mut usize) {
        if path[j] == path[*k] {
            *k = j;
            return;
        }
        let nj = self.normals[j];
        let nk = self.normals[*k];
        let sin_a = cross_vec(&nj, &nk).clamp(-1.0, 1.0);
        let cos_a = nj.dot(&nk);

        if sin_a * self.delta < 0.0 {
            if cos_a < SPIKE_COS {
                self.out.push(path[j]);
            } else {
                // concave: the middle point keeps the two offsets connected
                self.out.push(self.perpendicular(path[j], nk));
                self.out.push(path[j]);
                self.out.push(self.perpendicular(path[j], nj));
            }
        } else if cos_a > STRAIGHT_COS && self.join_type != JoinType::Round {
            self.do_miter(path, j, *k, cos_a);
        } else {
            match self.join_type {
                JoinType::Miter if cos_a > self.mit_lim_sqr - 1.0 => self.do_miter(path, j, *k, cos_a),
                JoinType::Miter | JoinType::Square => self.do_square(path, j, *k),
                JoinType::Round => self.do_round(path, j, *k, sin_a.atan2(cos_a)),
            }
        }
        *k = j;
    }

    fn do_miter(&mut self, path: &[Point2], j: usize, k: usize, cos_a: f64) {
        let q = self.delta / (cos_a + 1.0);
        self.out.push(path[j] + (self.normals[k] + self.normals[j]) * q);
    }

    /// Cuts the corner across the bisector at `|delta|` from the vertex.
    fn do_square(&mut self, path: &[Point2], j: usize, k: usize) {
        let nj = self.normals[j];
        let nk = self.normals[k];
        let vec = if j == k {
            Vector2::new(nj.y, -nj.x)
        } else {
            average_unit(Vector2::new(-nk.y, nk.x), Vector2::new(nj.y, -nj.x))
        };
        let abs_delta = self.delta.abs();
        let pt_q = path[j] + vec * abs_delta;
        let pt1 = pt_q + Vector2::new(vec.y, -vec.x) * self.delta;
        let pt2 = pt_q + Vector2::new(-vec.y, vec.x) * self.delta;
        let pt3 = self.perpendicular(path[k], nk);
        if j == k {
            let pt4 = pt3 + vec * self.delta;
            let pt = line_intersect_point(&pt1, &pt2, &pt3, &pt4);
            self.out.push(reflect(pt, pt_q));
            self.out.push(pt);
        } else {
            let pt4 = self.perpendicular(path[j], nk);
            let pt = line_intersect_point(&pt1, &pt2, &pt3, &pt4);
            self.out.push(pt);
            self.out.push(reflect(pt, pt_q));
        }
    }

    /// Arc from the offset along normal `k` to the offset along normal `j`.
    fn do_round(&mut self, path: &[Point2], j: usize, k: usize, angle: f64) {
        let pt = path[j];
        let mut offset = self.normals[k] * self.delta;
        if j == k {
            offset = -offset;
        }
        self.out.push(pt + offset);
        let steps = (self.steps_per_rad * angle.abs()).ceil();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = steps as usize;
        for _ in 1..steps {
            offset = Vector2::new(
                offset.x * self.step_cos - self.step_sin * offset.y,
                offset.x * self.step_sin + offset.y * self.step_cos,
            );
            self.out.push(pt + offset);
        }
        self.out.push(self.perpendicular(pt, self.normals[j]));
    }

    fn do_bevel(&mut self, path: &[Point2], j: usize, k: usize) {
        if j == k {
            let abs_delta = self.delta.abs();
            self.out.push(path[j] - self.normals[j] * abs_delta);
            self.out.push(path[j] + self.normals[j] * abs_delta);
        } else {
            self.out.push(self.perpendicular(path[j], self.normals[k]));
            self.out.push(self.perpendicular(path[j], self.normals[j]));
        }
    }

    fn offset_polygon(&mut self, path: &[Point2]) {
        let mut k = path.len() - 1;
        for j in 0..path.len() {
            self.offset_point(path, j, &mut k);
        }
    }

    /// Outlines both sides of an open path as two closed contours.
    fn offset_open_joined(&mut self, path: &[Point2], solution: &mut Paths) {
        self.offset_polygon(path);
        self.flush(solution);
        let reversed = reverse_path(path);
        self.build_normals(&reversed);
        self.offset_polygon(&reversed);
    }

    fn cap(&mut self, path: &[Point2], i: usize, end_type: EndType) {
        match end_type {
            EndType::OpenButt => self.do_bevel(path, i, i),
            EndType::OpenRound => self.do_round(path, i, i, PI),
            _ => self.do_square(path, i, i),
        }
    }

    /// Walks forward along the left side, caps the end, then walks back.
    fn offset_open_path(&mut self, path: &[Point2], end_type: EndType) {
        let high = path.len() - 1;
        self.cap(path, 0, end_type);

        let mut k = 0;
        for j in 1..high {
            self.offset_point(path, j, &mut k);
        }

        // normals now face the other side, indexed for the walk back
        for i in (1..=high).rev() {
            self.normals[i] = -self.normals[i - 1];
        }
        self.normals[0] = self.normals[high];

        self.cap(path, high, end_type);
        let mut k = high;
        for j in (1..high).rev() {
            self.offset_point(path, j, &mut k);
        }
    }
}

fn unit_normal(pt1: &Point2, pt2: &Point2) -> Vector2 {
    let d = pt2 - pt1;
    let len = d.norm();
    if len < TOLERANCE {
        return Vector2::zeros();
    }
    Vector2::new(d.y / len, -d.x / len)
}

fn average_unit(v1: Vector2, v2: Vector2) -> Vector2 {
    let sum = v1 + v2;
    let len = sum.norm();
    if len < TOLERANCE {
        Vector2::zeros()
    } else {
        sum / len
    }
}

/// Mirror of `pt` through `pivot`.
fn reflect(pt: Point2, pivot: Point2) -> Point2 {
    pivot + (pivot - pt)
}
