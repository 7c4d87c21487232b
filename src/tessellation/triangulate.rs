use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{Result, UsageError};
use crate::geometry::PolyTree;
use crate::math::polygon_2d::{is_positive, path_inside_path, signed_area};
use crate::math::{Path, Paths, Point2};
use crate::operations::boolean::{ClipType, ClipperBase, FillRule, PathType, Solution};

use super::ear_cut::ear_cut;
use super::hooks::TriangulationHooks;

/// Boolean clipping whose result is returned as triangles.
///
/// Runs the same sweep as [`Clipper`](crate::Clipper) while its hooks
/// record which output region owns which. Every hole is then bridged into
/// its outer ring and the ring ear-clipped, so the triangles cover exactly
/// the clipped area.
///
/// Only closed input and flat output are supported.
#[derive(Debug)]
pub struct ClipperTriangulation {
    base: ClipperBase<TriangulationHooks>,
}

impl Default for ClipperTriangulation {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipperTriangulation {
    #[must_use]
    pub fn new() -> Self {
        let mut base = ClipperBase::new(TriangulationHooks::default());
        // collinear vertices would only add slivers to the fan
        base.preserve_collinear = false;
        Self { base }
    }

    /// Registers one closed contour.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::Unsupported`] for open paths.
    pub fn add_path(&mut self, path: &[Point2], path_type: PathType, is_open: bool) -> Result<()> {
        if is_open {
            return Err(UsageError::Unsupported("open paths cannot be triangulated").into());
        }
        self.base.add_path(path, path_type, false)
    }

    /// Registers several closed contours of one type.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::Unsupported`] for open paths.
    pub fn add_paths(&mut self, paths: &[Path], path_type: PathType, is_open: bool) -> Result<()> {
        for path in paths {
            self.add_path(path, path_type, is_open)?;
        }
        Ok(())
    }

    pub fn add_subject(&mut self, paths: &[Path]) {
        for path in paths {
            self.base.add_closed_path(path, PathType::Subject);
        }
    }

    pub fn add_clip(&mut self, paths: &[Path]) {
        for path in paths {
            self.base.add_closed_path(path, PathType::Clip);
        }
    }

    pub fn clear(&mut self) {
        self.base.clear();
    }

    /// Runs `clip_type` and returns the result as triangles, each a
    /// positively oriented three-point path.
    ///
    /// Returns `Ok(None)` when nothing has been added.
    ///
    /// # Errors
    ///
    /// Returns an invariant error if the sweep lost consistency.
    pub fn execute(&mut self, clip_type: ClipType, fill_rule: FillRule) -> Result<Option<Paths>> {
        let Some(mut out) = self.base.sweep(clip_type, fill_rule, false)? else {
            return Ok(None);
        };
        let hooks = &self.base.hooks;

        let mut rings: Vec<(usize, Path)> = Vec::new();
        for &idx in hooks.sealed() {
            let idx = hooks.surviving(idx);
            if rings.iter().any(|(i, _)| *i == idx) {
                continue;
            }
            if let Some(path) = out.closed_path(idx, self.base.preserve_collinear) {
                rings.push((idx, path));
            }
        }

        let mut outers: Vec<(Path, Paths)> = Vec::new();
        let mut outer_of: HashMap<usize, usize> = HashMap::new();
        for (idx, path) in &rings {
            if is_positive(path) {
                outer_of.insert(*idx, outers.len());
                outers.push((path.clone(), Vec::new()));
            }
        }

        let mut hole_count = 0;
        for (idx, hole) in rings.iter().filter(|(_, p)| !is_positive(p)) {
            let hinted = hooks
                .owner_chain(*idx)
                .into_iter()
                .filter_map(|o| outer_of.get(&o).copied())
                .find(|&o| path_inside_path(hole, &outers[o].0));
            let Some(slot) = hinted.or_else(|| smallest_container(&outers, hole)) else {
                warn!(region = idx, "hole without an enclosing outer ring");
                continue;
            };
            outers[slot].1.push(hole.clone());
            hole_count += 1;
        }

        let mut triangles = Vec::new();
        for (outer, holes) in &outers {
            ear_cut(outer, holes, &mut triangles);
        }
        debug!(
            outers = outers.len(),
            holes = hole_count,
            triangles = triangles.len(),
            "triangulation finished"
        );
        Ok(Some(triangles))
    }

    /// Open paths cannot be triangulated.
    ///
    /// # Errors
    ///
    /// Always returns [`UsageError::Unsupported`].
    pub fn execute_with_open(&mut self, _clip_type: ClipType, _fill_rule: FillRule) -> Result<Option<Solution>> {
        Err(UsageError::Unsupported("triangulation has no open-path output").into())
    }

    /// Triangles have no nesting to report.
    ///
    /// # Errors
    ///
    /// Always returns [`UsageError::Unsupported`].
    pub fn execute_tree(
        &mut self,
        _clip_type: ClipType,
        _fill_rule: FillRule,
        _tree: &mut PolyTree,
        _open: &mut Paths,
    ) -> Result<bool> {
        Err(UsageError::Unsupported("triangulation has no tree output").into())
    }
}

fn smallest_container(outers: &[(Path, Paths)], hole: &[Point2]) -> Option<usize> {
    let hole_area = signed_area(hole).abs();
    outers
        .iter()
        .enumerate()
        .filter(|(_, (outer, _))| signed_area(outer) > hole_area && path_inside_path(hole, outer))
        .min_by(|a, b| signed_area(&a.1 .0).total_cmp(&signed_area(&b.1 .0)))
        .map(|(i, _)| i)
}
