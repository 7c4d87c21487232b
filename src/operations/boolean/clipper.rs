use crate::error::{Result, UsageError};
use crate::geometry::PolyTree;
use crate::math::{Path, Paths, Point2};

use super::engine::{Sweep, SweepOptions};
use super::hooks::{NoHooks, SweepHooks};
use super::out_rec::OutputStore;
use super::vertex::VertexList;
use super::{ClipType, FillRule, PathType};

/// Closed and open result contours of one clipping operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Solution {
    pub closed: Paths,
    pub open: Paths,
}

/// Input registration and sweep driving shared by every engine built on
/// the sweep. `H` observes output-region events.
#[derive(Debug)]
pub(crate) struct ClipperBase<H> {
    input: VertexList,
    pub(crate) preserve_collinear: bool,
    pub(crate) reverse_solution: bool,
    pub(crate) hooks: H,
}

impl<H: SweepHooks> ClipperBase<H> {
    pub(crate) fn new(hooks: H) -> Self {
        Self {
            input: VertexList::default(),
            preserve_collinear: true,
            reverse_solution: false,
            hooks,
        }
    }

    pub(crate) fn add_path(&mut self, path: &[Point2], path_type: PathType, is_open: bool) -> Result<()> {
        if is_open && path_type == PathType::Clip {
            return Err(UsageError::OpenClipPath.into());
        }
        self.input.add_path(path, path_type, is_open);
        Ok(())
    }

    /// Registers a closed contour, which is valid for either path type.
    pub(crate) fn add_closed_path(&mut self, path: &[Point2], path_type: PathType) {
        self.input.add_path(path, path_type, false);
    }

    pub(crate) fn clear(&mut self) {
        self.input.clear();
    }

    /// Runs one sweep and returns its raw output regions, or `None` when no
    /// usable path has been added.
    pub(crate) fn sweep(
        &mut self,
        clip_type: ClipType,
        fill_rule: FillRule,
        using_polytree: bool,
    ) -> Result<Option<OutputStore>> {
        if self.input.is_empty() {
            return Ok(None);
        }
        self.input.sort_minima();
        let options = SweepOptions {
            clip_type,
            fill_rule,
            preserve_collinear: self.preserve_collinear,
            using_polytree,
        };
        let mut sweep = Sweep::new(&self.input, &mut self.hooks, options);
        sweep.execute()?;
        Ok(Some(sweep.into_output()))
    }
}

/// Boolean clipping of polygon sets.
///
/// Paths are registered as subject or clip, then [`Clipper::execute`] runs
/// one operation over them. Registered paths survive an execute, so the
/// same instance can run several operations over the same input.
///
/// Closed outputs are oriented with positive signed area for outer
/// contours and negative for holes, unless `reverse_solution` is set.
///
/// # Examples
///
/// ```
/// use sweepclip::{ClipType, Clipper, FillRule, Point2};
///
/// let a = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(1.0, 1.0), Point2::new(0.0, 1.0)];
/// let b = vec![Point2::new(0.5, 0.5), Point2::new(1.5, 0.5), Point2::new(1.5, 1.5), Point2::new(0.5, 1.5)];
/// let mut clipper = Clipper::new();
/// clipper.add_subject(&[a]);
/// clipper.add_clip(&[b]);
/// let result = clipper.execute(ClipType::Intersection, FillRule::NonZero).unwrap().unwrap();
/// assert_eq!(result.len(), 1);
/// ```
#[derive(Debug)]
pub struct Clipper {
    base: ClipperBase<NoHooks>,
}

impl Default for Clipper {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipper {
    /// Creates an engine with collinear points preserved and output in
    /// positive orientation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: ClipperBase::new(NoHooks),
        }
    }

    /// Keeps collinear vertices in the output; 180 degree spikes are always
    /// removed.
    #[must_use]
    pub fn with_preserve_collinear(mut self, preserve: bool) -> Self {
        self.base.preserve_collinear = preserve;
        self
    }

    /// Emits outer contours with negative area and holes with positive.
    #[must_use]
    pub fn with_reverse_solution(mut self, reverse: bool) -> Self {
        self.base.reverse_solution = reverse;
        self
    }

    #[must_use]
    pub fn preserve_collinear(&self) -> bool {
        self.base.preserve_collinear
    }

    #[must_use]
    pub fn reverse_solution(&self) -> bool {
        self.base.reverse_solution
    }

    /// Registers one contour.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::OpenClipPath`] for an open clip path.
    pub fn add_path(&mut self, path: &[Point2], path_type: PathType, is_open: bool) -> Result<()> {
        self.base.add_path(path, path_type, is_open)
    }

    /// Registers several contours of one type.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::OpenClipPath`] for open clip paths.
    pub fn add_paths(&mut self, paths: &[Path], path_type: PathType, is_open: bool) -> Result<()> {
        for path in paths {
            self.base.add_path(path, path_type, is_open)?;
        }
        Ok(())
    }

    /// Registers closed subject contours.
    pub fn add_subject(&mut self, paths: &[Path]) {
        for path in paths {
            self.base.add_closed_path(path, PathType::Subject);
        }
    }

    /// Registers open subject polylines.
    pub fn add_open_subject(&mut self, paths: &[Path]) {
        for path in paths {
            self.base.input.add_path(path, PathType::Subject, true);
        }
    }

    /// Registers closed clip contours.
    pub fn add_clip(&mut self, paths: &[Path]) {
        for path in paths {
            self.base.add_closed_path(path, PathType::Clip);
        }
    }

    /// Removes every registered path.
    pub fn clear(&mut self) {
        self.base.clear();
    }

    /// Runs `clip_type` over the registered paths and returns the closed
    /// result contours. Open results are discarded.
    ///
    /// Returns `Ok(None)` when nothing has been added.
    ///
    /// # Errors
    ///
    /// Returns an invariant error if the sweep lost consistency.
    pub fn execute(&mut self, clip_type: ClipType, fill_rule: FillRule) -> Result<Option<Paths>> {
        Ok(self.execute_with_open(clip_type, fill_rule)?.map(|s| s.closed))
    }

    /// Like [`Clipper::execute`], also returning the clipped open paths.
    ///
    /// # Errors
    ///
    /// Returns an invariant error if the sweep lost consistency.
    pub fn execute_with_open(&mut self, clip_type: ClipType, fill_rule: FillRule) -> Result<Option<Solution>> {
        let Some(mut out) = self.base.sweep(clip_type, fill_rule, false)? else {
            return Ok(None);
        };
        let (closed, open) = out.build_paths(self.base.reverse_solution, self.base.preserve_collinear);
        tracing::debug!(closed = closed.len(), open = open.len(), "clip solution built");
        Ok(Some(Solution { closed, open }))
    }

    /// Runs `clip_type` and fills `tree` with the closed results nested by
    /// containment; clipped open paths go to `open`.
    ///
    /// Returns `Ok(false)` when nothing has been added.
    ///
    /// # Errors
    ///
    /// Returns an invariant error if the sweep lost consistency.
    pub fn execute_tree(
        &mut self,
        clip_type: ClipType,
        fill_rule: FillRule,
        tree: &mut PolyTree,
        open: &mut Paths,
    ) -> Result<bool> {
        tree.clear();
        open.clear();
        let Some(mut out) = self.base.sweep(clip_type, fill_rule, true)? else {
            return Ok(false);
        };
        out.build_tree(self.base.reverse_solution, self.base.preserve_collinear, tree, open);
        tracing::debug!(contours = tree.len(), open = open.len(), "clip tree built");
        Ok(true)
    }
}
