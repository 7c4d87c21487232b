use slotmap::SlotMap;
use tracing::{debug, trace};

use crate::error::Result;
use crate::math::Point2;

use super::active::{Active, ActiveId};
use super::hooks::SweepHooks;
use super::intersect::IntersectNode;
use super::out_rec::OutputStore;
use super::scanline::ScanlineQueue;
use super::vertex::{LocalMinima, Vertex, VertexFlags, VertexId, VertexList};
use super::{ClipType, FillRule};

/// Settings for one sweep.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SweepOptions {
    pub(crate) clip_type: ClipType,
    pub(crate) fill_rule: FillRule,
    pub(crate) preserve_collinear: bool,
    pub(crate) using_polytree: bool,
}

/// State of one sweep over a [`VertexList`].
///
/// A sweep borrows the input and the hooks for its whole lifetime, so no
/// path can be added while it runs. Every scratch structure is owned here
/// and released when the sweep is dropped, whether it finished or failed.
pub(crate) struct Sweep<'a, H: SweepHooks> {
    pub(super) vertices: &'a SlotMap<VertexId, Vertex>,
    pub(super) minima: &'a [LocalMinima],
    pub(super) hooks: &'a mut H,
    pub(super) clip_type: ClipType,
    pub(super) fill_rule: FillRule,
    pub(super) preserve_collinear: bool,
    pub(super) using_polytree: bool,
    pub(super) has_open_paths: bool,
    pub(super) actives: SlotMap<ActiveId, Active>,
    /// Leftmost edge of the active edge list.
    pub(super) ael: Option<ActiveId>,
    /// Head of the sorted edge list, doubling as the horizontal queue.
    pub(super) sel: Option<ActiveId>,
    pub(super) scanlines: ScanlineQueue,
    pub(super) intersects: Vec<IntersectNode>,
    pub(super) out: OutputStore,
    pub(super) current_bot_y: f64,
    current_loc_min: usize,
}

impl<'a, H: SweepHooks> Sweep<'a, H> {
    /// `input` must have its minima sorted.
    pub(crate) fn new(input: &'a VertexList, hooks: &'a mut H, options: SweepOptions) -> Self {
        Self {
            vertices: input.vertices(),
            minima: input.minima(),
            hooks,
            clip_type: options.clip_type,
            fill_rule: options.fill_rule,
            preserve_collinear: options.preserve_collinear,
            using_polytree: options.using_polytree,
            has_open_paths: input.has_open_paths(),
            actives: SlotMap::with_key(),
            ael: None,
            sel: None,
            scanlines: ScanlineQueue::default(),
            intersects: Vec::new(),
            out: OutputStore::default(),
            current_bot_y: 0.0,
            current_loc_min: 0,
        }
    }

    /// Hands over the output regions built by [`Sweep::execute`].
    pub(crate) fn into_output(self) -> OutputStore {
        self.out
    }

    /// Runs the sweep from the largest Y to the smallest.
    ///
    /// # Errors
    ///
    /// Returns an invariant error if the edge lists become inconsistent.
    pub(crate) fn execute(&mut self) -> Result<()> {
        self.hooks.reset();
        let minima = self.minima;
        for lm in minima {
            self.scanlines.insert(self.vertices[lm.vertex].pt.y);
        }
        let Some(mut y) = self.scanlines.pop() else {
            return Ok(());
        };
        let mut beams = 0_usize;
        loop {
            self.insert_local_minima_into_ael(y)?;
            while let Some(horz) = self.pop_horz() {
                self.do_horizontal(horz)?;
            }
            self.current_bot_y = y;
            let Some(top) = self.scanlines.pop() else {
                break;
            };
            y = top;
            trace!(bot = self.current_bot_y, top = y, "scanbeam");
            self.do_intersections(y)?;
            self.do_top_of_scanbeam(y)?;
            while let Some(horz) = self.pop_horz() {
                self.do_horizontal(horz)?;
            }
            beams += 1;
        }
        debug!(
            clip_type = ?self.clip_type,
            fill_rule = ?self.fill_rule,
            minima = self.minima.len(),
            scanbeams = beams,
            edges = self.actives.len(),
            out_recs = self.out.recs.len(),
            "sweep finished"
        );
        Ok(())
    }

    fn new_bound(&mut self, lm_idx: usize, wind_dx: i32) -> ActiveId {
        let v = &self.vertices[self.minima[lm_idx].vertex];
        let vertex_top = if wind_dx < 0 { v.prev } else { v.next };
        let top = self.vertices[vertex_top].pt;
        self.actives
            .insert(Active::new(v.pt, top, vertex_top, wind_dx, lm_idx))
    }

    /// Inserts both bounds of every local minimum at `bot_y`, opening output
    /// regions where they contribute.
    fn insert_local_minima_into_ael(&mut self, bot_y: f64) -> Result<()> {
        while let Some(&lm) = self.minima.get(self.current_loc_min) {
            let bot = self.vertices[lm.vertex].pt;
            if bot.y != bot_y {
                break;
            }
            let lm_idx = self.current_loc_min;
            self.current_loc_min += 1;
            let flags = self.vertices[lm.vertex].flags;

            let mut left = (!flags.intersects(VertexFlags::OPEN_START)).then(|| self.new_bound(lm_idx, -1));
            let mut right = (!flags.intersects(VertexFlags::OPEN_END)).then(|| self.new_bound(lm_idx, 1));

            // left and right bounds are only provisional
            match (left, right) {
                (Some(l), Some(r)) => {
                    let (la, ra) = (&self.actives[l], &self.actives[r]);
                    let swap = if la.is_horizontal() {
                        la.is_heading_right_horz()
                    } else if ra.is_horizontal() {
                        ra.is_heading_left_horz()
                    } else {
                        la.dx < ra.dx
                    };
                    if swap {
                        std::mem::swap(&mut left, &mut right);
                    }
                }
                (None, Some(_)) => {
                    left = right.take();
                }
                _ => {}
            }
            let Some(left) = left else {
                continue;
            };

            self.actives[left].is_left_bound = true;
            self.insert_left_edge(left);

            let contributing = if self.is_open(left) {
                self.set_wind_count_for_open_path_edge(left);
                self.is_contributing_open(left)
            } else {
                self.set_wind_count_for_closed_path_edge(left);
                self.is_contributing_closed(left)
            };

            if let Some(right) = right {
                self.actives[right].wind_cnt = self.actives[left].wind_cnt;
                self.actives[right].wind_cnt2 = self.actives[left].wind_cnt2;
                self.insert_right_edge(left, right);

                if contributing {
                    self.add_local_min_poly(left, right, bot, true);
                }

                while let Some(next) = self.actives[right].next_in_ael {
                    if !self.is_valid_ael_order(next, right) {
                        break;
                    }
                    self.intersect_edges(right, next, bot)?;
                    self.swap_positions_in_ael(right, next)?;
                }

                if self.actives[right].is_horizontal() {
                    self.push_horz(right);
                } else {
                    self.scanlines.insert(self.actives[right].top.y);
                }
            } else if contributing {
                self.start_open_path(left, bot);
            }

            if self.actives[left].is_horizontal() {
                self.push_horz(left);
            } else {
                self.scanlines.insert(self.actives[left].top.y);
            }
        }
        Ok(())
    }

    /// Advances `e` to the next segment of its bound.
    pub(super) fn update_edge_into_ael(&mut self, e: ActiveId) {
        let next_vertex = self.next_vertex(e);
        let top = self.vertices[next_vertex].pt;
        let a = &mut self.actives[e];
        a.bot = a.top;
        a.vertex_top = next_vertex;
        a.top = top;
        a.curr_x = a.bot.x;
        a.set_dx();
        let is_horz = a.is_horizontal();
        let top_y = a.top.y;
        if is_horz {
            if !self.is_open(e) {
                self.trim_horz(e);
            }
            return;
        }
        self.scanlines.insert(top_y);
    }

    fn do_top_of_scanbeam(&mut self, y: f64) -> Result<()> {
        // the SEL is reused as the horizontal queue
        self.sel = None;
        let mut cursor = self.ael;
        while let Some(e) = cursor {
            if self.actives[e].top.y == y {
                self.actives[e].curr_x = self.actives[e].top.x;
                if self.is_maxima(e) {
                    // the maxima pair and its neighbours may be removed
                    cursor = self.do_maxima(e)?;
                    continue;
                }
                if self.is_hot(e) {
                    let top = self.actives[e].top;
                    self.add_out_pt(e, top);
                }
                self.update_edge_into_ael(e);
                if self.actives[e].is_horizontal() {
                    self.push_horz(e);
                }
            } else {
                self.actives[e].curr_x = self.actives[e].top_x(y);
            }
            cursor = self.actives[e].next_in_ael;
        }
        Ok(())
    }

    /// Closes or merges the regions at a local maximum and removes both
    /// bounds. Returns the edge where the scan should continue.
    fn do_maxima(&mut self, e: ActiveId) -> Result<Option<ActiveId>> {
        let prev_e = self.actives[e].prev_in_ael;
        let mut next_e = self.actives[e].next_in_ael;
        let top: Point2 = self.actives[e].top;

        if self.is_open_end(e) {
            if self.is_hot(e) {
                self.add_out_pt(e, top);
            }
            if !self.actives[e].is_horizontal() {
                if self.is_hot(e) {
                    self.detach_from_out_rec(e);
                }
                self.delete_from_ael(e);
            }
            return Ok(next_e);
        }

        let Some(max_pair) = self.maxima_pair(e) else {
            // the pair is a horizontal still queued
            return Ok(next_e);
        };

        // edges between the pair cross both bounds at the maximum
        while let Some(n) = next_e {
            if n == max_pair {
                break;
            }
            self.intersect_edges(e, n, top)?;
            self.swap_positions_in_ael(e, n)?;
            next_e = self.actives[e].next_in_ael;
        }

        if self.is_hot(e) {
            self.add_local_max_poly(e, max_pair, top)?;
        }
        self.delete_from_ael(e);
        self.delete_from_ael(max_pair);

        Ok(match prev_e {
            Some(p) => self.actives[p].next_in_ael,
            None => self.ael,
        })
    }

    pub(super) fn detach_from_out_rec(&mut self, e: ActiveId) {
        let Some(or) = self.actives[e].out_rec.take() else {
            return;
        };
        let rec = &mut self.out.recs[or];
        if rec.front_edge == Some(e) {
            rec.front_edge = None;
        } else {
            rec.back_edge = None;
        }
    }
}
