use crate::error::{InvariantError, Result};
use crate::math::Point2;

use super::active::ActiveId;
use super::engine::Sweep;
use super::hooks::SweepHooks;
use super::out_rec::{OutPtId, OutRecKind};
use super::{ClipType, FillRule, PathType};

impl<H: SweepHooks> Sweep<'_, H> {
    fn new_out_rec(&mut self) -> usize {
        let idx = self.out.new_out_rec();
        self.hooks.out_rec_created(idx);
        idx
    }

    fn set_sides(&mut self, out_rec: usize, start_edge: ActiveId, end_edge: ActiveId) {
        let rec = &mut self.out.recs[out_rec];
        rec.front_edge = Some(start_edge);
        rec.back_edge = Some(end_edge);
    }

    fn swap_front_back_sides(&mut self, out_rec: usize) {
        let rec = &mut self.out.recs[out_rec];
        std::mem::swap(&mut rec.front_edge, &mut rec.back_edge);
        if let Some(op) = rec.pts {
            rec.pts = Some(self.out.pts[op].next);
        }
    }

    /// Releases both bounding edges of the region `e` contributes to.
    fn uncouple_out_rec(&mut self, e: ActiveId) {
        let Some(or) = self.actives[e].out_rec else {
            return;
        };
        let rec = &mut self.out.recs[or];
        let (front, back) = (rec.front_edge.take(), rec.back_edge.take());
        for edge in [front, back].into_iter().flatten() {
            self.actives[edge].out_rec = None;
        }
    }

    /// Appends `pt` to the end of the region ring that `e` bounds, skipping
    /// it when it repeats that end's current point.
    pub(super) fn add_out_pt(&mut self, e: ActiveId, pt: Point2) -> Option<OutPtId> {
        let or = self.actives[e].out_rec?;
        let to_front = self.is_front(e);
        let op_front = self.out.recs[or].pts?;
        let op_back = self.out.pts[op_front].next;

        if to_front && pt == self.out.pts[op_front].pt {
            return Some(op_front);
        }
        if !to_front && pt == self.out.pts[op_back].pt {
            return Some(op_back);
        }

        let new_op = self.out.new_out_pt(pt);
        self.out.pts[op_back].prev = new_op;
        self.out.pts[new_op].prev = op_front;
        self.out.pts[new_op].next = op_back;
        self.out.pts[op_front].next = new_op;
        if to_front {
            self.out.recs[or].pts = Some(new_op);
        }
        Some(new_op)
    }

    pub(super) fn start_open_path(&mut self, e: ActiveId, pt: Point2) -> OutPtId {
        let or = self.new_out_rec();
        self.out.recs[or].kind = OutRecKind::Open;
        if self.actives[e].wind_dx > 0 {
            self.out.recs[or].front_edge = Some(e);
        } else {
            self.out.recs[or].back_edge = Some(e);
        }
        self.actives[e].out_rec = Some(or);
        let op = self.out.new_out_pt(pt);
        self.out.recs[or].pts = Some(op);
        self.hooks.local_min_poly(or, OutRecKind::Open, None);
        op
    }

    /// Opens a region bounded by `e1` and `e2`.
    ///
    /// The front edge always has the region's interior on its right, so the
    /// nearest hot edge to the left decides whether this is a hole.
    pub(super) fn add_local_min_poly(&mut self, e1: ActiveId, e2: ActiveId, pt: Point2, is_new: bool) -> OutPtId {
        let or = self.new_out_rec();
        self.actives[e1].out_rec = Some(or);
        self.actives[e2].out_rec = Some(or);

        let mut owner = None;
        let kind = if self.is_open(e1) {
            if self.actives[e1].wind_dx > 0 {
                self.set_sides(or, e1, e2);
            } else {
                self.set_sides(or, e2, e1);
            }
            OutRecKind::Open
        } else if let Some(prev_hot) = self.prev_hot_edge(e1) {
            let ascending = self.is_front(prev_hot);
            if let Some(prev_or) = self.actives[prev_hot].out_rec {
                self.out.set_owner(or, prev_or);
                owner = Some(prev_or);
            }
            if ascending == is_new {
                self.set_sides(or, e2, e1);
            } else {
                self.set_sides(or, e1, e2);
            }
            if ascending {
                OutRecKind::Inner
            } else {
                OutRecKind::Outer
            }
        } else {
            if is_new {
                self.set_sides(or, e1, e2);
            } else {
                self.set_sides(or, e2, e1);
            }
            OutRecKind::Outer
        };
        self.out.recs[or].kind = kind;

        let op = self.out.new_out_pt(pt);
        self.out.recs[or].pts = Some(op);
        self.hooks.local_min_poly(or, kind, owner);
        op
    }

    /// Closes the regions of two meeting edges: seals the ring when both
    /// bound the same region, otherwise splices the two rings together.
    ///
    /// # Errors
    ///
    /// Returns an invariant error if either edge is cold, or both edges sit
    /// on the same side of their regions.
    pub(super) fn add_local_max_poly(&mut self, e1: ActiveId, e2: ActiveId, pt: Point2) -> Result<Option<OutPtId>> {
        let Some(or1) = self.actives[e1].out_rec else {
            tracing::warn!("local maximum reached on a cold edge");
            return Err(InvariantError::ColdEdgeClose.into());
        };
        let Some(or2) = self.actives[e2].out_rec else {
            if self.is_open(e1) {
                // only one side of an open path was contributing
                let op = self.add_out_pt(e1, pt);
                self.detach_from_out_rec(e1);
                return Ok(op);
            }
            tracing::warn!("local maximum reached on a cold edge");
            return Err(InvariantError::ColdEdgeClose.into());
        };

        if self.is_front(e1) == self.is_front(e2) {
            if self.is_open_end(e1) {
                self.swap_front_back_sides(or1);
            } else if self.is_open_end(e2) {
                self.swap_front_back_sides(or2);
            } else {
                tracing::warn!(or1, or2, "local maximum edges on the same side");
                return Err(InvariantError::MismatchedSides.into());
            }
        }

        let result = self.add_out_pt(e1, pt);
        if or1 == or2 {
            self.out.recs[or1].pts = result;
            if self.using_polytree {
                match self.prev_hot_edge(e1).and_then(|e| self.actives[e].out_rec) {
                    Some(owner) => self.out.set_owner(or1, owner),
                    None => self.out.recs[or1].owner = None,
                }
            }
            self.uncouple_out_rec(e1);
            self.hooks.local_max_poly(or1, None);
        } else if self.is_open(e1) {
            if self.actives[e1].wind_dx < 0 {
                self.join_outrec_paths(e1, e2);
            } else {
                self.join_outrec_paths(e2, e1);
            }
        } else if or1 < or2 {
            self.join_outrec_paths(e1, e2);
        } else {
            self.join_outrec_paths(e2, e1);
        }
        Ok(result)
    }

    /// Splices the ring of `e2`'s region onto `e1`'s and retires `e2`'s.
    fn join_outrec_paths(&mut self, e1: ActiveId, e2: ActiveId) {
        let (Some(or1), Some(or2)) = (self.actives[e1].out_rec, self.actives[e2].out_rec) else {
            return;
        };
        let (Some(p1_start), Some(p2_start)) = (self.out.recs[or1].pts, self.out.recs[or2].pts) else {
            return;
        };
        let p1_end = self.out.pts[p1_start].next;
        let p2_end = self.out.pts[p2_start].next;

        if self.is_front(e1) {
            self.out.pts[p2_end].prev = p1_start;
            self.out.pts[p1_start].next = p2_end;
            self.out.pts[p2_start].next = p1_end;
            self.out.pts[p1_end].prev = p2_start;
            self.out.recs[or1].pts = Some(p2_start);
            let front = self.out.recs[or2].front_edge;
            self.out.recs[or1].front_edge = front;
            if let Some(f) = front {
                self.actives[f].out_rec = Some(or1);
            }
        } else {
            self.out.pts[p1_end].prev = p2_start;
            self.out.pts[p2_start].next = p1_end;
            self.out.pts[p1_start].next = p2_end;
            self.out.pts[p2_end].prev = p1_start;
            let back = self.out.recs[or2].back_edge;
            self.out.recs[or1].back_edge = back;
            if let Some(b) = back {
                self.actives[b].out_rec = Some(or1);
            }
        }

        let rec2 = &mut self.out.recs[or2];
        rec2.front_edge = None;
        rec2.back_edge = None;
        rec2.pts = None;
        self.out.set_owner(or2, or1);

        if self.is_open_end(e1) {
            self.out.recs[or2].pts = self.out.recs[or1].pts;
            self.out.recs[or1].pts = None;
        }

        self.actives[e1].out_rec = None;
        self.actives[e2].out_rec = None;
        self.hooks.local_max_poly(or1, Some(or2));
    }

    fn swap_outrecs(&mut self, e1: ActiveId, e2: ActiveId) {
        let or1 = self.actives[e1].out_rec;
        let or2 = self.actives[e2].out_rec;
        if or1 == or2 {
            if let Some(or) = or1 {
                let rec = &mut self.out.recs[or];
                std::mem::swap(&mut rec.front_edge, &mut rec.back_edge);
            }
            return;
        }
        if let Some(or) = or1 {
            let rec = &mut self.out.recs[or];
            if rec.front_edge == Some(e1) {
                rec.front_edge = Some(e2);
            } else {
                rec.back_edge = Some(e2);
            }
        }
        if let Some(or) = or2 {
            let rec = &mut self.out.recs[or];
            if rec.front_edge == Some(e2) {
                rec.front_edge = Some(e1);
            } else {
                rec.back_edge = Some(e1);
            }
        }
        self.actives[e1].out_rec = or2;
        self.actives[e2].out_rec = or1;
    }

    fn find_edge_with_matching_loc_min(&self, e: ActiveId) -> Option<ActiveId> {
        let lm = self.actives[e].local_min;
        let bot = self.actives[e].bot;
        for forward in [true, false] {
            let step = |x: ActiveId| {
                if forward {
                    self.actives[x].next_in_ael
                } else {
                    self.actives[x].prev_in_ael
                }
            };
            let mut cursor = step(e);
            while let Some(x) = cursor {
                let a = &self.actives[x];
                if a.local_min == lm {
                    return Some(x);
                }
                if !a.is_horizontal() && a.bot != bot {
                    break;
                }
                cursor = step(x);
            }
        }
        None
    }

    /// Processes two edges crossing at `pt`, with `e1` currently left of
    /// `e2`: updates their winding counts and opens, extends or closes
    /// output regions accordingly.
    pub(super) fn intersect_edges(&mut self, e1: ActiveId, e2: ActiveId, pt: Point2) -> Result<()> {
        if self.has_open_paths && (self.is_open(e1) || self.is_open(e2)) {
            self.intersect_open_edge(e1, e2, pt);
            return Ok(());
        }

        // update winding counts, assuming e1 moves to the right of e2
        if self.is_same_path_type(e1, e2) {
            if self.fill_rule == FillRule::EvenOdd {
                let wc1 = self.actives[e1].wind_cnt;
                self.actives[e1].wind_cnt = self.actives[e2].wind_cnt;
                self.actives[e2].wind_cnt = wc1;
            } else {
                let (dx1, dx2) = (self.actives[e1].wind_dx, self.actives[e2].wind_dx);
                let a1 = &mut self.actives[e1];
                // a count that would reach zero is negated instead
                if a1.wind_cnt + dx2 == 0 {
                    a1.wind_cnt = -a1.wind_cnt;
                } else {
                    a1.wind_cnt += dx2;
                }
                let a2 = &mut self.actives[e2];
                if a2.wind_cnt - dx1 == 0 {
                    a2.wind_cnt = -a2.wind_cnt;
                } else {
                    a2.wind_cnt -= dx1;
                }
            }
        } else if self.fill_rule == FillRule::EvenOdd {
            let a1 = &mut self.actives[e1];
            a1.wind_cnt2 = i32::from(a1.wind_cnt2 == 0);
            let a2 = &mut self.actives[e2];
            a2.wind_cnt2 = i32::from(a2.wind_cnt2 == 0);
        } else {
            let (dx1, dx2) = (self.actives[e1].wind_dx, self.actives[e2].wind_dx);
            self.actives[e1].wind_cnt2 += dx2;
            self.actives[e2].wind_cnt2 -= dx1;
        }

        let fill_rule = self.fill_rule;
        let normalize = move |wc: i32| match fill_rule {
            FillRule::Positive => wc,
            FillRule::Negative => -wc,
            FillRule::EvenOdd | FillRule::NonZero => wc.abs(),
        };
        let wc1 = normalize(self.actives[e1].wind_cnt);
        let wc2 = normalize(self.actives[e2].wind_cnt);
        let e1_in_01 = wc1 == 0 || wc1 == 1;
        let e2_in_01 = wc2 == 0 || wc2 == 1;

        let (hot1, hot2) = (self.is_hot(e1), self.is_hot(e2));
        if (!hot1 && !e1_in_01) || (!hot2 && !e2_in_01) {
            return Ok(());
        }

        if hot1 && hot2 {
            if !e1_in_01
                || !e2_in_01
                || (!self.is_same_path_type(e1, e2) && self.clip_type != ClipType::Xor)
            {
                self.add_local_max_poly(e1, e2, pt)?;
            } else if self.is_front(e1) || self.actives[e1].out_rec == self.actives[e2].out_rec {
                // split regions that only touch at this vertex
                self.add_local_max_poly(e1, e2, pt)?;
                self.add_local_min_poly(e1, e2, pt, false);
            } else {
                self.add_out_pt(e1, pt);
                self.add_out_pt(e2, pt);
                self.swap_outrecs(e1, e2);
            }
        } else if hot1 {
            self.add_out_pt(e1, pt);
            self.swap_outrecs(e1, e2);
        } else if hot2 {
            self.add_out_pt(e2, pt);
            self.swap_outrecs(e1, e2);
        } else {
            let other1 = normalize(self.actives[e1].wind_cnt2);
            let other2 = normalize(self.actives[e2].wind_cnt2);
            if !self.is_same_path_type(e1, e2) {
                self.add_local_min_poly(e1, e2, pt, false);
            } else if wc1 == 1 && wc2 == 1 {
                let opens = match self.clip_type {
                    ClipType::Union => other1 <= 0 || other2 <= 0,
                    ClipType::Difference => match self.path_type(e1) {
                        PathType::Clip => other1 > 0 && other2 > 0,
                        PathType::Subject => other1 <= 0 && other2 <= 0,
                    },
                    ClipType::Xor => true,
                    ClipType::Intersection => other1 > 0 && other2 > 0,
                };
                if opens {
                    self.add_local_min_poly(e1, e2, pt, false);
                }
            }
        }
        Ok(())
    }

    /// An open edge crossing a closed one toggles whether it contributes.
    fn intersect_open_edge(&mut self, e1: ActiveId, e2: ActiveId, pt: Point2) {
        if self.is_open(e1) && self.is_open(e2) {
            return;
        }
        let (open, closed) = if self.is_open(e2) { (e2, e1) } else { (e1, e2) };

        if self.clip_type == ClipType::Union {
            if !self.is_hot(closed) {
                return;
            }
        } else if self.path_type(closed) == PathType::Subject {
            return;
        }
        let wc = self.actives[closed].wind_cnt;
        let bounds_region = match self.fill_rule {
            FillRule::Positive => wc == 1,
            FillRule::Negative => wc == -1,
            FillRule::EvenOdd | FillRule::NonZero => wc.abs() == 1,
        };
        if !bounds_region {
            return;
        }

        if self.is_hot(open) {
            self.add_out_pt(open, pt);
            self.detach_from_out_rec(open);
            return;
        }
        let lm_vertex = self.minima[self.actives[open].local_min].vertex;
        if pt == self.vertices[lm_vertex].pt && !self.is_open_end_vertex(lm_vertex) {
            // horizontals can pass under open paths at a local minimum
            if let Some(other) = self.find_edge_with_matching_loc_min(open) {
                if let Some(or) = self.actives[other].out_rec {
                    self.actives[open].out_rec = Some(or);
                    if self.actives[open].wind_dx > 0 {
                        self.set_sides(or, open, other);
                    } else {
                        self.set_sides(or, other, open);
                    }
                    return;
                }
            }
        }
        self.start_open_path(open, pt);
    }
}
