use crate::error::{InvariantError, Result};
use crate::math::intersect_2d::{closest_point_on_segment, segment_intersect_point};
use crate::math::Point2;

use super::active::ActiveId;
use super::engine::Sweep;
use super::hooks::SweepHooks;

/// Above this inverse slope an edge counts as near-horizontal.
const NEAR_HORIZONTAL_DX: f64 = 100.0;

/// A pending crossing of two edges inside the current scanbeam.
#[derive(Debug, Clone, Copy)]
pub(crate) struct IntersectNode {
    pub(crate) pt: Point2,
    pub(crate) edge1: ActiveId,
    pub(crate) edge2: ActiveId,
}

impl<H: SweepHooks> Sweep<'_, H> {
    /// Finds and applies every crossing between the current bottom and
    /// `top_y`.
    pub(super) fn do_intersections(&mut self, top_y: f64) -> Result<()> {
        if self.build_intersect_list(top_y) {
            self.process_intersect_list()?;
        }
        Ok(())
    }

    fn add_new_intersect_node(&mut self, e1: ActiveId, e2: ActiveId, top_y: f64) {
        let a1 = &self.actives[e1];
        let a2 = &self.actives[e2];
        let mut ip = segment_intersect_point(&a1.bot, &a1.top, &a2.bot, &a2.top)
            .unwrap_or_else(|| Point2::new(a1.curr_x, top_y));

        if ip.y > self.current_bot_y || ip.y < top_y {
            // rounding put the point outside the scanbeam
            let abs_dx1 = a1.dx.abs();
            let abs_dx2 = a2.dx.abs();
            let project_on = if abs_dx1 > NEAR_HORIZONTAL_DX && abs_dx2 > NEAR_HORIZONTAL_DX {
                Some(if abs_dx1 > abs_dx2 { a1 } else { a2 })
            } else if abs_dx1 > NEAR_HORIZONTAL_DX {
                Some(a1)
            } else if abs_dx2 > NEAR_HORIZONTAL_DX {
                Some(a2)
            } else {
                None
            };
            match project_on {
                Some(a) => ip = closest_point_on_segment(&ip, &a.bot, &a.top),
                None => {
                    ip.y = if ip.y < top_y { top_y } else { self.current_bot_y };
                    ip.x = if abs_dx1 < abs_dx2 { a1.top_x(ip.y) } else { a2.top_x(ip.y) };
                }
            }
            ip.y = ip.y.clamp(top_y, self.current_bot_y);
        }
        self.intersects.push(IntersectNode {
            pt: ip,
            edge1: e1,
            edge2: e2,
        });
    }

    fn extract_from_sel(&mut self, e: ActiveId) -> Option<ActiveId> {
        let next = self.actives[e].next_in_sel;
        let prev = self.actives[e].prev_in_sel;
        if let Some(n) = next {
            self.actives[n].prev_in_sel = prev;
        }
        if let Some(p) = prev {
            self.actives[p].next_in_sel = next;
        }
        next
    }

    fn insert1_before2_in_sel(&mut self, e1: ActiveId, e2: ActiveId) {
        let prev = self.actives[e2].prev_in_sel;
        self.actives[e1].prev_in_sel = prev;
        if let Some(p) = prev {
            self.actives[p].next_in_sel = Some(e1);
        }
        self.actives[e1].next_in_sel = Some(e2);
        self.actives[e2].prev_in_sel = Some(e1);
    }

    fn adjust_curr_x_and_copy_to_sel(&mut self, top_y: f64) {
        self.sel = self.ael;
        let mut cursor = self.ael;
        while let Some(e) = cursor {
            let a = &mut self.actives[e];
            a.prev_in_sel = a.prev_in_ael;
            a.next_in_sel = a.next_in_ael;
            a.jump = a.next_in_sel;
            a.curr_x = a.top_x(top_y);
            cursor = a.next_in_ael;
        }
    }

    /// Sorts a copy of the AEL by X at `top_y` using a bottom-up merge
    /// sort; every inversion the sort removes is a crossing in this beam.
    fn build_intersect_list(&mut self, top_y: f64) -> bool {
        let Some(head) = self.ael else {
            return false;
        };
        if self.actives[head].next_in_ael.is_none() {
            return false;
        }
        self.adjust_curr_x_and_copy_to_sel(top_y);

        // `jump` links each run to the next run to merge
        let mut left = self.sel;
        while left.and_then(|l| self.actives[l].jump).is_some() {
            let mut prev_base: Option<ActiveId> = None;
            while let Some(l) = left {
                let Some(r_start) = self.actives[l].jump else {
                    break;
                };
                let mut curr_base = l;
                let mut right = Some(r_start);
                let mut l_end = Some(r_start);
                let r_end = self.actives[r_start].jump;
                self.actives[l].jump = r_end;
                let mut lc_opt = Some(l);
                while lc_opt != l_end && right != r_end {
                    let (Some(lc), Some(rc)) = (lc_opt, right) else {
                        break;
                    };
                    if self.actives[rc].curr_x < self.actives[lc].curr_x {
                        let mut tmp = self.actives[rc].prev_in_sel;
                        while let Some(t) = tmp {
                            self.add_new_intersect_node(t, rc, top_y);
                            if t == lc {
                                break;
                            }
                            tmp = self.actives[t].prev_in_sel;
                        }
                        right = self.extract_from_sel(rc);
                        l_end = right;
                        self.insert1_before2_in_sel(rc, lc);
                        if lc == curr_base {
                            curr_base = rc;
                            self.actives[curr_base].jump = r_end;
                            match prev_base {
                                None => self.sel = Some(curr_base),
                                Some(pb) => self.actives[pb].jump = Some(curr_base),
                            }
                        }
                    } else {
                        lc_opt = self.actives[lc].next_in_sel;
                    }
                }
                prev_base = Some(curr_base);
                left = r_end;
            }
            left = self.sel;
        }
        !self.intersects.is_empty()
    }

    fn edges_adjacent_in_ael(&self, node: &IntersectNode) -> bool {
        self.actives[node.edge1].next_in_ael == Some(node.edge2)
            || self.actives[node.edge1].prev_in_ael == Some(node.edge2)
    }

    /// Applies queued crossings bottom-up, reordering so each processed pair
    /// is adjacent in the AEL at the time it swaps.
    fn process_intersect_list(&mut self) -> Result<()> {
        self.intersects.sort_by(|a, b| {
            if a.pt.y == b.pt.y {
                a.pt.x.total_cmp(&b.pt.x)
            } else {
                b.pt.y.total_cmp(&a.pt.y)
            }
        });

        for i in 0..self.intersects.len() {
            if !self.edges_adjacent_in_ael(&self.intersects[i]) {
                let Some(j) = (i + 1..self.intersects.len()).find(|&j| self.edges_adjacent_in_ael(&self.intersects[j]))
                else {
                    tracing::warn!(remaining = self.intersects.len() - i, "no adjacent intersection");
                    return Err(InvariantError::IntersectionOrder.into());
                };
                self.intersects.swap(i, j);
            }
            let node = self.intersects[i];
            let (e1, e2) = if self.actives[node.edge1].next_in_ael == Some(node.edge2) {
                (node.edge1, node.edge2)
            } else {
                (node.edge2, node.edge1)
            };
            self.intersect_edges(e1, e2, node.pt)?;
            self.swap_positions_in_ael(e1, e2)?;
            self.actives[e1].curr_x = node.pt.x;
            self.actives[e2].curr_x = node.pt.x;
        }
        self.intersects.clear();
        Ok(())
    }
}
