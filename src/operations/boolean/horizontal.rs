use crate::error::Result;
use crate::math::Point2;

use super::active::ActiveId;
use super::engine::Sweep;
use super::hooks::SweepHooks;
use super::vertex::{VertexFlags, VertexId};

impl<H: SweepHooks> Sweep<'_, H> {
    /// Last vertex of the run of same-Y vertices ahead of `e`, if that run
    /// ends in a local maximum. Open path ends stop the run.
    fn curr_y_maxima_vertex_open(&self, e: ActiveId) -> Option<VertexId> {
        let a = &self.actives[e];
        let mut result = a.vertex_top;
        let stop = VertexFlags::OPEN_END | VertexFlags::LOCAL_MAX;
        loop {
            let v = &self.vertices[result];
            let next = if a.wind_dx > 0 { v.next } else { v.prev };
            if self.vertices[next].pt.y != v.pt.y || v.flags.intersects(stop) {
                break;
            }
            result = next;
        }
        self.is_maxima_vertex(result).then_some(result)
    }

    fn curr_y_maxima_vertex(&self, e: ActiveId) -> Option<VertexId> {
        let a = &self.actives[e];
        let mut result = a.vertex_top;
        loop {
            let v = &self.vertices[result];
            let next = if a.wind_dx > 0 { v.next } else { v.prev };
            if self.vertices[next].pt.y != v.pt.y {
                break;
            }
            result = next;
        }
        self.is_maxima_vertex(result).then_some(result)
    }

    /// Merges consecutive horizontal segments into `horz`.
    ///
    /// With `preserve_collinear` set, a segment that doubles back is kept
    /// separate.
    pub(super) fn trim_horz(&mut self, horz: ActiveId) {
        let mut was_trimmed = false;
        let mut pt = self.vertices[self.next_vertex(horz)].pt;
        while pt.y == self.actives[horz].top.y {
            let a = &self.actives[horz];
            if self.preserve_collinear && (pt.x < a.top.x) != (a.bot.x < a.top.x) {
                break;
            }
            let next = self.next_vertex(horz);
            let a = &mut self.actives[horz];
            a.vertex_top = next;
            a.top = pt;
            was_trimmed = true;
            if self.is_maxima(horz) {
                break;
            }
            pt = self.vertices[self.next_vertex(horz)].pt;
        }
        if was_trimmed {
            self.actives[horz].set_dx();
        }
    }

    /// Direction of travel and the X span the horizontal covers.
    fn reset_horz_direction(&self, horz: ActiveId, vertex_max: Option<VertexId>) -> (bool, f64, f64) {
        let h = &self.actives[horz];
        if h.bot.x == h.top.x {
            // the horizontal has collapsed to a point
            let mut cursor = h.next_in_ael;
            while let Some(e) = cursor {
                if Some(self.actives[e].vertex_top) == vertex_max {
                    break;
                }
                cursor = self.actives[e].next_in_ael;
            }
            return (cursor.is_some(), h.curr_x, h.curr_x);
        }
        if h.curr_x < h.top.x {
            (true, h.curr_x, h.top.x)
        } else {
            (false, h.top.x, h.curr_x)
        }
    }

    /// Moves a horizontal edge across the edges it spans, intersecting each.
    ///
    /// Consecutive horizontals of one bound are handled in a single call. A
    /// horizontal that ends at a local maximum closes its region against the
    /// other bound of that maximum.
    pub(super) fn do_horizontal(&mut self, horz: ActiveId) -> Result<()> {
        let horz_is_open = self.is_open(horz);
        let y = self.actives[horz].bot.y;

        let vertex_max = if horz_is_open {
            self.curr_y_maxima_vertex_open(horz)
        } else {
            self.curr_y_maxima_vertex(horz)
        };
        if let Some(vm) = vertex_max {
            if !horz_is_open && vm != self.actives[horz].vertex_top {
                self.trim_horz(horz);
            }
        }

        let (mut left_to_right, mut left_x, mut right_x) = self.reset_horz_direction(horz, vertex_max);

        if self.is_hot(horz) {
            let curr_x = self.actives[horz].curr_x;
            self.add_out_pt(horz, Point2::new(curr_x, y));
        }

        loop {
            let mut cursor = if left_to_right {
                self.actives[horz].next_in_ael
            } else {
                self.actives[horz].prev_in_ael
            };

            while let Some(e) = cursor {
                if Some(self.actives[e].vertex_top) == vertex_max {
                    // reached the other bound of this maximum
                    if self.is_hot(horz) {
                        while Some(self.actives[horz].vertex_top) != vertex_max {
                            let top = self.actives[horz].top;
                            self.add_out_pt(horz, top);
                            self.update_edge_into_ael(horz);
                        }
                        let top = self.actives[horz].top;
                        if left_to_right {
                            self.add_local_max_poly(horz, e, top)?;
                        } else {
                            self.add_local_max_poly(e, horz, top)?;
                        }
                    }
                    self.delete_from_ael(e);
                    self.delete_from_ael(horz);
                    return Ok(());
                }

                // intersections past the horizontal's end wait for the next
                // segment unless that end is the maximum
                if vertex_max != Some(self.actives[horz].vertex_top) || self.is_open_end(horz) {
                    let a = &self.actives[e];
                    if (left_to_right && a.curr_x > right_x) || (!left_to_right && a.curr_x < left_x) {
                        break;
                    }
                    if a.curr_x == self.actives[horz].top.x && !a.is_horizontal() {
                        let pt = self.vertices[self.next_vertex(horz)].pt;
                        let tx = a.top_x(pt.y);
                        if self.is_open(e) && !self.is_same_path_type(e, horz) && !self.is_hot(e) {
                            if (left_to_right && tx > pt.x) || (!left_to_right && tx < pt.x) {
                                break;
                            }
                        } else if (left_to_right && tx >= pt.x) || (!left_to_right && tx <= pt.x) {
                            break;
                        }
                    }
                }

                let pt = Point2::new(self.actives[e].curr_x, y);
                if left_to_right {
                    self.intersect_edges(horz, e, pt)?;
                    self.swap_positions_in_ael(horz, e)?;
                    self.actives[horz].curr_x = self.actives[e].curr_x;
                    cursor = self.actives[horz].next_in_ael;
                } else {
                    self.intersect_edges(e, horz, pt)?;
                    self.swap_positions_in_ael(e, horz)?;
                    self.actives[horz].curr_x = self.actives[e].curr_x;
                    cursor = self.actives[horz].prev_in_ael;
                }
            }

            if horz_is_open && self.is_open_end(horz) {
                if self.is_hot(horz) {
                    let top = self.actives[horz].top;
                    self.add_out_pt(horz, top);
                    self.detach_from_out_rec(horz);
                }
                self.delete_from_ael(horz);
                return Ok(());
            }
            if self.vertices[self.next_vertex(horz)].pt.y != self.actives[horz].top.y {
                break;
            }

            // still horizontal: continue along the next segment
            if self.is_hot(horz) {
                let top = self.actives[horz].top;
                self.add_out_pt(horz, top);
            }
            self.update_edge_into_ael(horz);
            (left_to_right, left_x, right_x) = self.reset_horz_direction(horz, vertex_max);
        }

        if self.is_hot(horz) {
            let top = self.actives[horz].top;
            self.add_out_pt(horz, top);
        }
        self.update_edge_into_ael(horz);
        Ok(())
    }
}
