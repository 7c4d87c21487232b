use crate::error::{InvariantError, Result};
use crate::math::polygon_2d::{cross_product, cross_product_sign};
use crate::math::Point2;

use super::engine::Sweep;
use super::hooks::SweepHooks;
use super::vertex::{VertexFlags, VertexId};
use super::PathType;

slotmap::new_key_type! {
    /// Unique identifier for an active edge.
    pub(crate) struct ActiveId;
}

/// An edge currently crossed by the sweep line.
///
/// Edges run from `bot` (larger Y, where the sweep meets them first) to
/// `top`. They sit in the active edge list (AEL) ordered by `curr_x`, and
/// temporarily in the sorted edge list (SEL) during intersection search or
/// while queued as horizontals.
#[derive(Debug, Clone)]
pub(crate) struct Active {
    pub(crate) bot: Point2,
    pub(crate) top: Point2,
    pub(crate) curr_x: f64,
    pub(crate) dx: f64,
    pub(crate) wind_dx: i32,
    pub(crate) wind_cnt: i32,
    pub(crate) wind_cnt2: i32,
    pub(crate) out_rec: Option<usize>,
    pub(crate) prev_in_ael: Option<ActiveId>,
    pub(crate) next_in_ael: Option<ActiveId>,
    pub(crate) prev_in_sel: Option<ActiveId>,
    pub(crate) next_in_sel: Option<ActiveId>,
    pub(crate) jump: Option<ActiveId>,
    pub(crate) vertex_top: VertexId,
    pub(crate) local_min: usize,
    pub(crate) is_left_bound: bool,
}

/// Inverse slope `dX/dY`; horizontals get an infinity whose sign encodes
/// the heading (`-inf` for left to right).
pub(crate) fn get_dx(pt1: &Point2, pt2: &Point2) -> f64 {
    let dy = pt2.y - pt1.y;
    if dy != 0.0 {
        (pt2.x - pt1.x) / dy
    } else if pt2.x > pt1.x {
        f64::NEG_INFINITY
    } else {
        f64::INFINITY
    }
}

impl Active {
    pub(crate) fn new(bot: Point2, top: Point2, vertex_top: VertexId, wind_dx: i32, local_min: usize) -> Self {
        Self {
            bot,
            top,
            curr_x: bot.x,
            dx: get_dx(&bot, &top),
            wind_dx,
            wind_cnt: 0,
            wind_cnt2: 0,
            out_rec: None,
            prev_in_ael: None,
            next_in_ael: None,
            prev_in_sel: None,
            next_in_sel: None,
            jump: None,
            vertex_top,
            local_min,
            is_left_bound: false,
        }
    }

    pub(crate) fn set_dx(&mut self) {
        self.dx = get_dx(&self.bot, &self.top);
    }

    pub(crate) fn is_horizontal(&self) -> bool {
        self.top.y == self.bot.y
    }

    pub(crate) fn is_heading_right_horz(&self) -> bool {
        self.dx == f64::NEG_INFINITY
    }

    pub(crate) fn is_heading_left_horz(&self) -> bool {
        self.dx == f64::INFINITY
    }

    /// X where the edge crosses the horizontal line at `y`.
    pub(crate) fn top_x(&self, y: f64) -> f64 {
        if y == self.top.y || self.top.x == self.bot.x {
            self.top.x
        } else if y == self.bot.y {
            self.bot.x
        } else {
            self.bot.x + self.dx * (y - self.bot.y)
        }
    }
}

impl<H: SweepHooks> Sweep<'_, H> {
    pub(super) fn is_open(&self, e: ActiveId) -> bool {
        self.minima[self.actives[e].local_min].is_open
    }

    pub(super) fn path_type(&self, e: ActiveId) -> PathType {
        self.minima[self.actives[e].local_min].path_type
    }

    pub(super) fn is_same_path_type(&self, e1: ActiveId, e2: ActiveId) -> bool {
        self.path_type(e1) == self.path_type(e2)
    }

    pub(super) fn is_hot(&self, e: ActiveId) -> bool {
        self.actives[e].out_rec.is_some()
    }

    pub(super) fn is_maxima(&self, e: ActiveId) -> bool {
        self.is_maxima_vertex(self.actives[e].vertex_top)
    }

    pub(super) fn is_maxima_vertex(&self, v: VertexId) -> bool {
        self.vertices[v].flags.intersects(VertexFlags::LOCAL_MAX)
    }

    pub(super) fn is_open_end_vertex(&self, v: VertexId) -> bool {
        self.vertices[v]
            .flags
            .intersects(VertexFlags::OPEN_START | VertexFlags::OPEN_END)
    }

    pub(super) fn is_open_end(&self, e: ActiveId) -> bool {
        self.is_open(e) && self.is_open_end_vertex(self.actives[e].vertex_top)
    }

    /// Vertex after `vertex_top` along the edge's bound.
    pub(super) fn next_vertex(&self, e: ActiveId) -> VertexId {
        let a = &self.actives[e];
        if a.wind_dx > 0 {
            self.vertices[a.vertex_top].next
        } else {
            self.vertices[a.vertex_top].prev
        }
    }

    /// Vertex two steps back from `vertex_top`, i.e. before `bot`.
    pub(super) fn prev_prev_vertex(&self, e: ActiveId) -> VertexId {
        let a = &self.actives[e];
        let v = &self.vertices[a.vertex_top];
        if a.wind_dx > 0 {
            self.vertices[v.prev].prev
        } else {
            self.vertices[v.next].next
        }
    }

    pub(super) fn local_min_pt(&self, e: ActiveId) -> Point2 {
        self.vertices[self.minima[self.actives[e].local_min].vertex].pt
    }

    pub(super) fn is_front(&self, e: ActiveId) -> bool {
        self.actives[e]
            .out_rec
            .is_some_and(|or| self.out.recs[or].front_edge == Some(e))
    }

    pub(super) fn prev_hot_edge(&self, e: ActiveId) -> Option<ActiveId> {
        let mut prev = self.actives[e].prev_in_ael;
        while let Some(p) = prev {
            if !(self.is_open(p) || !self.is_hot(p)) {
                return Some(p);
            }
            prev = self.actives[p].prev_in_ael;
        }
        None
    }

    /// The other bound ending at this edge's top vertex.
    pub(super) fn maxima_pair(&self, e: ActiveId) -> Option<ActiveId> {
        let vertex_top = self.actives[e].vertex_top;
        let mut next = self.actives[e].next_in_ael;
        while let Some(n) = next {
            if self.actives[n].vertex_top == vertex_top {
                return Some(n);
            }
            next = self.actives[n].next_in_ael;
        }
        None
    }

    /// Whether `newcomer` belongs to the right of `resident` in the AEL.
    pub(super) fn is_valid_ael_order(&self, resident: ActiveId, newcomer: ActiveId) -> bool {
        let r = &self.actives[resident];
        let n = &self.actives[newcomer];
        if n.curr_x != r.curr_x {
            return n.curr_x > r.curr_x;
        }

        // turning direction of resident.top to newcomer's line
        let d = cross_product_sign(&r.top, &n.bot, &n.top);
        if d != 0 {
            return d < 0;
        }

        // edges are collinear
        if !self.is_maxima(resident) && r.top.y > n.top.y {
            let next = self.vertices[self.next_vertex(resident)].pt;
            return cross_product_sign(&n.bot, &r.top, &next) <= 0;
        }
        if !self.is_maxima(newcomer) && n.top.y > r.top.y {
            let next = self.vertices[self.next_vertex(newcomer)].pt;
            return cross_product_sign(&n.bot, &n.top, &next) >= 0;
        }

        let y = n.bot.y;
        let newcomer_is_left = n.is_left_bound;
        if r.bot.y != y || self.local_min_pt(resident).y != y {
            return newcomer_is_left;
        }
        // resident and newcomer start at the same local minimum
        if r.is_left_bound != newcomer_is_left {
            return newcomer_is_left;
        }
        let resident_pp = self.vertices[self.prev_prev_vertex(resident)].pt;
        if cross_product(&resident_pp, &r.bot, &r.top) == 0.0 {
            return true;
        }
        let newcomer_pp = self.vertices[self.prev_prev_vertex(newcomer)].pt;
        (cross_product_sign(&resident_pp, &n.bot, &newcomer_pp) > 0) == newcomer_is_left
    }

    pub(super) fn insert_left_edge(&mut self, e: ActiveId) {
        let Some(head) = self.ael else {
            self.actives[e].prev_in_ael = None;
            self.actives[e].next_in_ael = None;
            self.ael = Some(e);
            return;
        };
        if !self.is_valid_ael_order(head, e) {
            self.actives[e].prev_in_ael = None;
            self.actives[e].next_in_ael = Some(head);
            self.actives[head].prev_in_ael = Some(e);
            self.ael = Some(e);
            return;
        }
        let mut e2 = head;
        while let Some(n) = self.actives[e2].next_in_ael {
            if !self.is_valid_ael_order(n, e) {
                break;
            }
            e2 = n;
        }
        let next = self.actives[e2].next_in_ael;
        self.actives[e].next_in_ael = next;
        if let Some(n) = next {
            self.actives[n].prev_in_ael = Some(e);
        }
        self.actives[e].prev_in_ael = Some(e2);
        self.actives[e2].next_in_ael = Some(e);
    }

    pub(super) fn insert_right_edge(&mut self, e: ActiveId, e2: ActiveId) {
        let next = self.actives[e].next_in_ael;
        self.actives[e2].next_in_ael = next;
        if let Some(n) = next {
            self.actives[n].prev_in_ael = Some(e2);
        }
        self.actives[e2].prev_in_ael = Some(e);
        self.actives[e].next_in_ael = Some(e2);
    }

    /// Unlinks `e` from the AEL. The edge stays in the arena so stale
    /// references from output regions remain valid keys.
    pub(super) fn delete_from_ael(&mut self, e: ActiveId) {
        let prev = self.actives[e].prev_in_ael;
        let next = self.actives[e].next_in_ael;
        if prev.is_none() && next.is_none() && self.ael != Some(e) {
            return;
        }
        match prev {
            Some(p) => self.actives[p].next_in_ael = next,
            None => self.ael = next,
        }
        if let Some(n) = next {
            self.actives[n].prev_in_ael = prev;
        }
        self.actives[e].prev_in_ael = None;
        self.actives[e].next_in_ael = None;
    }

    /// Swaps `e1` with its right neighbour `e2`.
    pub(super) fn swap_positions_in_ael(&mut self, e1: ActiveId, e2: ActiveId) -> Result<()> {
        if self.actives[e1].next_in_ael != Some(e2) {
            tracing::warn!("swap requested for non-adjacent active edges");
            return Err(InvariantError::NonAdjacentSwap.into());
        }
        let next = self.actives[e2].next_in_ael;
        if let Some(n) = next {
            self.actives[n].prev_in_ael = Some(e1);
        }
        let prev = self.actives[e1].prev_in_ael;
        if let Some(p) = prev {
            self.actives[p].next_in_ael = Some(e2);
        }
        self.actives[e2].prev_in_ael = prev;
        self.actives[e2].next_in_ael = Some(e1);
        self.actives[e1].prev_in_ael = Some(e2);
        self.actives[e1].next_in_ael = next;
        if self.actives[e2].prev_in_ael.is_none() {
            self.ael = Some(e2);
        }
        Ok(())
    }

    pub(super) fn push_horz(&mut self, e: ActiveId) {
        self.actives[e].next_in_sel = self.sel;
        self.sel = Some(e);
    }

    pub(super) fn pop_horz(&mut self) -> Option<ActiveId> {
        let e = self.sel?;
        self.sel = self.actives[e].next_in_sel;
        Some(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dx_of_horizontals_encodes_heading() {
        let a = Point2::new(0.0, 1.0);
        let b = Point2::new(3.0, 1.0);
        assert_eq!(get_dx(&a, &b), f64::NEG_INFINITY);
        assert_eq!(get_dx(&b, &a), f64::INFINITY);
        assert!((get_dx(&Point2::new(0.0, 0.0), &Point2::new(2.0, 4.0)) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn top_x_interpolates_between_ends() {
        let key = slotmap::SlotMap::<VertexId, ()>::with_key().insert(());
        let edge = Active::new(Point2::new(0.0, 4.0), Point2::new(4.0, 0.0), key, 1, 0);
        assert!((edge.top_x(2.0) - 2.0).abs() < 1e-12);
        assert!((edge.top_x(0.0) - 4.0).abs() < 1e-12);
        assert!((edge.top_x(4.0)).abs() < 1e-12);
        assert!(!edge.is_horizontal());
    }
}
