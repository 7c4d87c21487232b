use slotmap::SlotMap;

use crate::geometry::PolyTree;
use crate::math::polygon_2d::{cross_product, dot_product, path_inside_path, signed_area};
use crate::math::{Path, Paths, Point2, TOLERANCE};

use super::active::ActiveId;

slotmap::new_key_type! {
    /// Unique identifier for an output point.
    pub(crate) struct OutPtId;
}

/// One point of an output contour in a circular doubly linked ring.
#[derive(Debug, Clone)]
pub(crate) struct OutPt {
    pub(crate) pt: Point2,
    pub(crate) next: OutPtId,
    pub(crate) prev: OutPtId,
}

/// Role of an output region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutRecKind {
    Outer,
    Inner,
    Open,
}

/// An output region under construction.
///
/// `pts` points at the front end of the ring; its `next` is the back end.
/// A region whose ring was merged into another keeps `pts == None`.
#[derive(Debug, Clone)]
pub(crate) struct OutRec {
    pub(crate) owner: Option<usize>,
    pub(crate) front_edge: Option<ActiveId>,
    pub(crate) back_edge: Option<ActiveId>,
    pub(crate) pts: Option<OutPtId>,
    pub(crate) kind: OutRecKind,
    path: Path,
    tree_node: Option<usize>,
}

/// Output regions and their point rings produced by one sweep.
#[derive(Debug, Default)]
pub(crate) struct OutputStore {
    pub(crate) recs: Vec<OutRec>,
    pub(crate) pts: SlotMap<OutPtId, OutPt>,
}

impl OutputStore {
    pub(crate) fn new_out_rec(&mut self) -> usize {
        let idx = self.recs.len();
        self.recs.push(OutRec {
            owner: None,
            front_edge: None,
            back_edge: None,
            pts: None,
            kind: OutRecKind::Outer,
            path: Vec::new(),
            tree_node: None,
        });
        idx
    }

    /// Allocates a single point linked to itself.
    pub(crate) fn new_out_pt(&mut self, pt: Point2) -> OutPtId {
        self.pts.insert_with_key(|k| OutPt { pt, next: k, prev: k })
    }

    /// Sets `new_owner` as the owner of `out_rec` without creating a cycle.
    pub(crate) fn set_owner(&mut self, out_rec: usize, new_owner: usize) {
        // skip owners that were merged away
        while let Some(o) = self.recs[new_owner].owner {
            if self.recs[o].pts.is_some() || o == new_owner {
                break;
            }
            self.recs[new_owner].owner = self.recs[o].owner;
        }
        let mut tmp = Some(new_owner);
        let mut steps = 0;
        while let Some(t) = tmp {
            if t == out_rec || steps > self.recs.len() {
                break;
            }
            tmp = self.recs[t].owner;
            steps += 1;
        }
        if tmp.is_some() {
            self.recs[new_owner].owner = self.recs[out_rec].owner;
        }
        self.recs[out_rec].owner = Some(new_owner);
    }

    /// Unlinks `op` and returns its successor, or `None` if it was alone.
    fn dispose_out_pt(&mut self, op: OutPtId) -> Option<OutPtId> {
        let (prev, next) = (self.pts[op].prev, self.pts[op].next);
        let result = (next != op).then_some(next);
        self.pts[prev].next = next;
        self.pts[next].prev = prev;
        self.pts.remove(op);
        result
    }

    fn is_valid_closed_path(&self, op: Option<OutPtId>) -> bool {
        op.is_some_and(|o| {
            let p = &self.pts[o];
            p.next != o && p.next != p.prev
        })
    }

    /// Removes 180 degree spikes, and collinear points unless
    /// `preserve_collinear` is set.
    pub(crate) fn clean_collinear(&mut self, idx: usize, preserve_collinear: bool) {
        if self.recs[idx].kind == OutRecKind::Open {
            return;
        }
        if !self.is_valid_closed_path(self.recs[idx].pts) {
            self.recs[idx].pts = None;
            return;
        }
        let Some(mut start) = self.recs[idx].pts else {
            return;
        };
        let mut op2 = start;
        loop {
            let prev = self.pts[op2].prev;
            let next = self.pts[op2].next;
            let (pp, p, pn) = (self.pts[prev].pt, self.pts[op2].pt, self.pts[next].pt);
            if cross_product(&pp, &p, &pn) == 0.0
                && (p == pp || p == pn || !preserve_collinear || dot_product(&pp, &p, &pn) < 0.0)
            {
                if self.recs[idx].pts == Some(op2) {
                    self.recs[idx].pts = Some(prev);
                }
                let remaining = self.dispose_out_pt(op2);
                if !self.is_valid_closed_path(remaining) {
                    self.recs[idx].pts = None;
                    return;
                }
                let Some(r) = remaining else {
                    return;
                };
                start = r;
                op2 = r;
                continue;
            }
            op2 = next;
            if op2 == start {
                break;
            }
        }
    }

    /// Walks the ring starting at `op` into a point list.
    ///
    /// Closed rings come out with positive orientation for outer regions;
    /// `reverse` flips that. Returns `None` for degenerate rings.
    fn build_path(&self, op: OutPtId, reverse: bool, is_open: bool) -> Option<Path> {
        let first = &self.pts[op];
        if first.next == op || (!is_open && first.next == first.prev) {
            return None;
        }
        let (start, mut curr) = if reverse {
            (op, first.prev)
        } else {
            let start = first.next;
            (start, self.pts[start].next)
        };
        let mut last_pt = self.pts[start].pt;
        let mut path = vec![last_pt];
        while curr != start {
            let pt = self.pts[curr].pt;
            if pt != last_pt {
                last_pt = pt;
                path.push(pt);
            }
            curr = if reverse {
                self.pts[curr].prev
            } else {
                self.pts[curr].next
            };
        }
        if !is_open && (path.len() < 3 || signed_area(&path).abs() < TOLERANCE) {
            return None;
        }
        Some(path)
    }

    /// Cleans and extracts the closed contour of one region.
    pub(crate) fn closed_path(&mut self, idx: usize, preserve_collinear: bool) -> Option<Path> {
        self.clean_collinear(idx, preserve_collinear);
        let op = self.recs[idx].pts?;
        self.build_path(op, false, false)
    }

    /// Extracts every finished contour, split into closed and open paths.
    pub(crate) fn build_paths(&mut self, reverse: bool, preserve_collinear: bool) -> (Paths, Paths) {
        let mut closed = Vec::new();
        let mut open = Vec::new();
        for idx in 0..self.recs.len() {
            if self.recs[idx].pts.is_none() {
                continue;
            }
            if self.recs[idx].kind == OutRecKind::Open {
                if let Some(path) = self.recs[idx].pts.and_then(|op| self.build_path(op, reverse, true)) {
                    open.push(path);
                }
                continue;
            }
            self.clean_collinear(idx, preserve_collinear);
            if let Some(path) = self.recs[idx].pts.and_then(|op| self.build_path(op, reverse, false)) {
                closed.push(path);
            }
        }
        (closed, open)
    }

    /// Extracts closed contours into `tree` by containment, and open
    /// contours into `open`.
    pub(crate) fn build_tree(
        &mut self,
        reverse: bool,
        preserve_collinear: bool,
        tree: &mut PolyTree,
        open: &mut Paths,
    ) {
        tree.clear();
        open.clear();
        for idx in 0..self.recs.len() {
            let Some(op) = self.recs[idx].pts else {
                continue;
            };
            if self.recs[idx].kind == OutRecKind::Open {
                if let Some(path) = self.build_path(op, reverse, true) {
                    open.push(path);
                }
                continue;
            }
            self.clean_collinear(idx, preserve_collinear);
            if let Some(path) = self.recs[idx].pts.and_then(|op| self.build_path(op, reverse, false)) {
                self.recs[idx].path = path;
            }
        }
        for idx in 0..self.recs.len() {
            if self.recs[idx].kind != OutRecKind::Open && !self.recs[idx].path.is_empty() {
                self.attach_to_tree(idx, tree);
            }
        }
    }

    fn attach_to_tree(&mut self, idx: usize, tree: &mut PolyTree) -> usize {
        if let Some(node) = self.recs[idx].tree_node {
            return node;
        }
        let parent = self
            .containing_owner(idx)
            .or_else(|| self.smallest_container(idx))
            .map(|o| self.attach_to_tree(o, tree));
        let node = tree.add_node(parent, self.recs[idx].path.clone());
        self.recs[idx].tree_node = Some(node);
        node
    }

    fn encloses(&self, outer: usize, inner: usize) -> bool {
        let o = &self.recs[outer];
        let i = &self.recs[inner];
        outer != inner
            && o.kind != OutRecKind::Open
            && !o.path.is_empty()
            && signed_area(&o.path).abs() > signed_area(&i.path).abs()
            && path_inside_path(&i.path, &o.path)
    }

    /// First region on the owner chain that actually encloses `idx`.
    fn containing_owner(&self, idx: usize) -> Option<usize> {
        let mut owner = self.recs[idx].owner;
        let mut steps = 0;
        while let Some(o) = owner {
            if self.encloses(o, idx) {
                return Some(o);
            }
            steps += 1;
            if steps > self.recs.len() {
                return None;
            }
            owner = self.recs[o].owner;
        }
        None
    }

    fn smallest_container(&self, idx: usize) -> Option<usize> {
        (0..self.recs.len())
            .filter(|&o| self.encloses(o, idx))
            .min_by(|&a, &b| {
                signed_area(&self.recs[a].path)
                    .abs()
                    .total_cmp(&signed_area(&self.recs[b].path).abs())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(store: &mut OutputStore, coords: &[(f64, f64)]) -> usize {
        let idx = store.new_out_rec();
        let mut first: Option<OutPtId> = None;
        let mut last: Option<OutPtId> = None;
        for &(x, y) in coords {
            let op = store.new_out_pt(Point2::new(x, y));
            if let Some(l) = last {
                let head = first.unwrap_or(op);
                store.pts[l].next = op;
                store.pts[op].prev = l;
                store.pts[op].next = head;
                store.pts[head].prev = op;
            } else {
                first = Some(op);
            }
            last = Some(op);
        }
        store.recs[idx].pts = last;
        idx
    }

    #[test]
    fn collinear_points_removed_when_not_preserved() {
        let mut store = OutputStore::default();
        let idx = ring(
            &mut store,
            &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)],
        );
        let path = store.closed_path(idx, false);
        assert_eq!(path.map(|p| p.len()), Some(4));
    }

    #[test]
    fn collinear_points_kept_when_preserved() {
        let mut store = OutputStore::default();
        let idx = ring(
            &mut store,
            &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)],
        );
        let path = store.closed_path(idx, true);
        assert_eq!(path.map(|p| p.len()), Some(5));
    }

    #[test]
    fn spike_removed_even_when_preserving() {
        let mut store = OutputStore::default();
        let idx = ring(
            &mut store,
            &[(0.0, 0.0), (2.0, 0.0), (3.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)],
        );
        let path = store.closed_path(idx, true);
        assert_eq!(path.map(|p| p.len()), Some(4));
    }

    #[test]
    fn flat_ring_is_discarded() {
        let mut store = OutputStore::default();
        let idx = ring(&mut store, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        assert!(store.closed_path(idx, false).is_none());
        assert!(store.recs[idx].pts.is_none());
    }

    #[test]
    fn reverse_flips_orientation() {
        let mut store = OutputStore::default();
        ring(&mut store, &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let (forward, _) = store.build_paths(false, true);
        let (backward, _) = store.build_paths(true, true);
        assert!(signed_area(&forward[0]) > 0.0);
        assert!(signed_area(&backward[0]) < 0.0);
    }

    #[test]
    fn set_owner_breaks_cycles() {
        let mut store = OutputStore::default();
        let a = ring(&mut store, &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        let b = ring(&mut store, &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        store.set_owner(b, a);
        store.set_owner(a, b);
        assert_eq!(store.recs[a].owner, Some(b));
        assert_eq!(store.recs[b].owner, None);
    }

    #[test]
    fn tree_nests_hole_under_outer() {
        let mut store = OutputStore::default();
        ring(&mut store, &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        ring(&mut store, &[(2.0, 2.0), (2.0, 8.0), (8.0, 8.0), (8.0, 2.0)]);
        let mut tree = PolyTree::new();
        let mut open = Vec::new();
        store.build_tree(false, true, &mut tree, &mut open);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.roots().len(), 1);
        let root = tree.roots()[0];
        assert_eq!(tree.children(root).len(), 1);
        assert!(tree.is_hole(tree.children(root)[0]));
    }
}
