use tracing::warn;

use crate::math::polygon_2d::{cross_product, cross_product_sign, is_positive};
use crate::math::{Path, Paths, Point2, TOLERANCE};

/// Ears whose doubled area is below this are dropped instead of emitted.
const MIN_EAR_AREA: f64 = TOLERANCE;

/// Triangulates `outer` minus `holes` into positively oriented triangles.
///
/// Each hole is bridged into the outer ring from its leftmost vertex, then
/// the single ring is ear-clipped. A ring with no clean ear left is first
/// cured of local self-intersections and then split along a diagonal.
pub(crate) fn ear_cut(outer: &[Point2], holes: &[Path], triangles: &mut Paths) {
    if outer.len() < 3 {
        return;
    }
    let mut ring = Ring::default();
    let Some(mut start) = ring.link(outer, 0, true) else {
        return;
    };
    if ring.next(start) == ring.prev(start) {
        return;
    }
    if !holes.is_empty() {
        start = ring.eliminate_holes(holes, outer.len(), start);
    }
    ring.cut(start, triangles, Pass::Ears);
}

#[derive(Debug, Clone, Copy)]
struct Node {
    pt: Point2,
    /// Input vertex this node stands for; bridges and splits copy it.
    src: usize,
    prev: usize,
    next: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Ears,
    Filtered,
    Cured,
}

/// Circular vertex lists held in one arena. Removed nodes stay in the arena
/// but are unlinked from their ring.
#[derive(Debug, Default)]
struct Ring {
    nodes: Vec<Node>,
}

impl Ring {
    fn pt(&self, i: usize) -> Point2 {
        self.nodes[i].pt
    }

    fn next(&self, i: usize) -> usize {
        self.nodes[i].next
    }

    fn prev(&self, i: usize) -> usize {
        self.nodes[i].prev
    }

    fn src(&self, i: usize) -> usize {
        self.nodes[i].src
    }

    /// Positive for a left turn at `b`.
    fn turn(&self, a: usize, b: usize, c: usize) -> f64 {
        cross_product(&self.pt(a), &self.pt(b), &self.pt(c))
    }

    fn insert(&mut self, src: usize, pt: Point2, last: Option<usize>) -> usize {
        let idx = self.nodes.len();
        match last {
            None => self.nodes.push(Node { pt, src, prev: idx, next: idx }),
            Some(last) => {
                let after = self.next(last);
                self.nodes.push(Node { pt, src, prev: last, next: after });
                self.nodes[after].prev = idx;
                self.nodes[last].next = idx;
            }
        }
        idx
    }

    fn remove(&mut self, i: usize) {
        let Node { prev, next, .. } = self.nodes[i];
        self.nodes[next].prev = prev;
        self.nodes[prev].next = next;
    }

    /// Links `points` into a new ring wound positively or negatively,
    /// numbering its vertices from `src_base`.
    fn link(&mut self, points: &[Point2], src_base: usize, positive: bool) -> Option<usize> {
        let forward = is_positive(points) == positive;
        let order: Vec<usize> = if forward {
            (0..points.len()).collect()
        } else {
            (0..points.len()).rev().collect()
        };
        let mut last = None;
        for i in order {
            last = Some(self.insert(src_base + i, points[i], last));
        }
        let last = last?;
        let next = self.next(last);
        if next != last && self.pt(last) == self.pt(next) {
            self.remove(last);
            return Some(next);
        }
        Some(last)
    }

    /// Unlinks repeated and collinear vertices between `start` and `end`.
    fn filter(&mut self, start: usize, end: Option<usize>) -> usize {
        let mut end = end.unwrap_or(start);
        let mut p = start;
        loop {
            let next = self.next(p);
            let again = if self.pt(p) == self.pt(next) || self.turn(self.prev(p), p, next) == 0.0 {
                self.remove(p);
                p = self.prev(p);
                end = p;
                if p == self.next(p) {
                    break;
                }
                true
            } else {
                p = next;
                false
            };
            if !again && p == end {
                break;
            }
        }
        end
    }

    fn cut(&mut self, mut ear: usize, triangles: &mut Paths, pass: Pass) {
        let mut stop = ear;
        while self.prev(ear) != self.next(ear) {
            let prev = self.prev(ear);
            let next = self.next(ear);
            if self.is_ear(ear) {
                self.emit(prev, ear, next, triangles);
                self.remove(ear);
                ear = self.next(next);
                stop = ear;
                continue;
            }
            ear = next;
            if ear == stop {
                match pass {
                    Pass::Ears => {
                        let start = self.filter(ear, None);
                        self.cut(start, triangles, Pass::Filtered);
                    }
                    Pass::Filtered => {
                        let start = self.filter(ear, None);
                        let start = self.cure_local_intersections(start, triangles);
                        self.cut(start, triangles, Pass::Cured);
                    }
                    Pass::Cured => self.split(ear, triangles),
                }
                break;
            }
        }
    }

    fn emit(&self, a: usize, b: usize, c: usize, triangles: &mut Paths) {
        if self.turn(a, b, c) > MIN_EAR_AREA {
            triangles.push(vec![self.pt(a), self.pt(b), self.pt(c)]);
        }
    }

    /// The corner at `ear` is convex and no reflex vertex of the ring lies
    /// in the triangle it cuts off. A copy of the first corner, as a bridge
    /// leaves behind, only blocks through its own wedge.
    fn is_ear(&self, ear: usize) -> bool {
        let (a, c) = (self.prev(ear), self.next(ear));
        if self.turn(a, ear, c) <= 0.0 {
            return false;
        }
        let (pa, pb, pc) = (self.pt(a), self.pt(ear), self.pt(c));
        let (x0, x1) = (pa.x.min(pb.x).min(pc.x), pa.x.max(pb.x).max(pc.x));
        let (y0, y1) = (pa.y.min(pb.y).min(pc.y), pa.y.max(pb.y).max(pc.y));

        let mut p = self.next(c);
        while p != a {
            let pt = self.pt(p);
            if pt.x >= x0
                && pt.x <= x1
                && pt.y >= y0
                && pt.y <= y1
                && pt != pa
                && point_in_triangle(&pa, &pb, &pc, &pt)
                && self.turn(self.prev(p), p, self.next(p)) <= 0.0
            {
                return false;
            }
            p = self.next(p);
        }
        true
    }

    /// Cuts off `a, p, b` wherever edges `a-p` and `p.next-b` cross.
    fn cure_local_intersections(&mut self, mut start: usize, triangles: &mut Paths) -> usize {
        let mut p = start;
        loop {
            let a = self.prev(p);
            let pn = self.next(p);
            let b = self.next(pn);
            if self.pt(a) != self.pt(b)
                && self.intersects(a, p, pn, b)
                && self.locally_inside(a, b)
                && self.locally_inside(b, a)
            {
                self.emit(a, p, b, triangles);
                self.remove(p);
                self.remove(pn);
                start = b;
                p = b;
            }
            p = self.next(p);
            if p == start {
                break;
            }
        }
        self.filter(p, None)
    }

    /// Splits the ring along the first valid diagonal and clips both halves.
    fn split(&mut self, start: usize, triangles: &mut Paths) {
        let mut a = start;
        loop {
            let mut b = self.next(self.next(a));
            while b != self.prev(a) {
                if self.src(a) != self.src(b) && self.is_valid_diagonal(a, b) {
                    let c = self.split_polygon(a, b);
                    let a = self.filter(a, Some(self.next(a)));
                    let c = self.filter(c, Some(self.next(c)));
                    self.cut(a, triangles, Pass::Ears);
                    self.cut(c, triangles, Pass::Ears);
                    return;
                }
                b = self.next(b);
            }
            a = self.next(a);
            if a == start {
                break;
            }
        }
        warn!("ring has no valid diagonal left");
    }

    fn eliminate_holes(&mut self, holes: &[Path], mut src_base: usize, mut outer: usize) -> usize {
        let mut queue = Vec::with_capacity(holes.len());
        for hole in holes {
            if hole.len() >= 3 {
                if let Some(list) = self.link(hole, src_base, false) {
                    queue.push(self.leftmost(list));
                }
            }
            src_base += hole.len();
        }
        queue.sort_by(|&a, &b| {
            let (pa, pb) = (self.pt(a), self.pt(b));
            pa.x.total_cmp(&pb.x).then(pa.y.total_cmp(&pb.y))
        });
        for hole in queue {
            outer = self.eliminate_hole(hole, outer);
        }
        outer
    }

    fn eliminate_hole(&mut self, hole: usize, outer: usize) -> usize {
        let Some(bridge) = self.find_hole_bridge(hole, outer) else {
            warn!(hole = self.src(hole), "no visible vertex for hole bridge");
            return outer;
        };
        let reverse = self.split_polygon(bridge, hole);
        self.filter(reverse, Some(self.next(reverse)));
        self.filter(bridge, Some(self.next(bridge)))
    }

    /// Outer vertex joined to `hole` by the bridge: the end of the nearest
    /// edge hit by a ray to the left, or the reflex vertex inside that
    /// triangle with the smallest angle to the ray.
    fn find_hole_bridge(&self, hole: usize, outer: usize) -> Option<usize> {
        let h = self.pt(hole);
        let mut p = outer;
        let mut qx = f64::NEG_INFINITY;
        let mut m = None;
        if h == self.pt(p) {
            return Some(p);
        }
        loop {
            let pn = self.next(p);
            let (pp, pnp) = (self.pt(p), self.pt(pn));
            if h == pnp {
                return Some(pn);
            }
            if h.y <= pp.y && h.y >= pnp.y && pnp.y != pp.y {
                let x = pp.x + (h.y - pp.y) * (pnp.x - pp.x) / (pnp.y - pp.y);
                if x <= h.x && x > qx {
                    qx = x;
                    let end = if pp.x < pnp.x { p } else { pn };
                    m = Some(end);
                    if x == h.x {
                        return m;
                    }
                }
            }
            p = pn;
            if p == outer {
                break;
            }
        }

        let mut m = m?;
        let stop = m;
        let mp = self.pt(m);
        let mut tan_min = f64::INFINITY;
        p = m;
        loop {
            let pt = self.pt(p);
            let (left, right) = if h.y < mp.y { (h.x, qx) } else { (qx, h.x) };
            if h.x >= pt.x
                && pt.x >= mp.x
                && h.x != pt.x
                && point_in_triangle(
                    &Point2::new(left, h.y),
                    &mp,
                    &Point2::new(right, h.y),
                    &pt,
                )
            {
                let tan = (h.y - pt.y).abs() / (h.x - pt.x);
                let best = self.pt(m);
                if self.locally_inside(p, hole)
                    && (tan < tan_min
                        || (tan == tan_min
                            && (pt.x > best.x || (pt.x == best.x && self.sector_contains_sector(m, p)))))
                {
                    m = p;
                    tan_min = tan;
                }
            }
            p = self.next(p);
            if p == stop {
                break;
            }
        }
        Some(m)
    }

    fn sector_contains_sector(&self, m: usize, p: usize) -> bool {
        self.turn(self.prev(m), m, self.prev(p)) > 0.0 && self.turn(self.next(p), m, self.next(m)) > 0.0
    }

    fn leftmost(&self, start: usize) -> usize {
        let mut p = start;
        let mut best = start;
        loop {
            let (pt, lt) = (self.pt(p), self.pt(best));
            if pt.x < lt.x || (pt.x == lt.x && pt.y < lt.y) {
                best = p;
            }
            p = self.next(p);
            if p == start {
                break;
            }
        }
        best
    }

    fn is_valid_diagonal(&self, a: usize, b: usize) -> bool {
        let (an, ap) = (self.next(a), self.prev(a));
        let (bn, bp) = (self.next(b), self.prev(b));
        if self.src(an) == self.src(b) || self.src(ap) == self.src(b) || self.intersects_ring(a, b) {
            return false;
        }
        let open_diagonal = self.locally_inside(a, b)
            && self.locally_inside(b, a)
            && self.middle_inside(a, b)
            && (self.turn(ap, a, bp) != 0.0 || self.turn(a, bp, b) != 0.0);
        let touching = self.pt(a) == self.pt(b) && self.turn(ap, a, an) < 0.0 && self.turn(bp, b, bn) < 0.0;
        open_diagonal || touching
    }

    /// Segments `p1-q1` and `p2-q2` cross or touch.
    fn intersects(&self, p1: usize, q1: usize, p2: usize, q2: usize) -> bool {
        let (p1, q1, p2, q2) = (self.pt(p1), self.pt(q1), self.pt(p2), self.pt(q2));
        let o1 = cross_product_sign(&p1, &q1, &p2);
        let o2 = cross_product_sign(&p1, &q1, &q2);
        let o3 = cross_product_sign(&p2, &q2, &p1);
        let o4 = cross_product_sign(&p2, &q2, &q1);
        (o1 != o2 && o3 != o4)
            || (o1 == 0 && in_box(&p1, &p2, &q1))
            || (o2 == 0 && in_box(&p1, &q2, &q1))
            || (o3 == 0 && in_box(&p2, &p1, &q2))
            || (o4 == 0 && in_box(&p2, &q1, &q2))
    }

    /// Diagonal `a-b` meets an edge of the ring not incident to either end.
    fn intersects_ring(&self, a: usize, b: usize) -> bool {
        let (sa, sb) = (self.src(a), self.src(b));
        let mut p = a;
        loop {
            let pn = self.next(p);
            let (sp, spn) = (self.src(p), self.src(pn));
            if sp != sa && spn != sa && sp != sb && spn != sb && self.intersects(p, pn, a, b) {
                return true;
            }
            p = pn;
            if p == a {
                return false;
            }
        }
    }

    /// Direction `a`->`b` starts inside the ring's wedge at `a`.
    fn locally_inside(&self, a: usize, b: usize) -> bool {
        let (ap, an) = (self.prev(a), self.next(a));
        if self.turn(ap, a, an) > 0.0 {
            self.turn(a, b, an) <= 0.0 && self.turn(a, ap, b) <= 0.0
        } else {
            self.turn(a, b, ap) > 0.0 || self.turn(a, an, b) > 0.0
        }
    }

    fn middle_inside(&self, a: usize, b: usize) -> bool {
        let (pa, pb) = (self.pt(a), self.pt(b));
        let (px, py) = ((pa.x + pb.x) / 2.0, (pa.y + pb.y) / 2.0);
        let mut inside = false;
        let mut p = a;
        loop {
            let (u, v) = (self.pt(p), self.pt(self.next(p)));
            if (u.y > py) != (v.y > py) && v.y != u.y && px < (v.x - u.x) * (py - u.y) / (v.y - u.y) + u.x {
                inside = !inside;
            }
            p = self.next(p);
            if p == a {
                return inside;
            }
        }
    }

    /// Joins `a` to `b` by two coincident edges, splitting the ring in two.
    /// Returns the copy of `b` that starts the second ring.
    fn split_polygon(&mut self, a: usize, b: usize) -> usize {
        let a2 = self.nodes.len();
        let b2 = a2 + 1;
        let (an, bp) = (self.next(a), self.prev(b));
        let a_copy = Node { prev: b2, next: an, ..self.nodes[a] };
        let b_copy = Node { prev: bp, next: a2, ..self.nodes[b] };
        self.nodes.push(a_copy);
        self.nodes.push(b_copy);
        self.nodes[a].next = b;
        self.nodes[b].prev = a;
        self.nodes[an].prev = a2;
        self.nodes[bp].next = b2;
        b2
    }
}

/// Inclusive test against a positively oriented triangle.
fn point_in_triangle(a: &Point2, b: &Point2, c: &Point2, p: &Point2) -> bool {
    (c.x - p.x) * (a.y - p.y) >= (a.x - p.x) * (c.y - p.y)
        && (a.x - p.x) * (b.y - p.y) >= (b.x - p.x) * (a.y - p.y)
        && (b.x - p.x) * (c.y - p.y) >= (c.x - p.x) * (b.y - p.y)
}

/// `q` lies in the bounding box of `p` and `r`.
fn in_box(p: &Point2, q: &Point2, r: &Point2) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}
