use std::ops::BitOr;

use slotmap::SlotMap;

use crate::math::Point2;

use super::PathType;

slotmap::new_key_type! {
    /// Unique identifier for an input vertex.
    pub(crate) struct VertexId;
}

/// Turning-point and open-end markers on an input vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct VertexFlags(u8);

impl VertexFlags {
    pub(crate) const NONE: Self = Self(0);
    pub(crate) const OPEN_START: Self = Self(1);
    pub(crate) const OPEN_END: Self = Self(2);
    pub(crate) const LOCAL_MAX: Self = Self(4);
    pub(crate) const LOCAL_MIN: Self = Self(8);

    /// Returns `true` if any flag in `other` is set.
    pub(crate) fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub(crate) fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

impl BitOr for VertexFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// One point of an input contour, linked into a circular list.
#[derive(Debug, Clone)]
pub(crate) struct Vertex {
    pub(crate) pt: Point2,
    pub(crate) next: VertexId,
    pub(crate) prev: VertexId,
    pub(crate) flags: VertexFlags,
}

/// A vertex where a bound starts, with the path set it belongs to.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LocalMinima {
    pub(crate) vertex: VertexId,
    pub(crate) path_type: PathType,
    pub(crate) is_open: bool,
}

/// All registered input contours as circular vertex lists, plus the local
/// minima that seed the sweep.
///
/// The sweep runs from the largest Y value towards the smallest, so a
/// "local minimum" is a vertex whose neighbours both have smaller Y.
#[derive(Debug, Default)]
pub(crate) struct VertexList {
    vertices: SlotMap<VertexId, Vertex>,
    minima: Vec<LocalMinima>,
    minima_sorted: bool,
    has_open_paths: bool,
}

impl VertexList {
    pub(crate) fn vertices(&self) -> &SlotMap<VertexId, Vertex> {
        &self.vertices
    }

    pub(crate) fn minima(&self) -> &[LocalMinima] {
        &self.minima
    }

    pub(crate) fn has_open_paths(&self) -> bool {
        self.has_open_paths
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.minima.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.vertices.clear();
        self.minima.clear();
        self.minima_sorted = false;
        self.has_open_paths = false;
    }

    /// Sorts the local minima so the sweep consumes them in descending Y.
    pub(crate) fn sort_minima(&mut self) {
        if self.minima_sorted {
            return;
        }
        let vertices = &self.vertices;
        self.minima
            .sort_by(|a, b| vertices[b.vertex].pt.y.total_cmp(&vertices[a.vertex].pt.y));
        self.minima_sorted = true;
    }

    /// Converts one contour into a circular vertex list and records its
    /// local minima and maxima.
    ///
    /// Consecutive duplicate points are skipped. Closed contours whose points
    /// all share one Y value are dropped.
    pub(crate) fn add_path(&mut self, path: &[Point2], path_type: PathType, is_open: bool) {
        let mut first: Option<VertexId> = None;
        let mut last: Option<VertexId> = None;
        for pt in path {
            match last {
                None => {
                    let id = self.vertices.insert_with_key(|k| Vertex {
                        pt: *pt,
                        next: k,
                        prev: k,
                        flags: VertexFlags::NONE,
                    });
                    first = Some(id);
                    last = Some(id);
                }
                Some(prev) if self.vertices[prev].pt != *pt => {
                    let id = self.vertices.insert_with_key(|k| Vertex {
                        pt: *pt,
                        next: k,
                        prev,
                        flags: VertexFlags::NONE,
                    });
                    self.vertices[prev].next = id;
                    last = Some(id);
                }
                Some(_) => {}
            }
        }
        let (Some(v0), Some(mut prev_v)) = (first, last) else {
            return;
        };
        if prev_v == v0 {
            self.vertices.remove(v0);
            return;
        }
        if !is_open && self.vertices[prev_v].pt == self.vertices[v0].pt {
            let before = self.vertices[prev_v].prev;
            self.vertices.remove(prev_v);
            prev_v = before;
        }
        self.vertices[prev_v].next = v0;
        self.vertices[v0].prev = prev_v;
        if !is_open && prev_v == v0 {
            self.vertices.remove(v0);
            return;
        }

        let v0_y = self.vertices[v0].pt.y;
        let mut going_up;
        if is_open {
            let mut curr = self.vertices[v0].next;
            while curr != v0 && self.vertices[curr].pt.y == v0_y {
                curr = self.vertices[curr].next;
            }
            going_up = self.vertices[curr].pt.y <= v0_y;
            if going_up {
                self.vertices[v0].flags = VertexFlags::OPEN_START;
                self.add_local_min(v0, path_type, true);
            } else {
                self.vertices[v0].flags = VertexFlags::OPEN_START | VertexFlags::LOCAL_MAX;
            }
        } else {
            let mut prev = self.vertices[v0].prev;
            while prev != v0 && self.vertices[prev].pt.y == v0_y {
                prev = self.vertices[prev].prev;
            }
            if prev == v0 {
                // zero extent: every point on one horizontal line
                self.discard_ring(v0);
                return;
            }
            going_up = self.vertices[prev].pt.y > v0_y;
        }

        let going_up0 = going_up;
        let mut prev = v0;
        let mut curr = self.vertices[v0].next;
        while curr != v0 {
            let curr_y = self.vertices[curr].pt.y;
            let prev_y = self.vertices[prev].pt.y;
            if curr_y > prev_y && going_up {
                self.vertices[prev].flags.insert(VertexFlags::LOCAL_MAX);
                going_up = false;
            } else if curr_y < prev_y && !going_up {
                going_up = true;
                self.add_local_min(prev, path_type, is_open);
            }
            prev = curr;
            curr = self.vertices[curr].next;
        }

        if is_open {
            self.vertices[prev].flags.insert(VertexFlags::OPEN_END);
            if going_up {
                self.vertices[prev].flags.insert(VertexFlags::LOCAL_MAX);
            } else {
                self.add_local_min(prev, path_type, true);
            }
            self.has_open_paths = true;
        } else if going_up != going_up0 {
            if going_up0 {
                self.add_local_min(prev, path_type, false);
            } else {
                self.vertices[prev].flags.insert(VertexFlags::LOCAL_MAX);
            }
        }
    }

    fn add_local_min(&mut self, vertex: VertexId, path_type: PathType, is_open: bool) {
        if self.vertices[vertex].flags.intersects(VertexFlags::LOCAL_MIN) {
            return;
        }
        self.vertices[vertex].flags.insert(VertexFlags::LOCAL_MIN);
        self.minima.push(LocalMinima {
            vertex,
            path_type,
            is_open,
        });
        self.minima_sorted = false;
    }

    fn discard_ring(&mut self, start: VertexId) {
        let mut curr = self.vertices[start].next;
        while curr != start {
            let next = self.vertices[curr].next;
            self.vertices.remove(curr);
            curr = next;
        }
        self.vertices.remove(start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point2> {
        coords.iter().map(|&(x, y)| Point2::new(x, y)).collect()
    }

    #[test]
    fn square_has_one_local_minimum_and_maximum() {
        let mut list = VertexList::default();
        list.add_path(
            &pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]),
            PathType::Subject,
            false,
        );
        assert_eq!(list.minima().len(), 1);
        let maxima = list
            .vertices()
            .values()
            .filter(|v| v.flags.intersects(VertexFlags::LOCAL_MAX))
            .count();
        assert_eq!(maxima, 1);
        let min_vertex = &list.vertices()[list.minima()[0].vertex];
        assert!((min_vertex.pt.y - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zigzag_has_two_minima() {
        let mut list = VertexList::default();
        list.add_path(
            &pts(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (3.0, 1.0), (2.0, 4.0), (0.0, 4.0)]),
            PathType::Clip,
            false,
        );
        assert_eq!(list.minima().len(), 2);
    }

    #[test]
    fn flat_closed_path_is_dropped() {
        let mut list = VertexList::default();
        list.add_path(
            &pts(&[(0.0, 2.0), (1.0, 2.0), (3.0, 2.0)]),
            PathType::Subject,
            false,
        );
        assert!(list.is_empty());
        assert!(list.vertices().is_empty());
    }

    #[test]
    fn duplicates_and_closing_point_are_skipped() {
        let mut list = VertexList::default();
        list.add_path(
            &pts(&[(0.0, 0.0), (0.0, 0.0), (2.0, 0.0), (1.0, 2.0), (0.0, 0.0)]),
            PathType::Subject,
            false,
        );
        assert_eq!(list.vertices().len(), 3);
    }

    #[test]
    fn open_path_flags_its_ends() {
        let mut list = VertexList::default();
        list.add_path(&pts(&[(0.0, 0.0), (1.0, 2.0)]), PathType::Subject, true);
        assert!(list.has_open_paths());
        assert_eq!(list.minima().len(), 1);
        let flagged = list
            .vertices()
            .values()
            .filter(|v| v.flags.intersects(VertexFlags::OPEN_START | VertexFlags::OPEN_END))
            .count();
        assert_eq!(flagged, 2);
    }

    #[test]
    fn minima_sort_descending() {
        let mut list = VertexList::default();
        list.add_path(
            &pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]),
            PathType::Subject,
            false,
        );
        list.add_path(
            &pts(&[(0.0, 5.0), (1.0, 5.0), (1.0, 9.0)]),
            PathType::Subject,
            false,
        );
        list.sort_minima();
        let ys: Vec<f64> = list
            .minima()
            .iter()
            .map(|lm| list.vertices()[lm.vertex].pt.y)
            .collect();
        assert!(ys[0] > ys[1]);
    }
}
