use crate::math::polygon_2d::signed_area;
use crate::math::{Path, Paths};

/// One contour in a [`PolyTree`].
#[derive(Debug, Clone, Default)]
pub struct PolyNode {
    pub polygon: Path,
    parent: Option<usize>,
    children: Vec<usize>,
}

impl PolyNode {
    /// Index of the enclosing node, `None` for top-level outers.
    #[must_use]
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[usize] {
        &self.children
    }
}

/// Nesting of closed output contours.
///
/// Nodes live in an arena and refer to each other by index. Depth 0 is an
/// outer contour, depth 1 a hole in it, depth 2 an island in that hole and
/// so on.
#[derive(Debug, Clone, Default)]
pub struct PolyTree {
    nodes: Vec<PolyNode>,
    roots: Vec<usize>,
}

impl PolyTree {
    /// Creates a new, empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
    }

    pub(crate) fn add_node(&mut self, parent: Option<usize>, polygon: Path) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(PolyNode {
            polygon,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(p) => self.nodes[p].children.push(idx),
            None => self.roots.push(idx),
        }
        idx
    }

    /// Number of contours in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level outer contours.
    #[must_use]
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    #[must_use]
    pub fn node(&self, idx: usize) -> Option<&PolyNode> {
        self.nodes.get(idx)
    }

    /// Children of `idx`; empty for an unknown index.
    #[must_use]
    pub fn children(&self, idx: usize) -> &[usize] {
        self.nodes
            .get(idx)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// Nesting depth of `idx`, counting from 0 at the roots.
    #[must_use]
    pub fn depth(&self, idx: usize) -> usize {
        let mut depth = 0;
        let mut curr = self.nodes.get(idx).and_then(|n| n.parent);
        while let Some(p) = curr {
            depth += 1;
            curr = self.nodes[p].parent;
        }
        depth
    }

    /// Odd-depth nodes are holes.
    #[must_use]
    pub fn is_hole(&self, idx: usize) -> bool {
        self.depth(idx) % 2 == 1
    }

    /// Net area: outers add, holes subtract.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.nodes.iter().map(|n| signed_area(&n.polygon)).sum()
    }

    /// Flattens the tree into contours, parents before children.
    #[must_use]
    pub fn to_paths(&self) -> Paths {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            out.push(node.polygon.clone());
            stack.extend(node.children.iter().rev());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Point2;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Path {
        vec![
            Point2::new(x0, y0),
            Point2::new(x1, y0),
            Point2::new(x1, y1),
            Point2::new(x0, y1),
        ]
    }

    #[test]
    fn depth_and_holes() {
        let mut tree = PolyTree::new();
        let outer = tree.add_node(None, square(0.0, 0.0, 10.0, 10.0));
        let hole = tree.add_node(Some(outer), square(2.0, 2.0, 8.0, 8.0));
        let island = tree.add_node(Some(hole), square(4.0, 4.0, 6.0, 6.0));
        assert_eq!(tree.depth(outer), 0);
        assert!(!tree.is_hole(outer));
        assert!(tree.is_hole(hole));
        assert_eq!(tree.depth(island), 2);
        assert_eq!(tree.node(island).and_then(PolyNode::parent), Some(hole));
    }

    #[test]
    fn to_paths_lists_parents_first() {
        let mut tree = PolyTree::new();
        let a = tree.add_node(None, square(0.0, 0.0, 10.0, 10.0));
        tree.add_node(Some(a), square(2.0, 2.0, 8.0, 8.0));
        tree.add_node(None, square(20.0, 0.0, 21.0, 1.0));
        let paths = tree.to_paths();
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[0][0], Point2::new(0.0, 0.0));
        assert_eq!(paths[1][0], Point2::new(2.0, 2.0));
        assert_eq!(paths[2][0], Point2::new(20.0, 0.0));
    }

    #[test]
    fn clear_empties_tree() {
        let mut tree = PolyTree::new();
        tree.add_node(None, square(0.0, 0.0, 1.0, 1.0));
        tree.clear();
        assert!(tree.is_empty());
        assert!(tree.roots().is_empty());
        assert!(tree.children(0).is_empty());
    }
}
