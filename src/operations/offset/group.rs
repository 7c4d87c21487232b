use crate::math::polygon_2d::{is_positive, reverse_paths, strip_duplicates};
use crate::math::{Path, Paths};

use super::{EndType, JoinType};

/// Paths offset together with one join and end type.
///
/// Closed groups are stored with their lowest contour positively oriented,
/// so that a positive delta always grows outers and shrinks holes.
#[derive(Debug, Clone)]
pub(super) struct OffsetGroup {
    pub(super) paths: Paths,
    pub(super) join_type: JoinType,
    pub(super) end_type: EndType,
    reversed: bool,
}

impl OffsetGroup {
    pub(super) fn new(paths: &[Path], join_type: JoinType, end_type: EndType) -> Self {
        let ring = matches!(end_type, EndType::ClosedPolygon | EndType::OpenJoined);
        let mut paths: Paths = paths
            .iter()
            .map(|p| strip_duplicates(p, ring))
            .filter(|p| !p.is_empty())
            .collect();
        let reversed = end_type == EndType::ClosedPolygon
            && lowest_path(&paths).is_some_and(|i| !is_positive(&paths[i]));
        if reversed {
            paths.iter_mut().for_each(|p| p.reverse());
        }
        Self {
            paths,
            join_type,
            end_type,
            reversed,
        }
    }

    /// The paths as they were added, minus duplicate points.
    pub(super) fn original_paths(&self) -> Paths {
        if self.reversed {
            reverse_paths(&self.paths)
        } else {
            self.paths.clone()
        }
    }
}

/// Index of the path holding the lowest vertex (largest Y, then smallest X).
/// The lowest contour is always an outer one.
fn lowest_path(paths: &[Path]) -> Option<usize> {
    let mut best: Option<(usize, f64, f64)> = None;
    for (i, path) in paths.iter().enumerate() {
        if path.len() < 3 {
            continue;
        }
        for pt in path {
            let lower = match best {
                None => true,
                Some((_, x, y)) => pt.y > y || (pt.y == y && pt.x < x),
            };
            if lower {
                best = Some((i, pt.x, pt.y));
            }
        }
    }
    best.map(|(i, _, _)| i)
}
