mod active;
mod clipper;
mod engine;
mod hooks;
mod horizontal;
mod intersect;
mod local_poly;
mod out_rec;
mod scanline;
mod vertex;
mod winding;

#[cfg(test)]
mod tests;

pub use clipper::{Clipper, Solution};

pub(crate) use clipper::ClipperBase;
pub(crate) use hooks::SweepHooks;
pub(crate) use out_rec::OutRecKind;

/// The boolean operation applied between subject and clip regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipType {
    Intersection,
    Union,
    Difference,
    Xor,
}

/// How winding numbers map to "inside".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FillRule {
    /// Inside when the winding number is odd.
    #[default]
    EvenOdd,
    /// Inside when the winding number is not zero.
    NonZero,
    /// Inside when the winding number is greater than zero.
    Positive,
    /// Inside when the winding number is less than zero.
    Negative,
}

/// Which operand a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathType {
    Subject,
    Clip,
}
