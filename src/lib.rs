//! Polygon boolean clipping, offsetting and triangulation.
//!
//! The core is a Vatti-style sweep over the Y axis ([`Clipper`]). Path
//! offsetting ([`ClipperOffset`]) and triangulation ([`ClipperTriangulation`])
//! are layered on the same sweep engine.
//!
//! A single engine instance owns all of its sweep state and is not meant to be
//! shared between threads; use one instance per concurrent operation.

pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod tessellation;

pub use error::{ClipError, Result};
pub use geometry::PolyTree;
pub use math::{Path, Paths, Point2};
pub use operations::boolean::{ClipType, Clipper, FillRule, PathType, Solution};
pub use operations::offset::{ClipperOffset, EndType, JoinType};
pub use tessellation::ClipperTriangulation;
