pub mod intersect_2d;
pub mod polygon_2d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// One contour: an ordered point sequence, implicitly closed unless added as open.
pub type Path = Vec<Point2>;

/// A polygon as a set of contours, interpreted together under a fill rule.
pub type Paths = Vec<Path>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;
