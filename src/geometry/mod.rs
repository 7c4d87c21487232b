pub mod poly_tree;

pub use poly_tree::{PolyNode, PolyTree};
