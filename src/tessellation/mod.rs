mod ear_cut;
mod hooks;
mod triangulate;

pub use triangulate::ClipperTriangulation;
