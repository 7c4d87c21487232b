use thiserror::Error;

/// Top-level error type for the clipping engine.
#[derive(Debug, Error)]
pub enum ClipError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    Invariant(#[from] InvariantError),
}

/// Programmer errors: the request itself is invalid.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("open paths cannot be added as clip paths")]
    OpenClipPath,

    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    #[error("invalid parameter {name} = {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// Internal sweep invariants that were found broken.
///
/// These indicate a defect in the engine rather than bad input; the sweep is
/// aborted instead of producing corrupt topology.
#[derive(Debug, Error)]
pub enum InvariantError {
    #[error("attempted to swap active edges that are not adjacent")]
    NonAdjacentSwap,

    #[error("local maximum closed on an edge that is not contributing")]
    ColdEdgeClose,

    #[error("local maximum edges are on the same side of their output region")]
    MismatchedSides,

    #[error("no adjacent edge pair left in the intersection list")]
    IntersectionOrder,
}

/// Convenience type alias for results using [`ClipError`].
pub type Result<T> = std::result::Result<T, ClipError>;
