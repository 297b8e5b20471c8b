use crate::r2::R2;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ShapeError {
    #[error("{what} must be positive, got {value}")]
    NonPositive { what: &'static str, value: f64 },

    #[error("Regular polygon needs at least 3 sides, got {0}")]
    TooFewSides(usize),

    #[error("Polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    #[error("Expected finite coordinates, got {0}")]
    NonFinitePoint(String),

    #[error("Bezier segments take 2 to 4 control points, got {0}")]
    ControlPoints(usize),

    #[error("Segment {idx} starts {gap:e} away from the end of its predecessor")]
    Discontinuous { idx: usize, gap: f64 },

    #[error("Expected {expected} strictly increasing knots, got {knots:?}")]
    Knots { expected: usize, knots: Vec<f64> },

    #[error("Curve is not closed, endpoints {gap:e} apart")]
    NotClosed { gap: f64 },

    #[error("Invalid shape components: {0}")]
    InvalidComponent(String),

    #[error("Can't parse {0:?}")]
    Parse(String),
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("Degenerate geometry: {reason}")]
    Degenerate { reason: String },

    #[error("Curve is not simple: segments {seg0} and {seg1} meet at {p}")]
    NotSimple { seg0: usize, seg1: usize, p: R2<f64> },
}

impl GeometryError {
    pub fn degenerate(reason: impl Into<String>) -> Self {
        GeometryError::Degenerate { reason: reason.into() }
    }
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ReconstructionError {
    #[error("Traversal dead-ended at node {node} after edges {path:?} ({curves} input curves)")]
    DeadEnd {
        node: String,
        path: Vec<String>,
        curves: usize,
    },

    #[error("Traversal never closed: {path:?}")]
    Unclosed { path: Vec<String> },
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Reconstruction(#[from] ReconstructionError),
}
