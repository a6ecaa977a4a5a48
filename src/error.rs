use thiserror::Error;

/// Problem set-up that cannot support a well-posed solve.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("node {node} has {found} distinct neighbors, a second-order stencil needs at least {required}")]
    InsufficientNeighbors {
        node: usize,
        found: usize,
        required: usize,
    },
    #[error("stencil size {requested} is below the minimum of {minimum}")]
    StencilTooSmall { requested: usize, minimum: usize },
    #[error("triangle {triangle} references node {index}, but the cloud has {node_count} nodes")]
    TriangleIndexOutOfRange {
        triangle: usize,
        index: i64,
        node_count: usize,
    },
    #[error("triangle {triangle} repeats node {index}")]
    DegenerateTriangle { triangle: usize, index: usize },
    #[error("neighbor row {node} is malformed: {reason}")]
    MalformedNeighborRow { node: usize, reason: String },
    #[error("blend parameter theta = {0} is outside [0, 1]")]
    ThetaOutOfRange(f64),
    #[error("step count must be positive")]
    ZeroSteps,
    #[error("wave speed must be positive and finite, got {0}")]
    InvalidWaveSpeed(f64),
    #[error("final time must be positive and finite, got {0}")]
    InvalidFinalTime(f64),
    #[error("pseudo-inverse cutoff must be finite and non-negative, got {0}")]
    InvalidPinvRcond(f64),
    #[error("minimum pivot ratio must be finite and non-negative, got {0}")]
    InvalidPivotRatio(f64),
    #[error("{what} has dimension {found}, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Failures of the numerical kernels.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumericalError {
    #[error("pseudo-inverse of the stencil at node {node} failed: {reason}")]
    PseudoInverse { node: usize, reason: String },
    #[error(
        "system matrix is singular or ill-conditioned at step {step} \
         (theta = {theta}, dt = {dt:.3e}, wave speed = {wave_speed})"
    )]
    SingularSystem {
        step: usize,
        theta: f64,
        dt: f64,
        wave_speed: f64,
    },
    #[error("non-finite value at step {step} (t = {time:.4e}, theta = {theta})")]
    NonFinite { step: usize, time: f64, theta: f64 },
}

/// Malformed node or connectivity arrays.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("the cloud contains no nodes")]
    EmptyCloud,
    #[error("{what}: expected {expected} entries, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("node {node} has boundary flag {flag}, expected 0 or 1")]
    InvalidBoundaryFlag { node: usize, flag: f64 },
    #[error("node {node} has a non-finite coordinate")]
    NonFiniteCoordinate { node: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GfdmError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Numerical(#[from] NumericalError),
    #[error(transparent)]
    Input(#[from] InputError),
}
