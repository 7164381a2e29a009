use thiserror::Error;

/// Errors returned when configuring a match engine.
///
/// Matching itself never fails: scoring and binning are total over their
/// inputs, so only parameter changes can be rejected.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid dimensionality {ndim}; expected 1..={max}")]
    InvalidDimensions { ndim: usize, max: usize },

    #[error("dimension index {dim} out of range for {ndim}-d engine")]
    DimensionOutOfRange { dim: usize, ndim: usize },

    #[error("error {value} for axis {dim} must be finite and >= 0")]
    InvalidError { dim: usize, value: f64 },

    #[error("bin factor {value} must be >= 1")]
    InvalidBinFactor { value: f64 },

    #[error("expected {expected} per-axis errors (got {got})")]
    ErrorCount { expected: usize, got: usize },

    #[error("unknown parameter: {0}")]
    UnknownParameter(String),
}
