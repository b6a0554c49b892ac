//! Error types.
//!
//! Two layers:
//!
//! - [`CoreError`]: typed failures of the data-selection and fitting core.
//!   Callers can match on them (e.g. to tell "unknown model" from "fit failed").
//! - [`AppError`]: what the binary reports (message + process exit code).
//!
//! Note that a bound with `low > high` is not an error anywhere in this crate:
//! the partition is still well defined (every row becomes an outlier).

use thiserror::Error;

/// Failures of the core pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Raw input could not be turned into a dataset.
    #[error("There was an error processing this file: {0}")]
    Decode(String),

    /// The requested model name is not in the catalog.
    #[error("Unknown model `{0}`")]
    ModelNotFound(String),

    /// Least squares failed on the inlier subset and again on the full dataset.
    #[error(
        "Fit did not converge for model {model} (inliers: {inlier_reason}; all data: {fallback_reason})"
    )]
    FitDidNotConverge {
        model: String,
        inlier_reason: String,
        fallback_reason: String,
    },

    /// A column has zero width, so display precision cannot be derived from it.
    #[error("Degenerate range: min = max = {min}")]
    DegenerateRange { min: f64, max: f64 },

    /// x and y columns differ in length.
    #[error("Column length mismatch: x has {x} values, y has {y}")]
    LengthMismatch { x: usize, y: usize },

    /// Grid resolution below the minimum of two points.
    #[error("Fit resolution must be >= 2 (got {0})")]
    InvalidResolution(usize),

    /// An operation that needs at least one point received none.
    #[error("No data points")]
    NoData,

    /// A parameter vector does not match the model's arity.
    #[error("Model {model} takes {expected} parameters (got {got})")]
    ParamCount {
        model: String,
        expected: usize,
        got: usize,
    },

    /// A table could not be serialised for download.
    #[error("Failed to serialise table: {0}")]
    Encode(String),

    /// A single solver attempt failed (used as the reason inside `FitDidNotConverge`).
    #[error("{0}")]
    Solver(String),
}

impl CoreError {
    /// Exit code used when this error terminates the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            CoreError::Decode(_)
            | CoreError::ModelNotFound(_)
            | CoreError::LengthMismatch { .. }
            | CoreError::InvalidResolution(_) => 2,
            CoreError::DegenerateRange { .. } | CoreError::NoData => 3,
            CoreError::FitDidNotConverge { .. }
            | CoreError::ParamCount { .. }
            | CoreError::Encode(_)
            | CoreError::Solver(_) => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
