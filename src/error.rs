//! Error types for the quadratic-bound optimizer.
//!
//! Provides an integer-coded `ReturnCode` (the termination reason carried by
//! every result and by the C ABI) and the `QuadBoundError` enum used for
//! Rust-idiomatic error propagation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Return codes describing why a run stopped.
///
/// Negative values indicate errors, positive values indicate termination
/// with a usable answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnCode {
    /// Rejected configuration (tolerance, gamma or interval)
    InvalidConfig = -1,
    /// The evaluator could not produce a value
    EvaluatorFailure = -2,
    /// Interval store accessed at a missing position
    OutOfRange = -3,
    /// Matrix could not be loaded or indexed
    MatrixFailure = -4,
    /// Stopped by the progress callback
    ForcedStop = -102,

    /// Upper and lower bound met within tolerance
    Converged = 1,
    /// Iteration cap reached before convergence
    MaxIterExceeded = 2,
    /// An intersection point left `[lb, ub]`; best bound so far returned
    BoundDivergence = 3,
}

impl ReturnCode {
    /// Returns true if this is a successful termination (positive code).
    pub fn is_success(&self) -> bool {
        (*self as i32) > 0
    }

    /// Returns true if this is an error (negative code).
    pub fn is_error(&self) -> bool {
        (*self as i32) < 0
    }

    /// Convert from an integer code (the value used across the C ABI).
    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Self::InvalidConfig),
            -2 => Some(Self::EvaluatorFailure),
            -3 => Some(Self::OutOfRange),
            -4 => Some(Self::MatrixFailure),
            -102 => Some(Self::ForcedStop),
            1 => Some(Self::Converged),
            2 => Some(Self::MaxIterExceeded),
            3 => Some(Self::BoundDivergence),
            _ => None,
        }
    }
}

/// Errors that can occur while configuring or running the optimizer.
#[derive(Error, Debug)]
pub enum QuadBoundError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Evaluation failed at x = {x}: {reason}")]
    EvaluatorFailure { x: f64, reason: String },

    #[error("Intersection point {x} left the interval [{lb}, {ub}]; the result may not be as accurate as required")]
    BoundDivergence { x: f64, lb: f64, ub: f64 },

    #[error("Position {position} out of range for store of size {size}")]
    OutOfRange { position: usize, size: usize },

    #[error("Matrix file could not be read: {0}")]
    MatrixIo(#[from] std::io::Error),

    #[error("Matrix entry {index} is not a number: {token:?}")]
    MatrixParse { index: usize, token: String },

    #[error("Matrix of shape {rows}x{cols} needs {} values, found {found}", needed_values(.rows, .cols))]
    MatrixShape { rows: usize, cols: usize, found: usize },

    #[error("Matrix index ({row}, {col}) out of bounds for shape {rows}x{cols}")]
    MatrixIndex {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Optimization forced to stop")]
    ForcedStop,
}

fn needed_values(rows: &usize, cols: &usize) -> String {
    match rows.checked_mul(*cols) {
        Some(n) => n.to_string(),
        None => format!("more than {}", usize::MAX),
    }
}

impl QuadBoundError {
    /// The `ReturnCode` reported for this error.
    pub fn return_code(&self) -> ReturnCode {
        match self {
            Self::InvalidConfig(_) => ReturnCode::InvalidConfig,
            Self::EvaluatorFailure { .. } => ReturnCode::EvaluatorFailure,
            Self::BoundDivergence { .. } => ReturnCode::BoundDivergence,
            Self::OutOfRange { .. } => ReturnCode::OutOfRange,
            Self::MatrixIo(_)
            | Self::MatrixParse { .. }
            | Self::MatrixShape { .. }
            | Self::MatrixIndex { .. } => ReturnCode::MatrixFailure,
            Self::ForcedStop => ReturnCode::ForcedStop,
        }
    }
}

/// Result type alias for optimizer operations.
pub type Result<T> = std::result::Result<T, QuadBoundError>;
