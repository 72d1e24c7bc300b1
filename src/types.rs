//! Core type definitions: optimization direction, options, bounds and results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ReturnCode;

// ──────────────────────────────────────────────────────────────────────────────
// Direction
// ──────────────────────────────────────────────────────────────────────────────

/// Whether the run searches for the global minimum or maximum of `f`.
///
/// The driver always works in minimize form. `Maximize` runs on `-f` and the
/// sign is restored once, when the result is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Minimize,
    Maximize,
}

impl Direction {
    /// Map a minimize-form quantity to the requested direction.
    #[inline]
    pub fn report(&self, value: f64) -> f64 {
        match self {
            Self::Minimize => value,
            Self::Maximize => -value,
        }
    }

    /// Integer flag used by the interactive demo and the C ABI:
    /// 0 = minimize, anything else = maximize.
    pub fn from_minmax(minmax: i32) -> Self {
        if minmax == 0 {
            Self::Minimize
        } else {
            Self::Maximize
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minimize => write!(f, "minimize"),
            Self::Maximize => write!(f, "maximize"),
        }
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Type Aliases
// ──────────────────────────────────────────────────────────────────────────────

/// Search interval `(lb, ub)`.
pub type Bounds = (f64, f64);

/// Progress callback, called after every refinement step.
///
/// - `x`: current incumbent point
/// - `upbound`: current upper bound (sign-corrected)
/// - `lowbound`: current lower bound (sign-corrected)
/// - `iteration`: refinement steps performed so far
/// - Returns: `true` to force stop, `false` to continue
pub type CallbackFn = dyn Fn(f64, f64, f64, usize) -> bool + Send + Sync;

// ──────────────────────────────────────────────────────────────────────────────
// Options
// ──────────────────────────────────────────────────────────────────────────────

/// Configuration for a run. Immutable once the optimizer is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadBoundOptions {
    /// Upper bound on `|f''(x)|` over the interval. Has no meaningful
    /// default; a run with `gamma <= 0` is rejected.
    pub gamma: f64,

    /// The run converges once `upbound - lowbound <= tolerance`.
    pub tolerance: f64,

    /// Minimize or maximize.
    pub direction: Direction,

    /// Print one `"<iter>. lowbound: <l> upbound: <u>"` line per iteration to stdout.
    pub display: bool,

    /// Maximum number of refinement steps. 0 means no limit.
    pub max_iter: usize,
}

impl Default for QuadBoundOptions {
    fn default() -> Self {
        Self {
            gamma: 0.0,
            tolerance: 0.1,
            direction: Direction::Minimize,
            display: false,
            max_iter: 0,
        }
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Result
// ──────────────────────────────────────────────────────────────────────────────

/// Proven bounds after one iteration, already sign-corrected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundSnapshot {
    /// 0 for the initial state, then one per refinement step.
    pub iteration: usize,
    pub lowbound: f64,
    pub upbound: f64,
}

/// Result of an optimization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuadBoundResult {
    /// Best value of `f` found (global minimum or maximum within tolerance).
    pub optimum_value: f64,

    /// Point at which `optimum_value` was observed.
    pub optimum_point: f64,

    /// Final lower bound (sign-corrected).
    pub lowbound: f64,

    /// Final upper bound (sign-corrected).
    pub upbound: f64,

    /// Refinement steps performed.
    pub iterations: usize,

    /// Total calls to the evaluator.
    pub nfev: usize,

    /// True when the run stopped before the bounds met within tolerance.
    pub terminated_early: bool,

    /// The return code indicating why the run stopped.
    pub return_code: ReturnCode,

    /// Human-readable termination message.
    pub message: String,

    /// Bounds after the initial state and after every refinement step.
    pub history: Vec<BoundSnapshot>,
}

impl fmt::Display for QuadBoundResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "QuadBoundResult {{")?;
        writeln!(f, "  terminated_early: {}", self.terminated_early)?;
        writeln!(f, "  message: {}", self.message)?;
        writeln!(f, "  optimum_value: {:.15e}", self.optimum_value)?;
        writeln!(f, "  optimum_point: {:.15e}", self.optimum_point)?;
        writeln!(f, "  bounds: [{:.15e}, {:.15e}]", self.lowbound, self.upbound)?;
        writeln!(f, "  iterations: {}", self.iterations)?;
        writeln!(f, "  nfev: {}", self.nfev)?;
        writeln!(f, "  return_code: {:?}", self.return_code)?;
        write!(f, "}}")
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig => write!(f, "Invalid configuration"),
            Self::EvaluatorFailure => write!(f, "Function evaluation failed"),
            Self::OutOfRange => write!(f, "Interval store position out of range"),
            Self::MatrixFailure => write!(f, "Matrix could not be loaded"),
            Self::ForcedStop => write!(f, "Optimization forced to stop"),
            Self::Converged => write!(f, "Bounds converged within tolerance"),
            Self::MaxIterExceeded => write!(f, "Maximum iterations reached"),
            Self::BoundDivergence => {
                write!(f, "The result may not be as accurate as required")
            }
        }
    }
}
