//! # quadbound: global 1-D optimization with quadratic lower bounds
//!
//! Finds the global minimum (or maximum) of a differentiable function `f`
//! over an interval `[lb, ub]`, given `gamma`, an upper bound on `|f''|`.
//!
//! ## Overview
//!
//! Every sample `(x, f(x), f'(x))` defines a concave parabola
//! `f(x) + f'(x)(t - x) - (gamma/2)(t - x)^2` that lies below `f`. Where the
//! parabolas of two adjacent samples meet, their common value is a certified
//! floor for `f` on that sub-interval. This is the classical Piyavskii scheme
//! with quadratic instead of linear bounding pieces.
//!
//! The driver repeatedly evaluates `f` at the intersection with the lowest
//! floor, splits it into two new intersections, and stops once the best
//! evaluated value (upper bound) and the lowest floor (lower bound) are
//! within `tolerance`.
//!
//! ## Usage
//!
//! ```
//! use quadbound::QuadBoundBuilder;
//!
//! let f = |x: f64| {
//!     let d = 3.0 - x;
//!     (std::f64::consts::PI.ln() + (1.0 + d * d).ln(), -2.0 * d / (1.0 + d * d))
//! };
//! let result = QuadBoundBuilder::new(f, (-2.0, 2.0))
//!     .gamma(20.0)
//!     .tolerance(0.1)
//!     .minimize()
//!     .unwrap();
//! assert!((result.optimum_point - 2.0).abs() < 1e-9);
//! ```
//!
//! ## Outcomes
//!
//! - `ReturnCode::Converged`: `upbound - lowbound <= tolerance`
//! - `ReturnCode::BoundDivergence`: an intersection left `[lb, ub]`, which means
//!   `gamma` understates the curvature; the best value so far is returned with
//!   `terminated_early = true`
//! - `ReturnCode::MaxIterExceeded` / `ReturnCode::ForcedStop`: iteration cap or
//!   callback stop, also with `terminated_early = true`
//! - `Err(QuadBoundError::InvalidConfig)` / `Err(QuadBoundError::EvaluatorFailure)`:
//!   the run could not start or the objective failed

pub mod error;
pub mod evaluator;
pub mod ffi;
pub mod matrix;
pub mod optimizer;
pub mod quadratic;
pub mod storage;
pub mod trace;
pub mod types;

use std::sync::Arc;

// Re-export main types
pub use error::{QuadBoundError, Result, ReturnCode};
pub use evaluator::{ArcEvaluator, Evaluator, MatrixEvaluator};
pub use matrix::Matrix;
pub use optimizer::{OptimizerState, Phase, QuadBound, StepOutcome};
pub use storage::{BoundPoint, IntervalStore, PointKind};
pub use trace::TraceWriter;
pub use types::{
    BoundSnapshot, Bounds, CallbackFn, Direction, QuadBoundOptions, QuadBoundResult,
};

/// Run the optimizer once with explicit options.
pub fn quadbound_optimize(
    func: impl Evaluator + Send + Sync + 'static,
    bounds: Bounds,
    options: QuadBoundOptions,
) -> Result<QuadBoundResult> {
    QuadBound::new(func, bounds, options)?.run()
}

/// Chained configuration for a single run.
///
/// ```
/// use quadbound::{QuadBoundBuilder, ReturnCode};
///
/// let result = QuadBoundBuilder::new(|x: f64| (x.sin(), x.cos()), (0.0, 6.0))
///     .gamma(1.0)
///     .tolerance(1e-3)
///     .maximize()
///     .unwrap();
/// assert_eq!(result.return_code, ReturnCode::Converged);
/// assert!((result.optimum_value - 1.0).abs() <= 1e-3);
/// ```
pub struct QuadBoundBuilder {
    func: ArcEvaluator,
    bounds: Bounds,
    options: QuadBoundOptions,
    callback: Option<Arc<CallbackFn>>,
    tracer: Option<Arc<TraceWriter>>,
}

impl QuadBoundBuilder {
    pub fn new(func: impl Evaluator + Send + Sync + 'static, bounds: Bounds) -> Self {
        Self::from_shared(Arc::new(func), bounds)
    }

    pub fn from_shared(func: ArcEvaluator, bounds: Bounds) -> Self {
        Self {
            func,
            bounds,
            options: QuadBoundOptions::default(),
            callback: None,
            tracer: None,
        }
    }

    /// Replace all options at once.
    pub fn options(mut self, options: QuadBoundOptions) -> Self {
        self.options = options;
        self
    }

    pub fn gamma(mut self, gamma: f64) -> Self {
        self.options.gamma = gamma;
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.options.tolerance = tolerance;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.options.direction = direction;
        self
    }

    pub fn display(mut self, display: bool) -> Self {
        self.options.display = display;
        self
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.options.max_iter = max_iter;
        self
    }

    /// Called after each refinement step with
    /// `(incumbent_x, upbound, lowbound, iteration)`; return `true` to stop.
    pub fn with_callback(
        mut self,
        callback: impl Fn(f64, f64, f64, usize) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.callback = Some(Arc::new(callback));
        self
    }

    pub fn with_tracer(mut self, tracer: Arc<TraceWriter>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Validate the configuration and build the optimizer without running it.
    pub fn build(self) -> Result<QuadBound> {
        Ok(QuadBound::from_shared(self.func, self.bounds, self.options)?
            .with_shared_callback(self.callback)
            .with_shared_tracer(self.tracer))
    }

    /// Run in the configured direction.
    pub fn optimize(self) -> Result<QuadBoundResult> {
        self.build()?.run()
    }

    pub fn minimize(self) -> Result<QuadBoundResult> {
        self.direction(Direction::Minimize).optimize()
    }

    pub fn maximize(self) -> Result<QuadBoundResult> {
        self.direction(Direction::Maximize).optimize()
    }
}
