//! The objective capability: `x -> (f(x), f'(x))`.
//!
//! Any `Fn(f64) -> (f64, f64)` closure is an evaluator. Objectives that need
//! external data bind it through `MatrixEvaluator`, and fallible objectives
//! implement `Evaluator` directly.

use std::sync::Arc;

use crate::error::Result;
use crate::matrix::Matrix;

/// Computes the value and the derivative of the objective at `x`.
///
/// Implementations must be pure for the lifetime of a run: the driver
/// evaluates each point once and trusts the answer.
pub trait Evaluator {
    fn evaluate(&self, x: f64) -> Result<(f64, f64)>;
}

impl<F> Evaluator for F
where
    F: Fn(f64) -> (f64, f64),
{
    #[inline]
    fn evaluate(&self, x: f64) -> Result<(f64, f64)> {
        Ok(self(x))
    }
}

/// Shared, thread-safe evaluator handle used by the driver.
pub type ArcEvaluator = Arc<dyn Evaluator + Send + Sync>;

/// Objective that reads a read-only matrix loaded before the run.
pub struct MatrixEvaluator<F> {
    matrix: Matrix,
    func: F,
}

impl<F> MatrixEvaluator<F>
where
    F: Fn(f64, &Matrix) -> Result<(f64, f64)>,
{
    pub fn new(matrix: Matrix, func: F) -> Self {
        Self { matrix, func }
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }
}

impl<F> Evaluator for MatrixEvaluator<F>
where
    F: Fn(f64, &Matrix) -> Result<(f64, f64)>,
{
    fn evaluate(&self, x: f64) -> Result<(f64, f64)> {
        (self.func)(x, &self.matrix)
    }
}

/// Minimize-form view of an objective being maximized: `(-f, -f')`.
pub(crate) struct Negated(pub(crate) ArcEvaluator);

impl Evaluator for Negated {
    #[inline]
    fn evaluate(&self, x: f64) -> Result<(f64, f64)> {
        let (f, g) = self.0.evaluate(x)?;
        Ok((-f, -g))
    }
}
