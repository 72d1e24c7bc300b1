//! Optimizer driver: initialization, refinement steps and termination.
//!
//! State machine:
//!
//! ```text
//! Init ──► Refine ──(gap <= tolerance)──► Converged
//!   │         │
//!   └─────────┴──(intersection outside [lb, ub])──► Diverged
//! ```
//!
//! | Operation                    | Effect                                                   |
//! |------------------------------|----------------------------------------------------------|
//! | `QuadBound::new()`           | validate configuration, bind the evaluator               |
//! | `QuadBound::initialize()`    | evaluate both endpoints, seed the three-point store      |
//! | `QuadBound::refine()`        | one refinement step (evaluate, two intersections, rescan) |
//! | `QuadBound::scan_lower_bound()` | minimum over the lower-bound candidate positions      |
//! | `QuadBound::run()`           | the whole loop, returning a sign-corrected result        |
//!
//! The driver works in minimize form throughout. For `Direction::Maximize`
//! the evaluator is wrapped to return `(-f, -f')`, and values are negated
//! back only in `snapshot()` and `report()`.

use std::sync::Arc;

use crate::error::{QuadBoundError, Result, ReturnCode};
use crate::evaluator::{ArcEvaluator, Evaluator, Negated};
use crate::quadratic::{intersect, Sample};
use crate::storage::{BoundPoint, IntervalStore};
use crate::trace::TraceWriter;
use crate::types::{
    BoundSnapshot, Bounds, CallbackFn, Direction, QuadBoundOptions, QuadBoundResult,
};

/// Driver phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Refine,
    Converged,
    Diverged,
}

/// What a single initialization or refinement step produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// Bounds were tightened; the loop may continue.
    Continue,
    /// A new intersection landed at `x`, outside `[lb, ub]`.
    Diverged { x: f64 },
}

/// Loop state carried from one refinement step to the next (minimize form).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerState {
    /// Certified floor on the optimum: minimum over the candidate positions.
    pub lowbound: f64,
    /// Best true value evaluated so far.
    pub upbound: f64,
    /// Point where `upbound` was evaluated.
    pub incumbent_x: f64,
    /// Refinement steps started.
    pub iteration: usize,
    /// Position to evaluate in the next refinement step.
    pub active_position: usize,
    /// Evaluator calls made.
    pub nfev: usize,
}

impl OptimizerState {
    fn empty() -> Self {
        Self {
            lowbound: f64::NEG_INFINITY,
            upbound: f64::INFINITY,
            incumbent_x: f64::NAN,
            iteration: 0,
            active_position: 1,
            nfev: 0,
        }
    }

    #[inline]
    pub fn gap(&self) -> f64 {
        self.upbound - self.lowbound
    }
}

impl From<BoundPoint> for Sample {
    fn from(p: BoundPoint) -> Self {
        Sample::new(p.x, p.value, p.slope)
    }
}

/// Quadratic-bound global optimizer over one interval.
pub struct QuadBound {
    /// Minimize-form evaluator.
    func: ArcEvaluator,
    lb: f64,
    ub: f64,
    options: QuadBoundOptions,
    callback: Option<Arc<CallbackFn>>,
    #[cfg_attr(not(feature = "trace"), allow(dead_code))]
    tracer: Option<Arc<TraceWriter>>,
    store: IntervalStore,
    state: OptimizerState,
    phase: Phase,
    history: Vec<BoundSnapshot>,
    /// Abscissa of the intersection that ended the run, if any.
    divergence: Option<f64>,
}

impl QuadBound {
    /// Create an optimizer for `func` over `bounds`.
    ///
    /// # Errors
    /// `InvalidConfig` if `tolerance <= 0`, `gamma <= 0`, `lb >= ub`, or any of
    /// them is not finite.
    pub fn new(
        func: impl Evaluator + Send + Sync + 'static,
        bounds: Bounds,
        options: QuadBoundOptions,
    ) -> Result<Self> {
        Self::from_shared(Arc::new(func), bounds, options)
    }

    /// Create an optimizer from an already shared evaluator.
    pub fn from_shared(
        func: ArcEvaluator,
        bounds: Bounds,
        options: QuadBoundOptions,
    ) -> Result<Self> {
        Self::validate_config(bounds, &options)?;

        let func: ArcEvaluator = match options.direction {
            Direction::Minimize => func,
            Direction::Maximize => Arc::new(Negated(func)),
        };

        Ok(Self {
            func,
            lb: bounds.0,
            ub: bounds.1,
            options,
            callback: None,
            tracer: None,
            store: IntervalStore::new(),
            state: OptimizerState::empty(),
            phase: Phase::Init,
            history: Vec::new(),
            divergence: None,
        })
    }

    /// Reject configurations the bound construction cannot work with.
    pub fn validate_config(bounds: Bounds, options: &QuadBoundOptions) -> Result<()> {
        let (lb, ub) = bounds;
        if !lb.is_finite() || !ub.is_finite() {
            return Err(QuadBoundError::InvalidConfig(format!(
                "interval bounds must be finite, got [{}, {}]",
                lb, ub
            )));
        }
        if lb >= ub {
            return Err(QuadBoundError::InvalidConfig(format!(
                "lower bound {} must be below upper bound {}",
                lb, ub
            )));
        }
        if !(options.gamma > 0.0 && options.gamma.is_finite()) {
            return Err(QuadBoundError::InvalidConfig(format!(
                "gamma must be positive and finite, got {}",
                options.gamma
            )));
        }
        if !(options.tolerance > 0.0 && options.tolerance.is_finite()) {
            return Err(QuadBoundError::InvalidConfig(format!(
                "tolerance must be positive and finite, got {}",
                options.tolerance
            )));
        }
        Ok(())
    }

    /// Set a callback for progress monitoring and early stopping.
    pub fn with_callback(
        mut self,
        callback: impl Fn(f64, f64, f64, usize) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.callback = Some(Arc::new(callback));
        self
    }

    pub(crate) fn with_shared_callback(mut self, callback: Option<Arc<CallbackFn>>) -> Self {
        self.callback = callback;
        self
    }

    /// Attach a trace sink (written to only with the `trace` feature).
    pub fn with_tracer(mut self, tracer: Arc<TraceWriter>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    pub(crate) fn with_shared_tracer(mut self, tracer: Option<Arc<TraceWriter>>) -> Self {
        self.tracer = tracer;
        self
    }

    pub fn store(&self) -> &IntervalStore {
        &self.store
    }

    pub fn state(&self) -> &OptimizerState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn bounds(&self) -> Bounds {
        (self.lb, self.ub)
    }

    pub fn options(&self) -> &QuadBoundOptions {
        &self.options
    }

    /// Bounds recorded so far, sign-corrected.
    pub fn history(&self) -> &[BoundSnapshot] {
        &self.history
    }

    #[inline]
    pub fn is_converged(&self) -> bool {
        self.state.gap() <= self.options.tolerance
    }

    /// Evaluate the minimize-form objective at `x`.
    ///
    /// Any evaluator error, and any non-finite value or slope, becomes
    /// `EvaluatorFailure`. Nothing is retried.
    pub fn evaluate(&mut self, x: f64) -> Result<(f64, f64)> {
        self.state.nfev += 1;
        let (f, g) = self.func.evaluate(x).map_err(|e| match e {
            e @ QuadBoundError::EvaluatorFailure { .. } => e,
            other => QuadBoundError::EvaluatorFailure {
                x,
                reason: other.to_string(),
            },
        })?;
        if !f.is_finite() || !g.is_finite() {
            return Err(QuadBoundError::EvaluatorFailure {
                x,
                reason: format!("non-finite result f = {}, g = {}", f, g),
            });
        }
        Ok((f, g))
    }

    // ──────────────────────────────────────────────────────────────────────
    // Initialization
    // ──────────────────────────────────────────────────────────────────────

    /// Evaluate both endpoints and seed the store with
    /// `(lb, flb, glb)`, `(x_mid, q_mid, 0)`, `(ub, fub, gub)`.
    ///
    /// The upper bound starts at the better endpoint (ties go to `ub`), the
    /// lower bound at `q_mid`. A first intersection outside `[lb, ub]` ends the
    /// run before any interior point is evaluated.
    pub fn initialize(&mut self) -> Result<StepOutcome> {
        let (lb, ub) = (self.lb, self.ub);
        let gamma = self.options.gamma;

        let (flb, glb) = self.evaluate(lb)?;
        let (fub, gub) = self.evaluate(ub)?;
        let left = Sample::new(lb, flb, glb);
        let right = Sample::new(ub, fub, gub);
        let mid = intersect(&left, &right, gamma);

        self.store = IntervalStore::seeded((lb, flb, glb), (mid.x, mid.q), (ub, fub, gub));

        let (upbound, incumbent_x) = if flb < fub { (flb, lb) } else { (fub, ub) };
        self.state = OptimizerState {
            lowbound: mid.q,
            upbound,
            incumbent_x,
            iteration: 0,
            active_position: 1,
            nfev: self.state.nfev,
        };
        self.history.clear();
        self.divergence = None;

        crate::trace_write!(
            self.tracer,
            "TRACE INIT lb={:.15e} flb={:.15e} ub={:.15e} fub={:.15e} xmid={:.15e} qmid={:.15e}",
            lb,
            flb,
            ub,
            fub,
            mid.x,
            mid.q
        );
        self.record();

        if !mid.within(lb, ub) {
            return Ok(self.diverge(mid.x));
        }

        self.phase = if self.is_converged() {
            Phase::Converged
        } else {
            Phase::Refine
        };
        Ok(StepOutcome::Continue)
    }

    // ──────────────────────────────────────────────────────────────────────
    // Refinement
    // ──────────────────────────────────────────────────────────────────────

    /// One refinement step at the current `active_position` (`mi`):
    ///
    /// 1. evaluate `f` at `x[mi]` and overwrite the record with the true value
    /// 2. intersect with the left neighbour, insert at `mi`
    /// 3. intersect with the right neighbour (now at `mi + 2`), insert at `mi + 2`
    /// 4. improve the incumbent if `f < upbound`
    /// 5. rescan for the next lower bound and active position
    ///
    /// If either new intersection falls outside `[lb, ub]` the step stops
    /// right after inserting it; the incumbent and bounds keep their values
    /// from the previous state.
    pub fn refine(&mut self) -> Result<StepOutcome> {
        let (lb, ub) = (self.lb, self.ub);
        let gamma = self.options.gamma;
        let mi = self.state.active_position;
        let size = self.store.size();

        let x = self.store.get(mi)?.x;
        self.state.iteration += 1;
        let (f, g) = self.evaluate(x)?;
        self.store.update(mi, f, g)?;
        let here = Sample::new(x, f, g);

        crate::trace_write!(
            self.tracer,
            "TRACE EVAL iter={} pos={} x={:.15e} f={:.15e} g={:.15e}",
            self.state.iteration,
            mi,
            x,
            f,
            g
        );

        // Left sub-interval
        let left_pos = mi
            .checked_sub(1)
            .ok_or(QuadBoundError::OutOfRange { position: 0, size })?;
        let left = Sample::from(self.store.get(left_pos)?);
        let xl = intersect(&left, &here, gamma);
        self.store.insert_after(left_pos, xl.x, xl.q, 0.0)?;
        crate::trace_write!(
            self.tracer,
            "TRACE INSERT side=left pos={} x={:.15e} q={:.15e}",
            mi,
            xl.x,
            xl.q
        );
        if !xl.within(lb, ub) {
            return Ok(self.diverge(xl.x));
        }

        // Right sub-interval: evaluated point now at mi + 1
        let right = Sample::from(self.store.get(mi + 2)?);
        let xr = intersect(&here, &right, gamma);
        self.store.insert_after(mi + 1, xr.x, xr.q, 0.0)?;
        crate::trace_write!(
            self.tracer,
            "TRACE INSERT side=right pos={} x={:.15e} q={:.15e}",
            mi + 2,
            xr.x,
            xr.q
        );
        if !xr.within(lb, ub) {
            return Ok(self.diverge(xr.x));
        }

        if f < self.state.upbound {
            self.state.upbound = f;
            self.state.incumbent_x = x;
        }

        let (next, lowbound) = Self::scan_lower_bound(&self.store)?;
        self.state.lowbound = lowbound;
        self.state.active_position = next;

        crate::trace_write!(
            self.tracer,
            "TRACE SCAN iter={} lowbound={:.15e} upbound={:.15e} next={} size={}",
            self.state.iteration,
            lowbound,
            self.state.upbound,
            next,
            self.store.size()
        );
        self.record();

        if self.is_converged() {
            self.phase = Phase::Converged;
        }
        Ok(StepOutcome::Continue)
    }

    /// Find the smallest lower-bound candidate and its position.
    ///
    /// Candidates are position 1, the last position, and every odd position
    /// from 3 up to (excluding) the last. Comparisons are strict, so ties
    /// keep position 1 first, then the last position, then the leftmost odd
    /// position.
    pub fn scan_lower_bound(store: &IntervalStore) -> Result<(usize, f64)> {
        let last = store
            .last_position()
            .ok_or(QuadBoundError::OutOfRange { position: 0, size: 0 })?;

        let mut best = 1;
        let mut lowbound = store.value(1)?;

        let v_last = store.value(last)?;
        if lowbound > v_last {
            lowbound = v_last;
            best = last;
        }

        for pos in (3..last).step_by(2) {
            let v = store.value(pos)?;
            if v < lowbound {
                lowbound = v;
                best = pos;
            }
        }
        Ok((best, lowbound))
    }

    fn diverge(&mut self, x: f64) -> StepOutcome {
        crate::trace_write!(
            self.tracer,
            "TRACE DIVERGE iter={} x={:.15e}",
            self.state.iteration,
            x
        );
        if self.options.display {
            println!("Warning: The result may not be as accurate as required!");
        }
        self.phase = Phase::Diverged;
        self.divergence = Some(x);
        StepOutcome::Diverged { x }
    }

    // ──────────────────────────────────────────────────────────────────────
    // Main loop
    // ──────────────────────────────────────────────────────────────────────

    /// Run from initialization to termination.
    ///
    /// Errors are only returned for evaluator failures and store
    /// inconsistencies; divergence, the iteration cap and a callback stop all
    /// produce a result with `terminated_early = true`.
    pub fn run(&mut self) -> Result<QuadBoundResult> {
        if let StepOutcome::Diverged { .. } = self.initialize()? {
            return Ok(self.report(ReturnCode::BoundDivergence));
        }

        let max_iter = self.options.max_iter;
        while !self.is_converged() {
            if max_iter > 0 && self.state.iteration >= max_iter {
                return Ok(self.report(ReturnCode::MaxIterExceeded));
            }

            if let StepOutcome::Diverged { .. } = self.refine()? {
                return Ok(self.report(ReturnCode::BoundDivergence));
            }

            if self.is_converged() {
                break;
            }
            if let Some(ref cb) = self.callback {
                let d = self.options.direction;
                if cb(
                    self.state.incumbent_x,
                    d.report(self.state.upbound),
                    d.report(self.state.lowbound),
                    self.state.iteration,
                ) {
                    return Ok(self.report(ReturnCode::ForcedStop));
                }
            }
        }

        self.phase = Phase::Converged;
        Ok(self.report(ReturnCode::Converged))
    }

    // ──────────────────────────────────────────────────────────────────────
    // Reporting: the only places where the sign is restored
    // ──────────────────────────────────────────────────────────────────────

    fn snapshot(&self) -> BoundSnapshot {
        let d = self.options.direction;
        BoundSnapshot {
            iteration: self.state.iteration,
            lowbound: d.report(self.state.lowbound),
            upbound: d.report(self.state.upbound),
        }
    }

    fn record(&mut self) {
        let snap = self.snapshot();
        if self.options.display {
            println!(
                "{}. lowbound: {:.6} upbound: {:.6}",
                snap.iteration, snap.lowbound, snap.upbound
            );
        }
        self.history.push(snap);
    }

    fn report(&self, code: ReturnCode) -> QuadBoundResult {
        let snap = self.snapshot();
        let message = match (code, self.divergence) {
            (ReturnCode::BoundDivergence, Some(x)) => QuadBoundError::BoundDivergence {
                x,
                lb: self.lb,
                ub: self.ub,
            }
            .to_string(),
            _ => code.to_string(),
        };

        crate::trace_write!(
            self.tracer,
            "TRACE END iter={} code={} lowbound={:.15e} upbound={:.15e}",
            self.state.iteration,
            code as i32,
            self.state.lowbound,
            self.state.upbound
        );

        QuadBoundResult {
            optimum_value: snap.upbound,
            optimum_point: self.state.incumbent_x,
            lowbound: snap.lowbound,
            upbound: snap.upbound,
            iterations: self.state.iteration,
            nfev: self.state.nfev,
            terminated_early: code != ReturnCode::Converged,
            return_code: code,
            message,
            history: self.history.clone(),
        }
    }
}
