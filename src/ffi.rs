//! C ABI for calling the optimizer from C or C++.
//!
//! | C function                  | Rust counterpart                     |
//! |-----------------------------|--------------------------------------|
//! | `quadbound_optimize()`      | `QuadBoundBuilder::optimize()`       |
//! | `quadbound_optimize_full()` | same, plus iteration statistics      |
//! | `quadbound_version()`       | `CARGO_PKG_VERSION`                  |
//!
//! The objective has the shape
//!
//! ```c
//! typedef int (*quadbound_feval)(double x, double *f, double *g, void *data);
//! ```
//!
//! It writes `f(x)` and `f'(x)` through `f` and `g` and returns 0 on success.
//! Any nonzero return is an evaluation failure and aborts the run with
//! `ReturnCode::EvaluatorFailure`.

use std::os::raw::{c_char, c_double, c_int, c_void};

use crate::error::{QuadBoundError, Result, ReturnCode};
use crate::evaluator::Evaluator;
use crate::types::{Direction, QuadBoundOptions, QuadBoundResult};
use crate::QuadBoundBuilder;

// ──────────────────────────────────────────────────────────────────────────────
// C-compatible types
// ──────────────────────────────────────────────────────────────────────────────

/// C objective: `(x, *f, *g, data) -> status`, 0 meaning success.
pub type QuadBoundEvaluatorC =
    unsafe extern "C" fn(x: c_double, f: *mut c_double, g: *mut c_double, data: *mut c_void) -> c_int;

/// Result struct returned by `quadbound_optimize_full`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct QuadBoundResultC {
    /// `ReturnCode` as an integer
    pub return_code: c_int,
    /// Refinement steps performed
    pub iterations: c_int,
    /// Evaluator calls made
    pub nfev: c_int,
    /// Nonzero if the run stopped before the bounds met
    pub terminated_early: c_int,
    pub lowbound: c_double,
    pub upbound: c_double,
}

impl QuadBoundResultC {
    fn failed(code: ReturnCode) -> Self {
        Self {
            return_code: code as c_int,
            iterations: 0,
            nfev: 0,
            terminated_early: 1,
            lowbound: f64::NAN,
            upbound: f64::NAN,
        }
    }
}

/// Adapts a C objective pointer and its opaque data to `Evaluator`.
///
/// The data pointer is kept as an address so the adapter is `Send + Sync`;
/// the caller guarantees it stays valid for the duration of the run.
struct CEvaluator {
    func: QuadBoundEvaluatorC,
    data: usize,
}

impl Evaluator for CEvaluator {
    fn evaluate(&self, x: f64) -> Result<(f64, f64)> {
        let mut f: c_double = 0.0;
        let mut g: c_double = 0.0;
        let status = unsafe { (self.func)(x, &mut f, &mut g, self.data as *mut c_void) };
        if status != 0 {
            return Err(QuadBoundError::EvaluatorFailure {
                x,
                reason: format!("C evaluator returned status {}", status),
            });
        }
        Ok((f, g))
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Entry points
// ──────────────────────────────────────────────────────────────────────────────

/// Shared body of both entry points.
unsafe fn run_c(
    f: QuadBoundEvaluatorC,
    f_data: *mut c_void,
    lb: c_double,
    ub: c_double,
    gamma: c_double,
    tolerance: c_double,
    minmax: c_int,
    display: c_int,
    max_iter: c_int,
    force_stop: *const c_int,
) -> Result<QuadBoundResult> {
    let options = QuadBoundOptions {
        gamma,
        tolerance,
        direction: Direction::from_minmax(minmax),
        display: display != 0,
        max_iter: if max_iter > 0 { max_iter as usize } else { 0 },
    };

    let evaluator = CEvaluator {
        func: f,
        data: f_data as usize,
    };
    let mut builder = QuadBoundBuilder::new(evaluator, (lb, ub)).options(options);

    if !force_stop.is_null() {
        let fs_ptr = force_stop as usize;
        builder = builder.with_callback(move |_x, _up, _low, _iteration| -> bool {
            let ptr = fs_ptr as *const c_int;
            unsafe { ptr.read_volatile() != 0 }
        });
    }

    builder.optimize()
}

/// Optimize a C objective over `[lb, ub]`.
///
/// Whenever the run itself completes, `*optimum` and `*point` receive the
/// best value and its abscissa (sign-corrected for maximization). That
/// includes `ForcedStop`, which is negative but still carries the incumbent.
/// Invalid configurations and evaluator failures leave both untouched.
///
/// # Safety
///
/// - `f` must be a valid function pointer that writes through both output pointers.
/// - `f_data` is passed through to `f` and must remain valid for the call.
/// - `force_stop` may be NULL; if non-NULL it must point to a valid `int`.
/// - `optimum` and `point` may be NULL; if non-NULL they must be writable.
///
/// # Returns
///
/// A `ReturnCode` integer: positive on normal termination, negative on error.
#[no_mangle]
pub unsafe extern "C" fn quadbound_optimize(
    f: QuadBoundEvaluatorC,
    f_data: *mut c_void,
    lb: c_double,
    ub: c_double,
    gamma: c_double,
    tolerance: c_double,
    minmax: c_int,
    display: c_int,
    max_iter: c_int,
    force_stop: *const c_int,
    optimum: *mut c_double,
    point: *mut c_double,
) -> c_int {
    let result = match run_c(
        f, f_data, lb, ub, gamma, tolerance, minmax, display, max_iter, force_stop,
    ) {
        Ok(r) => r,
        Err(e) => return e.return_code() as c_int,
    };

    write_out(optimum, point, &result);
    result.return_code as c_int
}

/// Same as `quadbound_optimize`, but also returns the final bounds and
/// iteration statistics.
///
/// # Safety
///
/// Same requirements as `quadbound_optimize`.
#[no_mangle]
pub unsafe extern "C" fn quadbound_optimize_full(
    f: QuadBoundEvaluatorC,
    f_data: *mut c_void,
    lb: c_double,
    ub: c_double,
    gamma: c_double,
    tolerance: c_double,
    minmax: c_int,
    display: c_int,
    max_iter: c_int,
    force_stop: *const c_int,
    optimum: *mut c_double,
    point: *mut c_double,
) -> QuadBoundResultC {
    let result = match run_c(
        f, f_data, lb, ub, gamma, tolerance, minmax, display, max_iter, force_stop,
    ) {
        Ok(r) => r,
        Err(e) => return QuadBoundResultC::failed(e.return_code()),
    };

    write_out(optimum, point, &result);
    QuadBoundResultC {
        return_code: result.return_code as c_int,
        iterations: saturating_c_int(result.iterations),
        nfev: saturating_c_int(result.nfev),
        terminated_early: c_int::from(result.terminated_early),
        lowbound: result.lowbound,
        upbound: result.upbound,
    }
}

/// Version string of the library.
///
/// Returns a pointer to a null-terminated static string.
/// The caller must NOT free the returned pointer.
#[no_mangle]
pub extern "C" fn quadbound_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

// ──────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ──────────────────────────────────────────────────────────────────────────────

fn saturating_c_int(n: usize) -> c_int {
    c_int::try_from(n).unwrap_or(c_int::MAX)
}

unsafe fn write_out(optimum: *mut c_double, point: *mut c_double, result: &QuadBoundResult) {
    if !optimum.is_null() {
        *optimum = result.optimum_value;
    }
    if !point.is_null() {
        *point = result.optimum_point;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;
    use std::ptr;

    // (x - 1)^2 on [-2, 2]
    unsafe extern "C" fn shifted_square_c(
        x: c_double,
        f: *mut c_double,
        g: *mut c_double,
        _data: *mut c_void,
    ) -> c_int {
        *f = (x - 1.0) * (x - 1.0);
        *g = 2.0 * (x - 1.0);
        0
    }

    unsafe extern "C" fn failing_c(
        _x: c_double,
        _f: *mut c_double,
        _g: *mut c_double,
        _data: *mut c_void,
    ) -> c_int {
        7
    }

    unsafe extern "C" fn counting_square_c(
        x: c_double,
        f: *mut c_double,
        g: *mut c_double,
        data: *mut c_void,
    ) -> c_int {
        let counter = &mut *(data as *mut i32);
        *counter += 1;
        *f = x * x;
        *g = 2.0 * x;
        0
    }

    #[test]
    fn test_ffi_minimize() {
        unsafe {
            let mut optimum = f64::MAX;
            let mut point = f64::NAN;
            let ret = quadbound_optimize(
                shifted_square_c,
                ptr::null_mut(),
                -2.0,
                2.0,
                2.0,
                1e-6,
                0,
                0,
                0,
                ptr::null(),
                &mut optimum,
                &mut point,
            );
            assert_eq!(ret, ReturnCode::Converged as c_int);
            assert!(optimum < 1e-6, "optimum = {}", optimum);
            assert!((point - 1.0).abs() < 1e-2, "point = {}", point);
        }
    }

    #[test]
    fn test_ffi_evaluator_failure() {
        unsafe {
            let mut optimum = 0.0;
            let ret = quadbound_optimize(
                failing_c,
                ptr::null_mut(),
                -1.0,
                1.0,
                2.0,
                0.1,
                0,
                0,
                0,
                ptr::null(),
                &mut optimum,
                ptr::null_mut(),
            );
            assert_eq!(ret, ReturnCode::EvaluatorFailure as c_int);
            assert_eq!(optimum, 0.0);
        }
    }

    #[test]
    fn test_ffi_invalid_config() {
        unsafe {
            let full = quadbound_optimize_full(
                shifted_square_c,
                ptr::null_mut(),
                1.0,
                1.0,
                2.0,
                0.1,
                0,
                0,
                0,
                ptr::null(),
                ptr::null_mut(),
                ptr::null_mut(),
            );
            assert_eq!(full.return_code, ReturnCode::InvalidConfig as c_int);
            assert_eq!(full.nfev, 0);
        }
    }

    #[test]
    fn test_ffi_full_counts_evaluations() {
        unsafe {
            let mut counter: i32 = 0;
            let full = quadbound_optimize_full(
                counting_square_c,
                &mut counter as *mut i32 as *mut c_void,
                -1.0,
                2.0,
                2.0,
                1e-4,
                0,
                0,
                0,
                ptr::null(),
                ptr::null_mut(),
                ptr::null_mut(),
            );
            assert_eq!(full.return_code, ReturnCode::Converged as c_int);
            assert_eq!(full.nfev, counter);
            assert_eq!(full.nfev, full.iterations + 2);
            assert_eq!(full.terminated_early, 0);
            assert!(full.upbound - full.lowbound <= 1e-4);
        }
    }

    #[test]
    fn test_ffi_force_stop() {
        unsafe {
            let stop: c_int = 1;
            let mut optimum = f64::NAN;
            let mut point = f64::NAN;
            let full = quadbound_optimize_full(
                shifted_square_c,
                ptr::null_mut(),
                -2.0,
                2.0,
                2.0,
                1e-12,
                0,
                0,
                0,
                &stop,
                &mut optimum,
                &mut point,
            );
            assert_eq!(full.return_code, ReturnCode::ForcedStop as c_int);
            assert!(ReturnCode::ForcedStop.is_error());
            assert_eq!(full.iterations, 1);
            assert_eq!(full.terminated_early, 1);
            // A forced stop still hands back the incumbent.
            assert!((-2.0..=2.0).contains(&point), "point = {}", point);
            assert_eq!(optimum, (point - 1.0) * (point - 1.0));
            assert!(optimum <= 1.0);
        }
    }

    #[test]
    fn test_saturating_c_int() {
        assert_eq!(saturating_c_int(0), 0);
        assert_eq!(saturating_c_int(42), 42);
        assert_eq!(saturating_c_int(c_int::MAX as usize), c_int::MAX);
        assert_eq!(saturating_c_int(usize::MAX), c_int::MAX);
    }

    #[test]
    fn test_ffi_maximize() {
        unsafe {
            // max of -(x - 1)^2 + 3 via minmax = 1
            unsafe extern "C" fn peak_c(
                x: c_double,
                f: *mut c_double,
                g: *mut c_double,
                _data: *mut c_void,
            ) -> c_int {
                *f = 3.0 - (x - 1.0) * (x - 1.0);
                *g = -2.0 * (x - 1.0);
                0
            }
            let mut optimum = 0.0;
            let ret = quadbound_optimize(
                peak_c,
                ptr::null_mut(),
                -2.0,
                2.0,
                2.0,
                1e-6,
                1,
                0,
                0,
                ptr::null(),
                &mut optimum,
                ptr::null_mut(),
            );
            assert_eq!(ret, ReturnCode::Converged as c_int);
            assert!((optimum - 3.0).abs() <= 1e-6, "optimum = {}", optimum);
        }
    }

    #[test]
    fn test_ffi_version() {
        let v = unsafe { CStr::from_ptr(quadbound_version()) };
        assert_eq!(v.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
    }
}
