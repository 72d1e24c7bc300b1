//! Properties that must hold for every run with a valid curvature bound:
//!
//! - the bounds bracket the true optimum at every recorded iteration
//! - `lowbound` never decreases and `upbound` never increases
//! - the store stays sorted with intersections at odd positions

use quadbound::{PointKind, QuadBound, QuadBoundOptions, QuadBoundResult, ReturnCode};

struct Case {
    name: &'static str,
    func: fn(f64) -> (f64, f64),
    bounds: (f64, f64),
    gamma: f64,
    tolerance: f64,
    true_min: f64,
}

fn log_pi(x: f64) -> (f64, f64) {
    let d = 3.0 - x;
    (
        std::f64::consts::PI.ln() + (1.0 + d * d).ln(),
        -2.0 * d / (1.0 + d * d),
    )
}

fn wavy(x: f64) -> (f64, f64) {
    ((3.0 * x).sin() + 0.1 * x, 3.0 * (3.0 * x).cos() + 0.1)
}

fn cubic(x: f64) -> (f64, f64) {
    (x * x * x - x, 3.0 * x * x - 1.0)
}

fn shifted_square(x: f64) -> (f64, f64) {
    ((x - 0.3) * (x - 0.3), 2.0 * (x - 0.3))
}

/// `cos(5x) + x^2/2`: two global minima at about +-0.6041, `|f''| <= 26`.
fn double_well(x: f64) -> (f64, f64) {
    ((5.0 * x).cos() + 0.5 * x * x, -5.0 * (5.0 * x).sin() + x)
}

fn cases() -> Vec<Case> {
    vec![
        Case {
            name: "log_pi",
            func: log_pi,
            bounds: (-2.0, 2.0),
            gamma: 20.0,
            tolerance: 0.1,
            true_min: 1.8378770664093453,
        },
        Case {
            name: "wavy",
            func: wavy,
            bounds: (-3.0, 3.0),
            gamma: 9.0,
            tolerance: 1e-4,
            true_min: -1.2623549948121893,
        },
        Case {
            name: "cubic",
            func: cubic,
            bounds: (-2.0, 2.0),
            gamma: 12.0,
            tolerance: 1e-6,
            true_min: -6.0,
        },
        Case {
            name: "shifted_square",
            func: shifted_square,
            bounds: (-1.0, 1.0),
            gamma: 2.0,
            tolerance: 1e-8,
            true_min: 0.0,
        },
        Case {
            name: "double_well",
            func: double_well,
            bounds: (-2.0, 2.0),
            gamma: 26.0,
            tolerance: 1e-5,
            true_min: -0.8102088345114964,
        },
    ]
}

fn run_case(case: &Case) -> (QuadBound, QuadBoundResult) {
    let mut qb = QuadBound::new(
        case.func,
        case.bounds,
        QuadBoundOptions {
            gamma: case.gamma,
            tolerance: case.tolerance,
            ..Default::default()
        },
    )
    .unwrap();
    let result = qb.run().unwrap();
    (qb, result)
}

// ──────────────────────────────────────────────────────────────────────────────
// Bracketing
// ──────────────────────────────────────────────────────────────────────────────

#[test]
fn test_bounds_bracket_true_minimum() {
    for case in cases() {
        let (_, result) = run_case(&case);
        assert_eq!(result.return_code, ReturnCode::Converged, "{}", case.name);
        for snap in &result.history {
            // The scan skips the left endpoint, so a minimum at `lb` is only
            // certified by the upper bound.
            assert!(
                snap.lowbound.min(snap.upbound) <= case.true_min + 1e-9,
                "{}: iteration {} low {} up {} above true min {}",
                case.name,
                snap.iteration,
                snap.lowbound,
                snap.upbound,
                case.true_min
            );
            assert!(
                snap.upbound >= case.true_min - 1e-9,
                "{}: upbound {} below true min",
                case.name,
                snap.upbound
            );
        }
        assert!(
            (result.optimum_value - case.true_min).abs() <= case.tolerance + 1e-9,
            "{}: f* = {}, expected {}",
            case.name,
            result.optimum_value,
            case.true_min
        );
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Monotonicity
// ──────────────────────────────────────────────────────────────────────────────

#[test]
fn test_bounds_are_monotone() {
    for case in cases() {
        let (_, result) = run_case(&case);
        for pair in result.history.windows(2) {
            assert!(
                pair[1].upbound <= pair[0].upbound,
                "{}: upbound rose at iteration {}",
                case.name,
                pair[1].iteration
            );
            assert!(
                pair[1].lowbound >= pair[0].lowbound - 1e-12,
                "{}: lowbound fell at iteration {} ({} < {})",
                case.name,
                pair[1].iteration,
                pair[1].lowbound,
                pair[0].lowbound
            );
        }
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Store layout
// ──────────────────────────────────────────────────────────────────────────────

#[test]
fn test_store_layout_after_run() {
    for case in cases() {
        let (qb, result) = run_case(&case);
        let store = qb.store();

        assert_eq!(store.size(), 3 + 2 * result.iterations, "{}", case.name);
        assert!(store.is_ordered(), "{}: xs = {:?}", case.name, store.xs());
        assert_eq!(store.xs()[0], case.bounds.0);
        assert_eq!(store.xs()[store.size() - 1], case.bounds.1);

        for point in store.iter() {
            assert!(
                point.x >= case.bounds.0 && point.x <= case.bounds.1,
                "{}: x = {} outside bounds",
                case.name,
                point.x
            );
            match point.kind() {
                PointKind::Intersection => {
                    assert_eq!(point.slope, 0.0, "{}: position {}", case.name, point.position)
                }
                PointKind::Sample => {
                    let (f, g) = (case.func)(point.x);
                    assert_eq!(point.value, f, "{}: position {}", case.name, point.position);
                    assert_eq!(point.slope, g, "{}: position {}", case.name, point.position);
                }
            }
        }
    }
}

#[test]
fn test_evaluation_count() {
    for case in cases() {
        let (qb, result) = run_case(&case);
        assert_eq!(result.nfev, result.iterations + 2, "{}", case.name);
        assert_eq!(qb.state().nfev, result.nfev);
        assert_eq!(result.history.len(), result.iterations + 1);
    }
}

#[test]
fn test_incumbent_value_matches_point() {
    for case in cases() {
        let (_, result) = run_case(&case);
        assert_eq!((case.func)(result.optimum_point).0, result.optimum_value, "{}", case.name);
    }
}
