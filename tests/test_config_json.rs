//! Run configurations and results stored as JSON.

use quadbound::{
    quadbound_optimize, Direction, QuadBoundOptions, QuadBoundResult, ReturnCode,
};

#[test]
fn test_partial_options_fill_from_default() {
    let opts: QuadBoundOptions = serde_json::from_str(r#"{ "gamma": 20.0 }"#).unwrap();
    assert_eq!(opts.gamma, 20.0);
    assert_eq!(opts.tolerance, 0.1);
    assert_eq!(opts.direction, Direction::Minimize);
    assert!(!opts.display);
    assert_eq!(opts.max_iter, 0);
}

#[test]
fn test_full_options_from_json() {
    let json = r#"{
        "gamma": 9.0,
        "tolerance": 1e-4,
        "direction": "Maximize",
        "display": false,
        "max_iter": 100
    }"#;
    let opts: QuadBoundOptions = serde_json::from_str(json).unwrap();
    assert_eq!(
        opts,
        QuadBoundOptions {
            gamma: 9.0,
            tolerance: 1e-4,
            direction: Direction::Maximize,
            display: false,
            max_iter: 100,
        }
    );

    let back = serde_json::to_string(&opts).unwrap();
    let again: QuadBoundOptions = serde_json::from_str(&back).unwrap();
    assert_eq!(opts, again);
}

#[test]
fn test_unknown_direction_is_rejected() {
    let res: Result<QuadBoundOptions, _> = serde_json::from_str(r#"{ "direction": "Sideways" }"#);
    assert!(res.is_err());
}

#[test]
fn test_json_configured_run() {
    let opts: QuadBoundOptions =
        serde_json::from_str(r#"{ "gamma": 2.0, "tolerance": 1e-6 }"#).unwrap();
    let result = quadbound_optimize(
        |x: f64| ((x - 0.3) * (x - 0.3), 2.0 * (x - 0.3)),
        (-1.0, 1.0),
        opts,
    )
    .unwrap();
    assert_eq!(result.return_code, ReturnCode::Converged);
}

#[test]
fn test_result_serializes() {
    let opts = QuadBoundOptions {
        gamma: 2.0,
        tolerance: 1e-3,
        ..Default::default()
    };
    let result = quadbound_optimize(|x: f64| (x * x, 2.0 * x), (-1.0, 2.0), opts).unwrap();

    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("\"return_code\":\"Converged\""), "{}", json);

    let back: QuadBoundResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back.return_code, result.return_code);
    assert_eq!(back.optimum_value, result.optimum_value);
    assert_eq!(back.optimum_point, result.optimum_point);
    assert_eq!(back.iterations, result.iterations);
    assert_eq!(back.history, result.history);
    assert_eq!(back.message, result.message);
}
