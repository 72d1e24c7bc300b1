use std::time::Instant;

use quadbound::{QuadBoundBuilder, QuadBoundResult};

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

fn run(name: &str, f: fn(f64) -> (f64, f64), bounds: (f64, f64), gamma: f64, tol: f64) -> QuadBoundResult {
    let start = Instant::now();
    let result = QuadBoundBuilder::new(f, bounds)
        .gamma(gamma)
        .tolerance(tol)
        .minimize()
        .unwrap();
    println!(
        "{:<28} {:>8} µs  iter={:<4} f={:<12.6} x={:<10.6} {:?}",
        name,
        start.elapsed().as_micros(),
        result.iterations,
        result.optimum_value,
        result.optimum_point,
        result.return_code
    );
    result
}

fn main() {
    println!("{:<28} {:>11}  {:<9} {}", "Case", "Time", "Iter", "Result");
    println!("{}", "-".repeat(85));

    let result = run("log_pi gamma=20 tol=0.1", log_pi, (-2.0, 2.0), 20.0, 0.1);
    run("log_pi gamma=20 tol=1e-6", log_pi, (-2.0, 2.0), 20.0, 1e-6);
    run("wavy gamma=9 tol=1e-4", wavy, (-3.0, 3.0), 9.0, 1e-4);
    run("wavy gamma=2 tol=1e-4", wavy, (-3.0, 3.0), 2.0, 1e-4);

    println!();
    for snap in &result.history {
        println!("{}. lowbound: {:.6} upbound: {:.6}", snap.iteration, snap.lowbound, snap.upbound);
    }
    println!("\n{}", result);
}
