//! Prompt-driven run on the log-Cauchy objective.
//!
//! Reads the interval, `gamma`, the tolerance, the display and direction
//! flags, and a matrix shape from stdin. A non-empty shape loads the matrix
//! from `matrix.txt` (or the path given as the first argument) and hands it to
//! the objective. Finishes by printing the optimum value `F` and point `Z`.
//!
//! ```text
//! $ printf '-2 2 20 0.1 0 0 0 0' | cargo run --example interactive
//! ```

use std::error::Error;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use quadbound::{Direction, Matrix, MatrixEvaluator, QuadBoundBuilder};

/// Whitespace-separated tokens from stdin, read line by line on demand.
struct Tokens<R> {
    reader: R,
    pending: Vec<String>,
}

impl<R: BufRead> Tokens<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::new(),
        }
    }

    fn next<T: FromStr>(&mut self, prompt: &str) -> Result<T, Box<dyn Error>>
    where
        T::Err: Error + 'static,
    {
        print!("\n{}", prompt);
        io::stdout().flush()?;
        while self.pending.is_empty() {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Err(format!("input ended before: {}", prompt.trim()).into());
            }
            self.pending = line.split_whitespace().rev().map(String::from).collect();
        }
        let token = self.pending.pop().unwrap_or_default();
        Ok(token.parse::<T>()?)
    }
}

fn log_pi(x: f64, _m: &Matrix) -> quadbound::Result<(f64, f64)> {
    let d = 3.0 - x;
    Ok((
        std::f64::consts::PI.ln() + (1.0 + d * d).ln(),
        -2.0 * d / (1.0 + d * d),
    ))
}

fn main() -> Result<(), Box<dyn Error>> {
    let stdin = io::stdin();
    let mut input = Tokens::new(stdin.lock());

    let lb: f64 = input.next("Enter lower bound: ")?;
    let ub: f64 = input.next("Enter upper bound: ")?;
    let gamma: f64 = input.next("Enter gamma value: ")?;
    let tolerance: f64 = input.next("Enter tolerance: ")?;
    let display: i32 = input.next("Enter 0 in case you want display: ")?;
    let minmax: i32 = input.next("Enter 0 in case you want to minimize: ")?;
    let rows: usize = input.next("Enter number of rows: ")?;
    let cols: usize = input.next("Enter number columns: ")?;
    println!();

    let matrix = if rows > 0 && cols > 0 {
        let path = std::env::args().nth(1).unwrap_or_else(|| "matrix.txt".to_string());
        Matrix::load(&path, rows, cols)?
    } else {
        Matrix::zeros(rows, cols)?
    };

    let result = QuadBoundBuilder::new(MatrixEvaluator::new(matrix, log_pi), (lb, ub))
        .gamma(gamma)
        .tolerance(tolerance)
        .display(display == 0)
        .direction(Direction::from_minmax(minmax))
        .optimize()?;

    if result.terminated_early {
        eprintln!("{}", result.message);
    }
    println!("\n\nF: {:.6} \nZ: {:.6}", result.optimum_value, result.optimum_point);
    Ok(())
}
