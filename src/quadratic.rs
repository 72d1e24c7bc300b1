//! Quadratic lower-bounding pieces and their intersection.
//!
//! For a sample `(xs, fs, gs)` and a curvature bound `gamma >= |f''|`, the
//! concave parabola
//!
//! ```text
//! q(x) = fs + gs*(x - xs) - (gamma/2)*(x - xs)^2
//! ```
//!
//! lies below `f` everywhere. Between two adjacent samples the tightest floor
//! is reached where the left and right parabolas meet:
//!
//! ```text
//! denom = 2*((xr - xl) - gl/gamma + gr/gamma)
//! x*    = ((2/gamma)*(fl - fr) - xl^2 + xr^2 - 2*xl*gl/gamma + 2*xr*gr/gamma) / denom
//! q*    = fl + gl*(x* - xl) - (gamma/2)*(x* - xl)^2
//! ```
//!
//! If `gamma` really bounds `|f''|`, `x*` lies in `[xl, xr]`.

/// A point where `f` and `f'` are known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub f: f64,
    pub g: f64,
}

impl Sample {
    pub fn new(x: f64, f: f64, g: f64) -> Self {
        Self { x, f, g }
    }

    /// Value of this sample's lower-bounding parabola at `x`.
    #[inline]
    pub fn lower_piece(&self, gamma: f64, x: f64) -> f64 {
        let d = x - self.x;
        self.f + self.g * d - (gamma / 2.0) * (d * d)
    }
}

/// Meeting point of two adjacent lower-bounding pieces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub x: f64,
    pub q: f64,
}

impl Intersection {
    /// True when `x` is finite and inside `[lb, ub]`.
    #[inline]
    pub fn within(&self, lb: f64, ub: f64) -> bool {
        (lb..=ub).contains(&self.x)
    }
}

/// Intersection of the pieces anchored at `left` and `right`.
///
/// A zero denominator yields a non-finite `x`, which `Intersection::within`
/// rejects.
pub fn intersect(left: &Sample, right: &Sample, gamma: f64) -> Intersection {
    let (xl, fl, gl) = (left.x, left.f, left.g);
    let (xr, fr, gr) = (right.x, right.f, right.g);

    let denom = 2.0 * ((xr - xl) - gl / gamma + gr / gamma);
    let x = ((2.0 / gamma) * (fl - fr) - xl * xl + xr * xr - 2.0 * xl * gl / gamma
        + 2.0 * xr * gr / gamma)
        / denom;
    let q = left.lower_piece(gamma, x);

    Intersection { x, q }
}
