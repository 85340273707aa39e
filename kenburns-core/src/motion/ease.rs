//! Cubic-bezier timing curves.

use crate::foundation::error::{KenBurnsError, KenBurnsResult};

const NEWTON_ITERATIONS: usize = 8;
const NEWTON_EPSILON: f64 = 1e-6;
const BISECTION_ITERATIONS: usize = 64;

/// A CSS-style `cubic-bezier(p1x, p1y, p2x, p2y)` timing function.
///
/// The curve runs from `(0, 0)` to `(1, 1)`; the two inner control points shape it.
/// [`CubicBezier::ease`] maps elapsed progress `x` to eased progress `y`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CubicBezier {
    /// First control point, x.
    pub p1x: f64,
    /// First control point, y.
    pub p1y: f64,
    /// Second control point, x.
    pub p2x: f64,
    /// Second control point, y.
    pub p2y: f64,
}

impl CubicBezier {
    /// `ease-in-out`, the default motion curve.
    pub const EASE_IN_OUT: Self = Self::from_points(0.42, 0.0, 0.58, 1.0);
    /// `ease`.
    pub const EASE: Self = Self::from_points(0.25, 0.1, 0.25, 1.0);
    /// `linear`.
    pub const LINEAR: Self = Self::from_points(0.0, 0.0, 1.0, 1.0);

    const fn from_points(p1x: f64, p1y: f64, p2x: f64, p2y: f64) -> Self {
        Self { p1x, p1y, p2x, p2y }
    }

    /// Construct a curve. Control x-values must lie in `[0, 1]` so x stays monotonic.
    pub fn new(p1x: f64, p1y: f64, p2x: f64, p2y: f64) -> KenBurnsResult<Self> {
        let curve = Self::from_points(p1x, p1y, p2x, p2y);
        curve.validate()?;
        Ok(curve)
    }

    /// Check control values; used after deserialization too.
    pub fn validate(&self) -> KenBurnsResult<()> {
        let all = [self.p1x, self.p1y, self.p2x, self.p2y];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(KenBurnsError::validation(
                "cubic-bezier control points must be finite",
            ));
        }
        if !(0.0..=1.0).contains(&self.p1x) || !(0.0..=1.0).contains(&self.p2x) {
            return Err(KenBurnsError::validation(
                "cubic-bezier control x values must be within [0, 1]",
            ));
        }
        Ok(())
    }

    /// Evaluate eased progress for elapsed progress `x` (clamped to `[0, 1]`).
    pub fn ease(&self, x: f64) -> f64 {
        let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
        if x == 0.0 || x == 1.0 {
            return x;
        }
        let t = self.solve_t(x);
        sample(self.p1y, self.p2y, t)
    }

    // Newton-Raphson on the x polynomial, seeded with t = x. Curves whose x slope vanishes
    // (control x at 0 or 1) can stall or overshoot, so an unconverged result is redone by
    // bisection, which only needs x(t) to be monotonic on [0, 1].
    fn solve_t(&self, x: f64) -> f64 {
        let mut t = x;
        for _ in 0..NEWTON_ITERATIONS {
            let err = sample(self.p1x, self.p2x, t) - x;
            if err.abs() < NEWTON_EPSILON {
                break;
            }
            let d = derivative(self.p1x, self.p2x, t);
            if d.abs() < NEWTON_EPSILON {
                break;
            }
            t -= err / d;
        }
        let t = t.clamp(0.0, 1.0);
        if (sample(self.p1x, self.p2x, t) - x).abs() < NEWTON_EPSILON {
            return t;
        }
        self.bisect_t(x)
    }

    fn bisect_t(&self, x: f64) -> f64 {
        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        for _ in 0..BISECTION_ITERATIONS {
            let t = 0.5 * (lo + hi);
            let err = sample(self.p1x, self.p2x, t) - x;
            if err.abs() < NEWTON_EPSILON {
                return t;
            }
            if err < 0.0 {
                lo = t;
            } else {
                hi = t;
            }
        }
        0.5 * (lo + hi)
    }
}

impl Default for CubicBezier {
    fn default() -> Self {
        Self::EASE_IN_OUT
    }
}

// One axis of a unit cubic bezier with endpoints 0 and 1, in Horner form.
fn sample(p1: f64, p2: f64, t: f64) -> f64 {
    let c = 3.0 * p1;
    let b = 3.0 * (p2 - p1) - c;
    let a = 1.0 - c - b;
    ((a * t + b) * t + c) * t
}

fn derivative(p1: f64, p2: f64, t: f64) -> f64 {
    let c = 3.0 * p1;
    let b = 3.0 * (p2 - p1) - c;
    let a = 1.0 - c - b;
    (3.0 * a * t + 2.0 * b) * t + c
}

#[cfg(test)]
#[path = "../../tests/unit/motion/ease.rs"]
mod tests;
