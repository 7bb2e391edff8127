//! Monotone-preserving cubic Hermite interpolation.
//!
//! Implements the Fritsch-Carlson algorithm that modifies cubic Hermite
//! slopes to guarantee monotonicity on each sub-interval where the data is
//! monotone — the interpolant of choice for discrete PDE solutions, where a
//! plain cubic spline would oscillate around the payoff kink.

use fdm_core::{errors::Error, errors::Result, Real};

use super::Interpolation1D;

/// Monotone-preserving cubic Hermite spline.
///
/// Piecewise cubic and continuously differentiable; the second derivative
/// may jump at the knots.  Queries outside the data range extrapolate with
/// the boundary cubic so that values and derivatives remain mutually
/// consistent.
#[derive(Debug, Clone)]
pub struct MonotoneCubicSpline {
    xs: Vec<Real>,
    ys: Vec<Real>,
    /// Adjusted tangent at each knot
    ts: Vec<Real>,
}

impl MonotoneCubicSpline {
    /// Build a monotone cubic spline through the given data.
    ///
    /// # Errors
    /// Fails unless there are at least 2 points, the lengths match, and the
    /// abscissae are strictly increasing.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        let n = xs.len();
        fdm_core::ensure!(n >= 2, "need at least 2 points");
        fdm_core::ensure!(xs.len() == ys.len(), "xs and ys must match in length");
        if !xs.windows(2).all(|w| w[0] < w[1]) {
            return Err(Error::Configuration(
                "interpolation abscissae must be strictly increasing".into(),
            ));
        }

        let xs = xs.to_vec();
        let ys = ys.to_vec();

        // Step 1: secant slopes δ_i
        let mut delta = Vec::with_capacity(n - 1);
        for i in 0..n - 1 {
            delta.push((ys[i + 1] - ys[i]) / (xs[i + 1] - xs[i]));
        }

        // Step 2: initial tangent estimates (three-point formula)
        let mut ts = vec![0.0; n];
        ts[0] = delta[0];
        if n > 2 {
            ts[n - 1] = delta[n - 2];
        } else {
            ts[1] = delta[0];
            return Ok(Self { xs, ys, ts });
        }
        for i in 1..n - 1 {
            ts[i] = 0.5 * (delta[i - 1] + delta[i]);
        }

        // Step 3: Fritsch-Carlson monotonicity corrections
        for i in 0..n - 1 {
            if delta[i].abs() < 1e-30 {
                // Flat segment — force both tangents to zero
                ts[i] = 0.0;
                ts[i + 1] = 0.0;
            } else {
                let alpha = ts[i] / delta[i];
                let beta = ts[i + 1] / delta[i];
                // Stay inside the monotone region: α² + β² ≤ 9
                let r2 = alpha * alpha + beta * beta;
                if r2 > 9.0 {
                    let tau = 3.0 / r2.sqrt();
                    ts[i] = tau * alpha * delta[i];
                    ts[i + 1] = tau * beta * delta[i];
                }
            }
        }

        Ok(Self { xs, ys, ts })
    }

    /// Index of the interval used to evaluate at `x` (clamped to the
    /// boundary intervals outside the data range).
    fn locate(&self, x: Real) -> usize {
        let n = self.xs.len();
        if x <= self.xs[0] {
            return 0;
        }
        if x >= self.xs[n - 1] {
            return n - 2;
        }
        let mut lo = 0;
        let mut hi = n - 1;
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if self.xs[mid] <= x {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        lo
    }
}

impl Interpolation1D for MonotoneCubicSpline {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    fn operator(&self, x: Real) -> Real {
        let lo = self.locate(x);
        let hi = lo + 1;
        let h = self.xs[hi] - self.xs[lo];
        let t = (x - self.xs[lo]) / h;

        // Hermite basis
        let h00 = (1.0 + 2.0 * t) * (1.0 - t) * (1.0 - t);
        let h10 = t * (1.0 - t) * (1.0 - t);
        let h01 = t * t * (3.0 - 2.0 * t);
        let h11 = t * t * (t - 1.0);

        h00 * self.ys[lo] + h10 * h * self.ts[lo] + h01 * self.ys[hi] + h11 * h * self.ts[hi]
    }

    fn derivative(&self, x: Real) -> Real {
        let lo = self.locate(x);
        let hi = lo + 1;
        let h = self.xs[hi] - self.xs[lo];
        let t = (x - self.xs[lo]) / h;

        // Derivatives of the Hermite basis w.r.t. t, divided by h for d/dx
        let d00 = 6.0 * t * t - 6.0 * t;
        let d10 = 3.0 * t * t - 4.0 * t + 1.0;
        let d01 = 6.0 * t - 6.0 * t * t;
        let d11 = 3.0 * t * t - 2.0 * t;

        (d00 * self.ys[lo] + d01 * self.ys[hi]) / h + d10 * self.ts[lo] + d11 * self.ts[hi]
    }

    fn second_derivative(&self, x: Real) -> Real {
        let lo = self.locate(x);
        let hi = lo + 1;
        let h = self.xs[hi] - self.xs[lo];
        let t = (x - self.xs[lo]) / h;

        let dd00 = 12.0 * t - 6.0;
        let dd10 = 6.0 * t - 4.0;
        let dd01 = 6.0 - 12.0 * t;
        let dd11 = 6.0 * t - 2.0;

        (dd00 * self.ys[lo] + dd01 * self.ys[hi]) / (h * h)
            + (dd10 * self.ts[lo] + dd11 * self.ts[hi]) / h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn exact_on_nodes() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [0.0, 1.0, 1.5, 3.0, 5.0];
        let s = MonotoneCubicSpline::new(&xs, &ys).unwrap();
        for (&x, &y) in xs.iter().zip(ys.iter()) {
            let v = s.operator(x);
            assert!((v - y).abs() < 1e-12, "at x={x}: expected {y}, got {v}");
        }
    }

    #[test]
    fn preserves_monotonicity() {
        // Monotone increasing data — interpolant should not decrease
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [0.0, 0.1, 0.5, 2.0, 4.0];
        let s = MonotoneCubicSpline::new(&xs, &ys).unwrap();
        let mut prev = -1e30;
        for i in 0..=100 {
            let x = 4.0 * (i as f64) / 100.0;
            let v = s.operator(x);
            assert!(v >= prev - 1e-12, "not monotone at x={x}: {v} < {prev}");
            prev = v;
        }
    }

    #[test]
    fn step_function_stays_bounded() {
        // Step: 0,0,1,1 — should stay in [0,1]
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [0.0, 0.0, 1.0, 1.0];
        let s = MonotoneCubicSpline::new(&xs, &ys).unwrap();
        for i in 0..=100 {
            let x = 3.0 * (i as f64) / 100.0;
            let v = s.operator(x);
            assert!(
                (-1e-10..=1.0 + 1e-10).contains(&v),
                "out of range at x={x}: {v}"
            );
        }
    }

    #[test]
    fn rejects_non_increasing_abscissae() {
        let xs = [0.0, 1.0, 1.0, 2.0];
        let ys = [0.0, 1.0, 2.0, 3.0];
        assert!(matches!(
            MonotoneCubicSpline::new(&xs, &ys),
            Err(Error::Configuration(_))
        ));
        let xs = [0.0, 2.0, 1.0];
        let ys = [0.0, 1.0, 2.0];
        assert!(MonotoneCubicSpline::new(&xs, &ys).is_err());
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let xs: Vec<f64> = (0..20).map(|i| 0.25 * i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| (0.7 * x).sin() + 0.1 * x * x).collect();
        let s = MonotoneCubicSpline::new(&xs, &ys).unwrap();
        let h = 1e-6;
        for i in 1..40 {
            let x = 4.75 * (i as f64) / 40.0 + 0.05;
            let fd = (s.operator(x + h) - s.operator(x - h)) / (2.0 * h);
            assert_abs_diff_eq!(s.derivative(x), fd, epsilon = 1e-6);
        }
    }

    #[test]
    fn second_derivative_matches_finite_difference() {
        let xs: Vec<f64> = (0..20).map(|i| 0.25 * i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| (0.7 * x).sin() + 0.1 * x * x).collect();
        let s = MonotoneCubicSpline::new(&xs, &ys).unwrap();
        let h = 1e-4;
        // Stay inside a single sub-interval: f'' jumps at the knots
        for i in 0..19 {
            let x = xs[i] + 0.5 * (xs[i + 1] - xs[i]);
            let fd = (s.operator(x + h) - 2.0 * s.operator(x) + s.operator(x - h)) / (h * h);
            assert_abs_diff_eq!(s.second_derivative(x), fd, epsilon = 1e-5);
        }
    }

    #[test]
    fn linear_data_reproduced_exactly() {
        let xs = [0.0, 0.5, 1.5, 2.0];
        let ys: Vec<f64> = xs.iter().map(|&x| 3.0 * x - 1.0).collect();
        let s = MonotoneCubicSpline::new(&xs, &ys).unwrap();
        for i in 0..=20 {
            let x = 2.0 * (i as f64) / 20.0;
            assert_abs_diff_eq!(s.operator(x), 3.0 * x - 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(s.derivative(x), 3.0, epsilon = 1e-12);
        }
    }

    proptest! {
        /// On monotone data the interpolant never overshoots the data range.
        #[test]
        fn no_overshoot_on_monotone_data(increments in proptest::collection::vec(0.0f64..10.0, 4..12)) {
            let mut xs = vec![0.0];
            let mut ys = vec![0.0];
            for (i, dy) in increments.iter().enumerate() {
                xs.push((i + 1) as f64);
                ys.push(ys.last().unwrap() + dy);
            }
            let s = MonotoneCubicSpline::new(&xs, &ys).unwrap();
            let (lo, hi) = (ys[0], *ys.last().unwrap());
            for i in 0..=200 {
                let x = xs.last().unwrap() * (i as f64) / 200.0;
                let v = s.operator(x);
                prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9, "overshoot at x={}: {}", x, v);
            }
        }
    }
}
