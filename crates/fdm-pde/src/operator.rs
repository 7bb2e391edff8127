//! Discretized spatial operators.
//!
//! The Black-Scholes differential operator in the log coordinate `x = ln S`,
//!
//! `L = ½σ²(t,s)·∂²/∂x² + (r − q − ½σ²(t,s))·∂/∂x − r`,
//!
//! is discretized with three-point central differences into a
//! [`TridiagonalOperator`].  The operator is rebuilt from the current
//! process state on every recalculation, so time- and level-dependent local
//! volatility flows straight into the bands.

use crate::mesher::FdmMesher;
use fdm_core::{errors::Error, errors::Result, Real, Size, Time};
use fdm_processes::GeneralizedBlackScholesProcess;
use std::sync::Arc;

// ─── Tridiagonal operator ─────────────────────────────────────────────────────

/// A tridiagonal matrix operator.
///
/// Stores the lower, diagonal, and upper bands.  Used for 1-D finite
/// difference discretisations of second-order PDEs.
#[derive(Debug, Clone)]
pub struct TridiagonalOperator {
    /// Lower diagonal (index 0 unused — starts from row 1).
    pub lower: Vec<Real>,
    /// Main diagonal.
    pub diag: Vec<Real>,
    /// Upper diagonal (last index unused — ends at row n−2).
    pub upper: Vec<Real>,
}

impl TridiagonalOperator {
    /// Create a zero tridiagonal operator of size `n`.
    pub fn new(n: Size) -> Self {
        Self {
            lower: vec![0.0; n],
            diag: vec![0.0; n],
            upper: vec![0.0; n],
        }
    }

    /// Size (number of rows/columns).
    pub fn size(&self) -> Size {
        self.diag.len()
    }

    /// Apply the operator: `y = A · x`.
    pub fn apply(&self, x: &[Real]) -> Vec<Real> {
        let n = self.size();
        debug_assert_eq!(x.len(), n);
        let mut y = vec![0.0; n];
        y[0] = self.diag[0] * x[0] + self.upper[0] * x[1];
        for i in 1..n - 1 {
            y[i] = self.lower[i] * x[i - 1] + self.diag[i] * x[i] + self.upper[i] * x[i + 1];
        }
        y[n - 1] = self.lower[n - 1] * x[n - 2] + self.diag[n - 1] * x[n - 1];
        y
    }

    /// Solve `A · x = rhs` using the Thomas algorithm (LU decomposition for
    /// tridiagonal systems).
    ///
    /// # Errors
    /// Fails with a numerical error when a pivot vanishes.
    pub fn solve(&self, rhs: &[Real]) -> Result<Vec<Real>> {
        let n = self.size();
        debug_assert_eq!(rhs.len(), n);

        let mut c_prime = vec![0.0; n];
        let mut d_prime = vec![0.0; n];

        if self.diag[0].abs() < 1e-300 {
            return Err(Error::Numerical("singular tridiagonal system".into()));
        }
        c_prime[0] = self.upper[0] / self.diag[0];
        d_prime[0] = rhs[0] / self.diag[0];

        for i in 1..n {
            let m = self.diag[i] - self.lower[i] * c_prime[i - 1];
            if m.abs() < 1e-300 {
                return Err(Error::Numerical("singular tridiagonal system".into()));
            }
            if i < n - 1 {
                c_prime[i] = self.upper[i] / m;
            }
            d_prime[i] = (rhs[i] - self.lower[i] * d_prime[i - 1]) / m;
        }

        let mut x = vec![0.0; n];
        x[n - 1] = d_prime[n - 1];
        for i in (0..n - 1).rev() {
            x[i] = d_prime[i] - c_prime[i] * x[i + 1];
        }

        Ok(x)
    }

    /// Return `I + a·L` where `L` is this operator.
    ///
    /// The explicit and implicit halves of a θ-step are both of this form:
    /// `(I − θ·Δt·L)·Vₙ = (I + (1−θ)·Δt·L)·Vₙ₊₁`.
    pub fn identity_plus(&self, a: Real) -> Self {
        let n = self.size();
        let mut out = Self::new(n);
        for i in 0..n {
            out.lower[i] = a * self.lower[i];
            out.diag[i] = 1.0 + a * self.diag[i];
            out.upper[i] = a * self.upper[i];
        }
        out
    }
}

// ─── Black-Scholes operator ───────────────────────────────────────────────────

/// The discretized Black-Scholes operator on a (possibly non-uniform)
/// log-price grid.
///
/// Interior rows use three-point central differences for the drift and
/// diffusion terms; the boundary rows assume zero convexity (the solution is
/// linear in `x` far from the strike) with one-sided drift.
#[derive(Debug)]
pub struct FdmBlackScholesOp {
    process: Arc<GeneralizedBlackScholesProcess>,
    strike: Real,
    local_vol: bool,
    illegal_local_vol_overwrite: Option<Real>,
    x: Vec<Real>,
}

impl FdmBlackScholesOp {
    /// Create an operator over the mesh's first axis.
    ///
    /// With `local_vol` set, volatilities come from the process's
    /// local-volatility surface; an undefined (non-finite or non-positive)
    /// value at a node is replaced by `illegal_local_vol_overwrite`, or is a
    /// numerical error when no overwrite is configured.
    pub fn new(
        mesher: &dyn FdmMesher,
        process: Arc<GeneralizedBlackScholesProcess>,
        strike: Real,
        local_vol: bool,
        illegal_local_vol_overwrite: Option<Real>,
    ) -> Result<Self> {
        let x = mesher.axis_locations(0);
        if x.len() < 3 {
            return Err(Error::Configuration(
                "operator needs at least 3 grid points".into(),
            ));
        }
        Ok(Self {
            process,
            strike,
            local_vol,
            illegal_local_vol_overwrite,
            x,
        })
    }

    /// Number of grid points along the operator's axis.
    pub fn size(&self) -> Size {
        self.x.len()
    }

    fn vol_at(&self, t: Time, s: Real) -> Result<Real> {
        if self.local_vol {
            match self.process.local_vol(t, s) {
                Some(v) if v.is_finite() && v > 0.0 => Ok(v),
                _ => match self.illegal_local_vol_overwrite {
                    Some(overwrite) => Ok(overwrite),
                    None => Err(Error::Numerical(format!(
                        "illegal local volatility at t={t}, s={s}"
                    ))),
                },
            }
        } else {
            Ok(self.process.black_vol(t, self.strike))
        }
    }

    /// The tridiagonal discretization of the operator at time `t`.
    pub fn tridiagonal(&self, t: Time) -> Result<TridiagonalOperator> {
        let n = self.x.len();
        let x = &self.x;
        let r = self.process.risk_free_rate(t);
        let q = self.process.dividend_yield(t);

        let mut op = TridiagonalOperator::new(n);

        for i in 1..n - 1 {
            let sigma = self.vol_at(t, x[i].exp())?;
            let alpha = 0.5 * sigma * sigma;
            let beta = r - q - alpha;

            let hm = x[i] - x[i - 1];
            let hp = x[i + 1] - x[i];

            // Non-uniform three-point central differences
            let d1m = -hp / (hm * (hm + hp));
            let d1c = (hp - hm) / (hm * hp);
            let d1p = hm / (hp * (hm + hp));

            let d2m = 2.0 / (hm * (hm + hp));
            let d2c = -2.0 / (hm * hp);
            let d2p = 2.0 / (hp * (hm + hp));

            op.lower[i] = alpha * d2m + beta * d1m;
            op.diag[i] = alpha * d2c + beta * d1c - r;
            op.upper[i] = alpha * d2p + beta * d1p;
        }

        // Boundary rows: zero convexity, one-sided drift
        let sigma0 = self.vol_at(t, x[0].exp())?;
        let beta0 = r - q - 0.5 * sigma0 * sigma0;
        let h0 = x[1] - x[0];
        op.diag[0] = -beta0 / h0 - r;
        op.upper[0] = beta0 / h0;

        let sigma_n = self.vol_at(t, x[n - 1].exp())?;
        let beta_n = r - q - 0.5 * sigma_n * sigma_n;
        let hn = x[n - 1] - x[n - 2];
        op.lower[n - 1] = -beta_n / hn;
        op.diag[n - 1] = beta_n / hn - r;

        Ok(op)
    }
}
