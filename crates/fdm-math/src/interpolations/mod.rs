//! 1D interpolation trait and implementations.

use fdm_core::Real;

/// A twice-differentiable 1D interpolation function `f: R → R` defined by a
/// set of known points.
pub trait Interpolation1D: std::fmt::Debug {
    /// Evaluate the interpolation at `x`.
    fn operator(&self, x: Real) -> Real;

    /// First derivative `f'(x)`.
    fn derivative(&self, x: Real) -> Real;

    /// Second derivative `f''(x)`.
    fn second_derivative(&self, x: Real) -> Real;

    /// Return the lower bound of the interpolation domain.
    fn x_min(&self) -> Real;

    /// Return the upper bound of the interpolation domain.
    fn x_max(&self) -> Real;

    /// Return `true` if `x` is within the interpolation range.
    fn is_in_range(&self, x: Real) -> bool {
        x >= self.x_min() && x <= self.x_max()
    }
}

mod monotone_cubic;

pub use monotone_cubic::MonotoneCubicSpline;
