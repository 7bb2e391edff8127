//! Local volatility surfaces.

use fdm_core::{Real, Time, Volatility};

/// A local volatility function σ(t, S) of both time and asset level.
///
/// Implementations may return a non-finite or non-positive value where the
/// surface is undefined (e.g. outside a calibrated region); consumers decide
/// whether to substitute a fallback or fail.
pub trait LocalVolSurface: std::fmt::Debug {
    /// Local volatility at time `t` and asset level `s`.
    fn local_vol(&self, t: Time, s: Real) -> Volatility;
}

/// A flat local volatility surface.
#[derive(Debug, Clone, Copy)]
pub struct ConstantLocalVol {
    vol: Volatility,
}

impl ConstantLocalVol {
    /// Create a flat surface at the given volatility level.
    pub fn new(vol: Volatility) -> Self {
        Self { vol }
    }
}

impl LocalVolSurface for ConstantLocalVol {
    fn local_vol(&self, _t: Time, _s: Real) -> Volatility {
        self.vol
    }
}
