//! Inner-value calculators.
//!
//! An inner value is the payoff (exercise value) seen at a grid point.  The
//! terminal condition of the rollback uses the *cell-averaged* variant: the
//! payoff averaged over the grid cell around each point, which smooths the
//! strike kink and noticeably improves convergence of the scheme.

use crate::mesher::{FdmLinearOpIterator, FdmMesher};
use crate::payoff::Payoff;
use fdm_core::{Real, Size, Time};
use std::sync::Arc;

/// Payoff values attached to grid points.
pub trait FdmInnerValueCalculator: std::fmt::Debug {
    /// Payoff value at a grid point.
    fn inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real;

    /// Payoff value averaged over the grid cell around the point;
    /// time-averaged as well for path-time-dependent payoffs.
    fn avg_inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real;
}

/// Inner values for a payoff quoted against the exponential of the grid
/// coordinate (a log-price grid).
#[derive(Debug)]
pub struct FdmLogInnerValue {
    payoff: Arc<dyn Payoff>,
    direction: Size,
    locations: Vec<Real>,
}

impl FdmLogInnerValue {
    /// Create a calculator for `payoff` on the mesh axis `direction`.
    pub fn new(payoff: Arc<dyn Payoff>, mesher: &dyn FdmMesher, direction: Size) -> Self {
        Self {
            payoff,
            direction,
            locations: mesher.axis_locations(direction),
        }
    }

    /// Composite Simpson average of the payoff over `[a, b]` in log space.
    fn cell_average(&self, a: Real, b: Real) -> Real {
        const INTERVALS: usize = 8;
        let h = (b - a) / INTERVALS as Real;
        let f = |x: Real| self.payoff.value(x.exp());
        let mut sum = f(a) + f(b);
        for i in 1..INTERVALS {
            let w = if i % 2 == 1 { 4.0 } else { 2.0 };
            sum += w * f(a + i as Real * h);
        }
        sum * h / 3.0 / (b - a)
    }
}

impl FdmInnerValueCalculator for FdmLogInnerValue {
    fn inner_value(&self, iter: &FdmLinearOpIterator, _t: Time) -> Real {
        let x = self.locations[iter.coordinates()[self.direction]];
        self.payoff.value(x.exp())
    }

    fn avg_inner_value(&self, iter: &FdmLinearOpIterator, t: Time) -> Real {
        let c = iter.coordinates()[self.direction];
        if c == 0 || c == self.locations.len() - 1 {
            // Edge cells have no surrounding cell to average over
            return self.inner_value(iter, t);
        }
        let x = self.locations[c];
        let a = x - 0.5 * (x - self.locations[c - 1]);
        let b = x + 0.5 * (self.locations[c + 1] - x);
        self.cell_average(a, b)
    }
}
