//! Boundary conditions.
//!
//! Boundary conditions are opaque to the solver core: the rollback applies
//! the whole set after every time step.  An empty set is valid — the
//! Black-Scholes operator's boundary rows already impose zero convexity with
//! one-sided drift, which suits vanilla payoffs that become linear in the
//! log coordinate far from the strike.

use fdm_core::Real;
use std::sync::Arc;

/// Side of the spatial grid a boundary condition acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundarySide {
    /// The first grid point.
    Lower,
    /// The last grid point.
    Upper,
}

/// A condition enforced on the value vector at the grid edge.
pub trait FdmBoundaryCondition: std::fmt::Debug {
    /// Adjust `values` after a time step has been applied.
    fn apply_after_applying(&self, values: &mut [Real]);
}

/// The ordered set of boundary conditions passed through to the rollback.
pub type FdmBoundaryConditionSet = Vec<Arc<dyn FdmBoundaryCondition>>;

/// Pins the value at one grid edge to a constant.
#[derive(Debug, Clone, Copy)]
pub struct FdmDirichletBoundary {
    side: BoundarySide,
    value: Real,
}

impl FdmDirichletBoundary {
    /// Create a Dirichlet condition holding `value` at `side`.
    pub fn new(side: BoundarySide, value: Real) -> Self {
        Self { side, value }
    }
}

impl FdmBoundaryCondition for FdmDirichletBoundary {
    fn apply_after_applying(&self, values: &mut [Real]) {
        match self.side {
            BoundarySide::Lower => {
                if let Some(v) = values.first_mut() {
                    *v = self.value;
                }
            }
            BoundarySide::Upper => {
                if let Some(v) = values.last_mut() {
                    *v = self.value;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dirichlet_pins_edges() {
        let mut values = vec![1.0, 2.0, 3.0];
        FdmDirichletBoundary::new(BoundarySide::Lower, 0.0).apply_after_applying(&mut values);
        FdmDirichletBoundary::new(BoundarySide::Upper, 9.0).apply_after_applying(&mut values);
        assert_eq!(values, vec![0.0, 2.0, 9.0]);
    }
}
