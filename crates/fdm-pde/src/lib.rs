//! # fdm-pde
//!
//! Finite-difference PDE machinery for single-underlying option pricing:
//! spatial mesh layout and meshers, inner-value (payoff) calculators,
//! boundary and step conditions, the discretized Black-Scholes operator,
//! backward time-stepping, and the lazily-recalculated
//! [`FdmBlackScholesSolver`] that turns the rolled-back grid into a
//! continuous price function with delta, gamma, and theta.
//!
//! # Modules
//!
//! * [`mesher`] — grid layout, iteration, and log-space meshers
//! * [`payoff`] — option types and plain-vanilla payoffs
//! * [`inner_value`] — terminal/exercise value calculators with cell averaging
//! * [`boundary`] — boundary condition set applied during rollback
//! * [`step_condition`] — composite, snapshot, and American step conditions
//! * [`operator`] — tridiagonal algebra and the Black-Scholes spatial operator
//! * [`scheme`] — θ-scheme descriptor and the backward rollback driver
//! * [`solver`] — the solver/interpolator core

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Boundary conditions.
pub mod boundary;

/// Inner-value calculators.
pub mod inner_value;

/// Grid layout and meshers.
pub mod mesher;

/// Discretized spatial operators.
pub mod operator;

/// Payoffs.
pub mod payoff;

/// Time-stepping schemes and the backward rollback.
pub mod scheme;

/// Step conditions applied during rollback.
pub mod step_condition;

/// The solver/interpolator core.
pub mod solver;

pub use boundary::{BoundarySide, FdmBoundaryCondition, FdmBoundaryConditionSet, FdmDirichletBoundary};
pub use inner_value::{FdmInnerValueCalculator, FdmLogInnerValue};
pub use mesher::{Fdm1dMesher, FdmBlackScholesMesher, FdmLinearOpIterator, FdmLinearOpLayout, FdmMesher};
pub use operator::{FdmBlackScholesOp, TridiagonalOperator};
pub use payoff::{OptionType, Payoff, PlainVanillaPayoff};
pub use scheme::{FdmBackwardSolver, FdmSchemeDesc};
pub use step_condition::{
    FdmAmericanStepCondition, FdmSnapshotCondition, FdmStepConditionComposite, StepCondition,
};
pub use solver::{theta_snapshot_time, FdmBlackScholesSolver, FdmSolverDesc};
