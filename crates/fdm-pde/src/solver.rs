//! The solver/interpolator core.
//!
//! [`FdmBlackScholesSolver`] owns the full valuation life-cycle for one
//! (process, strike, mesh, scheme) configuration: it seeds the terminal
//! condition, rolls the grid back to time zero, and reconstructs a
//! continuous, twice-differentiable price function from the discrete
//! solution via monotone cubic interpolation in log space.
//!
//! A snapshot condition is merged into the externally supplied step
//! conditions so the same single rollback also caches the solution at a
//! time just before the first scheduled event; theta comes out as a
//! one-sided finite difference between the two surfaces.
//!
//! Results are computed lazily, cached, and invalidated push-style when the
//! observed process changes.

use crate::boundary::FdmBoundaryConditionSet;
use crate::inner_value::FdmInnerValueCalculator;
use crate::mesher::FdmMesher;
use crate::operator::FdmBlackScholesOp;
use crate::scheme::{FdmBackwardSolver, FdmSchemeDesc};
use crate::step_condition::{FdmSnapshotCondition, FdmStepConditionComposite};
use fdm_core::{
    ensure, errors::Error, errors::Result, LazyObject, LazyState, Observable, Observer, Real,
    Size, Time,
};
use fdm_math::{Interpolation1D, MonotoneCubicSpline};
use fdm_processes::GeneralizedBlackScholesProcess;
use std::cell::{Cell, RefCell};
use std::sync::{Arc, Weak};

/// Everything the solver needs besides the process and scheme: mesh, payoff
/// calculator, boundary conditions, step conditions, and the time axis.
#[derive(Debug)]
pub struct FdmSolverDesc {
    /// The spatial mesh.
    pub mesher: Arc<dyn FdmMesher>,
    /// Boundary conditions, passed through to the rollback unmodified.
    pub bc_set: FdmBoundaryConditionSet,
    /// Externally supplied step conditions (exercise checks, barriers, ...).
    pub condition: Arc<FdmStepConditionComposite>,
    /// Terminal/exercise value calculator.
    pub calculator: Arc<dyn FdmInnerValueCalculator>,
    /// Maturity of the rollback, in years.
    pub maturity: Time,
    /// Number of uniform time steps.
    pub time_steps: Size,
    /// Number of initial implicit damping steps.
    pub damping_steps: Size,
}

/// Trigger time of the theta snapshot: just under one calendar day, capped
/// by the first scheduled stopping time (or the maturity when the schedule
/// is empty).
///
/// The capture therefore sits close enough to time zero to approximate an
/// instantaneous time derivative, yet strictly before the first event that
/// could introduce a discontinuity.
pub fn theta_snapshot_time(condition: &FdmStepConditionComposite, maturity: Time) -> Time {
    let t_first = condition
        .stopping_times()
        .first()
        .copied()
        .unwrap_or(maturity);
    0.99 * (1.0 / 365.0_f64).min(t_first)
}

/// Finite-difference solver for a single-underlying Black-Scholes-type
/// model, with continuous price, delta, gamma, and theta queries.
///
/// The solver registers itself as an observer of the process: parameter
/// changes mark the cache stale and the next query recomputes.  Queries
/// going through a valid cache never recompute.
pub struct FdmBlackScholesSolver {
    process: Arc<GeneralizedBlackScholesProcess>,
    strike: Real,
    solver_desc: FdmSolverDesc,
    scheme_desc: FdmSchemeDesc,
    local_vol: bool,
    illegal_local_vol_overwrite: Option<Real>,
    theta_condition: Arc<FdmSnapshotCondition>,
    conditions: Arc<FdmStepConditionComposite>,
    x: Vec<Real>,
    initial_values: Vec<Real>,
    result_values: RefCell<Vec<Real>>,
    interpolation: RefCell<Option<MonotoneCubicSpline>>,
    lazy: LazyState,
}

impl FdmBlackScholesSolver {
    /// Construct a solver and register it with the process.
    ///
    /// Seeds the terminal condition (time-averaged payoff per grid point)
    /// and the log-price coordinate vector in a single pass over the full
    /// grid, and merges the theta snapshot condition into the externally
    /// supplied composite.
    ///
    /// # Errors
    /// Fails on a non-positive maturity or strike, a zero step count, or a
    /// coordinate vector that is not strictly increasing.
    pub fn new(
        process: Arc<GeneralizedBlackScholesProcess>,
        strike: Real,
        solver_desc: FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
        local_vol: bool,
        illegal_local_vol_overwrite: Option<Real>,
    ) -> Result<Arc<Self>> {
        if solver_desc.maturity <= 0.0 {
            return Err(Error::Configuration(format!(
                "maturity must be positive, got {}",
                solver_desc.maturity
            )));
        }
        if solver_desc.time_steps == 0 {
            return Err(Error::Configuration(
                "at least one time step required".into(),
            ));
        }
        if strike <= 0.0 {
            return Err(Error::Configuration(format!(
                "strike must be positive, got {strike}"
            )));
        }

        let theta_condition = Arc::new(FdmSnapshotCondition::new(theta_snapshot_time(
            &solver_desc.condition,
            solver_desc.maturity,
        )));
        let conditions = Arc::new(FdmStepConditionComposite::join_conditions(
            theta_condition.clone(),
            &solver_desc.condition,
        ));

        let layout = solver_desc.mesher.layout();
        let mut initial_values = vec![0.0; layout.size()];
        let mut x = Vec::with_capacity(layout.dim()[0]);
        for iter in layout.iter() {
            initial_values[iter.index()] = solver_desc
                .calculator
                .avg_inner_value(&iter, solver_desc.maturity);
            if iter.coordinates()[1..].iter().all(|&c| c == 0) {
                x.push(solver_desc.mesher.location(&iter, 0));
            }
        }
        if !x.windows(2).all(|w| w[0] < w[1]) {
            return Err(Error::Configuration(
                "mesh coordinates along the first dimension must be strictly increasing".into(),
            ));
        }

        let solver = Arc::new(Self {
            process: process.clone(),
            strike,
            solver_desc,
            scheme_desc,
            local_vol,
            illegal_local_vol_overwrite,
            theta_condition,
            conditions,
            x,
            initial_values,
            result_values: RefCell::new(Vec::new()),
            interpolation: RefCell::new(None),
            lazy: LazyState::new(),
        });
        process.register_observer(Arc::downgrade(&solver) as Weak<dyn Observer>);
        Ok(solver)
    }

    /// Present value at the given spot.
    ///
    /// # Errors
    /// Fails on a non-positive spot or if the recalculation fails.
    pub fn value_at(&self, s: Real) -> Result<Real> {
        ensure!(s > 0.0, "spot must be positive, got {s}");
        self.with_interpolation(|spline| spline.operator(s.ln()))
    }

    /// Delta (∂V/∂S) at the given spot.
    ///
    /// The interpolant lives in `x = ln S`, so the log-space slope is
    /// divided by the spot.
    pub fn delta_at(&self, s: Real) -> Result<Real> {
        ensure!(s > 0.0, "spot must be positive, got {s}");
        self.with_interpolation(|spline| spline.derivative(s.ln()) / s)
    }

    /// Gamma (∂²V/∂S²) at the given spot.
    ///
    /// Differentiating a function of `ln S` twice with respect to `S` via
    /// `d/dS = (1/S)·d/dx` leaves a first-derivative correction:
    /// `V_SS = (f''(x) − f'(x)) / S²`.
    pub fn gamma_at(&self, s: Real) -> Result<Real> {
        ensure!(s > 0.0, "spot must be positive, got {s}");
        self.with_interpolation(|spline| {
            let x = s.ln();
            (spline.second_derivative(x) - spline.derivative(x)) / (s * s)
        })
    }

    /// Theta (∂V/∂t) at the given spot, estimated as a one-sided finite
    /// difference between the snapshot surface and the time-zero surface.
    ///
    /// # Errors
    /// Fails with a precondition error when the earliest stopping time of
    /// the condition set is exactly zero — theta is undefined at an
    /// instantaneous boundary.
    pub fn theta_at(&self, s: Real) -> Result<Real> {
        ensure!(s > 0.0, "spot must be positive, got {s}");
        let front = self.conditions.stopping_times()[0];
        ensure!(front > 0.0, "stopping time at zero: cannot calculate theta");

        self.calculate()?;
        let snapshot = self.theta_condition.values()?;
        let n = self.x.len();
        let spline = MonotoneCubicSpline::new(&self.x, &snapshot[..n])?;
        Ok((spline.operator(s.ln()) - self.value_at(s)?) / self.theta_condition.time())
    }

    /// The rolled-back values along the first dimension.
    ///
    /// # Errors
    /// Fails if the recalculation fails.
    pub fn result_values(&self) -> Result<Vec<Real>> {
        self.calculate()?;
        Ok(self.result_values.borrow().clone())
    }

    fn with_interpolation<R>(&self, f: impl FnOnce(&MonotoneCubicSpline) -> R) -> Result<R> {
        self.calculate()?;
        let guard = self.interpolation.borrow();
        match guard.as_ref() {
            Some(spline) => Ok(f(spline)),
            None => Err(Error::NotAvailable("interpolant not built".into())),
        }
    }
}

impl LazyObject for FdmBlackScholesSolver {
    fn perform_calculations(&self) -> Result<()> {
        // The operator is rebuilt from the live process state: rate, yield,
        // and (local) volatility changes all flow into the bands
        let op = FdmBlackScholesOp::new(
            self.solver_desc.mesher.as_ref(),
            self.process.clone(),
            self.strike,
            self.local_vol,
            self.illegal_local_vol_overwrite,
        )?;

        let mut rhs = self.initial_values.clone();
        FdmBackwardSolver::new(
            op,
            self.solver_desc.bc_set.clone(),
            self.conditions.clone(),
            self.scheme_desc,
        )
        .rollback(
            &mut rhs,
            self.solver_desc.maturity,
            0.0,
            self.solver_desc.time_steps,
            self.solver_desc.damping_steps,
        )?;

        let n = self.solver_desc.mesher.layout().dim()[0];
        let result = rhs[..n].to_vec();
        let spline = MonotoneCubicSpline::new(&self.x, &result)?;

        // Replace the cache only now that every fallible step has succeeded
        *self.result_values.borrow_mut() = result;
        *self.interpolation.borrow_mut() = Some(spline);
        Ok(())
    }

    fn calculated(&self) -> &Cell<bool> {
        &self.lazy.calculated
    }
}

impl Observer for FdmBlackScholesSolver {
    fn update(&self) {
        LazyObject::update(self);
    }
}
