//! Step conditions applied at scheduled times during backward rollback.
//!
//! A step condition mutates the value vector when the rollback reaches one
//! of its scheduled times — early exercise checks, barrier monitoring, or
//! the snapshot capture used for the theta estimate.  The
//! [`FdmStepConditionComposite`] aggregates conditions together with their
//! stopping-time schedule; the backward solver lands on every scheduled time
//! exactly and dispatches to the whole set.

use crate::inner_value::FdmInnerValueCalculator;
use crate::mesher::FdmMesher;
use fdm_core::{errors::Error, errors::Result, Real, Time};
use std::cell::RefCell;
use std::sync::Arc;

/// Absolute tolerance for matching a rollback time against a scheduled time.
const TIME_EPS: Time = 1e-10;

/// A rule applied to the value vector at specific times during rollback.
pub trait StepCondition: std::fmt::Debug {
    /// Apply the condition to `values` at time `t`.
    fn apply_to(&self, values: &mut [Real], t: Time);
}

// ─── Composite ────────────────────────────────────────────────────────────────

/// An ordered set of step conditions plus their merged stopping-time
/// schedule.
#[derive(Debug, Clone)]
pub struct FdmStepConditionComposite {
    stopping_times: Vec<Time>,
    conditions: Vec<Arc<dyn StepCondition>>,
}

impl FdmStepConditionComposite {
    /// Create a composite from conditions and their scheduled times.
    ///
    /// The schedule is sorted ascending and deduplicated; conditions are
    /// dispatched in the order given.
    pub fn new(conditions: Vec<Arc<dyn StepCondition>>, stopping_times: Vec<Time>) -> Self {
        let mut stopping_times = stopping_times;
        stopping_times.sort_by(|a, b| a.total_cmp(b));
        stopping_times.dedup_by(|a, b| (*a - *b).abs() < TIME_EPS);
        Self {
            stopping_times,
            conditions,
        }
    }

    /// A composite with no conditions and no schedule (plain European
    /// rollback).
    pub fn vanilla() -> Self {
        Self {
            stopping_times: Vec::new(),
            conditions: Vec::new(),
        }
    }

    /// The merged schedule, earliest time first.
    pub fn stopping_times(&self) -> &[Time] {
        &self.stopping_times
    }

    /// The aggregated conditions.
    pub fn conditions(&self) -> &[Arc<dyn StepCondition>] {
        &self.conditions
    }

    /// Merge a snapshot condition (and its trigger time) into an existing
    /// composite, so one rollback pass serves both.
    pub fn join_conditions(
        snapshot: Arc<FdmSnapshotCondition>,
        base: &FdmStepConditionComposite,
    ) -> Self {
        let mut stopping_times = base.stopping_times.clone();
        stopping_times.push(snapshot.time());
        let mut conditions = base.conditions.clone();
        conditions.push(snapshot as Arc<dyn StepCondition>);
        Self::new(conditions, stopping_times)
    }
}

impl StepCondition for FdmStepConditionComposite {
    fn apply_to(&self, values: &mut [Real], t: Time) {
        for condition in &self.conditions {
            condition.apply_to(values, t);
        }
    }
}

// ─── Snapshot ─────────────────────────────────────────────────────────────────

/// Captures a copy of the grid values when the rollback reaches its trigger
/// time.
///
/// The capture is overwritten on repeated hits at the same time, never
/// accumulated.
#[derive(Debug)]
pub struct FdmSnapshotCondition {
    t: Time,
    values: RefCell<Option<Vec<Real>>>,
}

impl FdmSnapshotCondition {
    /// Create a snapshot condition triggering at time `t`.
    pub fn new(t: Time) -> Self {
        Self {
            t,
            values: RefCell::new(None),
        }
    }

    /// The trigger time.
    pub fn time(&self) -> Time {
        self.t
    }

    /// The captured values.
    ///
    /// # Errors
    /// Fails with [`Error::NotAvailable`] before the rollback has reached
    /// the trigger time.
    pub fn values(&self) -> Result<Vec<Real>> {
        self.values
            .borrow()
            .clone()
            .ok_or_else(|| Error::NotAvailable("snapshot not yet captured".into()))
    }
}

impl StepCondition for FdmSnapshotCondition {
    fn apply_to(&self, values: &mut [Real], t: Time) {
        if (t - self.t).abs() < TIME_EPS {
            *self.values.borrow_mut() = Some(values.to_vec());
        }
    }
}

// ─── American exercise ────────────────────────────────────────────────────────

/// Floors the value vector at the exercise (inner) value wherever the
/// rollback applies it.
#[derive(Debug)]
pub struct FdmAmericanStepCondition {
    mesher: Arc<dyn FdmMesher>,
    calculator: Arc<dyn FdmInnerValueCalculator>,
}

impl FdmAmericanStepCondition {
    /// Create an American exercise condition.
    pub fn new(mesher: Arc<dyn FdmMesher>, calculator: Arc<dyn FdmInnerValueCalculator>) -> Self {
        Self { mesher, calculator }
    }
}

impl StepCondition for FdmAmericanStepCondition {
    fn apply_to(&self, values: &mut [Real], t: Time) {
        for iter in self.mesher.layout().iter() {
            let exercise = self.calculator.inner_value(&iter, t);
            if values[iter.index()] < exercise {
                values[iter.index()] = exercise;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inner_value::FdmLogInnerValue;
    use crate::mesher::Fdm1dMesher;
    use crate::payoff::{OptionType, PlainVanillaPayoff};

    #[test]
    fn snapshot_captures_only_at_trigger_time() {
        let snapshot = FdmSnapshotCondition::new(0.25);
        assert!(matches!(snapshot.values(), Err(Error::NotAvailable(_))));

        let mut values = vec![1.0, 2.0, 3.0];
        snapshot.apply_to(&mut values, 0.50);
        assert!(snapshot.values().is_err());

        snapshot.apply_to(&mut values, 0.25);
        assert_eq!(snapshot.values().unwrap(), vec![1.0, 2.0, 3.0]);

        // A second hit at the trigger overwrites, it does not accumulate
        values = vec![4.0, 5.0, 6.0];
        snapshot.apply_to(&mut values, 0.25);
        assert_eq!(snapshot.values().unwrap(), vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn composite_schedule_sorted_and_deduplicated() {
        let composite =
            FdmStepConditionComposite::new(Vec::new(), vec![0.75, 0.25, 0.25, 0.50]);
        assert_eq!(composite.stopping_times(), &[0.25, 0.50, 0.75]);
    }

    #[test]
    fn join_merges_snapshot_time_and_condition() {
        let base = FdmStepConditionComposite::new(Vec::new(), vec![0.5]);
        let snapshot = Arc::new(FdmSnapshotCondition::new(0.01));
        let joined = FdmStepConditionComposite::join_conditions(snapshot.clone(), &base);
        assert_eq!(joined.stopping_times(), &[0.01, 0.5]);
        assert_eq!(joined.conditions().len(), 1);

        let mut values = vec![7.0];
        joined.apply_to(&mut values, 0.01);
        assert_eq!(snapshot.values().unwrap(), vec![7.0]);
    }

    #[test]
    fn american_condition_floors_at_intrinsic() {
        let strike: Real = 100.0;
        let locations: Vec<Real> = (0..5).map(|i| strike.ln() - 0.2 + 0.1 * i as Real).collect();
        let mesher = Arc::new(Fdm1dMesher::new(locations).unwrap());
        let payoff = Arc::new(PlainVanillaPayoff::new(OptionType::Put, strike));
        let calc = Arc::new(FdmLogInnerValue::new(payoff.clone(), mesher.as_ref(), 0));
        let condition = FdmAmericanStepCondition::new(mesher.clone(), calc.clone());

        let n = mesher.layout().size();
        let mut values = vec![0.0; n];
        condition.apply_to(&mut values, 0.5);
        for iter in mesher.layout().iter() {
            let intrinsic = calc.inner_value(&iter, 0.5);
            assert!(values[iter.index()] >= intrinsic);
        }
    }
}
