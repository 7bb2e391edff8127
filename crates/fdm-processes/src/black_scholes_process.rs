//! Generalized Black-Scholes process.
//!
//! `dS/S = (r − q) dt + σ(t, S) dW`
//!
//! where `r` is the risk-free rate, `q` the continuous dividend yield, and
//! `σ` either a constant Black volatility or a local-volatility surface.
//!
//! The process is the shared market snapshot many pricers observe: every
//! mutator notifies registered observers so that downstream caches can be
//! marked stale without eager recomputation.

use crate::local_vol::LocalVolSurface;
use fdm_core::{
    errors::Error, errors::Result, Observable, ObservableImpl, Observer, Rate, Real, Time,
    Volatility,
};
use std::cell::{Cell, RefCell};
use std::sync::{Arc, Weak};

/// A generalized Black-Scholes stochastic process with mutable, observable
/// parameters.
///
/// Rates and the Black volatility are flat; the accessors still take time
/// (and, for volatilities, asset level) arguments so that term-structure
/// shaped implementations remain drop-in replacements at the call sites.
pub struct GeneralizedBlackScholesProcess {
    x0: Cell<Real>,
    risk_free_rate: Cell<Rate>,
    dividend_yield: Cell<Rate>,
    black_vol: Cell<Volatility>,
    local_vol: RefCell<Option<Arc<dyn LocalVolSurface>>>,
    observable: ObservableImpl,
}

impl GeneralizedBlackScholesProcess {
    /// Create a process with a constant Black volatility.
    ///
    /// # Errors
    /// Fails on a non-positive spot or a negative volatility.
    pub fn new(x0: Real, risk_free_rate: Rate, dividend_yield: Rate, vol: Volatility) -> Result<Self> {
        if x0 <= 0.0 {
            return Err(Error::Configuration(format!(
                "spot must be positive, got {x0}"
            )));
        }
        if vol < 0.0 {
            return Err(Error::Configuration(format!(
                "volatility must be non-negative, got {vol}"
            )));
        }
        Ok(Self {
            x0: Cell::new(x0),
            risk_free_rate: Cell::new(risk_free_rate),
            dividend_yield: Cell::new(dividend_yield),
            black_vol: Cell::new(vol),
            local_vol: RefCell::new(None),
            observable: ObservableImpl::new(),
        })
    }

    /// Create a process with a local-volatility surface.
    ///
    /// The Black volatility is still required: grid construction sizes the
    /// mesh from it.
    pub fn with_local_vol(
        x0: Real,
        risk_free_rate: Rate,
        dividend_yield: Rate,
        vol: Volatility,
        local_vol: Arc<dyn LocalVolSurface>,
    ) -> Result<Self> {
        let process = Self::new(x0, risk_free_rate, dividend_yield, vol)?;
        *process.local_vol.borrow_mut() = Some(local_vol);
        Ok(process)
    }

    /// The current spot price.
    pub fn x0(&self) -> Real {
        self.x0.get()
    }

    /// Continuously-compounded risk-free rate at time `t`.
    pub fn risk_free_rate(&self, _t: Time) -> Rate {
        self.risk_free_rate.get()
    }

    /// Continuous dividend yield at time `t`.
    pub fn dividend_yield(&self, _t: Time) -> Rate {
        self.dividend_yield.get()
    }

    /// Black volatility for time `t` and strike/level `s`.
    pub fn black_vol(&self, _t: Time, _s: Real) -> Volatility {
        self.black_vol.get()
    }

    /// Local volatility at `(t, s)`, or `None` when no surface is set.
    pub fn local_vol(&self, t: Time, s: Real) -> Option<Volatility> {
        self.local_vol.borrow().as_ref().map(|lv| lv.local_vol(t, s))
    }

    /// Replace the spot price and notify observers.
    pub fn set_spot(&self, x0: Real) {
        self.x0.set(x0);
        self.notify_observers();
    }

    /// Replace the risk-free rate and notify observers.
    pub fn set_risk_free_rate(&self, r: Rate) {
        self.risk_free_rate.set(r);
        self.notify_observers();
    }

    /// Replace the dividend yield and notify observers.
    pub fn set_dividend_yield(&self, q: Rate) {
        self.dividend_yield.set(q);
        self.notify_observers();
    }

    /// Replace the Black volatility and notify observers.
    pub fn set_black_vol(&self, vol: Volatility) {
        self.black_vol.set(vol);
        self.notify_observers();
    }

    /// Replace (or clear) the local-volatility surface and notify observers.
    pub fn set_local_vol(&self, local_vol: Option<Arc<dyn LocalVolSurface>>) {
        *self.local_vol.borrow_mut() = local_vol;
        self.notify_observers();
    }
}

impl Observable for GeneralizedBlackScholesProcess {
    fn register_observer(&self, observer: Weak<dyn Observer>) {
        self.observable.register(observer);
    }

    fn unregister_observer(&self, observer: &Weak<dyn Observer>) {
        self.observable.unregister(observer);
    }

    fn notify_observers(&self) {
        self.observable.notify();
    }
}

impl std::fmt::Debug for GeneralizedBlackScholesProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneralizedBlackScholesProcess")
            .field("x0", &self.x0.get())
            .field("risk_free_rate", &self.risk_free_rate.get())
            .field("dividend_yield", &self.dividend_yield.get())
            .field("black_vol", &self.black_vol.get())
            .field("local_vol", &self.local_vol.borrow().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_vol::ConstantLocalVol;
    use approx::assert_abs_diff_eq;

    #[test]
    fn flat_accessors() {
        let p = GeneralizedBlackScholesProcess::new(100.0, 0.05, 0.02, 0.20).unwrap();
        assert_abs_diff_eq!(p.x0(), 100.0, epsilon = 1e-15);
        assert_abs_diff_eq!(p.risk_free_rate(0.7), 0.05, epsilon = 1e-15);
        assert_abs_diff_eq!(p.dividend_yield(0.7), 0.02, epsilon = 1e-15);
        assert_abs_diff_eq!(p.black_vol(0.7, 80.0), 0.20, epsilon = 1e-15);
        assert!(p.local_vol(0.7, 80.0).is_none());
    }

    #[test]
    fn local_vol_surface() {
        let p = GeneralizedBlackScholesProcess::with_local_vol(
            100.0,
            0.05,
            0.0,
            0.20,
            Arc::new(ConstantLocalVol::new(0.25)),
        )
        .unwrap();
        assert_abs_diff_eq!(p.local_vol(0.3, 110.0).unwrap(), 0.25, epsilon = 1e-15);
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(GeneralizedBlackScholesProcess::new(0.0, 0.05, 0.0, 0.2).is_err());
        assert!(GeneralizedBlackScholesProcess::new(100.0, 0.05, 0.0, -0.1).is_err());
    }

    struct Flag {
        hit: Cell<bool>,
    }

    impl Observer for Flag {
        fn update(&self) {
            self.hit.set(true);
        }
    }

    #[test]
    fn mutators_notify_observers() {
        let p = GeneralizedBlackScholesProcess::new(100.0, 0.05, 0.0, 0.20).unwrap();
        let flag = Arc::new(Flag {
            hit: Cell::new(false),
        });
        p.register_observer(Arc::downgrade(&flag) as Weak<dyn Observer>);
        p.set_black_vol(0.25);
        assert!(flag.hit.get());
        assert_abs_diff_eq!(p.black_vol(0.0, 0.0), 0.25, epsilon = 1e-15);
    }
}
