//! Option payoffs.

use fdm_core::Real;

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    /// Right to buy at the strike.
    Call,
    /// Right to sell at the strike.
    Put,
}

impl OptionType {
    /// +1 for a call, −1 for a put.
    pub fn sign(&self) -> Real {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }
}

/// A payoff as a function of the underlying price.
pub trait Payoff: std::fmt::Debug {
    /// Payoff value for underlying level `s`.
    fn value(&self, s: Real) -> Real;
}

/// Plain vanilla payoff: `max(φ·(S − K), 0)`.
#[derive(Debug, Clone, Copy)]
pub struct PlainVanillaPayoff {
    option_type: OptionType,
    strike: Real,
}

impl PlainVanillaPayoff {
    /// Create a vanilla payoff.
    pub fn new(option_type: OptionType, strike: Real) -> Self {
        Self {
            option_type,
            strike,
        }
    }

    /// The option type.
    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    /// The strike.
    pub fn strike(&self) -> Real {
        self.strike
    }
}

impl Payoff for PlainVanillaPayoff {
    fn value(&self, s: Real) -> Real {
        (self.option_type.sign() * (s - self.strike)).max(0.0)
    }
}
