//! Probability distributions.
//!
//! Only the standard normal functions are needed here; they back the
//! Black-Scholes-Merton closed-form used as a reference in the PDE tests.

pub mod normal;

pub use normal::{normal_cdf, normal_pdf};
