//! # fdm-math
//!
//! Mathematical utilities for the fdm-rs workspace: the 1-D interpolation
//! trait with its monotone cubic spline implementation, and the standard
//! normal distribution functions used by closed-form reference prices.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Probability distributions.
pub mod distributions;

/// 1-D interpolation.
pub mod interpolations;

pub use interpolations::{Interpolation1D, MonotoneCubicSpline};
