//! # fdm-processes
//!
//! Stochastic process descriptions consumed by the PDE operators: the
//! generalized Black-Scholes process (flat rates, constant Black volatility
//! or a pluggable local-volatility surface) with observable, push-based
//! invalidation of dependent pricers.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// The generalized Black-Scholes process.
pub mod black_scholes_process;

/// Local volatility surfaces.
pub mod local_vol;

pub use black_scholes_process::GeneralizedBlackScholesProcess;
pub use local_vol::LocalVolSurface;
