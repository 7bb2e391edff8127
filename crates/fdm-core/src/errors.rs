//! Error types for fdm-rs.
//!
//! A single `thiserror`-derived enum covers the whole workspace.  The
//! variants follow the failure classes of a synchronous pricing query:
//! precondition violations on a single call, configuration errors that make
//! an object unusable, and numerical failures propagated unchanged from the
//! collaborating components.

use thiserror::Error;

/// The top-level error type used throughout fdm-rs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error.
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated by a single call (e.g. non-positive spot).
    ///
    /// Fatal to the call, not to the object it was made on.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Malformed construction input; the object must not be used afterwards.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A numerical method failed (singular system, illegal volatility, ...).
    #[error("numerical failure: {0}")]
    Numerical(String),

    /// A value was queried before the computation producing it has run.
    #[error("value not yet available: {0}")]
    NotAvailable(String),
}

/// Shorthand `Result` type used throughout fdm-rs.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Check a precondition, returning `Err(Error::Precondition(...))` when it
/// does not hold.
///
/// # Example
/// ```
/// use fdm_core::ensure;
/// fn positive(x: f64) -> fdm_core::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Return `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use fdm_core::fail;
/// fn always_err() -> fdm_core::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}
