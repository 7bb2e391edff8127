//! LazyObject pattern.
//!
//! `LazyObject` is the caching half of the invalidation graph: it caches an
//! expensive computation and recalculates only when an input it observes has
//! changed.  The caching uses interior mutability (`Cell<bool>`) so that the
//! calculation can be triggered through an `&self` reference.
//!
//! The calculated flag is only raised *after* `perform_calculations`
//! succeeds: a failed recomputation leaves the flag down and whatever cache
//! state existed before the attempt untouched, so other already-cached
//! queries keep working.

use std::cell::Cell;

/// Trait for objects that lazily compute and cache their results.
///
/// Implementors provide [`perform_calculations`][Self::perform_calculations]
/// and expose their bookkeeping flag through
/// [`calculated`][Self::calculated]; the default methods handle the rest.
pub trait LazyObject {
    /// Perform the actual (expensive) calculation.
    ///
    /// Called automatically by [`calculate`][Self::calculate] when the cached
    /// result is stale.  Implementations must compute into fresh storage and
    /// only replace the cache once every fallible step has succeeded.
    fn perform_calculations(&self) -> crate::errors::Result<()>;

    /// The flag recording whether the cached result is valid.
    fn calculated(&self) -> &Cell<bool>;

    /// Ensure results are up-to-date.
    ///
    /// If the cache is stale, calls
    /// [`perform_calculations`][Self::perform_calculations] and marks the
    /// cache valid on success.
    fn calculate(&self) -> crate::errors::Result<()> {
        if !self.calculated().get() {
            self.perform_calculations()?;
            self.calculated().set(true);
        }
        Ok(())
    }

    /// Mark the cached result as stale without triggering a recalculation.
    fn update(&self) {
        self.calculated().set(false);
    }

    /// Return `true` if the cache is currently valid.
    fn is_calculated(&self) -> bool {
        self.calculated().get()
    }
}

/// Convenience struct holding the bookkeeping field required by
/// [`LazyObject`].
///
/// Embed this in your struct and delegate the accessor method to it.
///
/// # Example
/// ```
/// use std::cell::Cell;
/// use fdm_core::patterns::lazy_object::{LazyObject, LazyState};
///
/// struct MyLazy {
///     state: LazyState,
///     result: Cell<f64>,
/// }
///
/// impl LazyObject for MyLazy {
///     fn perform_calculations(&self) -> fdm_core::Result<()> {
///         self.result.set(42.0);
///         Ok(())
///     }
///     fn calculated(&self) -> &Cell<bool> { &self.state.calculated }
/// }
///
/// let obj = MyLazy { state: LazyState::new(), result: Cell::new(0.0) };
/// obj.calculate().unwrap();
/// assert_eq!(obj.result.get(), 42.0);
/// assert!(obj.is_calculated());
/// ```
pub struct LazyState {
    /// `true` when the cached result is valid.
    pub calculated: Cell<bool>,
}

impl LazyState {
    /// Create a new `LazyState` where the cache is initially stale.
    pub fn new() -> Self {
        Self {
            calculated: Cell::new(false),
        }
    }
}

impl Default for LazyState {
    fn default() -> Self {
        Self::new()
    }
}
