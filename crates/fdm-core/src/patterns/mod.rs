//! Design patterns used across the workspace: the observer/observable
//! notification graph and the lazily-recalculated object built on top of it.

/// Lazy calculation with explicit invalidation.
pub mod lazy_object;

/// Observer / Observable notification.
pub mod observable;

pub use lazy_object::{LazyObject, LazyState};
pub use observable::{Observable, ObservableImpl, Observer};
