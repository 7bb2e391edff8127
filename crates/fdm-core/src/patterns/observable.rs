//! Observer / Observable pattern.
//!
//! The notification mechanism behind push-based cache invalidation:
//! * An **Observable** object (a market-data snapshot, a process) notifies
//!   registered **Observer**s whenever it changes state.
//! * Observers react by calling `update()` — typically marking a cached
//!   result stale without recomputing it.
//!
//! Registration and notification work through `&self` references so that
//! observables can be shared via `Arc`; the observer list lives behind a
//! `RefCell`.  The evaluation model is single-threaded and synchronous, so
//! `Observer` carries no `Send`/`Sync` bounds and observers are free to use
//! `Cell`/`RefCell` state internally.

use std::cell::RefCell;
use std::sync::{Arc, Weak};

/// An object that can notify interested parties when it changes.
///
/// Implementors hold a list of `Weak` references to registered [`Observer`]s
/// and call `notify_observers()` whenever their state changes.
pub trait Observable {
    /// Register an observer to receive future change notifications.
    fn register_observer(&self, observer: Weak<dyn Observer>);

    /// Remove a previously registered observer.
    fn unregister_observer(&self, observer: &Weak<dyn Observer>);

    /// Notify all currently registered observers that this object has changed.
    fn notify_observers(&self);
}

/// An object that reacts to changes in [`Observable`]s it has subscribed to.
pub trait Observer {
    /// Called by every observable this observer is registered with when that
    /// observable changes state.
    fn update(&self);
}

/// A helper struct that can be embedded in any type to provide the standard
/// observer-list management.
///
/// Uses interior mutability via `RefCell` so that `register`, `unregister`,
/// and `notify` all work through `&self` references.
pub struct ObservableImpl {
    observers: RefCell<Vec<Weak<dyn Observer>>>,
}

impl Default for ObservableImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl ObservableImpl {
    /// Create a new, empty observable implementation.
    pub fn new() -> Self {
        Self {
            observers: RefCell::new(Vec::new()),
        }
    }

    /// Register an observer.
    pub fn register(&self, observer: Weak<dyn Observer>) {
        self.observers.borrow_mut().push(observer);
    }

    /// Remove an observer (by pointer equality of the `Weak`).
    pub fn unregister(&self, observer: &Weak<dyn Observer>) {
        self.observers
            .borrow_mut()
            .retain(|o| !Weak::ptr_eq(o, observer));
    }

    /// Notify all live observers, removing dead `Weak` references as we go.
    pub fn notify(&self) {
        // Collect live observers first, then call update outside the borrow
        let observers: Vec<Arc<dyn Observer>> = self
            .observers
            .borrow()
            .iter()
            .filter_map(|w| w.upgrade())
            .collect();
        self.observers
            .borrow_mut()
            .retain(|w| w.upgrade().is_some());
        for obs in observers {
            obs.update();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingObserver {
        count: Cell<u32>,
    }

    impl Observer for CountingObserver {
        fn update(&self) {
            self.count.set(self.count.get() + 1);
        }
    }

    #[test]
    fn register_and_notify() {
        let obs = Arc::new(CountingObserver {
            count: Cell::new(0),
        });
        let observable = ObservableImpl::new();
        observable.register(Arc::downgrade(&obs) as Weak<dyn Observer>);
        observable.notify();
        assert_eq!(obs.count.get(), 1);
        observable.notify();
        assert_eq!(obs.count.get(), 2);
    }

    #[test]
    fn dead_observer_pruned() {
        let observable = ObservableImpl::new();
        {
            let obs = Arc::new(CountingObserver {
                count: Cell::new(0),
            });
            observable.register(Arc::downgrade(&obs) as Weak<dyn Observer>);
        }
        // obs dropped — notify should prune it
        observable.notify();
        assert_eq!(observable.observers.borrow().len(), 0);
    }

    #[test]
    fn unregister() {
        let obs = Arc::new(CountingObserver {
            count: Cell::new(0),
        });
        let weak = Arc::downgrade(&obs) as Weak<dyn Observer>;
        let observable = ObservableImpl::new();
        observable.register(weak.clone());
        observable.unregister(&weak);
        observable.notify();
        assert_eq!(obs.count.get(), 0);
    }
}
