//! src/view/observer.rs
//! ============================================================================
//! # View Observers and the Observer Registry
//!
//! Panels implement [`ViewObserver`] to receive broadcasts. The registry only
//! holds weak references, so a panel that is dropped without unregistering is
//! skipped and pruned instead of being dispatched into.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::{Rc, Weak},
};

use tracing::{debug, trace};

use crate::{
    config::ViewType,
    view::{event::ViewEvent, search::SearchTask},
};

/// Contract implemented by every panel that mirrors model state.
///
/// Delivery is infallible: a panel absorbs its own failures.
pub trait ViewObserver {
    fn receive_event(&self, event: &ViewEvent);

    /// Name used in dispatch logs
    fn observer_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// The single collaborator that switches the content panel's display mode.
pub trait ViewSwitcher {
    fn change_view(&self, view_type: ViewType);
}

/// The single collaborator that renders completed search tasks.
pub trait SearchResultsSink {
    fn show_results(&self, task: SearchTask);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Observer({})", self.0)
    }
}

struct Registration {
    id: ObserverId,
    observer: Weak<dyn ViewObserver>,
}

/// Ordered, identity-unique set of observers.
///
/// Broadcasts iterate over a snapshot taken when the broadcast starts:
/// observers registered meanwhile only see later events, and observers
/// unregistered meanwhile are skipped if not yet reached.
#[derive(Default)]
pub struct ObserverRegistry {
    entries: RefCell<Vec<Registration>>,
    next_id: Cell<u64>,
}

impl ObserverRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `observer`; registering the same allocation again returns
    /// the id it already holds.
    pub fn register<O: ViewObserver + 'static>(&self, observer: &Rc<O>) -> ObserverId {
        let weak = Rc::downgrade(observer);
        let weak: Weak<dyn ViewObserver> = weak;
        self.register_weak(weak)
    }

    pub fn register_weak(&self, observer: Weak<dyn ViewObserver>) -> ObserverId {
        let mut entries = self.entries.borrow_mut();

        if let Some(existing) = entries
            .iter()
            .find(|entry| std::ptr::addr_eq(entry.observer.as_ptr(), observer.as_ptr()))
        {
            debug!(observer = %existing.id, "Observer already registered");
            return existing.id;
        }

        let id = ObserverId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        entries.push(Registration { id, observer });

        debug!(observer = %id, total = entries.len(), "Observer registered");
        id
    }

    /// Returns false if `id` was not registered.
    pub fn unregister(&self, id: ObserverId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|entry| entry.id != id);

        let removed = entries.len() != before;
        if removed {
            debug!(observer = %id, "Observer unregistered");
        }
        removed
    }

    #[must_use]
    pub fn contains(&self, id: ObserverId) -> bool {
        self.entries.borrow().iter().any(|entry| entry.id == id)
    }

    /// Number of registered observers that are still alive.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.observer.strong_count() > 0)
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `event` to every observer in registration order.
    ///
    /// Returns the number of observers that received it.
    pub fn broadcast(&self, event: &ViewEvent) -> usize {
        let snapshot: Vec<(ObserverId, Weak<dyn ViewObserver>)> = self
            .entries
            .borrow()
            .iter()
            .map(|entry| (entry.id, entry.observer.clone()))
            .collect();

        let mut delivered: usize = 0;
        let mut dead: bool = false;

        for (id, weak) in snapshot {
            if !self.contains(id) {
                continue;
            }

            let Some(observer) = weak.upgrade() else {
                dead = true;
                continue;
            };

            trace!(observer = %id, name = observer.observer_name(), %event, "Dispatching");
            observer.receive_event(event);
            delivered += 1;
        }

        if dead {
            self.prune();
        }

        debug!(kind = %event.kind(), delivered, "Broadcast complete");
        delivered
    }

    /// Drop registrations whose observer no longer exists.
    pub fn prune(&self) {
        self.entries
            .borrow_mut()
            .retain(|entry| entry.observer.strong_count() > 0);
    }
}
