use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

/// Progress of one multi-event wait.
pub(crate) enum WaitStatus {
    /// Wait-all: events this waiter has not yet consumed.
    EventsLeft(usize),
    /// Wait-any: index of the first event delivered, if any.
    Fired(Option<usize>),
}

impl WaitStatus {
    /// The index to report to the caller. Only a wait-any waiter that has
    /// been fired carries one.
    pub(crate) fn fired_index(&self) -> Option<usize> {
        match self {
            WaitStatus::Fired(fired) => *fired,
            WaitStatus::EventsLeft(_) => None,
        }
    }
}

/// Shared coordination object for one multi-event wait.
///
/// The waiting thread holds one strong reference; every subscription
/// registered on an event holds another. Whoever drops the last reference,
/// the waiter itself or a signaler reaping a stale subscription, frees the
/// aggregate together with its mutex and condvar.
pub(crate) struct Waiter {
    pub(crate) cvar: Condvar,
    pub(crate) inner: Mutex<WaiterInner>,
}

/// The mutable part of `Waiter`.
pub(crate) struct WaiterInner {
    pub(crate) status: WaitStatus,
    /// True until the waiting thread has returned. Signalers that find it
    /// false leave `status` untouched and only drop their subscription.
    pub(crate) still_waiting: bool,
}

impl Waiter {
    pub(crate) fn new(wait_all: bool, count: usize) -> Arc<Self> {
        Arc::new(Waiter {
            cvar: Condvar::new(),
            inner: Mutex::new(WaiterInner {
                status: if wait_all {
                    WaitStatus::EventsLeft(count)
                } else {
                    WaitStatus::Fired(None)
                },
                still_waiting: true,
            }),
        })
    }
}

impl WaiterInner {
    /// Whether the wait condition is satisfied.
    pub(crate) fn done(&self) -> bool {
        match self.status {
            WaitStatus::EventsLeft(left) => left == 0,
            WaitStatus::Fired(fired) => fired.is_some(),
        }
    }

    /// Account one delivered event. A fired wait-any waiter is complete, so
    /// later signalers reach it only through the reap path; a wait-all
    /// waiter clears `still_waiting` itself once it observes zero left.
    pub(crate) fn record_fired(&mut self, index: usize) {
        match &mut self.status {
            WaitStatus::EventsLeft(left) => {
                debug_assert!(*left > 0);
                *left -= 1;
            }
            WaitStatus::Fired(fired) => {
                *fired = Some(index);
                self.still_waiting = false;
            }
        }
    }
}

/// An event's registration that a given waiter is interested in it.
pub(crate) struct WaitRecord {
    pub(crate) waiter: Arc<Waiter>,
    /// Position in the caller's event list, reported on wait-any success.
    pub(crate) index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_all_progress() {
        let waiter = Waiter::new(true, 2);
        let mut inner = waiter.inner.lock();
        assert!(!inner.done());
        inner.record_fired(0);
        assert!(!inner.done());
        inner.record_fired(1);
        assert!(inner.done());
        assert_eq!(inner.status.fired_index(), None);
        assert!(inner.still_waiting);
    }

    #[test]
    fn wait_any_records_first_index() {
        let waiter = Waiter::new(false, 2);
        let mut inner = waiter.inner.lock();
        assert!(!inner.done());
        inner.record_fired(1);
        assert!(inner.done());
        assert_eq!(inner.status.fired_index(), Some(1));
        assert!(!inner.still_waiting);
    }
}
