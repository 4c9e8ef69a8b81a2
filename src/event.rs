use crate::error::*;
use crate::waiter::{WaitRecord, Waiter};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Timeout sentinel meaning "block until the wait is satisfied".
pub const INFINITE: u64 = u64::MAX;

/// A Win32-style event for threads.
///
/// ## SYNOPSIS
///
/// An event holds a boolean signaled state. [`Event::set`] signals it,
/// [`Event::reset`] clears it, and [`Event::wait`] blocks until it is
/// signaled or a timeout elapses. A manual-reset event releases every
/// waiter and stays signaled; an auto-reset event releases exactly one
/// waiter and is consumed by the delivery.
///
/// Events are shared by cloning the [`Arc`] returned from [`Event::new`]
/// and are destroyed when the last clone drops; the caller is responsible
/// for not dropping an event that still has waiters.
pub struct Event {
    auto_reset: bool,
    cvar: Condvar,
    inner: Mutex<EventInner>,
}

/// The mutable part of `Event`.
#[derive(Default)]
struct EventInner {
    state: bool,
    registered_waits: VecDeque<WaitRecord>,
}

impl Event {
    /// Create an event, optionally already signaled.
    pub fn new(manual_reset: bool, initial_state: bool) -> Arc<Self> {
        let event = Arc::new(Event {
            auto_reset: !manual_reset,
            cvar: Condvar::new(),
            inner: Mutex::default(),
        });
        if initial_state {
            event.set();
        }
        event
    }

    /// Signal the event.
    ///
    /// Auto-reset: the signal goes to the oldest subscribed multi-waiter
    /// still waiting, or stays latched and wakes a single direct waiter if
    /// no multi-waiter wants it. Manual-reset: every subscribed multi-waiter
    /// is notified, every direct waiter is woken, and the state stays
    /// signaled until [`Event::reset`].
    pub fn set(&self) {
        trace!("event.set: auto_reset={}", self.auto_reset);
        let mut inner = self.inner.lock();
        inner.state = true;
        if self.auto_reset {
            while let Some(record) = inner.registered_waits.pop_front() {
                let waiter = record.waiter;
                let mut wait = waiter.inner.lock();
                if !wait.still_waiting {
                    // Stale subscription: dropping it releases this event's
                    // reference to the aggregate.
                    continue;
                }
                // Consumed by this multi-waiter.
                inner.state = false;
                wait.record_fired(record.index);
                drop(wait);
                drop(inner);
                waiter.cvar.notify_one();
                return;
            }
            // No multi-waiter took the signal; leave it latched for a
            // direct waiter.
            drop(inner);
            self.cvar.notify_one();
        } else {
            for record in inner.registered_waits.drain(..) {
                let mut wait = record.waiter.inner.lock();
                if !wait.still_waiting {
                    continue;
                }
                wait.record_fired(record.index);
                drop(wait);
                record.waiter.cvar.notify_one();
            }
            drop(inner);
            self.cvar.notify_all();
        }
    }

    /// Return the event to the unsignaled state. No waiters are woken.
    pub fn reset(&self) {
        self.inner.lock().state = false;
    }

    /// Block until the event is signaled or `timeout_ms` elapses.
    ///
    /// A timeout of `0` polls without blocking; [`INFINITE`] blocks until
    /// the event is signaled. Success consumes the signal of an auto-reset
    /// event. An elapsed deadline returns [`EvError::TimedOut`] without
    /// consuming anything.
    pub fn wait(&self, timeout_ms: u64) -> EvResult {
        let mut inner = self.inner.lock();
        if inner.try_consume(self.auto_reset) {
            return Ok(());
        }
        if timeout_ms == 0 {
            return Err(EvError::TimedOut);
        }
        let deadline = deadline_after(timeout_ms);
        loop {
            match deadline {
                Some(deadline) => {
                    if self.cvar.wait_until(&mut inner, deadline).timed_out() {
                        return Err(EvError::TimedOut);
                    }
                }
                None => self.cvar.wait(&mut inner),
            }
            if inner.try_consume(self.auto_reset) {
                return Ok(());
            }
        }
    }

    /// Zero-timeout try under the event lock: consume the signal if it is
    /// present, otherwise subscribe `waiter` for a later [`Event::set`].
    /// Returns whether the event was consumed.
    pub(crate) fn poll_or_subscribe(&self, waiter: &Arc<Waiter>, index: usize) -> bool {
        let mut inner = self.inner.lock();
        if inner.try_consume(self.auto_reset) {
            true
        } else {
            inner.registered_waits.push_back(WaitRecord {
                waiter: waiter.clone(),
                index,
            });
            false
        }
    }
}

impl EventInner {
    /// The zero-timeout acquire shared by every wait path.
    fn try_consume(&mut self, auto_reset: bool) -> bool {
        if !self.state {
            return false;
        }
        if auto_reset {
            self.state = false;
        }
        true
    }
}

/// Absolute deadline for a relative millisecond timeout; `None` means the
/// wait is unbounded.
pub(crate) fn deadline_after(timeout_ms: u64) -> Option<Instant> {
    if timeout_ms == INFINITE {
        return None;
    }
    Instant::now().checked_add(Duration::from_millis(timeout_ms))
}
