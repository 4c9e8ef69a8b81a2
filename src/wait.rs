use crate::error::*;
use crate::event::{deadline_after, Event};
use crate::waiter::Waiter;
use std::sync::Arc;

/// Wait until one of (wait-any) or all of (wait-all) `events` are signaled,
/// or until `timeout_ms` elapses.
///
/// ## SYNOPSIS
///
/// The events are scanned in order; already-signaled ones are acquired on
/// the spot, exactly as a zero-timeout [`Event::wait`] would (auto-reset
/// events are consumed by the scan). The waiter then subscribes to the
/// remaining events and blocks until the wait condition holds or the
/// deadline passes.
///
/// Wait-any success returns `Ok(Some(index))` with the position of the
/// event that satisfied the wait; wait-all success returns `Ok(None)`. An
/// elapsed deadline returns [`EvError::TimedOut`]; signals consumed before
/// the timeout stay consumed. An empty `events` slice is rejected with
/// [`EvError::InvalidArgs`].
pub fn wait_for_multiple_events(
    events: &[Arc<Event>],
    wait_all: bool,
    timeout_ms: u64,
) -> EvResult<Option<usize>> {
    if events.is_empty() {
        warn!("wait_many: empty event list");
        return Err(EvError::InvalidArgs);
    }
    trace!(
        "wait_many: count={}, wait_all={}, timeout_ms={}",
        events.len(),
        wait_all,
        timeout_ms
    );

    let waiter = Waiter::new(wait_all, events.len());
    // The guard is held across the scan so that status updates stay atomic
    // with respect to signalers reached through already-subscribed events.
    let mut inner = waiter.inner.lock();

    for (index, event) in events.iter().enumerate() {
        if event.poll_or_subscribe(&waiter, index) {
            inner.record_fired(index);
            if !wait_all {
                break;
            }
        }
    }

    let mut result = Ok(());
    if !inner.done() {
        if timeout_ms == 0 {
            result = Err(EvError::TimedOut);
        } else {
            let deadline = deadline_after(timeout_ms);
            while !inner.done() {
                match deadline {
                    Some(deadline) => {
                        if waiter.cvar.wait_until(&mut inner, deadline).timed_out() {
                            result = Err(EvError::TimedOut);
                            break;
                        }
                    }
                    None => waiter.cvar.wait(&mut inner),
                }
            }
        }
    }

    let fired = inner.status.fired_index();
    // Status is final from here on; late signalers only drop their
    // subscriptions, which will release the remaining references.
    inner.still_waiting = false;
    drop(inner);
    result.map(|()| fired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::INFINITE;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn empty_list_is_invalid() {
        assert_eq!(
            wait_for_multiple_events(&[], false, 0),
            Err(EvError::InvalidArgs)
        );
    }

    #[test]
    fn wait_any_takes_first_signaled() {
        let events = [Event::new(false, true), Event::new(false, true)];
        assert_eq!(wait_for_multiple_events(&events, false, 0), Ok(Some(0)));
        // The scan stopped at index 0; index 1 keeps its signal.
        assert_eq!(events[1].wait(0), Ok(()));
        assert_eq!(events[0].wait(0), Err(EvError::TimedOut));
    }

    #[test]
    fn wait_any_blocks_until_set() {
        let events = [Event::new(false, false), Event::new(false, false)];
        let setter = thread::spawn({
            let event = events[1].clone();
            move || {
                thread::sleep(Duration::from_millis(10));
                event.set();
            }
        });
        assert_eq!(
            wait_for_multiple_events(&events, false, INFINITE),
            Ok(Some(1))
        );
        // The delivered signal was consumed on the way out.
        assert_eq!(events[0].wait(0), Err(EvError::TimedOut));
        assert_eq!(events[1].wait(0), Err(EvError::TimedOut));
        setter.join().unwrap();
    }

    #[test]
    fn wait_all_mixed_types() {
        let events = [
            Event::new(false, true),
            Event::new(true, true),
            Event::new(false, false),
        ];
        let setter = thread::spawn({
            let event = events[2].clone();
            move || {
                thread::sleep(Duration::from_millis(10));
                event.set();
            }
        });
        assert_eq!(wait_for_multiple_events(&events, true, INFINITE), Ok(None));
        assert_eq!(events[0].wait(0), Err(EvError::TimedOut));
        assert_eq!(events[1].wait(0), Ok(()));
        assert_eq!(events[2].wait(0), Err(EvError::TimedOut));
        setter.join().unwrap();
    }

    #[test]
    fn wait_all_already_satisfied_polls_out() {
        let events = [Event::new(false, true), Event::new(true, true)];
        assert_eq!(wait_for_multiple_events(&events, true, 0), Ok(None));
    }

    #[test]
    fn zero_timeout_polls() {
        let event = Event::new(false, false);
        assert_eq!(
            wait_for_multiple_events(&[event], false, 0),
            Err(EvError::TimedOut)
        );
    }

    #[test]
    fn timeout_leaves_later_signals_alone() {
        let event = Event::new(false, false);
        let start = Instant::now();
        assert_eq!(
            wait_for_multiple_events(&[event.clone()], true, 50),
            Err(EvError::TimedOut)
        );
        assert!(start.elapsed() >= Duration::from_millis(50));
        // This set reaps the stale subscription; the signal stays latched
        // for the direct wait below.
        event.set();
        assert_eq!(event.wait(0), Ok(()));
    }

    #[test]
    fn aggregate_preferred_over_direct_waiter() {
        let event = Event::new(false, false);
        let direct = thread::spawn({
            let event = event.clone();
            move || event.wait(200)
        });
        thread::sleep(Duration::from_millis(20));
        let multi = thread::spawn({
            let event = event.clone();
            move || wait_for_multiple_events(&[event], false, 200)
        });
        thread::sleep(Duration::from_millis(20));
        event.set();
        assert_eq!(multi.join().unwrap(), Ok(Some(0)));
        assert_eq!(direct.join().unwrap(), Err(EvError::TimedOut));
    }

    #[test]
    fn concurrent_wait_any_single_delivery() {
        let event = Event::new(false, false);
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let event = event.clone();
                thread::spawn(move || wait_for_multiple_events(&[event], false, 200))
            })
            .collect();
        thread::sleep(Duration::from_millis(20));
        event.set();
        let successes = waiters
            .into_iter()
            .map(|waiter| waiter.join().unwrap())
            .filter(|result| matches!(result, Ok(Some(0))))
            .count();
        assert_eq!(successes, 1);
    }
}
