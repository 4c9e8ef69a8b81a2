//! Win32-style synchronization events on POSIX threading primitives.
//!
//! Two event flavors are provided. A *manual-reset* event stays signaled
//! until explicitly reset and releases every waiter; an *auto-reset* event
//! hands each signal to exactly one waiter and returns to the unsignaled
//! state on delivery. Waits take a millisecond timeout ([`INFINITE`] to
//! block forever, `0` to poll) and target either a single event or, through
//! [`wait_for_multiple_events`], a group of events with wait-any or
//! wait-all semantics.

#![deny(warnings, unsafe_code, unused_must_use, missing_docs)]

#[macro_use]
extern crate log;

mod error;
mod event;
mod wait;
mod waiter;

pub use self::error::*;
pub use self::event::{Event, INFINITE};
pub use self::wait::wait_for_multiple_events;
