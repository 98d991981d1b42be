//! The contract between the scheduling core and the event substrate.
//!
//! The core never owns a clock or a queue.  Every handler receives a
//! `&mut dyn Substrate` through which it reads "now", sends messages and
//! arms or disarms timers.  `sky-sim` provides the reference implementation;
//! tests use [`RecordingSubstrate`].
//!
//! # Ordering guarantees required from implementations
//!
//! - Events are delivered in non-decreasing timestamp order.
//! - Events with equal timestamps are delivered in scheduling order (FIFO).
//! - A cancelled event is never delivered.

use crate::{Address, Message, SimTime};

/// Opaque reference to a scheduled event, used to cancel it.
///
/// Handles are unique for the lifetime of a substrate; cancelling a handle
/// whose event already fired is a harmless no-op.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventHandle {
    pub at:  SimTime,
    pub seq: u64,
}

pub trait Substrate {
    /// Current simulated time.
    fn now(&self) -> SimTime;

    /// Deliver `message` to `to` at `at` (clamped to `now` if in the past).
    fn schedule(&mut self, at: SimTime, to: Address, message: Message) -> EventHandle;

    /// Withdraw a scheduled event.  Returns `false` if it was not pending.
    fn cancel(&mut self, handle: EventHandle) -> bool;

    /// Deliver `message` to `to` after the substrate's message latency.
    fn send(&mut self, to: Address, message: Message);
}

// ── RecordingSubstrate ────────────────────────────────────────────────────────

/// A [`Substrate`] that records everything and delivers nothing.
///
/// Unit tests drive a handler, then assert on `sent`, `scheduled` and
/// `cancelled`.  `now` is a public field so tests can move time by hand.
#[cfg(any(test, feature = "testing"))]
#[derive(Debug, Default)]
pub struct RecordingSubstrate {
    pub now:       SimTime,
    pub sent:      Vec<(Address, Message)>,
    pub scheduled: Vec<(EventHandle, Address, Message)>,
    pub cancelled: Vec<EventHandle>,
    next_seq:      u64,
}

#[cfg(any(test, feature = "testing"))]
impl RecordingSubstrate {
    pub fn at(now: f64) -> Self {
        Self { now: SimTime(now), ..Self::default() }
    }

    /// Scheduled events that have not been cancelled.
    pub fn pending(&self) -> Vec<&(EventHandle, Address, Message)> {
        self.scheduled
            .iter()
            .filter(|(h, _, _)| !self.cancelled.contains(h))
            .collect()
    }

    /// Messages sent to `to`, in order.
    pub fn sent_to(&self, to: Address) -> Vec<&Message> {
        self.sent.iter().filter(|(a, _)| *a == to).map(|(_, m)| m).collect()
    }

    /// Forget everything recorded so far (time is kept).
    pub fn clear(&mut self) {
        self.sent.clear();
        self.scheduled.clear();
        self.cancelled.clear();
    }
}

#[cfg(any(test, feature = "testing"))]
impl Substrate for RecordingSubstrate {
    fn now(&self) -> SimTime {
        self.now
    }

    fn schedule(&mut self, at: SimTime, to: Address, message: Message) -> EventHandle {
        let handle = EventHandle { at: at.max(self.now), seq: self.next_seq };
        self.next_seq += 1;
        self.scheduled.push((handle, to, message));
        handle
    }

    fn cancel(&mut self, handle: EventHandle) -> bool {
        let known = self.scheduled.iter().any(|(h, _, _)| *h == handle);
        if known && !self.cancelled.contains(&handle) {
            self.cancelled.push(handle);
            true
        } else {
            false
        }
    }

    fn send(&mut self, to: Address, message: Message) {
        self.sent.push((to, message));
    }
}
