//! `EventQueue` — timestamp-ordered, cancellable event queue.
//!
//! # Ordering
//!
//! Events are keyed by `(SimTime, seq)` in a `BTreeMap`, where `seq` is a
//! monotonically increasing counter.  Iterating the map therefore yields
//! events in non-decreasing time order and, for equal times, in the order
//! they were scheduled.  The scheduler relies on this FIFO tie-break when it
//! cancels and re-arms a hand-off timer.
//!
//! # Cancellation
//!
//! The key *is* the [`EventHandle`], so cancelling is a plain `remove`
//! in O(log n).  A cancelled event can never fire.

use std::collections::BTreeMap;

use crate::{EventHandle, SimTime};

pub struct EventQueue<E> {
    inner:    BTreeMap<EventHandle, E>,
    next_seq: u64,
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self { inner: BTreeMap::new(), next_seq: 0 }
    }
}

impl<E> EventQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` at `at` and return its handle.
    pub fn push(&mut self, at: SimTime, event: E) -> EventHandle {
        let handle = EventHandle { at, seq: self.next_seq };
        self.next_seq += 1;
        self.inner.insert(handle, event);
        handle
    }

    /// Remove a pending event.  Returns it if it had not fired yet.
    pub fn cancel(&mut self, handle: EventHandle) -> Option<E> {
        self.inner.remove(&handle)
    }

    /// Remove and return the earliest event.
    pub fn pop(&mut self) -> Option<(SimTime, E)> {
        self.inner.pop_first().map(|(h, e)| (h.at, e))
    }

    /// Timestamp of the earliest pending event.
    pub fn next_time(&self) -> Option<SimTime> {
        self.inner.keys().next().map(|h| h.at)
    }

    pub fn contains(&self, handle: EventHandle) -> bool {
        self.inner.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
