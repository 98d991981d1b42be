//! The event-queue-backed [`Substrate`] and the events it carries.

use sky_core::{Address, EventHandle, EventQueue, Message, Mission, SimTime, Substrate};

/// Everything that can sit in the sim's queue.
#[derive(Clone, Debug, PartialEq)]
pub enum SimEvent {
    /// A message (or a timer, which is a message to self) coming due.
    Deliver { to: Address, message: Message },
    /// Advance every agent by one physics step.
    UpdateAgents,
    /// Every station reports its docked agents.
    StationReport,
    /// A mission is submitted to the scheduler.
    MissionArrival(Mission),
}

/// A [`Substrate`] over the sim's queue for the duration of one event.
pub(crate) struct QueueSubstrate<'q> {
    pub now:     SimTime,
    pub latency: f64,
    pub queue:   &'q mut EventQueue<SimEvent>,
}

impl Substrate for QueueSubstrate<'_> {
    fn now(&self) -> SimTime {
        self.now
    }

    fn schedule(&mut self, at: SimTime, to: Address, message: Message) -> EventHandle {
        self.queue.push(at.max(self.now), SimEvent::Deliver { to, message })
    }

    fn cancel(&mut self, handle: EventHandle) -> bool {
        self.queue.cancel(handle).is_some()
    }

    fn send(&mut self, to: Address, message: Message) {
        self.queue.push(self.now + self.latency, SimEvent::Deliver { to, message });
    }
}
