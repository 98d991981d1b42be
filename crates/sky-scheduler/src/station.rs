//! `ChargingStation` — tracks docked agents and reports their batteries.
//!
//! A station never owns or mutates a battery.  It reads them through a
//! [`BatteryProbe`] the substrate supplies for the duration of one event,
//! and the actual charging is done by the docked agent's charge command.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use sky_core::{Address, AgentId, ChargingStatus, Coord, Message, StationId, Substrate};
use sky_energy::Battery;

/// Read-only access to agent batteries.
pub trait BatteryProbe {
    fn battery(&self, agent: AgentId) -> Option<&Battery>;
}

#[derive(Clone, Debug)]
pub struct ChargingStation {
    id:       StationId,
    position: Coord,
    docked:   BTreeSet<AgentId>,
}

impl ChargingStation {
    pub fn new(id: StationId, position: Coord) -> Self {
        Self { id, position, docked: BTreeSet::new() }
    }

    #[inline]
    pub fn id(&self) -> StationId {
        self.id
    }

    #[inline]
    pub fn position(&self) -> Coord {
        self.position
    }

    /// Docked agents in id order.
    pub fn docked(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.docked.iter().copied()
    }

    pub fn is_docked(&self, agent: AgentId) -> bool {
        self.docked.contains(&agent)
    }

    pub fn dock(&mut self, agent: AgentId) -> bool {
        self.docked.insert(agent)
    }

    pub fn undock(&mut self, agent: AgentId) -> bool {
        self.docked.remove(&agent)
    }

    /// The docked agent with the most energy, if it has at least
    /// `min_remaining` mAh.  Ties go to the lowest agent id.
    pub fn best_candidate<'p>(&self, probe: &'p dyn BatteryProbe, min_remaining: f64) -> Option<(AgentId, &'p Battery)> {
        self.docked
            .iter()
            .filter_map(|&a| probe.battery(a).map(|b| (a, b)))
            .filter(|(_, b)| b.remaining() >= min_remaining)
            .max_by(|(ia, a), (ib, b)| a.remaining().total_cmp(&b.remaining()).then(ib.cmp(ia)))
    }

    /// Batched battery report of every docked agent.  Nothing is sent when
    /// the station is empty.
    pub fn report(&self, probe: &dyn BatteryProbe, sub: &mut dyn Substrate) {
        let entries: Vec<ChargingStatus> = self
            .docked
            .iter()
            .filter_map(|&agent| {
                probe.battery(agent).map(|b| ChargingStatus {
                    agent,
                    remaining: b.remaining(),
                    capacity:  b.capacity(),
                })
            })
            .collect();
        if entries.is_empty() {
            return;
        }
        trace!(station = %self.id, docked = entries.len(), "status report");
        sub.send(
            Address::Scheduler,
            Message::ChargingStatusUpdate { station: self.id, position: self.position, entries },
        );
    }

    pub fn handle_message(&mut self, msg: Message, probe: &dyn BatteryProbe, sub: &mut dyn Substrate) {
        match msg {
            Message::Dock { agent } => {
                if self.dock(agent) {
                    debug!(station = %self.id, agent = %agent, "agent docked");
                }
            }
            Message::Undock { agent } => {
                if self.undock(agent) {
                    debug!(station = %self.id, agent = %agent, "agent undocked");
                }
            }
            Message::MobileNodeRequest { min_remaining } => {
                let response = match self.best_candidate(probe, min_remaining) {
                    Some((agent, b)) => Message::MobileNodeResponse {
                        station:   self.id,
                        found:     true,
                        agent,
                        capacity:  b.capacity(),
                        remaining: b.remaining(),
                    },
                    None => Message::MobileNodeResponse {
                        station:   self.id,
                        found:     false,
                        agent:     AgentId::INVALID,
                        capacity:  0.0,
                        remaining: 0.0,
                    },
                };
                sub.send(Address::Scheduler, response);
            }
            other => trace!(station = %self.id, message = other.name(), "ignored"),
        }
    }
}
