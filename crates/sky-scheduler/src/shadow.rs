//! The scheduler's view of one agent.

use sky_core::{AgentId, Coord, EventHandle, MissionId, ReplacementData};
use sky_energy::Battery;

use crate::NodeStatus;

/// Everything the scheduler knows about an agent.
///
/// The battery here is an independent copy refreshed wholesale from station
/// reports; it never aliases the agent's own battery.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeShadow {
    pub index:                     AgentId,
    pub status:                    NodeStatus,
    pub replacement_data:          Option<ReplacementData>,
    /// The single pending `ProvisionReplacement` timer for this agent.
    pub pending_replacement_event: Option<EventHandle>,
    pub last_known_battery:        Option<Battery>,
    pub position:                  Coord,
    pub mission:                   Option<MissionId>,
}

impl NodeShadow {
    /// A freshly registered IDLE agent.
    pub fn new(index: AgentId, position: Coord, battery: Option<Battery>) -> Self {
        Self {
            index,
            status: NodeStatus::Idle,
            replacement_data: None,
            pending_replacement_event: None,
            last_known_battery: battery,
            position,
            mission: None,
        }
    }

    /// Last reported remaining energy; 0 when nothing has been reported.
    pub fn known_remaining(&self) -> f64 {
        self.last_known_battery.as_ref().map_or(0.0, Battery::remaining)
    }

    /// The agent assigned to relieve this one, if any.
    pub fn replacing_node(&self) -> Option<AgentId> {
        self.replacement_data.as_ref().and_then(|d| d.replacing_node)
    }
}
