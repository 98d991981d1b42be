//! Typed messages exchanged between fleet members.
//!
//! Messages are semantic payloads, not wire formats: the substrate moves them
//! between [`Address`]es in timestamp order and never inspects them.

use std::fmt;

use crate::{AgentId, Coord, Mission, MissionCursor, MissionId, SimTime, StationId};

/// Where a message is delivered.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Address {
    Agent(AgentId),
    Scheduler,
    Station(StationId),
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Agent(a)   => write!(f, "{a}"),
            Address::Scheduler  => f.write_str("scheduler"),
            Address::Station(s) => write!(f, "{s}"),
        }
    }
}

/// Where and when a depleting agent must be relieved, and by whom.
///
/// Produced by the agent's feasibility forecast; owned by the scheduler once
/// received.  `replacing_node` is filled in by the scheduler only.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReplacementData {
    pub node_to_replace:     AgentId,
    pub replacing_node:      Option<AgentId>,
    pub time_of_replacement: SimTime,
    pub position:            Coord,
}

impl ReplacementData {
    pub fn new(node_to_replace: AgentId, time_of_replacement: SimTime, position: Coord) -> Self {
        Self { node_to_replace, replacing_node: None, time_of_replacement, position }
    }
}

/// One docked agent's battery in a station report.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChargingStatus {
    pub agent:     AgentId,
    pub remaining: f64,
    pub capacity:  f64,
}

/// Every message in the system.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Message {
    // ── scheduler → agent ────────────────────────────────────────────────
    /// Run `mission` from its first command.
    StartMission { mission: Mission },

    /// Fly to `handoff` and take over `replaced`'s mission there.
    ReplaceAgent { replaced: AgentId, handoff: Coord },

    // ── agent → agent ────────────────────────────────────────────────────
    /// The replacing agent has arrived and asks for the mission.
    ExchangeRequest { initiator: AgentId },

    /// The replaced agent hands its mission over.  `mission` is `None` if it
    /// had nothing left to hand over.
    ExchangeData { from: AgentId, mission: Option<MissionCursor> },

    // ── agent → scheduler ────────────────────────────────────────────────
    /// A command finished; `replacement` carries the updated depletion
    /// forecast, if one could be made and it predicts depletion.
    CommandCompleted {
        source:      AgentId,
        position:    Coord,
        replacement: Option<ReplacementData>,
    },

    /// The hand-off from `replaced` to `replacing` is done.
    ExchangeCompleted { replaced: AgentId, replacing: AgentId },

    /// A non-repeating mission ran to completion.
    MissionCompleted { agent: AgentId, mission: MissionId },

    /// The agent's battery ran dry mid-flight.
    NodeDepleted { agent: AgentId, position: Coord },

    // ── agent → station ──────────────────────────────────────────────────
    Dock { agent: AgentId },
    Undock { agent: AgentId },

    // ── station → scheduler ──────────────────────────────────────────────
    /// Batched battery report for every docked agent.
    ChargingStatusUpdate {
        station:  StationId,
        position: Coord,
        entries:  Vec<ChargingStatus>,
    },

    /// Answer to [`Message::MobileNodeRequest`].
    MobileNodeResponse {
        station:   StationId,
        found:     bool,
        agent:     AgentId,
        capacity:  f64,
        remaining: f64,
    },

    // ── scheduler → station ──────────────────────────────────────────────
    /// Ask for the best docked agent with at least `min_remaining` mAh.
    MobileNodeRequest { min_remaining: f64 },

    // ── scheduler → scheduler (timer) ────────────────────────────────────
    /// Time for `replaced`'s replacement to depart.
    ProvisionReplacement { replaced: AgentId },
}

impl Message {
    /// Short label for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Message::StartMission { .. }         => "StartMission",
            Message::ReplaceAgent { .. }         => "ReplaceAgent",
            Message::ExchangeRequest { .. }      => "ExchangeRequest",
            Message::ExchangeData { .. }         => "ExchangeData",
            Message::CommandCompleted { .. }     => "CommandCompleted",
            Message::ExchangeCompleted { .. }    => "ExchangeCompleted",
            Message::MissionCompleted { .. }     => "MissionCompleted",
            Message::NodeDepleted { .. }         => "NodeDepleted",
            Message::Dock { .. }                 => "Dock",
            Message::Undock { .. }               => "Undock",
            Message::ChargingStatusUpdate { .. } => "ChargingStatusUpdate",
            Message::MobileNodeResponse { .. }   => "MobileNodeResponse",
            Message::MobileNodeRequest { .. }    => "MobileNodeRequest",
            Message::ProvisionReplacement { .. } => "ProvisionReplacement",
        }
    }
}
