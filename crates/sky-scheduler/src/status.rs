//! Node lifecycle states and the legal transitions between them.
//!
//! ```text
//!            ┌──────────────────────────── CHARGING ◄──────────────┐
//!            ▼                              ▲  ▲  ▲                 │
//!          IDLE ──► RESERVED ──► PROVISIONING ──► MISSION ──► MAINTENANCE
//!            │         │              │             │
//!            └─────────┴──────────────┴─────────────┴──► CHARGING
//!
//!   any ──► DEAD (terminal)          CHARGING ──► RESERVED
//! ```

use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeStatus {
    Idle,
    Reserved,
    Provisioning,
    Mission,
    Maintenance,
    Charging,
    Dead,
}

impl NodeStatus {
    pub const ALL: [NodeStatus; 7] = [
        NodeStatus::Idle,
        NodeStatus::Reserved,
        NodeStatus::Provisioning,
        NodeStatus::Mission,
        NodeStatus::Maintenance,
        NodeStatus::Charging,
        NodeStatus::Dead,
    ];

    /// `true` if `self → next` is a legal lifecycle step.  Re-applying the
    /// current status is not a step and returns `false`.
    pub fn can_transition_to(self, next: NodeStatus) -> bool {
        use NodeStatus::*;
        match (self, next) {
            (Dead, _) => false,
            (_, Dead) => true,
            (Idle, Reserved | Charging)
            | (Reserved, Provisioning | Charging)
            | (Provisioning, Mission | Charging)
            | (Mission, Maintenance | Charging)
            | (Maintenance, Charging)
            | (Charging, Idle | Reserved) => true,
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeStatus::Idle         => "IDLE",
            NodeStatus::Reserved     => "RESERVED",
            NodeStatus::Provisioning => "PROVISIONING",
            NodeStatus::Mission      => "MISSION",
            NodeStatus::Maintenance  => "MAINTENANCE",
            NodeStatus::Charging     => "CHARGING",
            NodeStatus::Dead         => "DEAD",
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`NodeRegistry::set_status`][crate::NodeRegistry::set_status].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Legal step; the status changed.
    Changed,
    /// The node already had this status.
    Unchanged,
    /// An out-of-date report tried to move the node to CHARGING; ignored.
    Stale,
    /// Illegal step; status left as it was.
    Rejected,
}
