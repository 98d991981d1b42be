//! `NodeRegistry` — agent index → `NodeShadow`, plus the transition policy.
//!
//! # Determinism
//!
//! Shadows live in an `FxHashMap`, whose iteration order is arbitrary.  Every
//! query therefore breaks ties toward the lowest `AgentId`, so the answer
//! never depends on hash order.

use rustc_hash::FxHashMap;
use tracing::{trace, warn};

use sky_core::{AgentId, Coord, CoreError};

use crate::{NodeShadow, NodeStatus, SchedulerError, SchedulerResult, Transition};

#[derive(Default)]
pub struct NodeRegistry {
    nodes: FxHashMap<AgentId, NodeShadow>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, shadow: NodeShadow) -> SchedulerResult<()> {
        let id = shadow.index;
        if self.nodes.contains_key(&id) {
            return Err(SchedulerError::DuplicateAgent(id));
        }
        self.nodes.insert(id, shadow);
        Ok(())
    }

    pub fn get(&self, id: AgentId) -> Option<&NodeShadow> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut NodeShadow> {
        self.nodes.get_mut(&id)
    }

    /// Like [`get_mut`][Self::get_mut] but unknown agents are an error.
    pub fn shadow_mut(&mut self, id: AgentId) -> SchedulerResult<&mut NodeShadow> {
        self.nodes.get_mut(&id).ok_or(SchedulerError::Core(CoreError::AgentNotFound(id)))
    }

    pub fn status(&self, id: AgentId) -> Option<NodeStatus> {
        self.nodes.get(&id).map(|s| s.status)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All shadows ordered by agent id.
    pub fn sorted(&self) -> Vec<&NodeShadow> {
        let mut v: Vec<&NodeShadow> = self.nodes.values().collect();
        v.sort_by_key(|s| s.index);
        v
    }

    /// Number of agents currently in `status`.
    pub fn count(&self, status: NodeStatus) -> usize {
        self.nodes.values().filter(|s| s.status == status).count()
    }

    // ── Transition policy ─────────────────────────────────────────────────

    /// Move `id` to `next` if the lifecycle allows it.
    ///
    /// | Situation                         | Result      | Log   |
    /// |-----------------------------------|-------------|-------|
    /// | legal step                        | `Changed`   | trace |
    /// | already in `next`                 | `Unchanged` | —     |
    /// | illegal step to CHARGING          | `Stale`     | trace |
    /// | any other illegal step            | `Rejected`  | warn  |
    pub fn set_status(&mut self, id: AgentId, next: NodeStatus) -> SchedulerResult<Transition> {
        let shadow = self.shadow_mut(id)?;
        let current = shadow.status;
        if current == next {
            return Ok(Transition::Unchanged);
        }
        if current.can_transition_to(next) {
            shadow.status = next;
            trace!(agent = %id, from = %current, to = %next, "status changed");
            return Ok(Transition::Changed);
        }
        if next == NodeStatus::Charging {
            trace!(agent = %id, status = %current, "stale charging report ignored");
            return Ok(Transition::Stale);
        }
        warn!(agent = %id, from = %current, to = %next, "illegal status transition rejected");
        Ok(Transition::Rejected)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// The agent in `status` closest to `pos`.
    pub fn closest(&self, status: NodeStatus, pos: Coord) -> Option<AgentId> {
        self.nodes
            .values()
            .filter(|s| s.status == status)
            .min_by(|a, b| {
                a.position
                    .distance_sq(pos)
                    .total_cmp(&b.position.distance_sq(pos))
                    .then(a.index.cmp(&b.index))
            })
            .map(|s| s.index)
    }

    /// The lowest-indexed agent in `status`.
    pub fn first(&self, status: NodeStatus) -> Option<AgentId> {
        self.nodes
            .values()
            .filter(|s| s.status == status)
            .map(|s| s.index)
            .min()
    }

    /// The agent with the most known remaining energy among `statuses`.
    /// Agents with no reported battery count as empty.
    pub fn highest_charge(&self, statuses: &[NodeStatus]) -> Option<AgentId> {
        self.nodes
            .values()
            .filter(|s| statuses.contains(&s.status))
            .max_by(|a, b| {
                a.known_remaining()
                    .total_cmp(&b.known_remaining())
                    .then(b.index.cmp(&a.index))
            })
            .map(|s| s.index)
    }
}
