//! `FleetStats` — counters of one run, gathered from agents and scheduler.

use sky_agent::Agent;
use sky_core::SimTime;
use sky_scheduler::{FleetScheduler, NodeStatus, SchedulerStats};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FleetStats {
    pub time:                 SimTime,
    pub agents:               usize,
    pub agents_on_mission:    usize,
    pub commands_completed:   u64,
    pub depletion_failures:   u64,
    pub replacement_requests: u64,
    /// Missions waiting for an agent.
    pub backlog:              usize,
    /// Armed `ProvisionReplacement` timers.
    pub pending_replacements: usize,
    pub scheduler:            SchedulerStats,
}

impl FleetStats {
    pub fn collect(time: SimTime, agents: &[Agent], scheduler: &FleetScheduler) -> Self {
        let mut stats = Self {
            time,
            agents: agents.len(),
            agents_on_mission: scheduler.registry().count(NodeStatus::Mission),
            backlog: scheduler.backlog_len(),
            pending_replacements: scheduler
                .registry()
                .sorted()
                .iter()
                .filter(|s| s.pending_replacement_event.is_some())
                .count(),
            scheduler: scheduler.stats(),
            ..Self::default()
        };
        for a in agents {
            let s = a.stats();
            stats.commands_completed += s.commands_completed;
            stats.depletion_failures += s.depletion_failures;
            stats.replacement_requests += s.replacement_requests;
        }
        stats
    }
}
