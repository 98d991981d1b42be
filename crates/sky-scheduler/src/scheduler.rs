//! `FleetScheduler` — mission assignment and replacement orchestration.
//!
//! The scheduler is the only writer of `NodeStatus`.  It reacts to agent,
//! station and timer messages delivered through the substrate and never
//! touches an agent directly: everything it wants done is a message.
//!
//! # Replacement timing
//!
//! ```text
//!   departure = time_of_replacement − distance(replacing, hand-off) / provisioning_speed
//! ```
//!
//! A departure already in the past means the replacement cannot make it in
//! time; it leaves immediately and the provisioning is logged as degraded.
//! Every new forecast from the replaced agent cancels and re-arms its single
//! `ProvisionReplacement` timer.

use std::collections::VecDeque;

use tracing::{debug, info, trace, warn};

use sky_core::{
    Address, AgentId, ChargingStatus, Coord, CoreError, FleetConfig, Message, Mission, MissionId, ReplacementData,
    StationId, Substrate,
};
use sky_energy::Battery;

use crate::{NodeRegistry, NodeShadow, NodeStatus, SchedulerError, SchedulerResult, Transition};

/// Scheduler counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchedulerStats {
    pub missions_submitted:     u64,
    pub missions_assigned:      u64,
    pub missions_deferred:      u64,
    pub missions_completed:     u64,
    pub replacements_scheduled: u64,
    pub replacements_completed: u64,
    pub degraded_provisionings: u64,
    pub policy_violations:      u64,
    pub stale_reports:          u64,
    pub dead_agents:            u64,
}

pub struct FleetScheduler {
    registry: NodeRegistry,
    stations: Vec<StationId>,
    backlog:  VecDeque<Mission>,

    provisioning_speed:        f64,
    full_charge_percent:       f64,
    mission_min_remaining_mah: f64,

    stats: SchedulerStats,
}

impl FleetScheduler {
    pub fn new(config: &FleetConfig) -> Self {
        Self {
            registry: NodeRegistry::new(),
            stations: Vec::new(),
            backlog: VecDeque::new(),
            provisioning_speed: config.provisioning_speed,
            full_charge_percent: config.full_charge_percent,
            mission_min_remaining_mah: config.mission_min_remaining_mah,
            stats: SchedulerStats::default(),
        }
    }

    // ── Set-up ────────────────────────────────────────────────────────────

    /// Register an IDLE agent.
    pub fn register_agent(&mut self, id: AgentId, position: Coord, battery: Option<Battery>) -> SchedulerResult<()> {
        self.registry.register(NodeShadow::new(id, position, battery))
    }

    pub fn register_station(&mut self, id: StationId) {
        if !self.stations.contains(&id) {
            self.stations.push(id);
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    #[inline]
    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    // ── Status helper ─────────────────────────────────────────────────────

    /// `registry.set_status` plus bookkeeping of stale and rejected
    /// transitions.
    fn transition(&mut self, id: AgentId, next: NodeStatus) -> SchedulerResult<Transition> {
        let t = self.registry.set_status(id, next)?;
        match t {
            Transition::Stale    => self.stats.stale_reports += 1,
            Transition::Rejected => self.stats.policy_violations += 1,
            Transition::Changed | Transition::Unchanged => {}
        }
        Ok(t)
    }

    // ── Missions ──────────────────────────────────────────────────────────

    /// Assign `mission` to the IDLE agent nearest its first waypoint, or
    /// keep it in the backlog.  Returns the chosen agent.
    pub fn submit_mission(&mut self, mission: Mission, sub: &mut dyn Substrate) -> SchedulerResult<Option<AgentId>> {
        self.stats.missions_submitted += 1;
        let anchor = mission.anchor().unwrap_or(Coord::ORIGIN);
        match self.registry.closest(NodeStatus::Idle, anchor) {
            Some(agent) => {
                self.transition(agent, NodeStatus::Reserved)?;
                self.start_mission(agent, mission, sub)?;
                Ok(Some(agent))
            }
            None => {
                self.stats.missions_deferred += 1;
                info!(mission = %mission.id, backlog = self.backlog.len() + 1, "no idle agent, mission deferred");
                self.backlog.push_back(mission);
                self.request_mobile_node(sub);
                Ok(None)
            }
        }
    }

    /// RESERVED → PROVISIONING → MISSION and send the mission.
    fn start_mission(&mut self, agent: AgentId, mission: Mission, sub: &mut dyn Substrate) -> SchedulerResult<()> {
        self.transition(agent, NodeStatus::Provisioning)?;
        self.transition(agent, NodeStatus::Mission)?;
        self.registry.shadow_mut(agent)?.mission = Some(mission.id);
        self.stats.missions_assigned += 1;
        info!(agent = %agent, mission = %mission.id, "mission assigned");
        sub.send(Address::Agent(agent), Message::StartMission { mission });
        Ok(())
    }

    fn request_mobile_node(&self, sub: &mut dyn Substrate) {
        for &station in &self.stations {
            sub.send(
                Address::Station(station),
                Message::MobileNodeRequest { min_remaining: self.mission_min_remaining_mah },
            );
        }
    }

    /// Hand backlogged missions to IDLE agents while both exist.
    fn drain_backlog(&mut self, sub: &mut dyn Substrate) -> SchedulerResult<()> {
        while let Some(head) = self.backlog.front() {
            let anchor = head.anchor().unwrap_or(Coord::ORIGIN);
            let Some(agent) = self.registry.closest(NodeStatus::Idle, anchor) else { break };
            let Some(mission) = self.backlog.pop_front() else { break };
            self.transition(agent, NodeStatus::Reserved)?;
            self.start_mission(agent, mission, sub)?;
        }
        Ok(())
    }

    // ── Message dispatch ──────────────────────────────────────────────────

    pub fn on_message(&mut self, msg: Message, sub: &mut dyn Substrate) -> SchedulerResult<()> {
        match msg {
            Message::CommandCompleted { source, position, replacement } => {
                self.registry.shadow_mut(source)?.position = position;
                if let Some(data) = replacement {
                    self.handle_replacement(data, sub)?;
                }
                Ok(())
            }
            Message::ProvisionReplacement { replaced } => self.provision(replaced, sub),
            Message::ExchangeCompleted { replaced, replacing } => self.exchange_completed(replaced, replacing, sub),
            Message::ChargingStatusUpdate { station, position, entries } => {
                self.charging_status(station, position, &entries, sub)
            }
            Message::MissionCompleted { agent, mission } => self.mission_completed(agent, mission, sub),
            Message::NodeDepleted { agent, position } => {
                let shadow = self.registry.shadow_mut(agent)?;
                shadow.position = position;
                let lost = shadow.mission.is_some() && shadow.replacing_node().is_none();
                self.transition(agent, NodeStatus::Dead)?;
                self.stats.dead_agents += 1;
                if lost {
                    warn!(agent = %agent, "agent died on mission with no replacement arranged");
                } else {
                    warn!(agent = %agent, "agent died");
                }
                Ok(())
            }
            Message::MobileNodeResponse { station, found, agent, capacity, remaining } => {
                self.mobile_node_response(station, found, agent, capacity, remaining, sub)
            }
            other => {
                trace!(message = other.name(), "scheduler ignored message");
                Ok(())
            }
        }
    }

    // ── Replacement ───────────────────────────────────────────────────────

    /// A depletion forecast (or an energy-guard trip) from a MISSION agent.
    pub fn handle_replacement(&mut self, data: ReplacementData, sub: &mut dyn Substrate) -> SchedulerResult<()> {
        let replaced = data.node_to_replace;
        let shadow = self.registry.shadow_mut(replaced)?;
        if shadow.status != NodeStatus::Mission {
            trace!(agent = %replaced, status = %shadow.status, "replacement request from non-mission agent ignored");
            self.stats.stale_reports += 1;
            return Ok(());
        }

        let replacing = match shadow.replacing_node() {
            Some(r) if self.registry.status(r) == Some(NodeStatus::Provisioning) => {
                trace!(agent = %replaced, replacing = %r, "replacement already under way");
                return Ok(());
            }
            Some(r) => r,
            None => {
                let r = self
                    .registry
                    .closest(NodeStatus::Idle, data.position)
                    .or_else(|| self.registry.highest_charge(&[NodeStatus::Idle, NodeStatus::Charging]))
                    .ok_or(SchedulerError::NoAgentsAvailable(replaced))?;
                self.transition(r, NodeStatus::Reserved)?;
                self.stats.replacements_scheduled += 1;
                info!(agent = %replaced, replacing = %r, at = %data.position, "replacement chosen");
                r
            }
        };

        let now = sub.now();
        let from = self.registry.get(replacing).map_or(data.position, |s| s.position);
        let travel = from.distance(data.position) / self.provisioning_speed;
        let mut departure = data.time_of_replacement.offset(-travel);
        if departure < now {
            warn!(
                agent = %replaced,
                replacing = %replacing,
                late_by = now.since(departure),
                "replacement cannot arrive in time, departing now"
            );
            self.stats.degraded_provisionings += 1;
            departure = now;
        }

        let shadow = self.registry.shadow_mut(replaced)?;
        if let Some(old) = shadow.pending_replacement_event.take() {
            sub.cancel(old);
        }
        let handle = sub.schedule(departure, Address::Scheduler, Message::ProvisionReplacement { replaced });
        shadow.pending_replacement_event = Some(handle);
        shadow.replacement_data = Some(ReplacementData { replacing_node: Some(replacing), ..data });
        debug!(agent = %replaced, replacing = %replacing, departure = %departure, "replacement timer armed");
        Ok(())
    }

    /// The departure timer fired.
    fn provision(&mut self, replaced: AgentId, sub: &mut dyn Substrate) -> SchedulerResult<()> {
        let shadow = self.registry.shadow_mut(replaced)?;
        shadow.pending_replacement_event = None;
        let Some(data) = shadow.replacement_data.clone() else {
            trace!(agent = %replaced, "provision timer without replacement data");
            return Ok(());
        };
        let Some(replacing) = data.replacing_node else { return Ok(()) };

        if self.transition(replacing, NodeStatus::Provisioning)? != Transition::Changed {
            trace!(agent = %replaced, replacing = %replacing, "replacement no longer reserved");
            return Ok(());
        }
        info!(agent = %replaced, replacing = %replacing, handoff = %data.position, "replacement departing");
        sub.send(Address::Agent(replacing), Message::ReplaceAgent { replaced, handoff: data.position });
        Ok(())
    }

    fn exchange_completed(&mut self, replaced: AgentId, replacing: AgentId, sub: &mut dyn Substrate) -> SchedulerResult<()> {
        let shadow = self.registry.shadow_mut(replaced)?;
        let mission = shadow.mission.take();
        shadow.replacement_data = None;
        if let Some(h) = shadow.pending_replacement_event.take() {
            sub.cancel(h);
        }
        if shadow.status == NodeStatus::Mission {
            self.transition(replaced, NodeStatus::Maintenance)?;
        }

        match mission {
            Some(m) => {
                self.transition(replacing, NodeStatus::Mission)?;
                self.registry.shadow_mut(replacing)?.mission = Some(m);
                self.stats.replacements_completed += 1;
                info!(replaced = %replaced, replacing = %replacing, mission = %m, "hand-off completed");
            }
            None => {
                // The mission ended before the replacement arrived.
                self.transition(replacing, NodeStatus::Charging)?;
                debug!(replaced = %replaced, replacing = %replacing, "hand-off found nothing to take over");
            }
        }
        Ok(())
    }

    fn mission_completed(&mut self, agent: AgentId, mission: MissionId, sub: &mut dyn Substrate) -> SchedulerResult<()> {
        let shadow = self.registry.shadow_mut(agent)?;
        shadow.mission = None;
        if let Some(h) = shadow.pending_replacement_event.take() {
            sub.cancel(h);
        }
        let pending = shadow.replacing_node();
        self.transition(agent, NodeStatus::Maintenance)?;
        self.stats.missions_completed += 1;
        info!(agent = %agent, mission = %mission, "mission completed");

        // A replacement that has not left yet is no longer needed.  One that
        // is already flying gets an empty answer from the former mission
        // agent and is released by `exchange_completed`.
        if let Some(r) = pending {
            if self.registry.status(r) == Some(NodeStatus::Reserved) {
                self.registry.shadow_mut(agent)?.replacement_data = None;
                self.release(r, sub)?;
            }
        }
        Ok(())
    }

    /// Return an unneeded RESERVED agent to the pool via CHARGING.
    fn release(&mut self, agent: AgentId, sub: &mut dyn Substrate) -> SchedulerResult<()> {
        self.transition(agent, NodeStatus::Charging)?;
        let full = self
            .registry
            .get(agent)
            .and_then(|s| s.last_known_battery.as_ref())
            .is_some_and(|b| b.remaining_percentage() >= self.full_charge_percent);
        if full {
            self.transition(agent, NodeStatus::Idle)?;
            self.drain_backlog(sub)?;
        }
        debug!(agent = %agent, "reserved agent released");
        Ok(())
    }

    // ── Stations ──────────────────────────────────────────────────────────

    fn charging_status(
        &mut self,
        station: StationId,
        position: Coord,
        entries: &[ChargingStatus],
        sub: &mut dyn Substrate,
    ) -> SchedulerResult<()> {
        // A report naming an unknown agent is rejected as a whole.
        if let Some(entry) = entries.iter().find(|e| self.registry.get(e.agent).is_none()) {
            return Err(CoreError::AgentNotFound(entry.agent).into());
        }

        let mut freed = false;
        for entry in entries {
            let shadow = self.registry.shadow_mut(entry.agent)?;
            shadow.last_known_battery = Some(Battery::new(entry.capacity, entry.remaining));
            shadow.position = position;
            let percent = shadow.last_known_battery.as_ref().map_or(0.0, Battery::remaining_percentage);
            let status = shadow.status;

            match status {
                NodeStatus::Maintenance => {
                    self.transition(entry.agent, NodeStatus::Charging)?;
                }
                NodeStatus::Charging if percent >= self.full_charge_percent => {
                    self.transition(entry.agent, NodeStatus::Idle)?;
                    debug!(agent = %entry.agent, station = %station, percent, "charged, now idle");
                    freed = true;
                }
                NodeStatus::Charging => {}
                status => {
                    trace!(agent = %entry.agent, station = %station, status = %status, "stale charging report");
                    self.stats.stale_reports += 1;
                }
            }
        }
        if freed {
            self.drain_backlog(sub)?;
        }
        Ok(())
    }

    fn mobile_node_response(
        &mut self,
        station: StationId,
        found: bool,
        agent: AgentId,
        capacity: f64,
        remaining: f64,
        sub: &mut dyn Substrate,
    ) -> SchedulerResult<()> {
        if !found {
            trace!(station = %station, "station has no candidate");
            return Ok(());
        }
        self.registry.shadow_mut(agent)?.last_known_battery = Some(Battery::new(capacity, remaining));
        if self.backlog.is_empty() || self.registry.status(agent) != Some(NodeStatus::Charging) {
            trace!(station = %station, agent = %agent, "mobile node offer not needed");
            return Ok(());
        }
        let Some(mission) = self.backlog.pop_front() else { return Ok(()) };
        self.transition(agent, NodeStatus::Reserved)?;
        info!(station = %station, agent = %agent, remaining, "backlogged mission taken straight off the charger");
        self.start_mission(agent, mission, sub)
    }
}
