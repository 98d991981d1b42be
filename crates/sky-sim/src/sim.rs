//! The `FleetSim` struct and its event loop.

use tracing::{debug, info};

use sky_agent::{Agent, AgentContext};
use sky_command::ChargePoints;
use sky_core::{Address, AgentId, CoreError, EventQueue, FleetConfig, Mission, SimTime};
use sky_energy::Battery;
use sky_scheduler::{BatteryProbe, ChargingStation, FleetScheduler};

use crate::substrate::{QueueSubstrate, SimEvent};
use crate::{FleetStats, SimObserver, SimResult};

/// Station-side view of the agents' batteries.
struct AgentBatteries<'a>(&'a [Agent]);

impl BatteryProbe for AgentBatteries<'_> {
    fn battery(&self, agent: AgentId) -> Option<&Battery> {
        self.0.get(agent.index()).map(Agent::battery)
    }
}

/// The reference simulation: one queue, one scheduler, `N` agents and `M`
/// stations.
///
/// Each popped event is handled to completion before the next one; anything
/// a handler sends lands back in the same queue.  Agents are indexed by
/// `AgentId` and stations by `StationId`.
///
/// Create via [`FleetSimBuilder`][crate::FleetSimBuilder].
pub struct FleetSim {
    pub config: FleetConfig,

    pub(crate) now:           SimTime,
    pub(crate) queue:         EventQueue<SimEvent>,
    pub(crate) agents:        Vec<Agent>,
    pub(crate) stations:      Vec<ChargingStation>,
    pub(crate) points:        ChargePoints,
    pub(crate) scheduler:     FleetScheduler,
    pub(crate) next_snapshot: SimTime,
}

impl FleetSim {
    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.index())
    }

    pub fn stations(&self) -> &[ChargingStation] {
        &self.stations
    }

    pub fn scheduler(&self) -> &FleetScheduler {
        &self.scheduler
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    pub fn stats(&self) -> FleetStats {
        FleetStats::collect(self.now, &self.agents, &self.scheduler)
    }

    /// Submit `mission` to the scheduler at `at`.
    pub fn submit_mission(&mut self, at: SimTime, mission: Mission) {
        self.queue.push(at.max(self.now), SimEvent::MissionArrival(mission));
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run to `config.end_secs` and return the final statistics.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<FleetStats> {
        let end = self.config.end_time();
        self.run_until(end, observer)?;
        let stats = self.stats();
        info!(
            end = %self.now,
            missions = stats.scheduler.missions_assigned,
            replacements = stats.scheduler.replacements_completed,
            depletions = stats.depletion_failures,
            "simulation finished"
        );
        observer.on_sim_end(self.now, &stats);
        Ok(stats)
    }

    /// Handle every event due at or before `until`, then park the clock
    /// there.  Useful for tests and incremental stepping.
    pub fn run_until<O: SimObserver>(&mut self, until: SimTime, observer: &mut O) -> SimResult<()> {
        while let Some(at) = self.queue.next_time() {
            if at > until {
                break;
            }
            let Some((at, event)) = self.queue.pop() else { break };
            self.now = at;
            self.dispatch(event, observer)?;
        }
        self.now = self.now.max(until);
        Ok(())
    }

    // ── Event handling ────────────────────────────────────────────────────

    fn dispatch<O: SimObserver>(&mut self, event: SimEvent, observer: &mut O) -> SimResult<()> {
        let ctx = AgentContext::new(&self.points, &self.config);
        let mut sub = QueueSubstrate {
            now:     self.now,
            latency: self.config.message_latency_secs,
            queue:   &mut self.queue,
        };

        match event {
            SimEvent::Deliver { to, message } => match to {
                Address::Agent(id) => {
                    let agent = self.agents.get_mut(id.index()).ok_or(CoreError::AgentNotFound(id))?;
                    agent.handle_message(message, &ctx, &mut sub)?;
                }
                Address::Scheduler => self.scheduler.on_message(message, &mut sub)?,
                Address::Station(id) => {
                    let station = self.stations.get_mut(id.index()).ok_or(CoreError::StationNotFound(id))?;
                    station.handle_message(message, &AgentBatteries(&self.agents), &mut sub);
                }
            },

            SimEvent::UpdateAgents => {
                let step = self.config.update_interval_secs;
                for agent in &mut self.agents {
                    agent.update(step, &ctx, &mut sub)?;
                }
                sub.queue.push(self.now + step, SimEvent::UpdateAgents);

                let active = self.agents.iter().filter(|a| a.active_command().is_some()).count();
                observer.on_step_end(self.now, active);
                let interval = self.config.output_interval_secs;
                if interval > 0.0 && self.now >= self.next_snapshot {
                    observer.on_snapshot(self.now, &self.agents, self.scheduler.registry());
                    self.next_snapshot = self.now + interval;
                }
            }

            SimEvent::StationReport => {
                let probe = AgentBatteries(&self.agents);
                for station in &self.stations {
                    station.report(&probe, &mut sub);
                }
                sub.queue.push(self.now + self.config.status_report_interval_secs, SimEvent::StationReport);
            }

            SimEvent::MissionArrival(mission) => {
                debug!(mission = %mission.id, at = %self.now, "mission arrived");
                self.scheduler.submit_mission(mission, &mut sub)?;
            }
        }
        Ok(())
    }
}
