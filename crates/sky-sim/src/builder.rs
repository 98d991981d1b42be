//! Fluent builder for constructing a [`FleetSim`].

use std::sync::Arc;

use tracing::debug;

use sky_agent::Agent;
use sky_command::{ChargePoint, ChargePoints, FlightModel};
use sky_core::{AgentId, Coord, EventQueue, FleetConfig, Mission, SimTime, StationId};
use sky_energy::{Battery, ChargeModel, CurrentProfile};
use sky_scheduler::{ChargingStation, FleetScheduler};

use crate::substrate::SimEvent;
use crate::{FleetSim, SimError, SimResult};

/// Fluent builder for [`FleetSim`].
///
/// # Optional inputs (have defaults)
///
/// | Method                  | Default                    |
/// |-------------------------|----------------------------|
/// | `.charge_model(m)`      | `ChargeModel::default()`   |
/// | `.current_profile(p)`   | `CurrentProfile::default()`|
///
/// Agents and stations get consecutive ids in the order they are added.
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = FleetSimBuilder::new(config)
///     .station(Coord::ORIGIN)
///     .agent(Coord::ORIGIN, Battery::full(5_400.0))
///     .agent(Coord::ORIGIN, Battery::full(5_400.0))
///     .mission(SimTime::ZERO, mission)
///     .build()?;
/// let stats = sim.run(&mut NoopObserver)?;
/// ```
pub struct FleetSimBuilder {
    config:       FleetConfig,
    charge_model: ChargeModel,
    current:      CurrentProfile,
    stations:     Vec<Coord>,
    agents:       Vec<(Coord, Battery)>,
    missions:     Vec<(SimTime, Mission)>,
}

impl FleetSimBuilder {
    pub fn new(config: FleetConfig) -> Self {
        Self {
            config,
            charge_model: ChargeModel::default(),
            current:      CurrentProfile::default(),
            stations:     Vec::new(),
            agents:       Vec::new(),
            missions:     Vec::new(),
        }
    }

    /// Charge curve shared by every station.
    pub fn charge_model(mut self, model: ChargeModel) -> Self {
        self.charge_model = model;
        self
    }

    pub fn current_profile(mut self, profile: CurrentProfile) -> Self {
        self.current = profile;
        self
    }

    pub fn station(mut self, position: Coord) -> Self {
        self.stations.push(position);
        self
    }

    pub fn agent(mut self, position: Coord, battery: Battery) -> Self {
        self.agents.push((position, battery));
        self
    }

    /// Submit `mission` to the scheduler at `at`.
    pub fn mission(mut self, at: SimTime, mission: Mission) -> Self {
        self.missions.push((at, mission));
        self
    }

    /// Validate inputs, wire the scheduler, stations and agents together and
    /// seed the queue with the periodic events.
    pub fn build(self) -> SimResult<FleetSim> {
        self.config.validate()?;
        if self.agents.is_empty() {
            return Err(SimError::Config("a fleet needs at least one agent".into()));
        }
        if let Some((_, m)) = self.missions.iter().find(|(_, m)| m.is_empty()) {
            return Err(SimError::Config(format!("mission {} has no commands", m.id)));
        }

        // ── Stations ──────────────────────────────────────────────────────
        let algorithm = self.charge_model.build()?;
        let mut points = ChargePoints::default();
        let mut stations = Vec::with_capacity(self.stations.len());
        for (i, &pos) in self.stations.iter().enumerate() {
            let id = StationId(i as u32);
            points.insert(ChargePoint::new(id, pos, Arc::clone(&algorithm)));
            stations.push(ChargingStation::new(id, pos));
        }

        // ── Agents + scheduler ────────────────────────────────────────────
        let model = Arc::new(FlightModel::from_config(&self.config, self.current));
        let mut scheduler = FleetScheduler::new(&self.config);
        for station in &stations {
            scheduler.register_station(station.id());
        }
        let mut agents = Vec::with_capacity(self.agents.len());
        for (i, (pos, battery)) in self.agents.into_iter().enumerate() {
            let id = AgentId(i as u32);
            scheduler.register_agent(id, pos, Some(battery.clone()))?;
            agents.push(Agent::new(id, pos, battery, Arc::clone(&model)));
        }

        // ── Initial events ────────────────────────────────────────────────
        let start = self.config.start_time();
        let mut queue = EventQueue::new();
        queue.push(start, SimEvent::UpdateAgents);
        queue.push(start, SimEvent::StationReport);
        for (at, mission) in self.missions {
            queue.push(at.max(start), SimEvent::MissionArrival(mission));
        }
        debug!(agents = agents.len(), stations = stations.len(), events = queue.len(), "fleet sim built");

        Ok(FleetSim {
            config: self.config,
            now: start,
            queue,
            agents,
            stations,
            points,
            scheduler,
            next_snapshot: start,
        })
    }
}
