//! `Agent` — the per-UAV energy manager.
//!
//! # Command sources
//!
//! An agent draws work from two places, in this order:
//!
//! 1. `queue`: injected, non-mission engines (charge trips, hand-off
//!    flights, exchange waits), FIFO.
//! 2. `mission`: the mission cursor; each command is turned into an engine
//!    when it is dequeued.
//!
//! Exactly one engine is active at a time.
//!
//! # Energy guard
//!
//! Before a mission command starts, the agent checks that the battery covers
//! the command *and* the flight from its end point to the nearest charge
//! point.  When it does not, the command is pushed back and the agent hovers
//! in an exchange wait until relief arrives.  If no replacement has been
//! requested yet in this episode, it also asks the scheduler for one right
//! here, right now.
//!
//! After every completed mission command the agent re-runs
//! [`end_of_operation`][Agent::end_of_operation] over everything it still has
//! to do and reports the result, so the scheduler can time a hand-off before
//! the guard ever trips.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use sky_command::{CommandExecEngine, FlightModel, Prediction};
use sky_core::{
    Address, AgentId, Command, CommandId, Coord, Message, MissionCursor, MissionId, ReplacementData,
    SimTime, StationId, Substrate,
};
use sky_energy::Battery;

use crate::{AgentContext, AgentError, AgentResult, Forecast};

/// Laps of a repeating mission walked before a forecast gives up and calls
/// the battery sufficient.
pub const MAX_FORECAST_LAPS: usize = 100;

/// Per-agent counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AgentStats {
    pub commands_completed:   u64,
    pub depletion_failures:   u64,
    pub replacement_requests: u64,
}

pub struct Agent {
    id:       AgentId,
    position: Coord,
    battery:  Battery,
    model:    Arc<FlightModel>,

    active:  Option<CommandExecEngine>,
    queue:   VecDeque<CommandExecEngine>,
    mission: Option<MissionCursor>,

    /// A replacement has been requested in the current depletion episode.
    replacement_requested: bool,
    /// `NodeDepleted` has been sent for the current empty-battery episode.
    depletion_reported:    bool,

    next_command: u32,
    stats:        AgentStats,
}

impl Agent {
    pub fn new(id: AgentId, position: Coord, battery: Battery, model: Arc<FlightModel>) -> Self {
        Self {
            id,
            position,
            battery,
            model,
            active: None,
            queue: VecDeque::new(),
            mission: None,
            replacement_requested: false,
            depletion_reported: false,
            next_command: 0,
            stats: AgentStats::default(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> AgentId {
        self.id
    }

    #[inline]
    pub fn position(&self) -> Coord {
        self.position
    }

    #[inline]
    pub fn battery(&self) -> &Battery {
        &self.battery
    }

    #[inline]
    pub fn stats(&self) -> AgentStats {
        self.stats
    }

    pub fn mission(&self) -> Option<&MissionCursor> {
        self.mission.as_ref()
    }

    pub fn mission_id(&self) -> Option<MissionId> {
        self.mission.as_ref().map(|c| c.mission.id)
    }

    pub fn active_command(&self) -> Option<&CommandExecEngine> {
        self.active.as_ref()
    }

    /// Injected engines waiting to run.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Station the agent is currently docked at.
    pub fn docked_station(&self) -> Option<StationId> {
        self.active.as_ref().and_then(CommandExecEngine::docked_station)
    }

    /// Nothing active, nothing queued, no mission.
    pub fn is_idle(&self) -> bool {
        self.active.is_none() && self.queue.is_empty() && self.mission.is_none()
    }

    pub fn replacement_requested(&self) -> bool {
        self.replacement_requested
    }

    // ── Command plumbing ──────────────────────────────────────────────────

    fn engine(&mut self, command: Command, part_of_mission: bool) -> CommandExecEngine {
        let id = CommandId(self.next_command);
        self.next_command = self.next_command.wrapping_add(1);
        CommandExecEngine::new(id, command, part_of_mission, Arc::clone(&self.model))
    }

    /// Queue a non-mission command behind whatever is already injected.
    pub fn inject(&mut self, command: Command) {
        let engine = self.engine(command, false);
        self.queue.push_back(engine);
    }

    /// Queue a charge trip to the station nearest to the agent.
    fn head_to_charge(&mut self, ctx: &AgentContext<'_>) {
        match ctx.points.nearest(self.position) {
            Some(point) => {
                let station = point.id;
                debug!(agent = %self.id, station = %station, "heading to charge");
                self.inject(Command::Charge { station });
            }
            None => warn!(agent = %self.id, "no charge point to return to"),
        }
    }

    /// Drop the active engine.  A docked engine undocks; an in-flight mission
    /// command goes back onto the cursor.
    fn abandon_active(&mut self, sub: &mut dyn Substrate) {
        let Some(engine) = self.active.take() else { return };
        if let Some(station) = engine.docked_station() {
            sub.send(Address::Station(station), Message::Undock { agent: self.id });
        }
        if engine.is_mission() {
            if let Some(cursor) = self.mission.as_mut() {
                cursor.rewind();
            }
        }
        trace!(agent = %self.id, command = ?engine.id(), "command abandoned");
    }

    fn report_depletion(&mut self, sub: &mut dyn Substrate) {
        if self.depletion_reported {
            return;
        }
        self.depletion_reported = true;
        self.stats.depletion_failures += 1;
        warn!(agent = %self.id, position = %self.position, "battery depleted");
        sub.send(Address::Scheduler, Message::NodeDepleted { agent: self.id, position: self.position });
    }

    // ── Selection ─────────────────────────────────────────────────────────

    /// Pop, bind and start the next command, applying the energy guard to
    /// mission commands.
    pub fn select_next_command(&mut self, ctx: &AgentContext<'_>, sub: &mut dyn Substrate) -> AgentResult<()> {
        let now = sub.now();
        let mut engine = if let Some(engine) = self.queue.pop_front() {
            engine
        } else if let Some(command) = self.mission.as_mut().and_then(MissionCursor::advance) {
            self.engine(command, true)
        } else {
            return Ok(());
        };

        engine.bind(self.position, ctx.points)?;
        engine.initialize(now)?;

        if self.battery.is_empty() {
            self.report_depletion(sub);
        } else if engine.is_mission() && !self.battery.is_infinite() {
            let pct = ctx.percentile();
            let next = engine.predict_full_consumption(pct)?;
            let back = self.model.return_trip(next.end, ctx.points, pct);
            let needed = next.consumption_mah + back.consumption_mah;

            if self.battery.remaining() < needed {
                debug!(agent = %self.id, remaining = self.battery.remaining(), needed, "insufficient energy");
                self.wait_for_relief(engine, ctx, sub)?;
                return Ok(());
            }
        }

        if let Command::Exchange { peer: Some(peer), initiator: true, .. } = *engine.command() {
            info!(agent = %self.id, peer = %peer, "at hand-off point, requesting exchange");
            sub.send(Address::Agent(peer), Message::ExchangeRequest { initiator: self.id });
        }

        self.active = Some(engine);
        Ok(())
    }

    /// The energy guard tripped: push `engine` back and hover in an exchange
    /// wait.  The wait only ends with a hand-off, so it is entered once per
    /// episode.  Relief is requested here unless a forecast already did.
    fn wait_for_relief(
        &mut self,
        engine: CommandExecEngine,
        ctx: &AgentContext<'_>,
        sub: &mut dyn Substrate,
    ) -> AgentResult<()> {
        let now = sub.now();
        if let Some(cursor) = self.mission.as_mut() {
            cursor.rewind();
        }
        drop(engine);

        let mut wait = self.engine(Command::Exchange { peer: None, initiator: false, mission: false }, false);
        wait.bind(self.position, ctx.points)?;
        wait.initialize(now)?;
        self.active = Some(wait);

        if self.replacement_requested {
            info!(agent = %self.id, position = %self.position, "at last feasible point, waiting for replacement");
            return Ok(());
        }
        self.replacement_requested = true;
        self.stats.replacement_requests += 1;
        warn!(agent = %self.id, position = %self.position, "energy guard tripped, waiting for replacement");
        sub.send(
            Address::Scheduler,
            Message::CommandCompleted {
                source:      self.id,
                position:    self.position,
                replacement: Some(ReplacementData::new(self.id, now, self.position)),
            },
        );
        Ok(())
    }

    // ── Forecast ──────────────────────────────────────────────────────────

    /// Walk the active, queued and mission commands and find where, if
    /// anywhere, the battery stops covering "next command + return".
    pub fn end_of_operation(&self, ctx: &AgentContext<'_>, now: SimTime) -> AgentResult<Forecast> {
        if self.battery.is_infinite() {
            return Ok(Forecast::Sufficient);
        }
        let pct = ctx.percentile();
        let mut walk = ForecastWalk {
            remaining: self.battery.remaining(),
            position:  self.position,
            time:      now,
        };

        if let Some(engine) = &self.active {
            if !engine.is_mission() {
                return Ok(Forecast::Undetermined);
            }
            let p = engine.predict_remaining(now, pct)?;
            if let Some(f) = walk.step(p, &self.model, ctx, pct) {
                return Ok(f);
            }
        }
        if !self.queue.is_empty() {
            return Ok(Forecast::Undetermined);
        }

        let Some(cursor) = &self.mission else { return Ok(Forecast::Sufficient) };
        let len = cursor.mission.commands.len();
        let horizon = match cursor.remaining() {
            Some(n) => n,
            None    => len * MAX_FORECAST_LAPS,
        };

        let mut lap_start = walk.remaining;
        for ahead in 0..horizon {
            let Some(command) = cursor.peek_at(ahead) else { break };
            let p = self.model.predict(command, walk.position, ctx.points, pct)?;
            if let Some(f) = walk.step(p, &self.model, ctx, pct) {
                return Ok(f);
            }
            // A lap that costs nothing will never deplete the battery.
            if cursor.mission.repeat && (ahead + 1) % len == 0 {
                if walk.remaining >= lap_start {
                    break;
                }
                lap_start = walk.remaining;
            }
        }
        Ok(Forecast::Sufficient)
    }

    // ── Physics ───────────────────────────────────────────────────────────

    /// Advance the agent by one physics step of `step` seconds starting at
    /// `sub.now()`.
    pub fn update(&mut self, step: f64, ctx: &AgentContext<'_>, sub: &mut dyn Substrate) -> AgentResult<()> {
        if self.active.is_none() {
            self.select_next_command(ctx, sub)?;
        }
        let now = sub.now();
        let end = now + step;

        let Some(engine) = self.active.as_mut() else { return Ok(()) };
        let out = engine.update_state(&mut self.battery, step, now)?;
        self.position = engine.position();
        let completed = engine.is_completed(end);

        if let Some(station) = out.docked {
            sub.send(Address::Station(station), Message::Dock { agent: self.id });
        }
        if out.depleted {
            self.report_depletion(sub);
        } else if !self.battery.is_empty() {
            self.depletion_reported = false;
        }

        if completed {
            self.finish_active(ctx, sub, end)?;
        }
        Ok(())
    }

    fn finish_active(&mut self, ctx: &AgentContext<'_>, sub: &mut dyn Substrate, end: SimTime) -> AgentResult<()> {
        let Some(mut engine) = self.active.take() else { return Ok(()) };
        engine.mark_completed();
        self.stats.commands_completed += 1;
        trace!(agent = %self.id, command = ?engine.id(), kind = engine.command().kind(), "command completed");

        if let Some(station) = engine.docked_station() {
            sub.send(Address::Station(station), Message::Undock { agent: self.id });
        }
        if !engine.is_mission() {
            return Ok(());
        }

        let forecast = self.end_of_operation(ctx, end)?;
        debug!(agent = %self.id, ?forecast, "forecast after mission command");
        let replacement = match forecast {
            Forecast::Depleted { feasible, handoff } => {
                if !self.replacement_requested {
                    self.replacement_requested = true;
                    self.stats.replacement_requests += 1;
                    info!(agent = %self.id, at = %feasible, when = %handoff, "depletion forecast, requesting replacement");
                }
                Some(ReplacementData::new(self.id, handoff, feasible))
            }
            Forecast::Sufficient | Forecast::Undetermined => None,
        };
        sub.send(
            Address::Scheduler,
            Message::CommandCompleted { source: self.id, position: self.position, replacement },
        );

        let finished = self.mission.as_ref().is_some_and(MissionCursor::is_finished);
        if finished {
            if let Some(cursor) = self.mission.take() {
                info!(agent = %self.id, mission = %cursor.mission.id, "mission completed");
                sub.send(
                    Address::Scheduler,
                    Message::MissionCompleted { agent: self.id, mission: cursor.mission.id },
                );
            }
            self.replacement_requested = false;
            self.head_to_charge(ctx);
        }
        Ok(())
    }

    // ── Messages ──────────────────────────────────────────────────────────

    pub fn handle_message(
        &mut self,
        msg: Message,
        ctx: &AgentContext<'_>,
        sub: &mut dyn Substrate,
    ) -> AgentResult<()> {
        match msg {
            Message::StartMission { mission } => {
                info!(agent = %self.id, mission = %mission.id, commands = mission.commands.len(), "starting mission");
                self.abandon_active(sub);
                self.queue.clear();
                self.mission = Some(MissionCursor::new(mission));
                self.replacement_requested = false;
            }

            Message::ReplaceAgent { replaced, handoff } => {
                info!(agent = %self.id, replaced = %replaced, at = %handoff, "provisioning as replacement");
                self.abandon_active(sub);
                self.queue.clear();
                self.inject(Command::waypoint(handoff, ctx.config.provisioning_speed));
                self.inject(Command::Exchange { peer: Some(replaced), initiator: true, mission: false });
            }

            Message::ExchangeRequest { initiator } => self.hand_over(initiator, ctx, sub),

            Message::ExchangeData { from, mission } => {
                let Some(engine) = self.active.as_mut() else {
                    return Err(AgentError::NoActiveCommand(self.id));
                };
                if !matches!(engine.command(), Command::Exchange { initiator: true, .. }) {
                    return Err(AgentError::NoActiveCommand(self.id));
                }
                engine.complete_exchange();
                match mission {
                    Some(cursor) => {
                        info!(agent = %self.id, from = %from, mission = %cursor.mission.id, "mission taken over");
                        self.mission = Some(cursor);
                        self.replacement_requested = false;
                    }
                    None => {
                        debug!(agent = %self.id, from = %from, "nothing to take over");
                        self.head_to_charge(ctx);
                    }
                }
            }

            other => trace!(agent = %self.id, message = other.name(), "ignored"),
        }
        Ok(())
    }

    /// The replacement has arrived: give it the mission and go charge.
    ///
    /// Without a mission there is nothing to hand over, e.g. when the mission
    /// ended while the replacement was on its way.  The request is answered
    /// empty and current work carries on.
    fn hand_over(&mut self, initiator: AgentId, ctx: &AgentContext<'_>, sub: &mut dyn Substrate) {
        if self.mission.is_none() {
            debug!(agent = %self.id, replacing = %initiator, "exchange request without a mission");
            sub.send(Address::Agent(initiator), Message::ExchangeData { from: self.id, mission: None });
            sub.send(Address::Scheduler, Message::ExchangeCompleted { replaced: self.id, replacing: initiator });
            return;
        }

        let in_flight_mission = self.active.as_ref().is_some_and(CommandExecEngine::is_mission);
        if in_flight_mission {
            if let Some(cursor) = self.mission.as_mut() {
                cursor.rewind();
            }
        }
        if let Some(engine) = self.active.take() {
            if let Some(station) = engine.docked_station() {
                sub.send(Address::Station(station), Message::Undock { agent: self.id });
            }
        }
        self.queue.clear();

        let cursor = self.mission.take();
        info!(agent = %self.id, replacing = %initiator, "mission handed over");
        sub.send(Address::Agent(initiator), Message::ExchangeData { from: self.id, mission: cursor });
        sub.send(Address::Scheduler, Message::ExchangeCompleted { replaced: self.id, replacing: initiator });

        self.replacement_requested = false;
        self.head_to_charge(ctx);
    }
}

// ── Forecast walk ─────────────────────────────────────────────────────────────

struct ForecastWalk {
    remaining: f64,
    position:  Coord,
    time:      SimTime,
}

impl ForecastWalk {
    /// Account for one command.  Returns the verdict if the battery cannot
    /// cover the command plus the return trip after it.
    fn step(&mut self, p: Prediction, model: &FlightModel, ctx: &AgentContext<'_>, pct: f64) -> Option<Forecast> {
        let back = model.return_trip(p.end, ctx.points, pct);
        if self.remaining < p.consumption_mah + back.consumption_mah {
            return Some(Forecast::Depleted { feasible: self.position, handoff: self.time });
        }
        self.remaining -= p.consumption_mah;
        self.position = p.end;
        self.time = self.time + p.duration_secs;
        None
    }
}
