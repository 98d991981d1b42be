//! `CommandExecEngine` — executes and predicts one command.
//!
//! # Lifecycle
//!
//! ```text
//!   new ──bind(from, points)──► Pending ──initialize(now)──► Active ──► Completed
//! ```
//!
//! `bind` resolves the command's target against the agent's position and
//! the charge points (a takeoff climbs from wherever the agent is, a charge
//! command flies to its station).  `initialize` freezes the trajectory and
//! arms timers.  Only an `Active` engine may be stepped; stepping a pending
//! one is a programming error and returns [`CommandError::NotInitialized`].
//!
//! # Physics
//!
//! Every step moves the agent `speed · step` metres along the trajectory,
//! snapping onto the target when it would overshoot, and discharges
//! `mean_current · step / 3600` mAh for the whole step.  Forecasts use the
//! chosen percentile of the current distribution instead of the mean.

use std::sync::Arc;

use tracing::{debug, trace};

use sky_core::{Command, CommandId, Coord, SimTime, StationId};
use sky_energy::Battery;

use crate::{ChargePoint, ChargePoints, CommandError, CommandResult, FlightModel, Prediction, Trajectory};

/// Distance (m) under which a flying command counts as arrived.
pub const ARRIVAL_EPS_M: f64 = 1e-6;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EngineState {
    Pending,
    Active,
    Completed,
}

/// What happened during one `update_state` call.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StepOutcome {
    pub consumed_mah: f64,
    pub charged_mah:  f64,
    /// The battery hit zero during this step.
    pub depleted:     bool,
    /// Set on the step a charge command reached and docked at its station.
    pub docked:       Option<StationId>,
}

pub struct CommandExecEngine {
    id:              CommandId,
    command:         Command,
    part_of_mission: bool,
    model:           Arc<FlightModel>,
    state:           EngineState,
    bound:           bool,

    // ── Resolved at bind / initialize ────────────────────────────────────
    from:       Coord,
    to:         Coord,
    speed:      f64,
    trajectory: Trajectory,
    hold_until: SimTime,
    charger:    Option<ChargePoint>,

    // ── Live ─────────────────────────────────────────────────────────────
    position:      Coord,
    docked:        bool,
    percent:       f64,
    exchange_done: bool,
}

impl CommandExecEngine {
    pub fn new(id: CommandId, command: Command, part_of_mission: bool, model: Arc<FlightModel>) -> Self {
        Self {
            id,
            command,
            part_of_mission,
            model,
            state: EngineState::Pending,
            bound: false,
            from: Coord::ORIGIN,
            to: Coord::ORIGIN,
            speed: 0.0,
            trajectory: Trajectory { yaw: 0.0, pitch: 0.0, distance: 0.0 },
            hold_until: SimTime::ZERO,
            charger: None,
            position: Coord::ORIGIN,
            docked: false,
            percent: 0.0,
            exchange_done: false,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> CommandId {
        self.id
    }

    #[inline]
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Consume the engine and return its command (used to push a command
    /// back onto the mission).
    pub fn into_command(self) -> Command {
        self.command
    }

    #[inline]
    pub fn is_mission(&self) -> bool {
        self.part_of_mission
    }

    #[inline]
    pub fn state(&self) -> EngineState {
        self.state
    }

    #[inline]
    pub fn position(&self) -> Coord {
        self.position
    }

    /// Resolved target; equal to the start point for commands that stay put.
    #[inline]
    pub fn target(&self) -> Coord {
        self.to
    }

    /// The station this engine is docked at, if any.
    pub fn docked_station(&self) -> Option<StationId> {
        if self.docked { self.charger.as_ref().map(|c| c.id) } else { None }
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Resolve the command's target from the agent's position `from`.
    pub fn bind(&mut self, from: Coord, points: &ChargePoints) -> CommandResult<()> {
        self.from = from;
        self.position = from;
        match self.command {
            Command::Waypoint { x, y, z, speed } => {
                if !(speed > 0.0) {
                    return Err(CommandError::Invalid(format!("waypoint speed {speed} is not positive")));
                }
                self.to = Coord::new(x, y, z);
                self.speed = speed;
            }
            Command::Takeoff { altitude } => {
                self.to = Coord::new(from.x, from.y, altitude);
                self.speed = self.model.takeoff_speed;
            }
            Command::HoldPosition { .. } | Command::Exchange { .. } => {
                self.to = from;
                self.speed = 0.0;
            }
            Command::Charge { station } => {
                let point = points.get(station).ok_or(CommandError::UnknownStation(station))?;
                self.to = point.position;
                self.speed = self.model.return_speed;
                self.charger = Some(point.clone());
            }
        }
        self.bound = true;
        Ok(())
    }

    /// `Pending → Active`.  Re-initializing an active engine is a no-op.
    pub fn initialize(&mut self, now: SimTime) -> CommandResult<()> {
        if !self.bound {
            return Err(CommandError::NotBound(self.id));
        }
        if self.state != EngineState::Pending {
            return Ok(());
        }
        self.trajectory = Trajectory::between(self.from, self.to);
        if let Command::HoldPosition { duration } = self.command {
            self.hold_until = now + duration.max(0.0);
        }
        self.state = EngineState::Active;
        trace!(command = ?self.id, kind = self.command.kind(), to = %self.to, "command initialized");
        Ok(())
    }

    /// Advance the command by `step` seconds, moving and (dis)charging
    /// `battery`.
    pub fn update_state(&mut self, battery: &mut Battery, step: f64, _now: SimTime) -> CommandResult<StepOutcome> {
        match self.state {
            EngineState::Pending   => return Err(CommandError::NotInitialized(self.id)),
            EngineState::Completed => return Ok(StepOutcome::default()),
            EngineState::Active    => {}
        }
        let step = step.max(0.0);
        let mut out = StepOutcome::default();

        let current = match self.command {
            Command::Waypoint { .. } | Command::Takeoff { .. } => self.fly(step),
            Command::Charge { station } if !self.docked => {
                let current = self.fly(step);
                if self.arrived() {
                    self.docked = true;
                    out.docked = Some(station);
                    debug!(command = ?self.id, station = %station, "docked");
                }
                current
            }
            Command::Charge { .. } => {
                if let Some(charger) = &self.charger {
                    if !battery.is_infinite() {
                        let amount =
                            charger.algorithm.charge_amount(battery.remaining(), battery.capacity(), step);
                        battery.charge(amount);
                        out.charged_mah = amount;
                    }
                }
                0.0
            }
            Command::HoldPosition { .. } | Command::Exchange { .. } => self.model.current.hover.mean_ma,
        };

        if current > 0.0 {
            let amount = current * step / 3600.0;
            out.depleted = !battery.discharge(amount);
            out.consumed_mah = amount;
        }
        self.percent = battery.remaining_percentage();
        Ok(out)
    }

    /// Move toward the target; returns the mean current of the segment.
    fn fly(&mut self, step: f64) -> f64 {
        let left = self.position.distance(self.to);
        let travel = self.speed * step;
        self.position = if travel + ARRIVAL_EPS_M >= left {
            self.to
        } else {
            self.trajectory.advance(self.position, travel)
        };
        self.model.current.mean_for_climb(self.trajectory.climb_angle_deg())
    }

    #[inline]
    fn arrived(&self) -> bool {
        self.position.distance(self.to) < ARRIVAL_EPS_M
    }

    pub fn is_completed(&self, now: SimTime) -> bool {
        match self.state {
            EngineState::Pending   => false,
            EngineState::Completed => true,
            EngineState::Active    => match self.command {
                Command::Waypoint { .. } | Command::Takeoff { .. } => self.arrived(),
                Command::HoldPosition { .. } => now >= self.hold_until,
                Command::Exchange { .. } => self.exchange_done,
                Command::Charge { .. } => self.docked && self.percent >= self.model.charge_target_percent,
            },
        }
    }

    pub fn mark_completed(&mut self) {
        self.state = EngineState::Completed;
    }

    /// Signal that the hand-off this exchange command waits for is done.
    pub fn complete_exchange(&mut self) {
        self.exchange_done = true;
    }

    // ── Prediction ────────────────────────────────────────────────────────

    /// Forecast the whole command from where it started.
    pub fn predict_full_consumption(&self, percentile: f64) -> CommandResult<Prediction> {
        if self.state == EngineState::Pending {
            return Err(CommandError::NotInitialized(self.id));
        }
        Ok(match self.command {
            Command::HoldPosition { duration } => self.model.hover(self.from, duration, percentile),
            Command::Exchange { .. } => Prediction::stay(self.from),
            _ => self.model.leg(self.from, self.to, self.speed, percentile),
        })
    }

    /// Forecast what is left of an active command from its live position.
    pub fn predict_remaining(&self, now: SimTime, percentile: f64) -> CommandResult<Prediction> {
        match self.state {
            EngineState::Pending   => return Err(CommandError::NotInitialized(self.id)),
            EngineState::Completed => return Ok(Prediction::stay(self.position)),
            EngineState::Active    => {}
        }
        Ok(match self.command {
            Command::HoldPosition { .. } => {
                self.model.hover(self.position, self.hold_until.since(now), percentile)
            }
            Command::Exchange { .. } => Prediction::stay(self.position),
            Command::Charge { .. } if self.docked => Prediction::stay(self.position),
            _ => self.model.leg(self.position, self.to, self.speed, percentile),
        })
    }

    /// What-if forecast of this engine's command started at `from`.  Works
    /// in any state and does not touch the engine.
    pub fn predict_from(&self, from: Coord, points: &ChargePoints, percentile: f64) -> CommandResult<Prediction> {
        self.model.predict(&self.command, from, points, percentile)
    }
}

impl std::fmt::Debug for CommandExecEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandExecEngine")
            .field("id", &self.id)
            .field("command", &self.command)
            .field("mission", &self.part_of_mission)
            .field("state", &self.state)
            .field("position", &self.position)
            .finish()
    }
}
