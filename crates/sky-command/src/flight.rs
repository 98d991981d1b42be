//! Energy/time prediction for flight segments.

use sky_core::{Command, Coord, FleetConfig};
use sky_energy::CurrentProfile;

use crate::{ChargePoints, CommandError, CommandResult, Trajectory};

/// Forecast of one piece of work.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Prediction {
    /// Energy drawn, in mAh.
    pub consumption_mah: f64,
    /// Time taken, in seconds.
    pub duration_secs:   f64,
    /// Where the agent ends up.
    pub end:             Coord,
}

impl Prediction {
    /// No work: nothing consumed, nothing elapsed, stays at `pos`.
    pub fn stay(pos: Coord) -> Self {
        Self { consumption_mah: 0.0, duration_secs: 0.0, end: pos }
    }
}

/// Airframe parameters shared by every agent of one fleet.
#[derive(Clone, Debug)]
pub struct FlightModel {
    pub current:               CurrentProfile,
    pub takeoff_speed:         f64,
    pub return_speed:          f64,
    pub charge_target_percent: f64,
}

impl Default for FlightModel {
    fn default() -> Self {
        Self::from_config(&FleetConfig::default(), CurrentProfile::default())
    }
}

impl FlightModel {
    pub fn from_config(config: &FleetConfig, current: CurrentProfile) -> Self {
        Self {
            current,
            takeoff_speed:         config.takeoff_speed,
            return_speed:          config.return_speed,
            charge_target_percent: config.charge_target_percent,
        }
    }

    /// A straight flight from `from` to `to` at `speed`.
    pub fn leg(&self, from: Coord, to: Coord, speed: f64, percentile: f64) -> Prediction {
        let traj = Trajectory::between(from, to);
        let secs = traj.duration(speed);
        let current = self.current.current_for_climb(traj.climb_angle_deg(), percentile);
        Prediction { consumption_mah: current * secs / 3600.0, duration_secs: secs, end: to }
    }

    /// Hovering at `at` for `secs`.
    pub fn hover(&self, at: Coord, secs: f64, percentile: f64) -> Prediction {
        let secs = secs.max(0.0);
        Prediction {
            consumption_mah: self.current.hover_current(percentile) * secs / 3600.0,
            duration_secs:   secs,
            end:             at,
        }
    }

    /// The trip from `from` to the nearest charge point at return speed.
    /// With no charge points there is nowhere to return to and the cost is 0.
    pub fn return_trip(&self, from: Coord, points: &ChargePoints, percentile: f64) -> Prediction {
        match points.nearest(from) {
            Some(p) => self.leg(from, p.position, self.return_speed, percentile),
            None    => Prediction::stay(from),
        }
    }

    /// Forecast `command` started at `from`.
    ///
    /// Exchange commands have no knowable duration and predict zero.  Charge
    /// commands predict only the flight to the station.
    pub fn predict(
        &self,
        command: &Command,
        from: Coord,
        points: &ChargePoints,
        percentile: f64,
    ) -> CommandResult<Prediction> {
        Ok(match *command {
            Command::Waypoint { x, y, z, speed } => {
                if !(speed > 0.0) {
                    return Err(CommandError::Invalid(format!("waypoint speed {speed} is not positive")));
                }
                self.leg(from, Coord::new(x, y, z), speed, percentile)
            }
            Command::Takeoff { altitude } => {
                self.leg(from, Coord::new(from.x, from.y, altitude), self.takeoff_speed, percentile)
            }
            Command::HoldPosition { duration } => self.hover(from, duration, percentile),
            Command::Charge { station } => {
                let p = points.get(station).ok_or(CommandError::UnknownStation(station))?;
                self.leg(from, p.position, self.return_speed, percentile)
            }
            Command::Exchange { .. } => Prediction::stay(from),
        })
    }
}
