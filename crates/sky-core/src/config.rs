//! Top-level fleet configuration.
//!
//! Typically loaded from a JSON file by the application crate (enable the
//! `serde` feature) and passed to the scheduler, the agents and the
//! simulation runner.  Every field has a sensible default so scenario files
//! only need to override what they change.

use crate::{CoreError, CoreResult, SimTime};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FleetConfig {
    /// Simulated time of the first event, in seconds.
    pub start_secs: f64,

    /// The run stops before the first event at or after this time.
    pub end_secs: f64,

    /// Flight physics step: every agent is advanced this many seconds per update.
    pub update_interval_secs: f64,

    /// How often charging stations report the batteries of docked agents.
    pub status_report_interval_secs: f64,

    /// Delivery delay of point-to-point messages.
    pub message_latency_secs: f64,

    /// Percentile of the current-draw distribution used for forecasts, in
    /// (0, 1).  0.5 predicts the mean; higher values add safety margin.
    pub prediction_percentile: f64,

    /// Cruise speed (m/s) assumed for return trips to a charge point.
    pub return_speed: f64,

    /// Cruise speed (m/s) of a replacement agent flying to a hand-off point.
    pub provisioning_speed: f64,

    /// Vertical speed (m/s) of takeoff commands.
    pub takeoff_speed: f64,

    /// Speed (m/s) substituted for waypoints loaded without one.
    pub default_waypoint_speed: f64,

    /// A charge command completes when the battery reaches this percentage.
    pub charge_target_percent: f64,

    /// A charging agent is released to IDLE once the scheduler sees this
    /// percentage in a status report.
    pub full_charge_percent: f64,

    /// Minimum remaining energy (mAh) a docked agent needs to be handed a
    /// backlogged mission straight off the charger.
    pub mission_min_remaining_mah: f64,

    /// Master RNG seed.  The same seed always produces identical scenarios.
    pub seed: u64,

    /// Emit an output snapshot every N seconds.  0 disables snapshots.
    pub output_interval_secs: f64,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            start_secs:                  0.0,
            end_secs:                    3_600.0,
            update_interval_secs:        1.0,
            status_report_interval_secs: 10.0,
            message_latency_secs:        0.0,
            prediction_percentile:       0.5,
            return_speed:                10.0,
            provisioning_speed:          10.0,
            takeoff_speed:               2.0,
            default_waypoint_speed:      5.0,
            charge_target_percent:       99.0,
            full_charge_percent:         95.0,
            mission_min_remaining_mah:   1_000.0,
            seed:                        42,
            output_interval_secs:        60.0,
        }
    }
}

impl FleetConfig {
    #[inline]
    pub fn start_time(&self) -> SimTime {
        SimTime(self.start_secs)
    }

    #[inline]
    pub fn end_time(&self) -> SimTime {
        SimTime(self.end_secs)
    }

    /// Reject configurations the scheduler cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        let positive = [
            ("update_interval_secs", self.update_interval_secs),
            ("status_report_interval_secs", self.status_report_interval_secs),
            ("return_speed", self.return_speed),
            ("provisioning_speed", self.provisioning_speed),
            ("takeoff_speed", self.takeoff_speed),
            ("default_waypoint_speed", self.default_waypoint_speed),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(CoreError::Config(format!("{name} must be positive, got {value}")));
            }
        }
        if !(self.prediction_percentile > 0.0 && self.prediction_percentile < 1.0) {
            return Err(CoreError::Config(format!(
                "prediction_percentile must lie in (0, 1), got {}",
                self.prediction_percentile
            )));
        }
        if self.full_charge_percent > self.charge_target_percent {
            return Err(CoreError::Config(format!(
                "full_charge_percent ({}) exceeds charge_target_percent ({}), charged agents would never become idle",
                self.full_charge_percent, self.charge_target_percent
            )));
        }
        if self.message_latency_secs < 0.0 {
            return Err(CoreError::Config("message_latency_secs must not be negative".into()));
        }
        if self.end_secs < self.start_secs {
            return Err(CoreError::Config(format!(
                "end_secs ({}) is before start_secs ({})",
                self.end_secs, self.start_secs
            )));
        }
        Ok(())
    }
}
