//! Read-only fleet state passed to every agent callback.

use sky_command::ChargePoints;
use sky_core::FleetConfig;

/// Everything an agent reads but never writes.
///
/// Built by the substrate and shared immutably with every agent for the
/// duration of one event.  The clock and message sending go through the
/// separate `&mut dyn Substrate` argument.
#[derive(Copy, Clone)]
pub struct AgentContext<'a> {
    pub points: &'a ChargePoints,
    pub config: &'a FleetConfig,
}

impl<'a> AgentContext<'a> {
    #[inline]
    pub fn new(points: &'a ChargePoints, config: &'a FleetConfig) -> Self {
        Self { points, config }
    }

    /// Percentile used for every energy forecast.
    #[inline]
    pub fn percentile(&self) -> f64 {
        self.config.prediction_percentile
    }
}
