//! Simulation observer trait for progress reporting and data collection.

use sky_agent::Agent;
use sky_core::SimTime;
use sky_scheduler::NodeRegistry;

use crate::FleetStats;

/// Callbacks invoked by [`FleetSim::run`][crate::FleetSim::run].
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter;
///
/// impl SimObserver for ProgressPrinter {
///     fn on_step_end(&mut self, now: SimTime, active: usize) {
///         if now.secs() as u64 % 600 == 0 {
///             println!("{now}: {active} agents busy");
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called after every physics step.  `active` is the number of agents
    /// executing a command.
    fn on_step_end(&mut self, _now: SimTime, _active: usize) {}

    /// Called every `config.output_interval_secs` with the agents and the
    /// scheduler's view of them.
    fn on_snapshot(&mut self, _now: SimTime, _agents: &[Agent], _registry: &NodeRegistry) {}

    /// Called once when the run ends.
    fn on_sim_end(&mut self, _now: SimTime, _stats: &FleetStats) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
