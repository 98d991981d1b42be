//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use sky_agent::Agent;
use sky_core::SimTime;
use sky_scheduler::NodeRegistry;
use sky_sim::{FleetStats, SimObserver};

use crate::row::AgentSnapshotRow;
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes agent snapshots and the final statistics to
/// any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_snapshot(&mut self, now: SimTime, agents: &[Agent], registry: &NodeRegistry) {
        let rows: Vec<AgentSnapshotRow> = agents
            .iter()
            .map(|a| {
                let pos = a.position();
                AgentSnapshotRow {
                    agent_id:      a.id().0,
                    time_secs:     now.secs(),
                    x:             pos.x,
                    y:             pos.y,
                    z:             pos.z,
                    remaining_mah: a.battery().remaining(),
                    status:        registry.status(a.id()).map_or("UNKNOWN", |s| s.as_str()),
                }
            })
            .collect();

        if !rows.is_empty() {
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _now: SimTime, stats: &FleetStats) {
        let result = self.writer.write_stats(stats);
        self.store_err(result);
        let result = self.writer.finish();
        self.store_err(result);
    }
}
