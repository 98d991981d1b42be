//! The `OutputWriter` trait implemented by backend writers.

use sky_sim::FleetStats;

use crate::{AgentSnapshotRow, OutputResult};

/// Errors are stored by [`SimOutputObserver`][crate::SimOutputObserver] and
/// retrieved with `take_error`, since observer hooks cannot fail.
pub trait OutputWriter {
    /// Write a batch of agent snapshots.
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()>;

    /// Write the run's final counters.
    fn write_stats(&mut self, stats: &FleetStats) -> OutputResult<()>;

    /// Flush and close all underlying file handles.  Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
