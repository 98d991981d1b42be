//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `agent_snapshots.csv`
//! - `fleet_stats.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use sky_sim::FleetStats;

use crate::writer::OutputWriter;
use crate::{AgentSnapshotRow, OutputError, OutputResult};

pub const SNAPSHOT_HEADER: [&str; 7] = ["agent_id", "time", "x", "y", "z", "remaining", "status"];

pub const STATS_HEADER: [&str; 18] = [
    "time",
    "agents",
    "agents_on_mission",
    "commands_completed",
    "depletion_failures",
    "replacement_requests",
    "missions_submitted",
    "missions_assigned",
    "missions_deferred",
    "missions_completed",
    "replacements_scheduled",
    "replacements_completed",
    "degraded_provisionings",
    "policy_violations",
    "stale_reports",
    "dead_agents",
    "backlog",
    "pending_replacements",
];

/// Writes simulation output to two CSV files.
pub struct CsvWriter {
    snapshots: Writer<File>,
    stats:     Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create `dir` if needed, then the two CSV files with their header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir).map_err(|source| OutputError::Dir { path: dir.to_path_buf(), source })?;

        let mut snapshots = Writer::from_path(dir.join("agent_snapshots.csv"))?;
        snapshots.write_record(SNAPSHOT_HEADER)?;

        let mut stats = Writer::from_path(dir.join("fleet_stats.csv"))?;
        stats.write_record(STATS_HEADER)?;

        Ok(Self { snapshots, stats, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.agent_id.to_string(),
                row.time_secs.to_string(),
                row.x.to_string(),
                row.y.to_string(),
                row.z.to_string(),
                row.remaining_mah.to_string(),
                row.status.to_owned(),
            ])?;
        }
        Ok(())
    }

    fn write_stats(&mut self, s: &FleetStats) -> OutputResult<()> {
        let sch = &s.scheduler;
        self.stats.write_record(&[
            s.time.secs().to_string(),
            s.agents.to_string(),
            s.agents_on_mission.to_string(),
            s.commands_completed.to_string(),
            s.depletion_failures.to_string(),
            s.replacement_requests.to_string(),
            sch.missions_submitted.to_string(),
            sch.missions_assigned.to_string(),
            sch.missions_deferred.to_string(),
            sch.missions_completed.to_string(),
            sch.replacements_scheduled.to_string(),
            sch.replacements_completed.to_string(),
            sch.degraded_provisionings.to_string(),
            sch.policy_violations.to_string(),
            sch.stale_reports.to_string(),
            sch.dead_agents.to_string(),
            s.backlog.to_string(),
            s.pending_replacements.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.stats.flush()?;
        Ok(())
    }
}
