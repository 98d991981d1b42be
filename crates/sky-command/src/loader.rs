//! CSV mission loader.
//!
//! # CSV format
//!
//! One row per command, in execution order.  Command codes follow MAVLink.
//!
//! ```csv
//! command,param1,param2,param3,param4,lat,lon,alt
//! 22,0,0,0,0,30.6940,-88.0430,15
//! 16,6,0,0,0,30.6950,-88.0430,15
//! 19,30,0,0,0,0,0,0
//! 16,0,0,0,0,30.6940,-88.0430,15
//! ```
//!
//! | Code | Command        | Parameters used                                   |
//! |------|----------------|---------------------------------------------------|
//! | `16` | `Waypoint`     | `lat,lon,alt`; `param1` = speed (0 → default)     |
//! | `22` | `Takeoff`      | `alt`                                             |
//! | `19` | `HoldPosition` | `param1` = seconds                                |
//!
//! Any other code is rejected with [`LoaderError::UnsupportedCommand`].
//! `lat`/`lon` are projected onto the local frame around
//! [`MissionSource::origin`].

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use sky_core::{Command, GeoOrigin, Mission, MissionId};

use crate::LoaderError;

const MAV_CMD_NAV_WAYPOINT: u16 = 16;
const MAV_CMD_NAV_LOITER_TIME: u16 = 19;
const MAV_CMD_NAV_TAKEOFF: u16 = 22;

// ── CSV record ────────────────────────────────────────────────────────────────

/// `param2`..`param4` are unused by the supported commands and ignored.
#[derive(Deserialize)]
struct MissionRecord {
    command: u16,
    param1:  f64,
    lat:     f64,
    lon:     f64,
    alt:     f64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// How to interpret a mission file.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MissionSource {
    pub origin:        GeoOrigin,
    /// Substituted for waypoints whose `param1` is 0.
    pub default_speed: f64,
    pub repeat:        bool,
}

/// Load one mission from a CSV file.
pub fn load_mission_csv(path: &Path, id: MissionId, source: &MissionSource) -> Result<Mission, LoaderError> {
    let file = std::fs::File::open(path)?;
    load_mission_reader(file, id, source)
}

/// Like [`load_mission_csv`] but accepts any `Read` source.
pub fn load_mission_reader<R: Read>(
    reader: R,
    id: MissionId,
    source: &MissionSource,
) -> Result<Mission, LoaderError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut commands = Vec::new();

    for (i, result) in csv_reader.deserialize::<MissionRecord>().enumerate() {
        let row = result.map_err(|e| LoaderError::Parse(e.to_string()))?;
        // +2: one for the header, one for 1-based numbering.
        let line = i as u64 + 2;
        commands.push(to_command(&row, source, line)?);
    }

    debug!(mission = %id, commands = commands.len(), "mission loaded");
    Ok(Mission::new(id, commands, source.repeat))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn to_command(row: &MissionRecord, source: &MissionSource, line: u64) -> Result<Command, LoaderError> {
    match row.command {
        MAV_CMD_NAV_WAYPOINT => {
            let speed = if row.param1 > 0.0 { row.param1 } else { source.default_speed };
            Ok(Command::waypoint(source.origin.project(row.lat, row.lon, row.alt), speed))
        }
        MAV_CMD_NAV_TAKEOFF => Ok(Command::Takeoff { altitude: row.alt }),
        MAV_CMD_NAV_LOITER_TIME => {
            if row.param1 < 0.0 {
                return Err(LoaderError::Parse(format!("line {line}: negative hold time {}", row.param1)));
            }
            Ok(Command::HoldPosition { duration: row.param1 })
        }
        code => Err(LoaderError::UnsupportedCommand { code, line }),
    }
}
