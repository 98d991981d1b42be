//! Plain data row types written by output backends.

/// One agent at one snapshot time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSnapshotRow {
    pub agent_id:      u32,
    pub time_secs:     f64,
    pub x:             f64,
    pub y:             f64,
    pub z:             f64,
    pub remaining_mah: f64,
    /// Scheduler status, e.g. `"MISSION"`; `"UNKNOWN"` if unregistered.
    pub status:        &'static str,
}
