//! `sky-output` — simulation output writers for the skyfleet scheduler.
//!
//! | Backend | Files created                                |
//! |---------|----------------------------------------------|
//! | CSV     | `agent_snapshots.csv`, `fleet_stats.csv`     |
//!
//! Backends implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `sky_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sky_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer);
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv_writer;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv_writer::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::AgentSnapshotRow;
pub use writer::OutputWriter;
