//! `sky-command` — executing and forecasting agent commands.
//!
//! # Crate layout
//!
//! | Module            | Contents                                                  |
//! |-------------------|-----------------------------------------------------------|
//! | [`cee`]           | `CommandExecEngine` — per-command state machine + physics |
//! | [`flight`]        | `FlightModel`, `Prediction` — energy/time forecasts       |
//! | [`trajectory`]    | `Trajectory` — yaw, pitch and length of a segment         |
//! | [`charge_points`] | `ChargePoints` — R-tree of charging stations              |
//! | [`loader`]        | Mission CSV loading                                       |
//! | [`error`]         | `CommandError`, `LoaderError`                             |
//!
//! Engines never mutate anything but their own state and the battery they
//! are handed; predictions are side-effect free.

pub mod cee;
pub mod charge_points;
pub mod error;
pub mod flight;
pub mod loader;
pub mod trajectory;

#[cfg(test)]
mod tests;

pub use cee::{ARRIVAL_EPS_M, CommandExecEngine, EngineState, StepOutcome};
pub use charge_points::{ChargePoint, ChargePoints};
pub use error::{CommandError, CommandResult, LoaderError, LoaderResult};
pub use flight::{FlightModel, Prediction};
pub use loader::{MissionSource, load_mission_csv, load_mission_reader};
pub use trajectory::Trajectory;
