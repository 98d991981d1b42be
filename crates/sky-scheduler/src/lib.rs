//! `sky-scheduler` — the fleet scheduler and its charging stations.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`status`]    | `NodeStatus` lifecycle and its transition table             |
//! | [`shadow`]    | `NodeShadow` — the scheduler's copy of one agent's state    |
//! | [`registry`]  | `NodeRegistry` — shadows, transition policy, agent queries  |
//! | [`scheduler`] | `FleetScheduler` — assignment, replacement timing, backlog  |
//! | [`station`]   | `ChargingStation`, `BatteryProbe`                           |
//! | [`error`]     | `SchedulerError`, `SchedulerResult<T>`                      |
//!
//! Only the scheduler writes `NodeStatus`; see [`status`] for the lifecycle.

pub mod error;
pub mod registry;
pub mod scheduler;
pub mod shadow;
pub mod station;
pub mod status;


pub use error::{SchedulerError, SchedulerResult};
pub use registry::NodeRegistry;
pub use scheduler::{FleetScheduler, SchedulerStats};
pub use shadow::NodeShadow;
pub use station::{BatteryProbe, ChargingStation};
pub use status::{NodeStatus, Transition};
