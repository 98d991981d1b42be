//! `sky-core` — foundational types for the `skyfleet` UAV scheduler.
//!
//! This crate is a dependency of every other `sky-*` crate.  It has no
//! `sky-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `StationId`, `MissionId`, `CommandId`          |
//! | [`geo`]         | `Coord` (local metres), `GeoOrigin` projection            |
//! | [`time`]        | `SimTime`                                                 |
//! | [`config`]      | `FleetConfig`                                             |
//! | [`rng`]         | `SimRng` (scenario generation)                            |
//! | [`command`]     | `Command`, `Mission`, `MissionCursor`                     |
//! | [`message`]     | `Address`, `Message`, `ReplacementData`, `ChargingStatus` |
//! | [`substrate`]   | `Substrate` trait, `EventHandle`, `RecordingSubstrate`    |
//! | [`event_queue`] | `EventQueue<E>` — ordered, cancellable                    |
//! | [`error`]       | `CoreError`, `CoreResult`                                     |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                   |
//! |-----------|----------------------------------------------------------|
//! | `serde`   | Adds `Serialize`/`Deserialize` to all public data types. |
//! | `testing` | Exposes `RecordingSubstrate` outside this crate.         |

pub mod command;
pub mod config;
pub mod error;
pub mod event_queue;
pub mod geo;
pub mod ids;
pub mod message;
pub mod rng;
pub mod substrate;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use command::{Command, Mission, MissionCursor};
pub use config::FleetConfig;
pub use error::{CoreError, CoreResult};
pub use event_queue::EventQueue;
pub use geo::{Coord, GeoOrigin};
pub use ids::{AgentId, CommandId, MissionId, StationId};
pub use message::{Address, ChargingStatus, Message, ReplacementData};
pub use rng::SimRng;
pub use substrate::{EventHandle, Substrate};
pub use time::SimTime;

#[cfg(any(test, feature = "testing"))]
pub use substrate::RecordingSubstrate;
