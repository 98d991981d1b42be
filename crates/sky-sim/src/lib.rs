//! `sky-sim` — reference discrete-event substrate for the skyfleet scheduler.
//!
//! # Event loop
//!
//! ```text
//! while next event at t ≤ end:
//!   pop (t, event)                  ─ non-decreasing t, FIFO on ties
//!   Deliver{to, msg}  → agent / scheduler / station handler
//!   UpdateAgents      → Agent::update(step) for every agent, re-arm at t+step
//!   StationReport     → ChargingStation::report for every station, re-arm
//!   MissionArrival(m) → FleetScheduler::submit_mission(m)
//! ```
//!
//! Handlers only ever see `&mut dyn Substrate`; sends and timers go back into
//! the same queue, and a cancelled timer is removed from it outright.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use sky_sim::{FleetSimBuilder, NoopObserver};
//!
//! let mut sim = FleetSimBuilder::new(config)
//!     .station(Coord::ORIGIN)
//!     .agent(Coord::ORIGIN, Battery::full(5_400.0))
//!     .mission(SimTime::ZERO, mission)
//!     .build()?;
//! let stats = sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;
pub mod stats;
pub mod substrate;


pub use builder::FleetSimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use sim::FleetSim;
pub use stats::FleetStats;
pub use substrate::SimEvent;
