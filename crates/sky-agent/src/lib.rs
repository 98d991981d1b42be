//! `sky-agent` — the Agent Energy Manager.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                       |
//! |--------------|----------------------------------------------------------------|
//! | [`agent`]    | `Agent` — command selection, energy guard, hand-off protocol   |
//! | [`context`]  | `AgentContext` — read-only charge points + configuration       |
//! | [`forecast`] | `Forecast` — result of the end-of-operation walk               |
//! | [`error`]    | `AgentError`, `AgentResult<T>`                                 |
//!
//! # Hand-off protocol
//!
//! ```text
//!  depleting agent A           scheduler               replacement B
//!  ─────────────────           ─────────               ─────────────
//!  CommandCompleted{repl} ──►  time the departure
//!                              ProvisionReplacement ─► (timer)
//!                              ReplaceAgent ─────────► fly to hand-off point
//!                         ◄─────────────────────────── ExchangeRequest
//!  ExchangeData{cursor} ─────────────────────────────► take over mission
//!  ExchangeCompleted ───────►  A: MAINTENANCE, B: MISSION
//!  fly to nearest charger
//! ```

pub mod agent;
pub mod context;
pub mod error;
pub mod forecast;

#[cfg(test)]
mod tests;

pub use agent::{Agent, AgentStats, MAX_FORECAST_LAPS};
pub use context::AgentContext;
pub use error::{AgentError, AgentResult};
pub use forecast::Forecast;
