//! `sky-energy` — batteries, charge curves and current draw.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`battery`]  | `Battery` — clamped mAh store, optionally infinite        |
//! | [`charge`]   | `ChargeAlgorithm` trait, `ChargeModel` selection          |
//! | [`amp_hour`] | `AmpHourCurve` — linear then bounded-exponential          |
//! | [`cccv`]     | `CurrentCccv` — constant current, then constant voltage   |
//! | [`current`]  | `CurrentProfile` — climb-angle current table + hover draw |
//! | [`error`]    | `EnergyError`, `EnergyResult<T>`                          |
//!
//! Everything here is pure arithmetic: no clock, no messages.  Agents own
//! their `Battery`; charge algorithms are built once and shared as
//! `Arc<dyn ChargeAlgorithm>`.

pub mod amp_hour;
pub mod battery;
pub mod cccv;
pub mod charge;
pub mod current;
pub mod error;


pub use amp_hour::AmpHourCurve;
pub use battery::Battery;
pub use cccv::CurrentCccv;
pub use charge::{ChargeAlgorithm, ChargeModel};
pub use current::{CurrentProfile, CurrentSample, z_score};
pub use error::{EnergyError, EnergyResult};
