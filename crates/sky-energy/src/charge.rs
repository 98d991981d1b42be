//! The `ChargeAlgorithm` trait and deployment-level model selection.
//!
//! # Pluggability
//!
//! Charging stations and charge commands only talk to
//! `Arc<dyn ChargeAlgorithm>`, so a deployment picks one physical model at
//! start-up (via [`ChargeModel`]) and every component shares it read-only.
//! Two models ship with the crate:
//!
//! | Model            | Phase 1                 | Phase 2                                  |
//! |------------------|-------------------------|------------------------------------------|
//! | [`AmpHourCurve`] | linear %/s              | bounded exponential growth toward a limit |
//! | [`CurrentCccv`]  | constant current (mA)   | current ramps linearly to zero           |

use std::fmt;
use std::sync::Arc;

use crate::{AmpHourCurve, CurrentCccv, EnergyError, EnergyResult};

/// A stateless charge-curve model.
///
/// Units: `remaining`/`capacity` and returned amounts in mAh, durations in
/// seconds, percentages in `[0, 100]`.
///
/// # Contract
///
/// - `charge_amount` is never negative and never exceeds `capacity − remaining`.
/// - `charge_time` is `0` when `target_percent` is at or below the current
///   percentage, and never negative.
pub trait ChargeAlgorithm: Send + Sync + fmt::Debug {
    /// mAh gained when charging for `seconds` starting at `remaining`.
    fn charge_amount(&self, remaining: f64, capacity: f64, seconds: f64) -> f64;

    /// Seconds needed to go from `remaining` to `target_percent` of capacity.
    fn charge_time(&self, remaining: f64, capacity: f64, target_percent: f64) -> f64;
}

/// Serde-configurable choice of charge model.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum ChargeModel {
    AmpHour {
        linear_gradient: f64,
        exp_gradient:    f64,
        start_percent:   f64,
        limit_percent:   f64,
    },
    CurrentCccv {
        cc_current_ma:    f64,
        shift_percent:    f64,
        cv_duration_secs: f64,
    },
}

impl Default for ChargeModel {
    fn default() -> Self {
        ChargeModel::AmpHour {
            linear_gradient: 0.4,
            exp_gradient:    0.0006,
            start_percent:   90.0,
            limit_percent:   101.0,
        }
    }
}

impl ChargeModel {
    /// Validate the parameters and build the shared algorithm.
    pub fn build(&self) -> EnergyResult<Arc<dyn ChargeAlgorithm>> {
        match *self {
            ChargeModel::AmpHour { linear_gradient, exp_gradient, start_percent, limit_percent } => {
                if !(linear_gradient > 0.0 && exp_gradient > 0.0) {
                    return Err(EnergyError::InvalidModel("gradients must be positive".into()));
                }
                if !(0.0..100.0).contains(&start_percent) || limit_percent <= start_percent {
                    return Err(EnergyError::InvalidModel(format!(
                        "need 0 <= start ({start_percent}) < 100 and limit ({limit_percent}) > start"
                    )));
                }
                Ok(Arc::new(AmpHourCurve::new(linear_gradient, exp_gradient, start_percent, limit_percent)))
            }
            ChargeModel::CurrentCccv { cc_current_ma, shift_percent, cv_duration_secs } => {
                if !(cc_current_ma > 0.0 && cv_duration_secs > 0.0) {
                    return Err(EnergyError::InvalidModel(
                        "CC current and CV duration must be positive".into(),
                    ));
                }
                if !(0.0..100.0).contains(&shift_percent) {
                    return Err(EnergyError::InvalidModel(format!(
                        "shift percentage {shift_percent} outside [0, 100)"
                    )));
                }
                Ok(Arc::new(CurrentCccv::new(cc_current_ma, shift_percent, cv_duration_secs)))
            }
        }
    }
}

#[inline]
pub(crate) fn percent_of(remaining: f64, capacity: f64) -> f64 {
    if capacity <= 0.0 { 100.0 } else { 100.0 * remaining / capacity }
}
