//! Current-based CC/CV charge model.
//!
//! Constant current (`cc_current_ma`) below `shift_percent`; above it the
//! charger holds the voltage and the current falls linearly to zero over
//! `cv_duration_secs`.  Progress through the CV stage is read off the charge
//! percentage, i.e. the stage is treated as linear in percent.

use crate::charge::percent_of;
use crate::ChargeAlgorithm;

#[derive(Clone, Debug, PartialEq)]
pub struct CurrentCccv {
    cc_current_ma:    f64,
    shift_percent:    f64,
    cv_duration_secs: f64,
}

impl CurrentCccv {
    pub fn new(cc_current_ma: f64, shift_percent: f64, cv_duration_secs: f64) -> Self {
        Self { cc_current_ma, shift_percent, cv_duration_secs }
    }

    /// Fraction of the CV stage already done at `pct`, in `[0, 1]`.
    fn cv_progress(&self, pct: f64) -> f64 {
        ((pct - self.shift_percent) / (100.0 - self.shift_percent)).clamp(0.0, 1.0)
    }
}

impl ChargeAlgorithm for CurrentCccv {
    fn charge_amount(&self, remaining: f64, capacity: f64, seconds: f64) -> f64 {
        if seconds <= 0.0 || capacity <= 0.0 {
            return 0.0;
        }
        let pct = percent_of(remaining, capacity);

        let amount = if pct < self.shift_percent {
            self.cc_current_ma * seconds / 3600.0
        } else {
            // Interpolate the falling current across the step; once the ramp
            // hits zero the rest of the step adds nothing.
            let f0 = self.cv_progress(pct);
            let f1 = (f0 + seconds / self.cv_duration_secs).min(1.0);
            let i0 = self.cc_current_ma * (1.0 - f0);
            let i1 = self.cc_current_ma * (1.0 - f1);
            let active_secs = (f1 - f0) * self.cv_duration_secs;
            0.5 * (i0 + i1) * active_secs / 3600.0
        };

        amount.clamp(0.0, (capacity - remaining).max(0.0))
    }

    /// Approximate: the CV share is prorated by percentage span, which is not
    /// exact for partial spans because the current is not constant there.
    fn charge_time(&self, remaining: f64, capacity: f64, target_percent: f64) -> f64 {
        let pct = percent_of(remaining, capacity);
        let target = target_percent.min(100.0);
        if target <= pct || capacity <= 0.0 {
            return 0.0;
        }

        let cc_span = (target.min(self.shift_percent) - pct).max(0.0);
        let cc_secs = cc_span / 100.0 * capacity / self.cc_current_ma * 3600.0;

        let cv_span = (target - pct.max(self.shift_percent)).max(0.0);
        let cv_secs = self.cv_duration_secs * cv_span / (100.0 - self.shift_percent);

        cc_secs + cv_secs
    }
}
