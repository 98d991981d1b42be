//! Amp-hour dual-phase charge curve.
//!
//! ```text
//!   %  ^
//! limit|- - - - - - - - - - - - - - - - - - -
//!  100 |                         ____-----
//!      |                   __---
//! start|_______________ .-'          phase 2: pct(t) = limit − (limit − start)·e^(−k·t)
//!      |           _.-'
//!      |       _.-'       phase 1: pct grows by `linear_gradient` %/s
//!      |   _.-'
//!    0 +--------------------------------------> t
//! ```
//!
//! With `limit > 100` the curve crosses 100 % in finite time; with
//! `limit ≤ 100` it approaches the limit asymptotically and never reaches
//! it.  The limit models a practical ceiling of the pack and is deliberate.

use crate::charge::percent_of;
use crate::ChargeAlgorithm;

#[derive(Clone, Debug, PartialEq)]
pub struct AmpHourCurve {
    /// Phase-1 slope in percent per second.
    linear_gradient: f64,
    /// Phase-2 rate constant `k` in 1/s.
    exp_gradient:    f64,
    /// Percentage at which phase 2 begins.
    start_percent:   f64,
    /// Asymptote of phase 2.
    limit_percent:   f64,
}

impl AmpHourCurve {
    /// Build a curve.  Parameters are not validated here; use
    /// [`ChargeModel::build`][crate::ChargeModel::build] for checked construction.
    pub fn new(linear_gradient: f64, exp_gradient: f64, start_percent: f64, limit_percent: f64) -> Self {
        Self { linear_gradient, exp_gradient, start_percent, limit_percent }
    }

    /// Seconds the exponential phase needs to go from `start_percent` to
    /// `pct`.  Both `charge_amount` and `charge_time` measure phase-2
    /// progress against this reference so the two stay exact inverses.
    pub fn secs_since_phase2_start(&self, pct: f64) -> f64 {
        if pct <= self.start_percent {
            return 0.0;
        }
        if pct >= self.limit_percent {
            return f64::INFINITY;
        }
        let span = self.limit_percent - self.start_percent;
        -((self.limit_percent - pct) / span).ln() / self.exp_gradient
    }

    /// Percentage reached `secs` seconds after phase 2 began.
    fn phase2_percent(&self, secs: f64) -> f64 {
        let span = self.limit_percent - self.start_percent;
        self.limit_percent - span * (-self.exp_gradient * secs).exp()
    }
}

impl ChargeAlgorithm for AmpHourCurve {
    fn charge_amount(&self, remaining: f64, capacity: f64, seconds: f64) -> f64 {
        if seconds <= 0.0 || capacity <= 0.0 {
            return 0.0;
        }
        let start_pct = percent_of(remaining, capacity);
        let mut pct = start_pct;
        let mut left = seconds;

        // Phase 1, clamped so it never overshoots the phase boundary.
        if pct < self.start_percent {
            let to_boundary = (self.start_percent - pct) / self.linear_gradient;
            if left >= to_boundary {
                left -= to_boundary;
                pct = self.start_percent;
            } else {
                pct += self.linear_gradient * left;
                left = 0.0;
            }
        }

        // Phase 2.
        if left > 0.0 && pct < self.limit_percent {
            let t_ref = self.secs_since_phase2_start(pct);
            pct = self.phase2_percent(t_ref + left);
        }

        let amount = (pct - start_pct) / 100.0 * capacity;
        amount.clamp(0.0, (capacity - remaining).max(0.0))
    }

    fn charge_time(&self, remaining: f64, capacity: f64, target_percent: f64) -> f64 {
        let mut pct = percent_of(remaining, capacity);
        if target_percent <= pct {
            return 0.0;
        }

        let mut secs = 0.0;
        if pct < self.start_percent {
            let stop = target_percent.min(self.start_percent);
            secs += (stop - pct) / self.linear_gradient;
            pct = stop;
            if target_percent <= self.start_percent {
                return secs;
            }
        }

        if target_percent >= self.limit_percent {
            return f64::INFINITY;
        }
        secs + (self.secs_since_phase2_start(target_percent) - self.secs_since_phase2_start(pct)).max(0.0)
    }
}
