//! Simulation time model.
//!
//! # Design
//!
//! The event substrate fires callbacks at arbitrary instants, so time is a
//! continuous quantity: `SimTime` wraps seconds since the start of the run as
//! `f64`.  Flight physics is still advanced in fixed steps
//! (`FleetConfig::update_interval_secs`), but hand-off deadlines and charge
//! completion times fall between steps.
//!
//! `SimTime` implements a total order (`f64::total_cmp`) so it can key a
//! `BTreeMap` in the event queue.  NaN never appears in practice; if it did
//! it would sort after every finite time instead of poisoning comparisons.

use std::cmp::Ordering;
use std::fmt;

/// An absolute simulation timestamp in seconds.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    #[inline]
    pub fn secs(self) -> f64 {
        self.0
    }

    /// The timestamp `secs` seconds after `self`.
    #[inline]
    pub fn offset(self, secs: f64) -> SimTime {
        SimTime(self.0 + secs)
    }

    /// Seconds elapsed from `earlier` to `self` (negative if `earlier` is later).
    #[inline]
    pub fn since(self, earlier: SimTime) -> f64 {
        self.0 - earlier.0
    }

    /// The later of two timestamps.
    #[inline]
    pub fn max(self, other: SimTime) -> SimTime {
        if self >= other { self } else { other }
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for SimTime {}

// `total_cmp` equality is bit equality, so hashing the bits is consistent.
impl std::hash::Hash for SimTime {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::ops::Add<f64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: f64) -> SimTime {
        SimTime(self.0 + rhs)
    }
}

impl std::ops::Sub for SimTime {
    type Output = f64;
    #[inline]
    fn sub(self, rhs: SimTime) -> f64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:.1}s", self.0)
    }
}
