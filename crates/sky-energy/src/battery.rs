//! The `Battery` — capacity and remaining charge in mAh.

/// A battery with a fixed capacity.
///
/// # Invariant
///
/// `0 ≤ remaining ≤ capacity` for finite batteries.  `charge` and
/// `discharge` clamp at the bounds and report the clamp through their return
/// value; hitting a bound is a modeled condition, never an error.
///
/// An *infinite* battery never runs out: every operation succeeds and
/// `remaining()` reports `f64::INFINITY`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Battery {
    capacity:  f64,
    remaining: f64,
    infinite:  bool,
}

impl Battery {
    /// A finite battery holding `remaining` of `capacity` mAh.
    ///
    /// Negative capacity is treated as empty; `remaining` is clamped into
    /// `[0, capacity]`.
    pub fn new(capacity: f64, remaining: f64) -> Self {
        let capacity = capacity.max(0.0);
        Self {
            capacity,
            remaining: remaining.clamp(0.0, capacity),
            infinite: false,
        }
    }

    /// A fully charged finite battery.
    pub fn full(capacity: f64) -> Self {
        Self::new(capacity, capacity)
    }

    /// A battery that never depletes.
    pub fn infinite() -> Self {
        Self { capacity: f64::INFINITY, remaining: f64::INFINITY, infinite: true }
    }

    #[inline]
    pub fn is_infinite(&self) -> bool {
        self.infinite
    }

    #[inline]
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    #[inline]
    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    /// Energy still missing to a full battery.
    #[inline]
    pub fn missing(&self) -> f64 {
        if self.infinite { 0.0 } else { self.capacity - self.remaining }
    }

    /// `100 · remaining / capacity`; `100` for infinite or zero-capacity batteries.
    pub fn remaining_percentage(&self) -> f64 {
        if self.infinite || self.capacity <= 0.0 {
            return 100.0;
        }
        100.0 * self.remaining / self.capacity
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.infinite && self.remaining <= 0.0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.infinite || self.remaining >= self.capacity
    }

    /// Add `amount` mAh.  Returns `false` if the battery overflowed and was
    /// clamped to capacity.
    pub fn charge(&mut self, amount: f64) -> bool {
        if self.infinite {
            return true;
        }
        let next = self.remaining + amount.max(0.0);
        if next > self.capacity {
            self.remaining = self.capacity;
            false
        } else {
            self.remaining = next;
            true
        }
    }

    /// Draw `amount` mAh.  Returns `false` if the battery ran dry and was
    /// clamped to zero.
    pub fn discharge(&mut self, amount: f64) -> bool {
        if self.infinite {
            return true;
        }
        let next = self.remaining - amount.max(0.0);
        if next < 0.0 {
            self.remaining = 0.0;
            false
        } else {
            self.remaining = next;
            true
        }
    }
}
