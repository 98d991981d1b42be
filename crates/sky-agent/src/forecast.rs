//! Result of an agent's end-of-operation forecast.

use sky_core::{Coord, SimTime};

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Forecast {
    /// Every remaining command can be flown with a return to a charge point
    /// still possible afterwards.
    Sufficient,

    /// The battery runs short.  `feasible` is the last point from which a
    /// return is still possible, reached at `handoff`.
    Depleted { feasible: Coord, handoff: SimTime },

    /// A non-mission command comes first; its cost cannot be forecast.
    Undetermined,
}

impl Forecast {
    #[inline]
    pub fn is_depleted(&self) -> bool {
        matches!(self, Forecast::Depleted { .. })
    }
}
