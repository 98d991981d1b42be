//! Deterministic scenario RNG.
//!
//! The scheduling core itself is deterministic; randomness only enters
//! through scenario generation (initial fleet placement, synthetic
//! missions).  `SimRng` wraps a seeded `SmallRng` so the same
//! `FleetConfig::seed` always reproduces the same scenario.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::Coord;

/// Scenario-level RNG, used only in set-up code.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// A point drawn uniformly from the horizontal square `[-half, half]²`
    /// centred on `center`, at `center.z`.
    pub fn coord_around(&mut self, center: Coord, half: f64) -> Coord {
        if half <= 0.0 {
            return center;
        }
        Coord::new(
            center.x + self.0.gen_range(-half..=half),
            center.y + self.0.gen_range(-half..=half),
            center.z,
        )
    }
}
