//! Straight-line flight geometry.

use sky_core::Coord;

/// Direction and length of a straight segment.
///
/// `yaw` is measured in the horizontal plane from +x toward +y, `pitch` from
/// the horizontal plane toward +z; both in radians.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Trajectory {
    pub yaw:      f64,
    pub pitch:    f64,
    pub distance: f64,
}

impl Trajectory {
    pub fn between(from: Coord, to: Coord) -> Self {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let dz = to.z - from.z;
        let horizontal = dx.hypot(dy);
        Self {
            yaw:      dy.atan2(dx),
            pitch:    dz.atan2(horizontal),
            distance: from.distance(to),
        }
    }

    /// Climb angle in degrees, −90 (straight down) … +90 (straight up).
    #[inline]
    pub fn climb_angle_deg(&self) -> f64 {
        self.pitch.to_degrees()
    }

    /// Seconds to fly the segment at `speed` m/s.
    #[inline]
    pub fn duration(&self, speed: f64) -> f64 {
        if self.distance <= 0.0 { 0.0 } else { self.distance / speed }
    }

    /// The point `len` metres along the segment from `from`.
    pub fn advance(&self, from: Coord, len: f64) -> Coord {
        let horizontal = len * self.pitch.cos();
        Coord::new(
            from.x + horizontal * self.yaw.cos(),
            from.y + horizontal * self.yaw.sin(),
            from.z + len * self.pitch.sin(),
        )
    }
}
