//! Local Cartesian coordinates and geodetic projection.
//!
//! All motion happens in a flat local frame measured in metres: `x` east,
//! `y` north, `z` up.  Mission files carry WGS-84 lat/lon, which are projected
//! onto this frame around a fixed origin with an equirectangular
//! approximation.  Over the few kilometres a UAV mission spans the error is
//! well below a metre.

/// A point in the local frame, in metres.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coord {
    pub const ORIGIN: Coord = Coord { x: 0.0, y: 0.0, z: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Straight-line (3-D Euclidean) distance in metres.
    #[inline]
    pub fn distance(self, other: Coord) -> f64 {
        self.distance_sq(other).sqrt()
    }

    #[inline]
    pub fn distance_sq(self, other: Coord) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Distance in the horizontal plane only.
    #[inline]
    pub fn horizontal_distance(self, other: Coord) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// Geodetic anchor of the local frame.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoOrigin {
    pub lat: f64,
    pub lon: f64,
}

impl GeoOrigin {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;

    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Project `(lat, lon, alt)` to local metres around `self`.
    pub fn project(&self, lat: f64, lon: f64, alt: f64) -> Coord {
        let d_lat = (lat - self.lat).to_radians();
        let d_lon = (lon - self.lon).to_radians();
        let mean_lat = ((lat + self.lat) * 0.5).to_radians();
        Coord {
            x: Self::EARTH_RADIUS_M * d_lon * mean_lat.cos(),
            y: Self::EARTH_RADIUS_M * d_lat,
            z: alt,
        }
    }
}
