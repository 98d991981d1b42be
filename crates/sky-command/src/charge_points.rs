//! Spatial index of charging stations.
//!
//! Agents ask "which station is closest to here?" on every forecast, so the
//! stations live in an R-tree (via `rstar`) keyed on their 3-D position.
//! The set is built once at start-up and passed explicitly to whoever needs
//! it; there is no global registry.

use std::sync::Arc;

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use sky_core::{Coord, StationId};
use sky_energy::ChargeAlgorithm;

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone)]
struct PointEntry {
    point: [f64; 3],
    slot:  usize,
}

impl RTreeObject for PointEntry {
    type Envelope = AABB<[f64; 3]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for PointEntry {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        let dz = self.point[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

// ── ChargePoint ───────────────────────────────────────────────────────────────

/// A charging station as seen by agents: where it is and how it charges.
#[derive(Clone, Debug)]
pub struct ChargePoint {
    pub id:        StationId,
    pub position:  Coord,
    pub algorithm: Arc<dyn ChargeAlgorithm>,
}

impl ChargePoint {
    pub fn new(id: StationId, position: Coord, algorithm: Arc<dyn ChargeAlgorithm>) -> Self {
        Self { id, position, algorithm }
    }
}

// ── ChargePoints ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct ChargePoints {
    points: Vec<ChargePoint>,
    index:  RTree<PointEntry>,
}

impl ChargePoints {
    pub fn new(points: Vec<ChargePoint>) -> Self {
        let entries = points
            .iter()
            .enumerate()
            .map(|(slot, p)| PointEntry { point: to_array(p.position), slot })
            .collect();
        Self { points, index: RTree::bulk_load(entries) }
    }

    pub fn insert(&mut self, point: ChargePoint) {
        let slot = self.points.len();
        self.index.insert(PointEntry { point: to_array(point.position), slot });
        self.points.push(point);
    }

    /// The station closest to `pos`, or `None` if there are no stations.
    pub fn nearest(&self, pos: Coord) -> Option<&ChargePoint> {
        self.index
            .nearest_neighbor(&to_array(pos))
            .map(|e| &self.points[e.slot])
    }

    pub fn get(&self, id: StationId) -> Option<&ChargePoint> {
        self.points.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChargePoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[inline]
fn to_array(c: Coord) -> [f64; 3] {
    [c.x, c.y, c.z]
}
