//! Queries a route search makes against the world.
//!
//! The search never owns tile data or collision geometry. It asks a
//! [`CellOccupancy`] whether a cell can be entered and, optionally, a
//! [`Raycaster`] whether the straight segment between two cell centres is
//! obstructed.

use glam::{Vec2, Vec3};

use crate::geom::Point;

/// What the world knows about one grid cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellState {
    /// No collidable layer covers the cell.
    NoData,
    /// Covered, and nothing blocks it.
    Open,
    /// Covered, and a blocking tile occupies it.
    Blocked,
}

impl CellState {
    /// Only [`Open`](Self::Open) cells can be entered. Cells without data are
    /// treated as outside the world.
    #[inline]
    pub fn is_traversable(self) -> bool {
        self == Self::Open
    }
}

/// Cell-occupancy query.
pub trait CellOccupancy {
    /// State of the cell at `p`.
    fn cell_state(&self, p: Point) -> CellState;
}

impl<F: Fn(Point) -> CellState> CellOccupancy for F {
    fn cell_state(&self, p: Point) -> CellState {
        self(p)
    }
}

/// One intersection reported by a [`Raycaster`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin to the hit.
    pub distance: f32,
    /// Layer bits of the collider that was hit.
    pub layer: u32,
}

/// Geometric line-of-sight probe.
///
/// A cast runs from `origin` toward `target` and stops at `target`. Every
/// collider intersected on the way whose layer overlaps `layer_mask` is
/// appended to `hits`. The caller owns and clears `hits`; implementations
/// only push. Hits at distance zero (the origin touching a collider) are
/// reported like any other and filtered by the caller.
pub trait Raycaster {
    /// Cast in the XY plane.
    fn raycast_2d(&self, origin: Vec2, target: Vec2, layer_mask: u32, hits: &mut Vec<RayHit>);

    /// Cast in 3D. The default projects onto the XY plane.
    fn raycast_3d(&self, origin: Vec3, target: Vec3, layer_mask: u32, hits: &mut Vec<RayHit>) {
        self.raycast_2d(origin.truncate(), target.truncate(), layer_mask, hits);
    }
}

/// A raycaster that never hits anything.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoRaycast;

impl Raycaster for NoRaycast {
    fn raycast_2d(&self, _origin: Vec2, _target: Vec2, _layer_mask: u32, _hits: &mut Vec<RayHit>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_open_cells_are_traversable() {
        assert!(CellState::Open.is_traversable());
        assert!(!CellState::Blocked.is_traversable());
        assert!(!CellState::NoData.is_traversable());
    }

    #[test]
    fn closures_are_occupancy_queries() {
        let world = |p: Point| {
            if p.x < 0 {
                CellState::NoData
            } else if p == Point::new(1, 1) {
                CellState::Blocked
            } else {
                CellState::Open
            }
        };
        assert_eq!(world.cell_state(Point::new(-1, 0)), CellState::NoData);
        assert_eq!(world.cell_state(Point::new(1, 1)), CellState::Blocked);
        assert_eq!(world.cell_state(Point::new(2, 1)), CellState::Open);
    }

    #[test]
    fn no_raycast_reports_nothing() {
        let mut hits = Vec::new();
        NoRaycast.raycast_3d(Vec3::ZERO, Vec3::ONE, u32::MAX, &mut hits);
        assert!(hits.is_empty());
    }
}
