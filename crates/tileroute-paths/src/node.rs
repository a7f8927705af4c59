use std::fmt;

use glam::Vec2;
use tileroute_core::{CellSize, GridKey, Point};

use crate::neighbors::{NEIGHBOR_COUNT, OFFSETS};

/// One cell of the grid graph.
///
/// Holds its grid coordinates, its world position and the keys of its eight
/// neighbours in [slot order](crate::neighbors). Neighbour keys are computed
/// once; the neighbour nodes themselves are only created when a search first
/// asks for them.
#[derive(Debug, Clone, PartialEq)]
pub struct GridNode {
    grid: Point,
    position: Vec2,
    neighbors: [GridKey; NEIGHBOR_COUNT],
    cost_factor: f32,
}

impl GridNode {
    /// Create the node for cell `key`.
    pub fn new(key: GridKey, cell_size: CellSize) -> Self {
        let mut node = Self {
            grid: Point::ZERO,
            position: Vec2::ZERO,
            neighbors: [GridKey::default(); NEIGHBOR_COUNT],
            // Reserved for per-tile weights.
            cost_factor: 1.0,
        };
        node.set_grid_pos(key.point(), cell_size);
        node
    }

    /// Move the node to cell `grid`, recomputing its world position and
    /// neighbour keys.
    ///
    /// Only [`NodeCache::relocate`](crate::NodeCache::relocate) should call
    /// this on cached nodes, so the cache index stays consistent.
    pub(crate) fn set_grid_pos(&mut self, grid: Point, cell_size: CellSize) {
        self.grid = grid;
        self.position = cell_size.to_world(grid);
        // The grid wraps at the i32 edges.
        for (slot, off) in OFFSETS.iter().enumerate() {
            self.neighbors[slot] =
                GridKey::pack(grid.x.wrapping_add(off.x), grid.y.wrapping_add(off.y));
        }
    }

    /// Grid coordinates.
    #[inline]
    pub fn grid(&self) -> Point {
        self.grid
    }

    /// The node's own key.
    #[inline]
    pub fn key(&self) -> GridKey {
        GridKey::from(self.grid)
    }

    /// World position (cell centre).
    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Key of the neighbour in `slot`.
    #[inline]
    pub fn neighbor_key(&self, slot: usize) -> GridKey {
        self.neighbors[slot]
    }

    /// Multiplier applied to every edge leaving this node.
    #[inline]
    pub fn cost_factor(&self) -> f32 {
        self.cost_factor
    }
}

impl fmt::Display for GridNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GridNode {} at {}", self.grid, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neighbors::{E, N, NW, SE};

    #[test]
    fn neighbor_keys_follow_slot_layout() {
        let node = GridNode::new(GridKey::pack(3, -2), CellSize::ONE);
        assert_eq!(node.grid(), Point::new(3, -2));
        assert_eq!(node.key(), GridKey::pack(3, -2));
        assert_eq!(node.neighbor_key(NW).point(), Point::new(2, -3));
        assert_eq!(node.neighbor_key(N).point(), Point::new(3, -3));
        assert_eq!(node.neighbor_key(E).point(), Point::new(4, -2));
        assert_eq!(node.neighbor_key(SE).point(), Point::new(4, -1));
        assert_eq!(node.cost_factor(), 1.0);
    }

    #[test]
    fn position_is_cell_centre() {
        let cs = CellSize::new(Vec2::new(2.0, 4.0)).unwrap();
        let node = GridNode::new(GridKey::pack(1, 1), cs);
        assert_eq!(node.position(), Vec2::new(3.0, 6.0));
    }

    #[test]
    fn relocate_recomputes_everything() {
        let mut node = GridNode::new(GridKey::pack(0, 0), CellSize::ONE);
        node.set_grid_pos(Point::new(10, 5), CellSize::ONE);
        assert_eq!(node.grid(), Point::new(10, 5));
        assert_eq!(node.position(), Vec2::new(10.5, 5.5));
        assert_eq!(node.neighbor_key(NW).point(), Point::new(9, 4));
        assert_eq!(node.neighbor_key(SE).point(), Point::new(11, 6));
    }
}
