//! Lazy, append-only store of grid nodes.

use std::fmt;

use glam::Vec2;
use rustc_hash::FxHashMap;
use tileroute_core::{CellSize, GridError, GridKey, Point};

use crate::node::GridNode;

/// Handle to a node owned by a [`NodeCache`].
///
/// Handles stay valid until the cache is cleared. Handles taken before a
/// clear are stale: the cache refuses them instead of resolving them to
/// whatever node now occupies their slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    epoch: u32,
}

impl NodeId {
    /// Position in the cache's creation order.
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }
}

/// Owner of every [`GridNode`] materialized for a grid.
///
/// Lookups are idempotent: asking twice for the same cell returns the same
/// [`NodeId`]. Nodes are never removed one by one, only all at once by
/// [`clear`](Self::clear).
#[derive(Debug, Clone)]
pub struct NodeCache {
    cell_size: CellSize,
    nodes: Vec<GridNode>,
    index: FxHashMap<GridKey, u32>,
    epoch: u32,
}

impl NodeCache {
    /// An empty cache for cells of `cell_size`.
    pub fn new(cell_size: CellSize) -> Self {
        Self {
            cell_size,
            nodes: Vec::new(),
            index: FxHashMap::default(),
            epoch: 0,
        }
    }

    #[inline]
    pub fn cell_size(&self) -> CellSize {
        self.cell_size
    }

    /// Number of materialized nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Generation of the cache, bumped by every [`clear`](Self::clear).
    #[inline]
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Drop every node. Previously returned handles become stale.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// The node for `key`, created on first use.
    pub fn get_or_create(&mut self, key: GridKey) -> NodeId {
        if let Some(&index) = self.index.get(&key) {
            return NodeId {
                index,
                epoch: self.epoch,
            };
        }
        let index = self.nodes.len() as u32;
        self.nodes.push(GridNode::new(key, self.cell_size));
        self.index.insert(key, index);
        NodeId {
            index,
            epoch: self.epoch,
        }
    }

    /// The node for grid cell `p`, created on first use.
    #[inline]
    pub fn get_or_create_at(&mut self, p: Point) -> NodeId {
        self.get_or_create(GridKey::from(p))
    }

    /// The node for the cell containing world position `pos`.
    pub fn get_or_create_world(&mut self, pos: Vec2) -> Result<NodeId, GridError> {
        let p = self.cell_size.to_grid(pos)?;
        Ok(self.get_or_create_at(p))
    }

    /// The node for `key` if it has been materialized.
    pub fn find(&self, key: GridKey) -> Option<NodeId> {
        self.index.get(&key).map(|&index| NodeId {
            index,
            epoch: self.epoch,
        })
    }

    /// Resolve a handle. Returns `None` for stale handles.
    pub fn get(&self, id: NodeId) -> Option<&GridNode> {
        if id.epoch != self.epoch {
            return None;
        }
        self.nodes.get(id.index())
    }

    /// Whether `id` was issued since the last clear.
    #[inline]
    pub fn is_live(&self, id: NodeId) -> bool {
        id.epoch == self.epoch && id.index() < self.nodes.len()
    }

    /// Resolve a handle known to be live.
    ///
    /// # Panics
    /// Panics on a handle from another cache or from before a clear that
    /// points past the end of the arena.
    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &GridNode {
        debug_assert_eq!(id.epoch, self.epoch, "stale node handle");
        &self.nodes[id.index()]
    }

    /// Move a node to another cell, keeping its handle.
    ///
    /// Fails if the handle is stale or if another node already sits at `to`,
    /// since two nodes must never share a key.
    pub fn relocate(&mut self, id: NodeId, to: Point) -> Result<(), CacheError> {
        if !self.is_live(id) {
            return Err(CacheError::StaleNode(id));
        }
        let new_key = GridKey::from(to);
        let old_key = self.nodes[id.index()].key();
        if new_key == old_key {
            return Ok(());
        }
        if self.index.contains_key(&new_key) {
            return Err(CacheError::KeyOccupied(new_key));
        }
        self.index.remove(&old_key);
        self.index.insert(new_key, id.index);
        let cell_size = self.cell_size;
        self.nodes[id.index()].set_grid_pos(to, cell_size);
        Ok(())
    }

    /// Every live node in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &GridNode)> {
        let epoch = self.epoch;
        self.nodes
            .iter()
            .enumerate()
            .map(move |(i, n)| (NodeId { index: i as u32, epoch }, n))
    }
}

/// Errors raised by [`NodeCache`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The handle was issued before the last clear.
    StaleNode(NodeId),
    /// Another node already occupies the target cell.
    KeyOccupied(GridKey),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleNode(id) => write!(f, "node #{} is stale", id.index),
            Self::KeyOccupied(k) => write!(f, "cell {} already has a node", k.point()),
        }
    }
}

impl std::error::Error for CacheError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_create_is_idempotent() {
        let mut cache = NodeCache::new(CellSize::ONE);
        let a = cache.get_or_create_at(Point::new(2, 3));
        let b = cache.get_or_create(GridKey::pack(2, 3));
        let c = cache.get_or_create_world(Vec2::new(2.7, 3.1)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(a).unwrap().grid(), Point::new(2, 3));
    }

    #[test]
    fn distinct_cells_get_distinct_nodes() {
        let mut cache = NodeCache::new(CellSize::ONE);
        let a = cache.get_or_create_at(Point::new(0, -1));
        let b = cache.get_or_create_at(Point::new(-1, -1));
        assert_ne!(a, b);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.find(GridKey::pack(-1, -1)), Some(b));
        assert_eq!(cache.find(GridKey::pack(5, 5)), None);
    }

    #[test]
    fn clear_makes_handles_stale() {
        let mut cache = NodeCache::new(CellSize::ONE);
        let old = cache.get_or_create_at(Point::new(1, 1));
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get(old).is_none());
        assert!(!cache.is_live(old));

        let new = cache.get_or_create_at(Point::new(1, 1));
        // Same arena slot, different identity.
        assert_eq!(new.index(), old.index());
        assert_ne!(new, old);
        assert!(cache.get(old).is_none());
        assert!(cache.get(new).is_some());
    }

    #[test]
    fn world_lookup_rejects_unaddressable_positions() {
        let mut cache = NodeCache::new(CellSize::ONE);
        assert!(cache.get_or_create_world(Vec2::new(f32::NAN, 0.0)).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn relocate_rekeys_the_node() {
        let mut cache = NodeCache::new(CellSize::ONE);
        let id = cache.get_or_create_at(Point::new(0, 0));
        cache.relocate(id, Point::new(4, 4)).unwrap();
        assert_eq!(cache.find(GridKey::pack(0, 0)), None);
        assert_eq!(cache.find(GridKey::pack(4, 4)), Some(id));
        assert_eq!(cache.get_or_create_at(Point::new(4, 4)), id);
        assert_eq!(cache.get(id).unwrap().position(), Vec2::new(4.5, 4.5));
    }

    #[test]
    fn relocate_refuses_occupied_cells_and_stale_handles() {
        let mut cache = NodeCache::new(CellSize::ONE);
        let a = cache.get_or_create_at(Point::new(0, 0));
        cache.get_or_create_at(Point::new(1, 0));
        assert_eq!(
            cache.relocate(a, Point::new(1, 0)),
            Err(CacheError::KeyOccupied(GridKey::pack(1, 0)))
        );
        assert_eq!(cache.relocate(a, Point::new(0, 0)), Ok(()));
        cache.clear();
        assert_eq!(
            cache.relocate(a, Point::new(9, 9)),
            Err(CacheError::StaleNode(a))
        );
    }

    #[test]
    fn iter_lists_live_nodes() {
        let mut cache = NodeCache::new(CellSize::ONE);
        let a = cache.get_or_create_at(Point::new(0, 0));
        let b = cache.get_or_create_at(Point::new(0, 1));
        let ids: Vec<NodeId> = cache.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, b]);
    }
}
