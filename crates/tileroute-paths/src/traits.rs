use std::hash::Hash;

use glam::Vec2;

/// Edge cost meaning "this edge cannot be traversed".
///
/// Distinct from the destination being impassable: an edge may be forbidden
/// (a diagonal squeezing between two walls, a thin wall between two open
/// cells) while the node it leads to is open.
pub const INFINITE_COST: f32 = f32::INFINITY;

/// Minimal search-graph interface: node identity and topology.
///
/// Nodes are cheap handles; the graph owns whatever they refer to and may
/// create nodes on demand while resolving neighbours.
pub trait Pather {
    type Node: Copy + Eq + Hash;

    /// World-space position of `node`. Used for reporting only.
    fn position(&self, node: Self::Node) -> Vec2;

    /// Number of neighbour slots of `node`.
    fn neighbor_count(&self, node: Self::Node) -> usize;

    /// Node in neighbour slot `slot` of `node`, materializing it if needed.
    fn neighbor(&mut self, node: Self::Node, slot: usize) -> Self::Node;
}

/// Pather with passability and weighted edges.
pub trait WeightedPather: Pather {
    /// Whether `node` can be entered. Must not have side effects.
    fn is_passable(&self, node: Self::Node) -> bool;

    /// Cost of moving from `node` into neighbour slot `slot`, or
    /// [`INFINITE_COST`] when that edge does not exist. Finite costs must
    /// be > 0.
    fn neighbor_cost(&mut self, node: Self::Node, slot: usize) -> f32;
}

/// Full A* pather with a heuristic.
pub trait AstarPather: WeightedPather {
    /// Estimated remaining cost from `node` to `goal`. Need not be
    /// admissible; an overestimating heuristic trades optimality for fewer
    /// expansions.
    fn estimate(&self, node: Self::Node, goal: Self::Node) -> f32;
}
