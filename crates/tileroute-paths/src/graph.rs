//! The grid graph: lazily materialized nodes plus the world queries that
//! decide where a route may go.

use glam::Vec2;
use tileroute_core::{CellOccupancy, NoRaycast, Point, RayHit, Raycaster};

use crate::cache::{NodeCache, NodeId};
use crate::config::{DIAGONAL_COST, DetectionMode, ORTHOGONAL_COST, RouteConfig};
use crate::neighbors::{self, NEIGHBOR_COUNT};
use crate::node::GridNode;
use crate::traits::{AstarPather, INFINITE_COST, Pather, WeightedPather};

/// An 8-connected grid over a [`NodeCache`], answering the search's
/// passability, cost and heuristic queries from a [`CellOccupancy`] and an
/// optional [`Raycaster`].
///
/// The blocked-destination exception only covers the
/// [active goal](Self::set_active_goal).
#[derive(Debug)]
pub struct GridGraph<O, R = NoRaycast> {
    cache: NodeCache,
    occupancy: O,
    raycaster: R,
    config: RouteConfig,
    active_goal: Option<NodeId>,
    // Probe results; reused by every raycast of this graph.
    hits: Vec<RayHit>,
}

impl<O: CellOccupancy> GridGraph<O> {
    /// A graph without geometric probing.
    pub fn new(occupancy: O, cache: NodeCache) -> Self {
        Self::with_raycaster(occupancy, NoRaycast, cache)
    }
}

impl<O: CellOccupancy, R: Raycaster> GridGraph<O, R> {
    pub fn with_raycaster(occupancy: O, raycaster: R, cache: NodeCache) -> Self {
        Self {
            cache,
            occupancy,
            raycaster,
            config: RouteConfig::default(),
            active_goal: None,
            hits: Vec::with_capacity(10),
        }
    }

    /// Swap the raycaster, keeping nodes and settings.
    pub fn replace_raycaster<R2: Raycaster>(self, raycaster: R2) -> GridGraph<O, R2> {
        GridGraph {
            cache: self.cache,
            occupancy: self.occupancy,
            raycaster,
            config: self.config,
            active_goal: None,
            hits: self.hits,
        }
    }

    pub fn config(&self) -> &RouteConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut RouteConfig {
        &mut self.config
    }

    pub fn cache(&self) -> &NodeCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut NodeCache {
        &mut self.cache
    }

    pub fn occupancy(&self) -> &O {
        &self.occupancy
    }

    pub fn occupancy_mut(&mut self) -> &mut O {
        &mut self.occupancy
    }

    pub fn raycaster(&self) -> &R {
        &self.raycaster
    }

    pub fn raycaster_mut(&mut self) -> &mut R {
        &mut self.raycaster
    }

    /// The goal of the search currently being stepped, if any.
    pub fn active_goal(&self) -> Option<NodeId> {
        self.active_goal
    }

    /// Set the goal that `allow_blocked_destination` exempts.
    ///
    /// [`TileRouter`](crate::TileRouter) sets it around every search step.
    /// Callers driving a [`PathFinder`](crate::PathFinder) over the graph
    /// directly set it to the search goal themselves, and back to `None`
    /// afterwards.
    pub fn set_active_goal(&mut self, goal: Option<NodeId>) {
        self.active_goal = goal;
    }

    #[inline]
    fn node(&self, id: NodeId) -> &GridNode {
        self.cache.node(id)
    }

    #[inline]
    fn grid(&self, id: NodeId) -> Point {
        self.cache.node(id).grid()
    }

    fn is_exempt_goal(&self, id: NodeId) -> bool {
        self.config.allow_blocked_destination && self.active_goal == Some(id)
    }

    /// Whether a probe from `from` toward `to` hits anything past its own
    /// origin. Only the 2D probe runs when both probe bits are set.
    fn probe_blocked(&mut self, from: Vec2, to: Vec2) -> bool {
        let mode = self.config.detection_mode;
        let mask = self.config.raycast_layer_mask;
        self.hits.clear();
        if mode.contains(DetectionMode::RAYCAST_2D) {
            self.raycaster.raycast_2d(from, to, mask, &mut self.hits);
        } else if mode.contains(DetectionMode::RAYCAST_3D) {
            self.raycaster
                .raycast_3d(from.extend(0.0), to.extend(0.0), mask, &mut self.hits);
        } else {
            return false;
        }
        // Zero-distance hits are the origin touching a collider.
        self.hits.iter().any(|h| h.distance > 0.0)
    }

    /// Whether the orthogonal neighbour in `slot` can be stepped past when
    /// moving diagonally.
    fn flank_open(&mut self, id: NodeId, slot: usize) -> bool {
        let flank = self.neighbor(id, slot);
        if !self.is_passable(flank) {
            return false;
        }
        !self.config.detection_mode.uses_raycast() || self.neighbor_cost(id, slot).is_finite()
    }
}

impl<O: CellOccupancy, R: Raycaster> Pather for GridGraph<O, R> {
    type Node = NodeId;

    fn position(&self, node: NodeId) -> Vec2 {
        self.node(node).position()
    }

    fn neighbor_count(&self, _node: NodeId) -> usize {
        NEIGHBOR_COUNT
    }

    fn neighbor(&mut self, node: NodeId, slot: usize) -> NodeId {
        let key = self.node(node).neighbor_key(slot);
        self.cache.get_or_create(key)
    }
}

impl<O: CellOccupancy, R: Raycaster> WeightedPather for GridGraph<O, R> {
    fn is_passable(&self, node: NodeId) -> bool {
        if self.is_exempt_goal(node) {
            return true;
        }
        if !self.config.detection_mode.contains(DetectionMode::CELL_CHECK) {
            return true;
        }
        self.occupancy.cell_state(self.grid(node)).is_traversable()
    }

    fn neighbor_cost(&mut self, node: NodeId, slot: usize) -> f32 {
        if neighbors::is_diagonal(slot) && !self.config.allow_diagonals {
            return INFINITE_COST;
        }

        let next = self.neighbor(node, slot);
        if !self.is_exempt_goal(next) {
            let from = self.node(node).position();
            let to = self.node(next).position();
            if self.probe_blocked(from, to) {
                return INFINITE_COST;
            }
        }

        let cost = match neighbors::flanks(slot) {
            None => ORTHOGONAL_COST,
            Some((a, b)) => {
                if !self.flank_open(node, a) || !self.flank_open(node, b) {
                    return INFINITE_COST;
                }
                DIAGONAL_COST
            }
        };
        cost * self.node(node).cost_factor()
    }
}

impl<O: CellOccupancy, R: Raycaster> AstarPather for GridGraph<O, R> {
    fn estimate(&self, node: NodeId, goal: NodeId) -> f32 {
        self.config.heuristic.estimate(self.grid(node), self.grid(goal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Heuristic;
    use crate::neighbors::{E, N, NE, S, SE, W};
    use std::cell::RefCell;
    use tileroute_core::{CellSize, GridKey, Range, ThinWalls, Tile, TileLayer};

    fn graph_from(ascii: &str) -> GridGraph<TileLayer> {
        let layer = TileLayer::from_ascii(Point::ZERO, ascii).unwrap();
        GridGraph::new(layer, NodeCache::new(CellSize::ONE))
    }

    fn open_graph(w: i32, h: i32) -> GridGraph<TileLayer> {
        let layer = TileLayer::filled(Range::new(0, 0, w, h), Tile::FLOOR);
        GridGraph::new(layer, NodeCache::new(CellSize::ONE))
    }

    fn at<O: CellOccupancy, R: Raycaster>(g: &mut GridGraph<O, R>, x: i32, y: i32) -> NodeId {
        g.cache_mut().get_or_create_at(Point::new(x, y))
    }

    #[test]
    fn orthogonal_and_diagonal_costs() {
        let mut g = open_graph(3, 3);
        let c = at(&mut g, 1, 1);
        assert_eq!(g.neighbor_cost(c, N), 1.0);
        assert_eq!(g.neighbor_cost(c, W), 1.0);
        assert!((g.neighbor_cost(c, SE) - 1.414_213_6).abs() < 1e-6);
        assert_eq!(g.neighbor_count(c), 8);
    }

    #[test]
    fn neighbors_materialize_through_the_cache() {
        let mut g = open_graph(3, 3);
        let c = at(&mut g, 1, 1);
        assert_eq!(g.cache().len(), 1);
        let e = g.neighbor(c, E);
        assert_eq!(g.cache().len(), 2);
        assert_eq!(g.neighbor(c, E), e);
        assert_eq!(g.cache().find(GridKey::pack(2, 1)), Some(e));
        assert_eq!(g.position(e), Vec2::new(2.5, 1.5));
    }

    #[test]
    fn passability_follows_occupancy() {
        let mut g = graph_from(
            "
.#.
...
",
        );
        let open = at(&mut g, 0, 0);
        let wall = at(&mut g, 1, 0);
        let outside = at(&mut g, 5, 5);
        assert!(g.is_passable(open));
        assert!(!g.is_passable(wall));
        assert!(!g.is_passable(outside));
    }

    #[test]
    fn without_cell_check_everything_is_passable() {
        let mut g = graph_from("#");
        g.config_mut().detection_mode = DetectionMode::RAYCAST_2D;
        let wall = at(&mut g, 0, 0);
        let outside = at(&mut g, 9, 9);
        assert!(g.is_passable(wall));
        assert!(g.is_passable(outside));
    }

    #[test]
    fn diagonals_disabled() {
        let mut g = open_graph(3, 3);
        g.config_mut().allow_diagonals = false;
        let c = at(&mut g, 1, 1);
        for slot in [0, 2, 5, 7] {
            assert_eq!(g.neighbor_cost(c, slot), INFINITE_COST);
        }
        assert_eq!(g.neighbor_cost(c, S), 1.0);
    }

    #[test]
    fn corner_cutting_is_forbidden() {
        let mut g = graph_from(
            "
.#.
...
...
",
        );
        let c = at(&mut g, 1, 1);
        // N flank is a wall: NW and NE are cut, SE and SW are fine.
        assert_eq!(g.neighbor_cost(c, 0), INFINITE_COST);
        assert_eq!(g.neighbor_cost(c, NE), INFINITE_COST);
        assert!(g.neighbor_cost(c, SE).is_finite());
        assert!(g.neighbor_cost(c, 5).is_finite());
    }

    #[test]
    fn blocked_goal_is_passable_only_while_exempt() {
        let mut g = graph_from(".#");
        let door = at(&mut g, 1, 0);
        assert!(!g.is_passable(door));

        g.set_active_goal(Some(door));
        assert!(!g.is_passable(door));
        g.config_mut().allow_blocked_destination = true;
        assert!(g.is_passable(door));

        g.set_active_goal(None);
        assert!(!g.is_passable(door));
    }

    #[test]
    fn heuristic_uses_grid_offsets() {
        let mut g = open_graph(1, 1);
        let a = at(&mut g, 0, 0);
        let b = at(&mut g, 3, 1);
        assert_eq!(g.estimate(a, b), 40.0);
        g.config_mut().heuristic = Heuristic::Diagonal;
        assert_eq!(g.estimate(a, b), 14.0 + 20.0);
        g.config_mut().heuristic = Heuristic::None;
        assert_eq!(g.estimate(a, b), 0.0);
    }

    fn walled(walls: ThinWalls, mode: DetectionMode) -> GridGraph<TileLayer, ThinWalls> {
        let layer = TileLayer::filled(Range::new(0, 0, 4, 4), Tile::FLOOR);
        let mut g = GridGraph::with_raycaster(layer, walls, NodeCache::new(CellSize::ONE));
        g.config_mut().detection_mode = mode;
        g
    }

    #[test]
    fn thin_wall_blocks_the_edge_not_the_cells() {
        // Wall on the edge between (0, 0) and (1, 0).
        let walls = ThinWalls::new().with_wall(Vec2::new(1.0, 0.0), Vec2::new(1.0, 0.8));
        let mut g = walled(walls, DetectionMode::CELL_CHECK | DetectionMode::RAYCAST_2D);
        let a = at(&mut g, 0, 0);
        let b = at(&mut g, 1, 0);
        assert!(g.is_passable(a) && g.is_passable(b));
        assert_eq!(g.neighbor_cost(a, E), INFINITE_COST);
        assert_eq!(g.neighbor_cost(b, W), INFINITE_COST);
        assert_eq!(g.neighbor_cost(a, S), 1.0);
        // The diagonal ray clears the wall but its E flank edge does not.
        assert_eq!(g.neighbor_cost(a, SE), INFINITE_COST);
    }

    #[test]
    fn probes_are_off_without_raycast_bits() {
        let walls = ThinWalls::new().with_wall(Vec2::new(1.0, 0.0), Vec2::new(1.0, 0.8));
        let mut g = walled(walls, DetectionMode::CELL_CHECK);
        let a = at(&mut g, 0, 0);
        assert_eq!(g.neighbor_cost(a, E), 1.0);
    }

    #[test]
    fn layer_mask_filters_probes() {
        let mut walls = ThinWalls::new();
        walls.add_on_layer(Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), 0b10);
        let mut g = walled(walls, DetectionMode::CELL_CHECK | DetectionMode::RAYCAST_2D);
        let a = at(&mut g, 0, 0);
        g.config_mut().raycast_layer_mask = 0b01;
        assert_eq!(g.neighbor_cost(a, E), 1.0);
        g.config_mut().raycast_layer_mask = 0b11;
        assert_eq!(g.neighbor_cost(a, E), INFINITE_COST);
    }

    #[test]
    fn origin_hits_are_ignored() {
        // Passes through the centre of (0, 0).
        let walls = ThinWalls::new().with_wall(Vec2::new(0.5, 0.0), Vec2::new(0.5, 2.0));
        let mut g = walled(walls, DetectionMode::CELL_CHECK | DetectionMode::RAYCAST_2D);
        let a = at(&mut g, 0, 0);
        assert_eq!(g.neighbor_cost(a, E), 1.0);
        let b = at(&mut g, 1, 0);
        assert_eq!(g.neighbor_cost(b, W), INFINITE_COST);
    }

    #[test]
    fn exempt_goal_skips_the_probe() {
        let walls = ThinWalls::new().with_wall(Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0));
        let mut g = walled(walls, DetectionMode::CELL_CHECK | DetectionMode::RAYCAST_2D);
        let a = at(&mut g, 0, 0);
        let b = at(&mut g, 1, 0);
        g.set_active_goal(Some(b));
        assert_eq!(g.neighbor_cost(a, E), INFINITE_COST);
        g.config_mut().allow_blocked_destination = true;
        assert_eq!(g.neighbor_cost(a, E), 1.0);
    }

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<&'static str>>,
    }

    impl Raycaster for Recorder {
        fn raycast_2d(&self, _o: Vec2, _t: Vec2, _m: u32, _hits: &mut Vec<RayHit>) {
            self.calls.borrow_mut().push("2d");
        }

        fn raycast_3d(&self, _o: glam::Vec3, _t: glam::Vec3, _m: u32, hits: &mut Vec<RayHit>) {
            self.calls.borrow_mut().push("3d");
            hits.push(RayHit {
                distance: 0.5,
                layer: 1,
            });
        }
    }

    #[test]
    fn raycast_2d_takes_precedence_over_3d() {
        let layer = TileLayer::filled(Range::new(0, 0, 2, 2), Tile::FLOOR);
        let mut g = GridGraph::with_raycaster(layer, Recorder::default(), NodeCache::new(CellSize::ONE));
        let a = at(&mut g, 0, 0);

        g.config_mut().detection_mode = DetectionMode::RAYCAST_2D | DetectionMode::RAYCAST_3D;
        assert_eq!(g.neighbor_cost(a, E), 1.0);
        g.config_mut().detection_mode = DetectionMode::RAYCAST_3D;
        assert_eq!(g.neighbor_cost(a, E), INFINITE_COST);
        assert_eq!(*g.raycaster().calls.borrow(), vec!["2d", "3d"]);
    }

    #[test]
    fn path_finder_over_the_graph_honours_the_active_goal() {
        let mut g = graph_from("..#");
        g.config_mut().allow_blocked_destination = true;
        let start = at(&mut g, 0, 0);
        let door = at(&mut g, 2, 0);
        let mut pf = crate::PathFinder::new();
        assert!(pf.compute_sync(&mut g, start, door, usize::MAX).is_empty());

        g.set_active_goal(Some(door));
        let path = pf.compute_sync(&mut g, start, door, usize::MAX);
        g.set_active_goal(None);
        assert_eq!(path.len(), 3);
        assert_eq!(path.goal(), Some(&door));
    }
}
