//! World-space route requests over a tile grid.

use std::fmt;

use glam::Vec2;
use tileroute_core::{CellOccupancy, CellSize, GridError, NoRaycast, Point, Raycaster};

use crate::cache::{CacheError, NodeCache, NodeId};
use crate::config::RouteConfig;
use crate::graph::GridGraph;
use crate::node::GridNode;
use crate::path::Path;
use crate::pathfinder::PathFinder;
use crate::search::{Search, SearchFailure, SearchStatus, SearchStep};
use crate::traits::WeightedPather;

/// An incremental route search, driven by [`TileRouter::resume`].
pub type RouteSearch = Search<NodeId>;

/// Errors raised by [`TileRouter`] requests.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteError {
    /// A world position could not be mapped to a grid cell.
    Grid(GridError),
    /// A node handle was rejected by the node cache.
    Cache(CacheError),
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid(e) => write!(f, "grid error: {e}"),
            Self::Cache(e) => write!(f, "node cache error: {e}"),
        }
    }
}

impl std::error::Error for RouteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            Self::Cache(e) => Some(e),
        }
    }
}

impl From<GridError> for RouteError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

impl From<CacheError> for RouteError {
    fn from(e: CacheError) -> Self {
        Self::Cache(e)
    }
}

/// Route finder for one tile world.
///
/// Owns the grid graph (node cache, occupancy source, raycaster and
/// [`RouteConfig`]) and an A* [`PathFinder`]. Routes are returned goal first
/// as [`NodeId`]s; [`world_path`](Self::world_path) turns them into world
/// positions.
///
/// One route is computed at a time. While an incremental search is alive,
/// further requests are refused with a warning and an empty result.
#[derive(Debug)]
pub struct TileRouter<O, R = NoRaycast> {
    graph: GridGraph<O, R>,
    finder: PathFinder<NodeId>,
}

impl<O: CellOccupancy> TileRouter<O> {
    pub fn new(occupancy: O, cell_size: CellSize) -> Self {
        Self {
            graph: GridGraph::new(occupancy, NodeCache::new(cell_size)),
            finder: PathFinder::new(),
        }
    }
}

impl<O: CellOccupancy, R: Raycaster> TileRouter<O, R> {
    /// Probe edges with `raycaster` when the detection mode asks for it.
    pub fn with_raycaster<R2: Raycaster>(self, raycaster: R2) -> TileRouter<O, R2> {
        TileRouter {
            graph: self.graph.replace_raycaster(raycaster),
            finder: self.finder,
        }
    }

    pub fn with_config(mut self, config: RouteConfig) -> Self {
        self.set_config(config);
        self
    }

    pub fn config(&self) -> &RouteConfig {
        self.graph.config()
    }

    /// Settings changes apply from the next step of any search.
    pub fn config_mut(&mut self) -> &mut RouteConfig {
        self.graph.config_mut()
    }

    pub fn set_config(&mut self, config: RouteConfig) {
        *self.graph.config_mut() = config;
    }

    pub fn cell_size(&self) -> CellSize {
        self.graph.cache().cell_size()
    }

    pub fn occupancy(&self) -> &O {
        self.graph.occupancy()
    }

    /// Edit the world. Cached nodes stay valid: passability is queried live.
    pub fn occupancy_mut(&mut self) -> &mut O {
        self.graph.occupancy_mut()
    }

    pub fn raycaster(&self) -> &R {
        self.graph.raycaster()
    }

    pub fn raycaster_mut(&mut self) -> &mut R {
        self.graph.raycaster_mut()
    }

    pub fn cache(&self) -> &NodeCache {
        self.graph.cache()
    }

    /// Whether an incremental search is alive and unfinished.
    pub fn is_computing(&self) -> bool {
        self.finder.is_computing()
    }

    /// How the last blocking route request ended.
    pub fn last_status(&self) -> SearchStatus {
        self.finder.last_status()
    }

    // -----------------------------------------------------------------------
    // Nodes
    // -----------------------------------------------------------------------

    /// The node for the cell containing `pos`, created on first use.
    pub fn resolve_node(&mut self, pos: Vec2) -> Result<NodeId, RouteError> {
        Ok(self.graph.cache_mut().get_or_create_world(pos)?)
    }

    /// The node for grid cell `p`, created on first use.
    pub fn node_at(&mut self, p: Point) -> NodeId {
        self.graph.cache_mut().get_or_create_at(p)
    }

    /// Resolve a handle. `None` if it went stale in a cache clear.
    pub fn node(&self, id: NodeId) -> Option<&GridNode> {
        self.graph.cache().get(id)
    }

    /// Whether a route may enter `id` under the current settings.
    ///
    /// Asked outside of any search, so the blocked-destination exception
    /// never applies.
    pub fn is_passable(&self, id: NodeId) -> Result<bool, RouteError> {
        if !self.graph.cache().is_live(id) {
            return Err(CacheError::StaleNode(id).into());
        }
        Ok(self.graph.is_passable(id))
    }

    /// Drop every cached node. An incremental search in flight is cancelled
    /// on its next [`resume`](Self::resume).
    pub fn clear_node_cache(&mut self) {
        if self.is_computing() {
            log::warn!("node cache cleared while a route search is in flight; it will be cancelled");
        }
        log::debug!("clearing {} cached nodes", self.graph.cache().len());
        self.graph.cache_mut().clear();
    }

    /// World positions of `path` from start to goal. Stale nodes are skipped.
    pub fn world_path(&self, path: &Path<NodeId>) -> Vec<Vec2> {
        path.iter_from_start()
            .filter_map(|&id| self.graph.cache().get(id))
            .map(GridNode::position)
            .collect()
    }

    // -----------------------------------------------------------------------
    // Requests
    // -----------------------------------------------------------------------

    /// Route between two world positions, blocking until done.
    ///
    /// Returns the route goal first, or an empty path when the goal cannot be
    /// reached within the configured budgets or another search is in flight.
    pub fn compute_route(&mut self, start: Vec2, end: Vec2) -> Result<Path<NodeId>, RouteError> {
        if self.refuse_request() {
            return Ok(Path::empty());
        }
        let start = self.resolve_node(start)?;
        let goal = self.resolve_node(end)?;
        Ok(self.run_sync(start, goal))
    }

    /// Route between two nodes, blocking until done.
    pub fn compute_route_between(&mut self, start: NodeId, goal: NodeId) -> Result<Path<NodeId>, RouteError> {
        self.check_live(start)?;
        self.check_live(goal)?;
        if self.refuse_request() {
            return Ok(Path::empty());
        }
        Ok(self.run_sync(start, goal))
    }

    /// Start an incremental route between two world positions.
    ///
    /// Returns `Ok(None)` when another search is in flight. Drive the search
    /// with [`resume`](Self::resume); dropping it frees the router.
    pub fn compute_route_incremental(
        &mut self,
        start: Vec2,
        end: Vec2,
    ) -> Result<Option<RouteSearch>, RouteError> {
        if self.refuse_request() {
            return Ok(None);
        }
        let start = self.resolve_node(start)?;
        let goal = self.resolve_node(end)?;
        self.finder.set_max_iterations(self.config().max_iterations);
        let budget = self.config().request_budget();
        Ok(self.finder.compute_async(start, goal, budget))
    }

    /// Expand at most `max_expansions` more nodes of `search`.
    ///
    /// A search started before the last [`clear_node_cache`](Self::clear_node_cache)
    /// is cancelled instead of resumed.
    pub fn resume(&mut self, search: &mut RouteSearch, max_expansions: usize) -> SearchStep<NodeId> {
        if search.is_running() && !self.graph.cache().is_live(search.goal()) {
            log::warn!("route search outlived a node cache clear; cancelling it");
            search.cancel();
            return SearchStep::Failed(SearchFailure::Cancelled);
        }
        self.graph.set_active_goal(Some(search.goal()));
        let step = search.step(&mut self.graph, max_expansions);
        self.graph.set_active_goal(None);
        step
    }

    /// Hand a finished search back so its storage is reused.
    pub fn recycle(&mut self, search: RouteSearch) {
        self.finder.recycle(search);
    }

    fn refuse_request(&self) -> bool {
        if self.is_computing() {
            log::warn!("route search already in flight; request ignored");
            return true;
        }
        false
    }

    fn check_live(&self, id: NodeId) -> Result<(), CacheError> {
        if self.graph.cache().is_live(id) {
            Ok(())
        } else {
            Err(CacheError::StaleNode(id))
        }
    }

    fn run_sync(&mut self, start: NodeId, goal: NodeId) -> Path<NodeId> {
        self.finder.set_max_iterations(self.config().max_iterations);
        let budget = self.config().request_budget();
        self.graph.set_active_goal(Some(goal));
        let path = self.finder.compute_sync(&mut self.graph, start, goal, budget);
        self.graph.set_active_goal(None);
        path
    }
}
