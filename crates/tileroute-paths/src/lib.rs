//! A* route search for tile worlds.
//!
//! This crate finds routes across 8-connected tile grids:
//!
//! - **Grid graph** with lazily created nodes ([`GridGraph`], [`NodeCache`])
//! - **A\*** with blocking and incremental modes ([`PathFinder`], [`Search`])
//! - **World-space requests** with collision probing ([`TileRouter`])
//!
//! Diagonal moves never cut corners: both orthogonal cells flanking a
//! diagonal step must be open. Cell occupancy comes from any
//! [`CellOccupancy`](tileroute_core::CellOccupancy) and edge probes from any
//! [`Raycaster`](tileroute_core::Raycaster), as selected by [`DetectionMode`].
//!
//! # Trait hierarchy
//!
//! | Trait | Provides |
//! |---|---|
//! | [`Pather`] | node positions and neighbour slots |
//! | [`WeightedPather`] : [`Pather`] | passability and edge costs |
//! | [`AstarPather`] : [`WeightedPather`] | the remaining-cost estimate |
//!
//! [`PathFinder`] searches any [`AstarPather`]; [`GridGraph`] is the tile
//! grid implementation.

mod cache;
mod config;
mod distance;
mod graph;
pub mod neighbors;
mod node;
mod path;
mod pathfinder;
mod router;
mod search;
mod traits;

pub use cache::{CacheError, NodeCache, NodeId};
pub use config::{DIAGONAL_COST, DetectionMode, Heuristic, ORTHOGONAL_COST, RouteConfig};
pub use distance::{manhattan, octile};
pub use graph::GridGraph;
pub use node::GridNode;
pub use path::Path;
pub use pathfinder::PathFinder;
pub use router::{RouteError, RouteSearch, TileRouter};
pub use search::{Search, SearchFailure, SearchStatus, SearchStep};
pub use traits::{AstarPather, INFINITE_COST, Pather, WeightedPather};
