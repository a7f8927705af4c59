//! **tileroute-core**: grid-space types and world queries for tile route search.
//!
//! This crate provides the pieces a route search needs from the world it
//! runs in: grid geometry, packed cell keys, the grid/world mapping, and the
//! occupancy and raycast queries the search consults. It also ships simple
//! reference implementations of those queries (stacked tile layers and thin
//! wall segments) that hosts can use directly or replace.

pub mod cell;
pub mod geom;
pub mod key;
pub mod layer;
pub mod walls;
pub mod world;

pub use cell::{CellSize, GridError};
pub use geom::{Point, Range};
pub use key::GridKey;
pub use layer::{LayerError, LayerGroup, Tile, TileLayer};
pub use walls::{ThinWalls, Wall};
pub use world::{CellOccupancy, CellState, NoRaycast, RayHit, Raycaster};
