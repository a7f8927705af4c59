//! Tile layers: a reference [`CellOccupancy`] built from stacked tile grids.
//!
//! A [`TileLayer`] covers a rectangle of grid cells, each holding an optional
//! [`Tile`]. A [`LayerGroup`] stacks layers the way a tilemap editor does and
//! answers occupancy queries across all of them: a cell is blocked when any
//! collidable layer has a solid tile there, open when at least one collidable
//! layer covers it, and has no data otherwise.

use std::fmt;

use crate::geom::{Point, Range};
use crate::world::{CellOccupancy, CellState};

/// A tile placed in a layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    pub id: u32,
    /// Whether the tile carries a collider.
    pub solid: bool,
}

impl Tile {
    /// A walkable floor tile.
    pub const FLOOR: Self = Self { id: 0, solid: false };
    /// A solid wall tile.
    pub const WALL: Self = Self { id: 1, solid: true };
}

// ---------------------------------------------------------------------------
// TileLayer
// ---------------------------------------------------------------------------

/// A rectangular grid of optional tiles.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileLayer {
    bounds: Range,
    tiles: Vec<Option<Tile>>,
    collidable: bool,
}

impl TileLayer {
    /// Create a collidable layer covering `bounds` with no tiles.
    pub fn new(bounds: Range) -> Self {
        Self {
            bounds,
            tiles: vec![None; bounds.len()],
            collidable: true,
        }
    }

    /// Create a collidable layer covering `bounds` filled with `tile`.
    pub fn filled(bounds: Range, tile: Tile) -> Self {
        Self {
            bounds,
            tiles: vec![Some(tile); bounds.len()],
            collidable: true,
        }
    }

    /// Build a layer from ASCII art whose top-left character is at `origin`.
    ///
    /// `#` is a wall, `.` a floor tile and a space a covered cell without a
    /// tile. Leading and trailing newlines are ignored; every remaining line
    /// must have the same width.
    pub fn from_ascii(origin: Point, s: &str) -> Result<Self, LayerError> {
        let s = s.trim_matches('\n');
        let lines: Vec<&str> = s.lines().collect();
        let width = lines.first().map_or(0, |l| l.chars().count());
        if lines.iter().any(|l| l.chars().count() != width) {
            return Err(LayerError::InconsistentSize(s.to_string()));
        }

        let size = Point::new(width as i32, lines.len() as i32);
        let bounds = Range::new(origin.x, origin.y, origin.x + size.x, origin.y + size.y);
        let mut layer = Self::new(bounds);
        for (y, line) in lines.iter().enumerate() {
            for (x, ch) in line.chars().enumerate() {
                let tile = match ch {
                    '#' => Some(Tile::WALL),
                    '.' => Some(Tile::FLOOR),
                    ' ' => None,
                    _ => {
                        return Err(LayerError::InvalidRune {
                            ch,
                            pos: Point::new(x as i32, y as i32),
                            content: s.to_string(),
                        });
                    }
                };
                layer.set_tile(origin.shift(x as i32, y as i32), tile);
            }
        }
        Ok(layer)
    }

    /// The cells covered by the layer.
    #[inline]
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    /// Whether the layer takes part in occupancy queries.
    #[inline]
    pub fn is_collidable(&self) -> bool {
        self.collidable
    }

    /// Include or exclude the layer from occupancy queries.
    pub fn set_collidable(&mut self, collidable: bool) {
        self.collidable = collidable;
    }

    #[inline]
    fn index(&self, p: Point) -> Option<usize> {
        if !self.bounds.contains(p) {
            return None;
        }
        let x = (p.x - self.bounds.min.x) as usize;
        let y = (p.y - self.bounds.min.y) as usize;
        Some(y * self.bounds.width() as usize + x)
    }

    /// The tile at `p`, if any.
    pub fn tile(&self, p: Point) -> Option<Tile> {
        self.index(p).and_then(|i| self.tiles[i])
    }

    /// Place or remove a tile. Returns `false` when `p` is outside the layer.
    pub fn set_tile(&mut self, p: Point, tile: Option<Tile>) -> bool {
        match self.index(p) {
            Some(i) => {
                self.tiles[i] = tile;
                true
            }
            None => false,
        }
    }
}

impl CellOccupancy for TileLayer {
    fn cell_state(&self, p: Point) -> CellState {
        if !self.collidable || !self.bounds.contains(p) {
            return CellState::NoData;
        }
        match self.tile(p) {
            Some(t) if t.solid => CellState::Blocked,
            _ => CellState::Open,
        }
    }
}

// ---------------------------------------------------------------------------
// LayerGroup
// ---------------------------------------------------------------------------

/// A stack of tile layers queried together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerGroup {
    layers: Vec<TileLayer>,
}

impl LayerGroup {
    /// An empty group: every cell has no data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer on top of the stack.
    pub fn push(&mut self, layer: TileLayer) {
        self.layers.push(layer);
    }

    /// Builder form of [`push`](Self::push).
    pub fn with_layer(mut self, layer: TileLayer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn layers(&self) -> &[TileLayer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [TileLayer] {
        &mut self.layers
    }
}

impl From<TileLayer> for LayerGroup {
    fn from(layer: TileLayer) -> Self {
        Self {
            layers: vec![layer],
        }
    }
}

impl CellOccupancy for LayerGroup {
    fn cell_state(&self, p: Point) -> CellState {
        let mut state = CellState::NoData;
        for layer in &self.layers {
            match layer.cell_state(p) {
                CellState::Blocked => return CellState::Blocked,
                CellState::Open => state = CellState::Open,
                CellState::NoData => {}
            }
        }
        state
    }
}

/// Errors that can occur when parsing an ASCII layer.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerError {
    /// Lines have inconsistent widths.
    InconsistentSize(String),
    /// A character other than `#`, `.` or space was found.
    InvalidRune {
        ch: char,
        pos: Point,
        content: String,
    },
}

impl fmt::Display for LayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InconsistentSize(s) => write!(f, "layer: inconsistent size:\n{s}"),
            Self::InvalidRune { ch, pos, content } => {
                write!(
                    f,
                    "layer contains invalid rune \u{201c}{ch}\u{201d} at ({}, {}):\n{content}",
                    pos.x, pos.y
                )
            }
        }
    }
}

impl std::error::Error for LayerError {}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn layer_round_trip() {
        let layer = TileLayer::from_ascii(Point::new(2, -1), "#.\n. ").unwrap();
        let json = serde_json::to_string(&layer).unwrap();
        let back: TileLayer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, layer);
        assert_eq!(back.tile(Point::new(3, 0)), None);
    }
}
