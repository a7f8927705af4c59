//! The [`CellSize`] type: the mapping between grid cells and world space.

use std::fmt;

use glam::Vec2;

use crate::geom::Point;

/// Slack added before flooring so positions sitting exactly on a cell edge
/// land in the cell they start.
const EDGE_EPSILON: f32 = 1e-5;

/// World-space size of one grid cell.
///
/// Cell `(x, y)` covers `[x * w, (x + 1) * w) × [y * h, (y + 1) * h)` and its
/// world position is the centre of that rectangle.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellSize(Vec2);

impl CellSize {
    /// Unit cells.
    pub const ONE: Self = Self(Vec2::ONE);

    /// Create a cell size. Both components must be finite and positive.
    pub fn new(size: Vec2) -> Result<Self, GridError> {
        if size.is_finite() && size.x > 0.0 && size.y > 0.0 {
            Ok(Self(size))
        } else {
            Err(GridError::InvalidCellSize(size))
        }
    }

    /// The size as a vector.
    #[inline]
    pub fn get(self) -> Vec2 {
        self.0
    }

    /// World position (cell centre) of a grid cell.
    #[inline]
    pub fn to_world(self, p: Point) -> Vec2 {
        Vec2::new(
            (p.x as f32 + 0.5) * self.0.x,
            (p.y as f32 + 0.5) * self.0.y,
        )
    }

    /// Grid cell containing a world position.
    ///
    /// Fails for non-finite positions and for positions whose cell would not
    /// fit in `i32` coordinates.
    pub fn to_grid(self, pos: Vec2) -> Result<Point, GridError> {
        let fx = ((pos.x + EDGE_EPSILON) / self.0.x).floor();
        let fy = ((pos.y + EDGE_EPSILON) / self.0.y).floor();
        match (to_coord(fx), to_coord(fy)) {
            (Some(x), Some(y)) => Ok(Point::new(x, y)),
            _ => Err(GridError::PositionOutOfRange(pos)),
        }
    }
}

impl Default for CellSize {
    fn default() -> Self {
        Self::ONE
    }
}

fn to_coord(v: f32) -> Option<i32> {
    // i32::MAX as f32 rounds up to 2^31, hence the strict upper bound.
    if v >= i32::MIN as f32 && v < i32::MAX as f32 {
        Some(v as i32)
    } else {
        None
    }
}

/// Errors raised when converting between world and grid space.
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// The cell size has a zero, negative or non-finite component.
    InvalidCellSize(Vec2),
    /// The position is not finite or maps outside the `i32` grid.
    PositionOutOfRange(Vec2),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCellSize(s) => write!(f, "invalid cell size {s}"),
            Self::PositionOutOfRange(p) => {
                write!(f, "world position {p} is outside the addressable grid")
            }
        }
    }
}

impl std::error::Error for GridError {}
