//! Fixed 8-neighbour slot layout of a grid node.
//!
//! Slots run row-major over the 3x3 block around a cell, centre excluded,
//! with Y growing down:
//!
//! ```text
//! 0 1 2      NW N NE
//! 3 X 4      W  X  E
//! 5 6 7      SW S SE
//! ```

use tileroute_core::Point;

/// Number of neighbour slots of a grid node.
pub const NEIGHBOR_COUNT: usize = 8;

pub const NW: usize = 0;
pub const N: usize = 1;
pub const NE: usize = 2;
pub const W: usize = 3;
pub const E: usize = 4;
pub const SW: usize = 5;
pub const S: usize = 6;
pub const SE: usize = 7;

/// Grid offset of each slot.
pub const OFFSETS: [Point; NEIGHBOR_COUNT] = [
    Point::new(-1, -1),
    Point::new(0, -1),
    Point::new(1, -1),
    Point::new(-1, 0),
    Point::new(1, 0),
    Point::new(-1, 1),
    Point::new(0, 1),
    Point::new(1, 1),
];

/// Whether `slot` is a diagonal slot (0, 2, 5 or 7).
#[inline]
pub const fn is_diagonal(slot: usize) -> bool {
    matches!(slot, NW | NE | SW | SE)
}

/// The two orthogonal slots flanking a diagonal slot, `None` for
/// orthogonal slots.
#[inline]
pub const fn flanks(slot: usize) -> Option<(usize, usize)> {
    match slot {
        NW => Some((N, W)),
        NE => Some((N, E)),
        SW => Some((S, W)),
        SE => Some((S, E)),
        _ => None,
    }
}
