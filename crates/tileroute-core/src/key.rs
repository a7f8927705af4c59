//! [`GridKey`]: a packed identifier for one grid cell.

use std::fmt;

use crate::geom::Point;

/// Both grid coordinates of a cell packed into a `u64`.
///
/// `x` occupies the high 32 bits and `y` the low 32 bits, each stored as its
/// two's-complement bit pattern. Every `(i32, i32)` pair maps to a distinct
/// key and [`unpack`](Self::unpack) is the exact inverse of
/// [`pack`](Self::pack), so keys never collide and need no range checks.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridKey(pub u64);

impl GridKey {
    /// Pack a pair of grid coordinates.
    #[inline]
    pub const fn pack(x: i32, y: i32) -> Self {
        Self(((x as u32 as u64) << 32) | (y as u32 as u64))
    }

    /// Unpack into `(x, y)`.
    #[inline]
    pub const fn unpack(self) -> (i32, i32) {
        ((self.0 >> 32) as u32 as i32, self.0 as u32 as i32)
    }

    /// Grid X coordinate.
    #[inline]
    pub const fn x(self) -> i32 {
        (self.0 >> 32) as u32 as i32
    }

    /// Grid Y coordinate.
    #[inline]
    pub const fn y(self) -> i32 {
        self.0 as u32 as i32
    }

    /// The cell as a [`Point`].
    #[inline]
    pub const fn point(self) -> Point {
        Point::new(self.x(), self.y())
    }
}

impl From<Point> for GridKey {
    #[inline]
    fn from(p: Point) -> Self {
        Self::pack(p.x, p.y)
    }
}

impl From<GridKey> for Point {
    #[inline]
    fn from(k: GridKey) -> Self {
        k.point()
    }
}

impl fmt::Display for GridKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}{}", self.0, self.point())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn pack_unpack_signed() {
        for &(x, y) in &[
            (0, 0),
            (1, -1),
            (-1, 1),
            (-32768, 32767),
            (70_000, -70_000),
            (i32::MIN, i32::MAX),
        ] {
            let k = GridKey::pack(x, y);
            assert_eq!(k.unpack(), (x, y));
            assert_eq!(k.point(), Point::new(x, y));
        }
    }

    #[test]
    fn keys_do_not_collide_across_sign_and_width() {
        // These pairs collide under a naive two-i16 pack.
        let pts = [
            Point::new(0, -1),
            Point::new(-1, -1),
            Point::new(65_536, 0),
            Point::new(0, 0),
            Point::new(0, 65_535),
            Point::new(1, -65_536),
        ];
        let keys: HashSet<GridKey> = pts.iter().map(|&p| GridKey::from(p)).collect();
        assert_eq!(keys.len(), pts.len());
    }

    #[test]
    fn point_conversion_roundtrip() {
        let p = Point::new(-12, 34);
        let k: GridKey = p.into();
        let back: Point = k.into();
        assert_eq!(back, p);
    }
}
