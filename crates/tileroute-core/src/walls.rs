//! Thin wall segments: a reference [`Raycaster`].
//!
//! Walls are zero-width line segments in world space. They can sit on the
//! edge shared by two open cells and block movement between them without
//! marking either cell as occupied.

use glam::Vec2;

use crate::world::{RayHit, Raycaster};

/// A wall segment on one or more collision layers.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Wall {
    pub a: Vec2,
    pub b: Vec2,
    pub layer: u32,
}

/// A set of [`Wall`]s.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ThinWalls {
    walls: Vec<Wall>,
}

impl ThinWalls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a wall on layer bit 0.
    pub fn add(&mut self, a: Vec2, b: Vec2) {
        self.add_on_layer(a, b, 1);
    }

    /// Add a wall on the given layer bits.
    pub fn add_on_layer(&mut self, a: Vec2, b: Vec2, layer: u32) {
        self.walls.push(Wall { a, b, layer });
    }

    /// Builder form of [`add`](Self::add).
    pub fn with_wall(mut self, a: Vec2, b: Vec2) -> Self {
        self.add(a, b);
        self
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn clear(&mut self) {
        self.walls.clear();
    }
}

impl Raycaster for ThinWalls {
    fn raycast_2d(&self, origin: Vec2, target: Vec2, layer_mask: u32, hits: &mut Vec<RayHit>) {
        let d = target - origin;
        let len = d.length();
        for w in &self.walls {
            if w.layer & layer_mask == 0 {
                continue;
            }
            let e = w.b - w.a;
            let denom = d.perp_dot(e);
            if denom.abs() <= f32::EPSILON {
                // Parallel or degenerate.
                continue;
            }
            let ap = w.a - origin;
            let t = ap.perp_dot(e) / denom;
            let u = ap.perp_dot(d) / denom;
            if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
                hits.push(RayHit {
                    distance: t * len,
                    layer: w.layer,
                });
            }
        }
    }
}
