//! Route search settings: [`Heuristic`], [`DetectionMode`] and [`RouteConfig`].

use std::ops::{BitAnd, BitOr};

use tileroute_core::Point;

use crate::distance;

/// Cost of an orthogonal step before the node cost factor.
pub const ORTHOGONAL_COST: f32 = 1.0;
/// Cost of a diagonal step before the node cost factor.
pub const DIAGONAL_COST: f32 = std::f32::consts::SQRT_2;

// ---------------------------------------------------------------------------
// Heuristic
// ---------------------------------------------------------------------------

/// Remaining-cost estimate used to order the frontier.
///
/// `Manhattan` and `Diagonal` measure in units of 10 per orthogonal step and
/// 14 per diagonal step while edges cost 1 and √2. They overestimate on
/// purpose: the search behaves close to greedy best-first and expands far
/// fewer nodes, at the price of routes that are not always shortest. The
/// constants are part of the observable route shapes and must not be
/// rescaled.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Heuristic {
    /// Always 0: uniform-cost search, shortest routes, most expansions.
    None,
    /// `10 * (|dx| + |dy|)`.
    #[default]
    Manhattan,
    /// `14 * min(|dx|, |dy|) + 10 * (max - min)`.
    Diagonal,
}

impl Heuristic {
    /// Estimate from grid cell `from` to grid cell `to`.
    #[inline]
    pub fn estimate(self, from: Point, to: Point) -> f32 {
        match self {
            Self::None => 0.0,
            Self::Manhattan => 10.0 * distance::manhattan(from, to) as f32,
            Self::Diagonal => {
                let (diag, straight) = distance::octile(from, to);
                14.0 * diag as f32 + 10.0 * straight as f32
            }
        }
    }
}

// ---------------------------------------------------------------------------
// DetectionMode
// ---------------------------------------------------------------------------

/// Bitmask selecting how passability and edge costs are evaluated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DetectionMode(pub u8);

impl DetectionMode {
    pub const NONE: Self = Self(0);
    /// Query cell occupancy for every node.
    pub const CELL_CHECK: Self = Self(1 << 0);
    /// Probe every edge with a 2D raycast.
    pub const RAYCAST_2D: Self = Self(1 << 1);
    /// Probe every edge with a 3D raycast. Ignored when `RAYCAST_2D` is set.
    pub const RAYCAST_3D: Self = Self(1 << 2);

    /// Whether this mode contains all the bits from `other`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Whether either raycast bit is set.
    #[inline]
    pub const fn uses_raycast(self) -> bool {
        self.0 & (Self::RAYCAST_2D.0 | Self::RAYCAST_3D.0) != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl Default for DetectionMode {
    fn default() -> Self {
        Self::CELL_CHECK
    }
}

impl BitOr for DetectionMode {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for DetectionMode {
    type Output = Self;
    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

// ---------------------------------------------------------------------------
// RouteConfig
// ---------------------------------------------------------------------------

/// Settings read by every route search.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RouteConfig {
    pub heuristic: Heuristic,
    /// Expansion budget of one route request. 0 means unbounded.
    pub max_distance: u32,
    pub detection_mode: DetectionMode,
    pub allow_diagonals: bool,
    /// Let the goal cell be blocked, to walk up to a door or a chest.
    pub allow_blocked_destination: bool,
    /// Collision layers hit by raycast probes.
    pub raycast_layer_mask: u32,
    /// Persistent expansion cap across all requests. `<= 0` means unbounded.
    pub max_iterations: i32,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            heuristic: Heuristic::Manhattan,
            max_distance: 0,
            detection_mode: DetectionMode::CELL_CHECK,
            allow_diagonals: true,
            allow_blocked_destination: false,
            raycast_layer_mask: u32::MAX,
            max_iterations: 0,
        }
    }
}

impl RouteConfig {
    pub fn with_heuristic(mut self, heuristic: Heuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn with_max_distance(mut self, max_distance: u32) -> Self {
        self.max_distance = max_distance;
        self
    }

    pub fn with_detection_mode(mut self, mode: DetectionMode) -> Self {
        self.detection_mode = mode;
        self
    }

    pub fn with_diagonals(mut self, allow: bool) -> Self {
        self.allow_diagonals = allow;
        self
    }

    pub fn with_blocked_destination(mut self, allow: bool) -> Self {
        self.allow_blocked_destination = allow;
        self
    }

    pub fn with_raycast_layer_mask(mut self, mask: u32) -> Self {
        self.raycast_layer_mask = mask;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: i32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Per-request expansion budget derived from `max_distance`.
    #[inline]
    pub fn request_budget(&self) -> usize {
        if self.max_distance > 0 {
            self.max_distance as usize
        } else {
            usize::MAX
        }
    }
}
