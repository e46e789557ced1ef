//! Collision detection
//!
//! Everything collides as an axis-aligned box. Two extra checks cover the
//! cases a plain overlap test misses between ticks:
//! - swap: two tile movers that exchanged cells in the same tick
//! - sweep: a fast projectile whose box jumped over its target

use glam::Vec2;

use super::entity::{Body, Walker};
use super::grid::TilePos;

/// Axis-aligned bounding box in world units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Unit box covering one grid tile
    pub fn tile(pos: TilePos) -> Self {
        let min = Vec2::new(pos.x as f32, pos.y as f32);
        Self {
            min,
            max: min + Vec2::ONE,
        }
    }

    /// Strict overlap: boxes that only share an edge do not collide
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Strictly inside; points on the edge are out
    pub fn contains(&self, p: Vec2) -> bool {
        self.min.x < p.x && p.x < self.max.x && self.min.y < p.y && p.y < self.max.y
    }

    /// Smallest box containing both
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// Anything that occupies a box now and occupied one last tick
pub trait Collider {
    fn bounds(&self) -> Aabb;
    fn prev_bounds(&self) -> Aabb;

    /// Area covered while moving from the previous to the current position
    fn swept_bounds(&self) -> Aabb {
        self.bounds().union(&self.prev_bounds())
    }
}

impl Collider for Walker {
    fn bounds(&self) -> Aabb {
        Aabb::tile(self.pos)
    }

    fn prev_bounds(&self) -> Aabb {
        Aabb::tile(self.prev_pos)
    }
}

impl Collider for Body {
    fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, self.size)
    }

    fn prev_bounds(&self) -> Aabb {
        Aabb::from_center(self.prev_pos, self.size)
    }
}

/// Current-position overlap
pub fn overlapping(a: &impl Collider, b: &impl Collider) -> bool {
    a.bounds().overlaps(&b.bounds())
}

/// Overlap where `fast` is tested over its whole path this tick
pub fn swept_overlapping(fast: &impl Collider, target: &impl Collider) -> bool {
    fast.swept_bounds().overlaps(&target.bounds())
}

/// Two movers exchanged positions between ticks
pub fn swapped<P: PartialEq>(a_pos: P, a_prev: P, b_pos: P, b_prev: P) -> bool {
    a_pos == b_prev && b_pos == a_prev && a_pos != a_prev
}

/// Tile contact: same cell now, or passed through each other
pub fn walkers_touch(a: &Walker, b: &Walker) -> bool {
    overlapping(a, b) || swapped(a.pos, a.prev_pos, b.pos, b.prev_pos)
}
