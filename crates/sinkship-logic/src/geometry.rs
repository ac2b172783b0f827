//! 2D vectors and axis-aligned rectangles.
//!
//! Water areas arrive as four world-space corners (the way a UI rect reports
//! them), so `Rect::from_corners` accepts any corner order. Containment is
//! edge-inclusive: a point lying exactly on an edge or corner is inside.

use serde::{Deserialize, Serialize};

/// 2D position / displacement in world units.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Build from two opposite corners in any order.
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vec2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn from_center_size(center: Vec2, width: f32, height: f32) -> Self {
        let hw = width.abs() / 2.0;
        let hh = height.abs() / 2.0;
        Self {
            min: Vec2::new(center.x - hw, center.y - hh),
            max: Vec2::new(center.x + hw, center.y + hh),
        }
    }

    /// Bounding rectangle of four corners (bottom-left, top-left, top-right,
    /// bottom-right in the usual winding, but any order works).
    pub fn from_corners(corners: [Vec2; 4]) -> Self {
        let mut min = corners[0];
        let mut max = corners[0];
        for c in &corners[1..] {
            min.x = min.x.min(c.x);
            min.y = min.y.min(c.y);
            max.x = max.x.max(c.x);
            max.y = max.y.max(c.y);
        }
        Self { min, max }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Edge-inclusive point test.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

/// True if `point` lies inside (or on the edge of) any of `rects`.
pub fn inside_any(rects: &[Rect], point: Vec2) -> bool {
    rects.iter().any(|r| r.contains(point))
}
