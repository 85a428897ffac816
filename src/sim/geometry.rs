//! Axis-aligned rectangles, biome walls and line-of-sight
//!
//! Occlusion is a pure query over the live wall set: a sight line is blocked
//! when it crosses any edge of any wall rectangle. Touching an edge or running
//! collinear along it counts as blocked.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::EntityId;

/// Axis-aligned rectangle given by its top-left corner and size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanning two corners
    pub fn from_corners(min: Vec2, max: Vec2) -> Self {
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Strict interior test
    pub fn contains(&self, p: Vec2) -> bool {
        p.x > self.x && p.x < self.x + self.width && p.y > self.y && p.y < self.y + self.height
    }

    /// Closest point of the rectangle to `p`
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min(), self.max())
    }

    /// Whether a circle overlaps this rectangle
    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        self.closest_point(center).distance_squared(center) < radius * radius
    }

    /// Clamp a circle's center so the whole circle stays inside
    ///
    /// Falls back to the center axis when the rectangle is narrower than the
    /// circle.
    pub fn clamp_circle(&self, center: Vec2, radius: f32) -> Vec2 {
        let clamp_axis = |v: f32, lo: f32, hi: f32| {
            if lo > hi { (lo + hi) * 0.5 } else { v.clamp(lo, hi) }
        };
        Vec2::new(
            clamp_axis(center.x, self.x + radius, self.x + self.width - radius),
            clamp_axis(center.y, self.y + radius, self.y + self.height - radius),
        )
    }

    /// The four edges as segments: top, bottom, left, right
    pub fn edges(&self) -> [(Vec2, Vec2); 4] {
        let tl = self.min();
        let br = self.max();
        let tr = Vec2::new(br.x, tl.y);
        let bl = Vec2::new(tl.x, br.y);
        [(tl, tr), (bl, br), (tl, bl), (tr, br)]
    }
}

/// A biome-dividing wall
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wall {
    pub id: EntityId,
    pub rect: Rect,
    /// Unlock tier; removed as a group when the matching boss falls
    pub tier: u8,
}

/// Turn direction of the ordered triple (p, q, r)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Collinear,
    Clockwise,
    CounterClockwise,
}

fn orientation(p: Vec2, q: Vec2, r: Vec2) -> Orientation {
    let val = (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y);
    if val == 0.0 {
        Orientation::Collinear
    } else if val > 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::CounterClockwise
    }
}

/// Whether `q` lies within the bounding box of segment `p`-`r`
fn on_segment(p: Vec2, q: Vec2, r: Vec2) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

/// Segment intersection test, counting touching and collinear overlap as a hit
pub fn segments_intersect(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> bool {
    let o1 = orientation(p1, p2, p3);
    let o2 = orientation(p1, p2, p4);
    let o3 = orientation(p3, p4, p1);
    let o4 = orientation(p3, p4, p2);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == Orientation::Collinear && on_segment(p1, p3, p2))
        || (o2 == Orientation::Collinear && on_segment(p1, p4, p2))
        || (o3 == Orientation::Collinear && on_segment(p3, p1, p4))
        || (o4 == Orientation::Collinear && on_segment(p3, p2, p4))
}

/// Whether the straight line from `a` to `b` crosses any wall edge
pub fn line_obstructed(a: Vec2, b: Vec2, walls: &[Wall]) -> bool {
    walls.iter().any(|wall| {
        wall.rect
            .edges()
            .iter()
            .any(|&(e1, e2)| segments_intersect(a, b, e1, e2))
    })
}
