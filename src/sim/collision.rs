//! Collision primitives
//!
//! Every template resolves contacts with axis-aligned rectangles, except the
//! whack-a-mole tap test which uses a circle.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_pos(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Strict AABB overlap; touching edges do not count
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        aabb_overlap(self, other)
    }

    /// Whether this rect lies inside `bounds` grown by its own size on each side
    pub fn within_extended(&self, bounds: &Rect) -> bool {
        self.x >= bounds.x - self.w
            && self.right() <= bounds.right() + self.w
            && self.y >= bounds.y - self.h
            && self.bottom() <= bounds.bottom() + self.h
    }
}

/// `a.x < b.x+b.w && a.x+a.w > b.x && a.y < b.y+b.h && a.y+a.h > b.y`
#[inline]
pub fn aabb_overlap(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

/// Point strictly inside a circle
#[inline]
pub fn point_in_circle(point: Vec2, center: Vec2, radius: f32) -> bool {
    point.distance(center) < radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(aabb_overlap(&a, &Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(aabb_overlap(&a, &Rect::new(-5.0, 2.0, 6.0, 1.0)));
        // Touching edges
        assert!(!aabb_overlap(&a, &Rect::new(10.0, 0.0, 5.0, 5.0)));
        assert!(!aabb_overlap(&a, &Rect::new(0.0, 10.0, 5.0, 5.0)));
        // Apart
        assert!(!aabb_overlap(&a, &Rect::new(20.0, 20.0, 1.0, 1.0)));
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let a = Rect::new(3.0, 4.0, 34.0, 24.0);
        let b = Rect::new(30.0, 0.0, 52.0, 10.0);
        assert_eq!(a.overlaps(&b), b.overlaps(&a));
    }

    #[test]
    fn test_within_extended() {
        let field = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(Rect::new(-20.0, 50.0, 20.0, 20.0).within_extended(&field));
        assert!(!Rect::new(-21.0, 50.0, 20.0, 20.0).within_extended(&field));
        assert!(Rect::new(90.0, 95.0, 10.0, 10.0).within_extended(&field));
    }

    #[test]
    fn test_point_in_circle() {
        let c = Vec2::new(100.0, 100.0);
        assert!(point_in_circle(Vec2::new(120.0, 120.0), c, 40.0));
        assert!(!point_in_circle(Vec2::new(140.0, 100.0), c, 40.0));
    }
}
