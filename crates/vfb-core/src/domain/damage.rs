//! Damage regions: the parts of an output that need repainting.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in output pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    /// X coordinate of the top-left corner (may be negative before clipping).
    pub x: i32,
    /// Y coordinate of the top-left corner (may be negative before clipping).
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Returns the rightmost X coordinate (exclusive).
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Returns the bottommost Y coordinate (exclusive).
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Intersects this rectangle with `(0, 0, width, height)`.
    ///
    /// Returns `None` when nothing of the rectangle lies on the surface.
    pub fn clip_to(&self, width: u32, height: u32) -> Option<Rect> {
        let left = (self.x as i64).max(0);
        let top = (self.y as i64).max(0);
        let right = self.right().min(width as i64);
        let bottom = self.bottom().min(height as i64);
        if right <= left || bottom <= top {
            return None;
        }
        Some(Rect {
            x: left as i32,
            y: top as i32,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        })
    }
}

/// Accumulated damage for one output.
///
/// Rectangles are kept as submitted; overlapping areas are simply painted
/// twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Damage {
    rects: Vec<Rect>,
}

impl Damage {
    /// No damage.
    pub fn none() -> Self {
        Self::default()
    }

    /// Damage covering a whole `width` x `height` output.
    pub fn full(width: u32, height: u32) -> Self {
        let mut damage = Self::default();
        damage.add(Rect::new(0, 0, width, height));
        damage
    }

    /// Adds a rectangle; empty rectangles are ignored.
    pub fn add(&mut self, rect: Rect) {
        if !rect.is_empty() {
            self.rects.push(rect);
        }
    }

    /// Merges all rectangles of `other` into `self`.
    pub fn extend(&mut self, other: &Damage) {
        self.rects.extend(other.rects.iter().copied());
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Returns the damage restricted to a `width` x `height` surface.
    pub fn clipped(&self, width: u32, height: u32) -> Damage {
        Damage {
            rects: self
                .rects
                .iter()
                .filter_map(|r| r.clip_to(width, height))
                .collect(),
        }
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_keeps_rect_inside_surface() {
        let rect = Rect::new(10, 20, 30, 40);
        assert_eq!(rect.clip_to(800, 600), Some(rect));
    }

    #[test]
    fn test_clip_trims_negative_origin_and_overhang() {
        // Arrange – starts off-surface to the top-left and overhangs the bottom-right
        let rect = Rect::new(-5, -5, 20, 20);

        // Act
        let clipped = rect.clip_to(10, 10);

        // Assert
        assert_eq!(clipped, Some(Rect::new(0, 0, 10, 10)));
    }

    #[test]
    fn test_clip_returns_none_for_rect_outside_surface() {
        assert_eq!(Rect::new(100, 0, 5, 5).clip_to(100, 100), None);
        assert_eq!(Rect::new(-10, 0, 10, 5).clip_to(100, 100), None);
    }

    #[test]
    fn test_full_damage_covers_output() {
        let damage = Damage::full(800, 600);
        assert_eq!(damage.rects(), &[Rect::new(0, 0, 800, 600)]);
    }

    #[test]
    fn test_empty_rects_are_not_recorded() {
        let mut damage = Damage::none();
        damage.add(Rect::new(0, 0, 0, 10));
        assert!(damage.is_empty());
    }

    #[test]
    fn test_clipped_drops_rects_outside_surface() {
        // Arrange
        let mut damage = Damage::none();
        damage.add(Rect::new(0, 0, 4, 4));
        damage.add(Rect::new(50, 50, 4, 4));

        // Act
        let clipped = damage.clipped(10, 10);

        // Assert
        assert_eq!(clipped.rects(), &[Rect::new(0, 0, 4, 4)]);
    }

    #[test]
    fn test_extend_and_clear() {
        let mut a = Damage::full(2, 2);
        a.extend(&Damage::full(4, 4));
        assert_eq!(a.rects().len(), 2);

        a.clear();
        assert!(a.is_empty());
    }
}
