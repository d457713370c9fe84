//! Core type definitions used throughout the codebase

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Index of a mesh partition (material slot) that owns its own mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubmeshIndex(pub usize);

/// Axis-aligned UV rectangle, origin at the bottom-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UvRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl UvRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Rect of the given size centered on `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self {
            x: center.x - size.x * 0.5,
            y: center.y - size.y * 0.5,
            width: size.x,
            height: size.y,
        }
    }

    /// Half-open containment: `[x, x + width) × [y, y + height)`
    pub fn contains(&self, uv: Vec2) -> bool {
        uv.x >= self.x
            && uv.x < self.x + self.width
            && uv.y >= self.y
            && uv.y < self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Corners in counter-clockwise order starting at the origin
    pub fn corners(&self) -> [[f32; 2]; 4] {
        let x2 = self.x + self.width;
        let y2 = self.y + self.height;
        [[self.x, self.y], [x2, self.y], [x2, y2], [self.x, y2]]
    }
}

/// UV coordinate of the center of raster cell `(x, y)`
#[inline]
pub fn cell_center_uv(x: usize, y: usize, resolution: usize) -> Vec2 {
    let res = resolution as f32;
    Vec2::new((x as f32 + 0.5) / res, (y as f32 + 0.5) / res)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_half_open() {
        let rect = UvRect::new(0.25, 0.25, 0.5, 0.5);
        assert!(rect.contains(Vec2::new(0.25, 0.25)));
        assert!(rect.contains(Vec2::new(0.5, 0.7)));
        assert!(!rect.contains(Vec2::new(0.75, 0.5)));
        assert!(!rect.contains(Vec2::new(0.5, 0.75)));
    }

    #[test]
    fn test_rect_centered() {
        let rect = UvRect::centered(Vec2::new(0.5, 0.5), Vec2::new(0.2, 0.4));
        assert!((rect.x - 0.4).abs() < 1e-6);
        assert!((rect.y - 0.3).abs() < 1e-6);
        assert!((rect.center() - Vec2::new(0.5, 0.5)).length() < 1e-6);
    }

    #[test]
    fn test_cell_center_uv() {
        assert_eq!(cell_center_uv(0, 0, 4), Vec2::new(0.125, 0.125));
        assert_eq!(cell_center_uv(3, 1, 4), Vec2::new(0.875, 0.375));
    }
}
