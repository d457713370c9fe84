//! Brush requests submitted to the mask store
//!
//! A brush is fully described by its UV footprint, shape, treatment kind and
//! burn intensity. Nothing about the tool that produced it leaks past this
//! module: the store only sees the blend target implied by `TreatmentKind`.

pub mod footprint;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::types::SubmeshIndex;

pub use footprint::{
    FootprintCalculator, FootprintMode, SurfaceHit, SurfaceProbe, TangentData,
};

/// Treatment applied by a stroke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreatmentKind {
    /// Shortens hair to stubble
    Shaver,
    /// Removes hair completely and may leave burn
    Laser,
}

impl TreatmentKind {
    /// Treatment level this kind blends toward
    pub fn target_level(&self, stubble_level: f32) -> f32 {
        match self {
            TreatmentKind::Shaver => stubble_level,
            TreatmentKind::Laser => 0.0,
        }
    }

    /// Does this kind write the burn channel?
    pub fn burns(&self) -> bool {
        matches!(self, TreatmentKind::Laser)
    }
}

/// Footprint shape of a stroke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BrushShape {
    /// Oriented rectangle
    #[default]
    Rect,
    /// Circle with a diameter of the larger footprint extent
    Circle,
}

/// Oriented footprint of a brush in UV space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UvFootprint {
    pub center: Vec2,
    pub size: Vec2,
    /// Rotation of the footprint's width axis from the U axis (radians)
    pub angle: f32,
}

impl UvFootprint {
    pub fn new(center: Vec2, size: Vec2, angle: f32) -> Self {
        Self { center, size, angle }
    }

    /// Axis-aligned footprint
    pub fn axis_aligned(center: Vec2, size: Vec2) -> Self {
        Self::new(center, size, 0.0)
    }

    /// Finite center and angle with a strictly positive finite size
    pub fn is_valid(&self) -> bool {
        self.center.is_finite()
            && self.angle.is_finite()
            && self.size.is_finite()
            && self.size.x > 0.0
            && self.size.y > 0.0
    }

    /// Does the footprint cover a UV point?
    pub fn contains(&self, uv: Vec2, shape: BrushShape) -> bool {
        let offset = uv - self.center;
        match shape {
            BrushShape::Rect => {
                // Rotate by -angle into the footprint's local frame
                let (sin, cos) = self.angle.sin_cos();
                let local_x = offset.x * cos + offset.y * sin;
                let local_y = -offset.x * sin + offset.y * cos;
                local_x.abs() <= self.size.x * 0.5 && local_y.abs() <= self.size.y * 0.5
            }
            BrushShape::Circle => offset.length() <= self.radius(),
        }
    }

    /// Radius used by circular brushes
    pub fn radius(&self) -> f32 {
        self.size.x.max(self.size.y) * 0.5
    }

    /// UV half-extents of the axis-aligned box enclosing the footprint
    pub fn bounding_half_extents(&self, shape: BrushShape) -> Vec2 {
        match shape {
            BrushShape::Rect => {
                let (sin, cos) = self.angle.sin_cos();
                let half = self.size * 0.5;
                Vec2::new(
                    (half.x * cos).abs() + (half.y * sin).abs(),
                    (half.x * sin).abs() + (half.y * cos).abs(),
                )
            }
            BrushShape::Circle => Vec2::splat(self.radius()),
        }
    }

    /// Inclusive pixel range `(x0, y0, x1, y1)` that can intersect the footprint
    ///
    /// `None` when the footprint lies entirely outside the raster.
    pub fn pixel_bounds(&self, shape: BrushShape, resolution: usize) -> Option<(usize, usize, usize, usize)> {
        if resolution == 0 {
            return None;
        }
        let half = self.bounding_half_extents(shape);
        let res = resolution as f32;
        let min = ((self.center - half) * res).floor();
        let max = ((self.center + half) * res).floor();
        let limit = resolution as f32 - 1.0;
        if max.x < 0.0 || max.y < 0.0 || min.x > limit || min.y > limit {
            return None;
        }
        Some((
            min.x.clamp(0.0, limit) as usize,
            min.y.clamp(0.0, limit) as usize,
            max.x.clamp(0.0, limit) as usize,
            max.y.clamp(0.0, limit) as usize,
        ))
    }
}

/// One brush application against a submesh mask
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushStroke {
    pub submesh: SubmeshIndex,
    pub footprint: UvFootprint,
    pub shape: BrushShape,
    pub kind: TreatmentKind,
    /// Burn written by laser strokes, in [0, 1]
    pub burn_intensity: f32,
}

impl BrushStroke {
    pub fn shaver(submesh: SubmeshIndex, footprint: UvFootprint) -> Self {
        Self {
            submesh,
            footprint,
            shape: BrushShape::Rect,
            kind: TreatmentKind::Shaver,
            burn_intensity: 0.0,
        }
    }

    pub fn laser(submesh: SubmeshIndex, footprint: UvFootprint, burn_intensity: f32) -> Self {
        Self {
            submesh,
            footprint,
            shape: BrushShape::Rect,
            kind: TreatmentKind::Laser,
            burn_intensity,
        }
    }

    pub fn with_shape(mut self, shape: BrushShape) -> Self {
        self.shape = shape;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_target_levels() {
        assert_eq!(TreatmentKind::Laser.target_level(0.3), 0.0);
        assert_eq!(TreatmentKind::Shaver.target_level(0.3), 0.3);
        assert!(TreatmentKind::Laser.burns());
        assert!(!TreatmentKind::Shaver.burns());
    }

    #[test]
    fn test_rotated_rect_membership() {
        // Wide and flat; rotated a quarter turn it becomes tall and narrow
        let footprint = UvFootprint::new(Vec2::new(0.5, 0.5), Vec2::new(0.4, 0.1), FRAC_PI_2);
        assert!(footprint.contains(Vec2::new(0.5, 0.68), BrushShape::Rect));
        assert!(!footprint.contains(Vec2::new(0.68, 0.5), BrushShape::Rect));

        let flat = UvFootprint::axis_aligned(Vec2::new(0.5, 0.5), Vec2::new(0.4, 0.1));
        assert!(flat.contains(Vec2::new(0.68, 0.5), BrushShape::Rect));
        assert!(!flat.contains(Vec2::new(0.5, 0.68), BrushShape::Rect));
    }

    #[test]
    fn test_circle_membership() {
        let footprint = UvFootprint::axis_aligned(Vec2::new(0.5, 0.5), Vec2::new(0.2, 0.2));
        assert!(footprint.contains(Vec2::new(0.57, 0.57), BrushShape::Circle));
        assert!(!footprint.contains(Vec2::new(0.58, 0.58), BrushShape::Circle));
        // Corner of the square is outside the circle but inside the rect
        assert!(footprint.contains(Vec2::new(0.59, 0.59), BrushShape::Rect));
    }

    #[test]
    fn test_invalid_footprints() {
        let center = Vec2::new(0.5, 0.5);
        assert!(!UvFootprint::axis_aligned(center, Vec2::new(0.0, 0.1)).is_valid());
        assert!(!UvFootprint::axis_aligned(center, Vec2::new(f32::NAN, 0.1)).is_valid());
        assert!(!UvFootprint::new(center, Vec2::splat(0.1), f32::INFINITY).is_valid());
        assert!(UvFootprint::axis_aligned(center, Vec2::splat(0.1)).is_valid());
    }

    #[test]
    fn test_pixel_bounds() {
        let footprint = UvFootprint::axis_aligned(Vec2::new(0.5, 0.5), Vec2::new(0.5, 0.5));
        assert_eq!(footprint.pixel_bounds(BrushShape::Rect, 4), Some((1, 1, 3, 3)));

        let outside = UvFootprint::axis_aligned(Vec2::new(2.0, 2.0), Vec2::splat(0.1));
        assert_eq!(outside.pixel_bounds(BrushShape::Rect, 4), None);
    }
}
