//! Mask store: per-submesh treatment and burn rasters
//!
//! Every paintable submesh owns one `Mask` with two channels:
//! - treatment level: 1.0 untreated hair, stubble after a shaver, 0.0 removed
//! - burn level: accumulated laser burn
//!
//! Strokes composite with a min-blend on treatment and a max-blend on burn,
//! so neither channel can move backwards within a session. Only a full clear
//! restores the defaults.

pub mod raster;
pub mod response;

use glam::Vec2;
use std::sync::Arc;

use crate::brush::BrushStroke;
use crate::core::config::StoreConfig;
use crate::core::types::{cell_center_uv, SubmeshIndex};

pub use raster::Raster;
pub use response::HairResponseCurve;

/// Treatment level of untouched hair
pub const UNTREATED: f32 = 1.0;
/// Burn level of untouched skin
pub const NO_BURN: f32 = 0.0;

/// Sample offsets for `sample_average`, as fractions of the rect size
///
/// Covers the inner 50% of the rect so rotated brushes don't pick up edges.
const SAMPLE_OFFSETS: [f32; 3] = [-0.25, 0.0, 0.25];

/// Treatment and burn state of one submesh
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    treatment: Raster<f32>,
    burn: Raster<f32>,
}

impl Mask {
    /// A cleared mask
    pub fn new(resolution: usize) -> Self {
        Self {
            treatment: Raster::filled(resolution, UNTREATED),
            burn: Raster::filled(resolution, NO_BURN),
        }
    }

    pub fn resolution(&self) -> usize {
        self.treatment.resolution()
    }

    pub fn treatment(&self) -> &Raster<f32> {
        &self.treatment
    }

    pub fn burn(&self) -> &Raster<f32> {
        &self.burn
    }

    pub fn treatment_at(&self, x: usize, y: usize) -> Option<f32> {
        self.treatment.get(x, y)
    }

    pub fn burn_at(&self, x: usize, y: usize) -> Option<f32> {
        self.burn.get(x, y)
    }

    /// Reset both channels to their defaults
    pub fn clear(&mut self) {
        self.treatment.fill(UNTREATED);
        self.burn.fill(NO_BURN);
    }

    /// Composite a stroke into this mask, returning the number of pixels covered
    pub fn apply(&mut self, stroke: &BrushStroke, stubble_level: f32) -> usize {
        let resolution = self.resolution();
        let footprint = &stroke.footprint;
        let Some((x0, y0, x1, y1)) = footprint.pixel_bounds(stroke.shape, resolution) else {
            return 0;
        };

        let target = stroke.kind.target_level(stubble_level);
        let burn = (stroke.kind.burns() && stroke.burn_intensity > 0.0)
            .then(|| stroke.burn_intensity.min(1.0));

        let mut covered = 0;
        for y in y0..=y1 {
            for x in x0..=x1 {
                if !footprint.contains(cell_center_uv(x, y, resolution), stroke.shape) {
                    continue;
                }
                covered += 1;

                if let Some(level) = self.treatment.get_mut(x, y) {
                    *level = level.min(target);
                }
                if let Some(intensity) = burn {
                    if let Some(level) = self.burn.get_mut(x, y) {
                        *level = level.max(intensity);
                    }
                }
            }
        }
        covered
    }

    /// Mean treatment level of a 3×3 sample grid in the inner half of a rect
    pub fn sample_average(&self, center: Vec2, size: Vec2) -> f32 {
        let mut total = 0.0;
        for dy in SAMPLE_OFFSETS {
            for dx in SAMPLE_OFFSETS {
                let uv = center + Vec2::new(dx * size.x, dy * size.y);
                total += self.treatment.sample(uv);
            }
        }
        total / (SAMPLE_OFFSETS.len() * SAMPLE_OFFSETS.len()) as f32
    }

    /// Mean treatment level over the whole mask
    pub fn mean_treatment(&self) -> f32 {
        let values = self.treatment.as_slice();
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f32>() / values.len() as f32
    }
}

/// Static per-submesh raster of where hair may grow (0-255)
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthBuffer {
    raster: Raster<u8>,
}

impl GrowthBuffer {
    pub fn new(raster: Raster<u8>) -> Self {
        Self { raster }
    }

    /// Same growth value everywhere
    pub fn uniform(resolution: usize, value: u8) -> Self {
        Self::new(Raster::filled(resolution, value))
    }

    /// Build from a function of the pixel-center UV
    pub fn from_fn(resolution: usize, mut f: impl FnMut(Vec2) -> u8) -> Self {
        let mut raster = Raster::new(resolution);
        for y in 0..resolution {
            for x in 0..resolution {
                raster.set(x, y, f(cell_center_uv(x, y, resolution)));
            }
        }
        Self::new(raster)
    }

    pub fn raster(&self) -> &Raster<u8> {
        &self.raster
    }

    pub fn resolution(&self) -> usize {
        self.raster.resolution()
    }
}

#[derive(Debug, Clone)]
struct PaintableSurface {
    mask: Mask,
    growth: Arc<GrowthBuffer>,
}

/// Owns the masks of every paintable submesh
///
/// Callers submit `BrushStroke`s and read back through immutable views; the
/// rasters themselves are never handed out mutably.
#[derive(Debug, Clone)]
pub struct MaskStore {
    config: StoreConfig,
    surfaces: Vec<Option<PaintableSurface>>,
}

impl MaskStore {
    /// Create cleared masks for every submesh that has a growth buffer
    ///
    /// Index `i` of `growth` describes submesh `i`; `None` marks a submesh that
    /// cannot be treated (no mask is allocated for it).
    pub fn new(config: StoreConfig, growth: Vec<Option<Arc<GrowthBuffer>>>) -> Self {
        let resolution = config.resolution;
        let surfaces = growth
            .into_iter()
            .map(|growth| {
                growth.map(|growth| PaintableSurface {
                    mask: Mask::new(resolution),
                    growth,
                })
            })
            .collect();

        Self { config, surfaces }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn is_paintable(&self, submesh: SubmeshIndex) -> bool {
        self.surface(submesh).is_some()
    }

    pub fn paintable_submeshes(&self) -> impl Iterator<Item = SubmeshIndex> + '_ {
        self.surfaces
            .iter()
            .enumerate()
            .filter(|(_, surface)| surface.is_some())
            .map(|(i, _)| SubmeshIndex(i))
    }

    pub fn mask(&self, submesh: SubmeshIndex) -> Option<&Mask> {
        self.surface(submesh).map(|s| &s.mask)
    }

    pub fn growth(&self, submesh: SubmeshIndex) -> Option<&GrowthBuffer> {
        self.surface(submesh).map(|s| s.growth.as_ref())
    }

    fn surface(&self, submesh: SubmeshIndex) -> Option<&PaintableSurface> {
        self.surfaces.get(submesh.0).and_then(Option::as_ref)
    }

    fn surface_mut(&mut self, submesh: SubmeshIndex) -> Option<&mut PaintableSurface> {
        self.surfaces.get_mut(submesh.0).and_then(Option::as_mut)
    }

    /// Composite a stroke into its submesh's mask
    ///
    /// Returns the number of pixels covered. Invalid footprints and
    /// non-paintable submeshes are ignored.
    pub fn apply_brush(&mut self, stroke: &BrushStroke) -> usize {
        if !stroke.footprint.is_valid() {
            tracing::warn!("Ignoring stroke with invalid footprint: {:?}", stroke.footprint);
            return 0;
        }

        let stubble_level = self.config.stubble_level;
        match self.surface_mut(stroke.submesh) {
            Some(surface) => surface.mask.apply(stroke, stubble_level),
            None => {
                tracing::warn!("Ignoring stroke on non-paintable submesh {:?}", stroke.submesh);
                0
            }
        }
    }

    /// Reset one submesh to untreated, unburnt
    pub fn clear_to_default(&mut self, submesh: SubmeshIndex) {
        match self.surface_mut(submesh) {
            Some(surface) => surface.mask.clear(),
            None => tracing::warn!("Cannot clear non-paintable submesh {:?}", submesh),
        }
    }

    /// Reset every mask, used when a pooled subject is reused
    pub fn reset_all(&mut self) {
        for surface in self.surfaces.iter_mut().flatten() {
            surface.mask.clear();
        }
    }

    /// Center-biased average treatment level under a rect
    ///
    /// Non-paintable submeshes report 0.0 (no hair).
    pub fn sample_average(&self, submesh: SubmeshIndex, center: Vec2, size: Vec2) -> f32 {
        if !center.is_finite() || !size.is_finite() {
            tracing::warn!("Cannot sample non-finite rect at {:?} size {:?}", center, size);
            return 0.0;
        }
        match self.mask(submesh) {
            Some(mask) => mask.sample_average(center, size),
            None => {
                tracing::warn!("Cannot sample non-paintable submesh {:?}", submesh);
                0.0
            }
        }
    }

    /// Whether a shaver stroke here would change nothing
    pub fn should_skip_shaver(&self, submesh: SubmeshIndex, center: Vec2, size: Vec2) -> bool {
        let average = self.sample_average(submesh, center, size);
        average <= self.config.stubble_level + self.config.shaver_skip_epsilon
    }
}
