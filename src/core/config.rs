//! Engine configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other. Every section deserializes from
//! TOML with per-field defaults, so a config file only needs the overrides.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{MaskError, Result};
use crate::mask::HairResponseCurve;

/// Top-level configuration for the mask engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskConfig {
    pub store: StoreConfig,
    pub footprint: FootprintConfig,
    pub tracker: TrackerConfig,
    pub response: HairResponseCurve,
}

/// Mask raster settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Side length of every mask raster (pixels)
    ///
    /// Completion counting downsamples to `TrackerConfig::grid_resolution`,
    /// so this only affects paint precision, not tick cost.
    pub resolution: usize,

    /// Treatment level a shaver leaves behind
    ///
    /// Must stay strictly positive: the min-blend relies on stubble being
    /// above the laser target so that shaving never undoes a laser pass.
    pub stubble_level: f32,

    /// Tolerance used by the shaver pre-check
    ///
    /// A region whose sampled average is at or below
    /// `stubble_level + shaver_skip_epsilon` is already shaved.
    pub shaver_skip_epsilon: f32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            resolution: 1024,
            stubble_level: 0.3,
            shaver_skip_epsilon: 0.02,
        }
    }
}

/// Brush footprint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FootprintConfig {
    /// UV units per world unit for the undistorted (expected) brush size
    ///
    /// At 1.0 the physical brush size is read directly as UV size.
    pub uv_per_world: f32,

    /// Largest accepted ratio between a measured and the expected UV size
    ///
    /// UV seams can make an offset probe land on a distant island; anything
    /// above this ratio is treated as a seam artifact and clamped.
    pub max_distortion_ratio: f32,

    /// Distance above the surface from which offset probes are cast (world units)
    pub probe_height: f32,
}

impl Default for FootprintConfig {
    fn default() -> Self {
        Self {
            uv_per_world: 1.0,
            max_distortion_ratio: 5.0,
            probe_height: 0.05,
        }
    }
}

/// Completion tracking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Side length of the counting grid
    ///
    /// Masks and growth buffers are box-downsampled to this size, which keeps
    /// tick cost constant regardless of mask resolution.
    pub grid_resolution: usize,

    /// Treatment value (0-255) a cell must exceed to count as remaining hair
    ///
    /// Must sit above `stubble_level * 255` or shaved cells would never count
    /// as treated.
    pub high_threshold: u8,

    /// Growth value (0-255) a cell must exceed to be eligible at all
    pub low_threshold: u8,

    /// Percentage points added to every computed percentage
    ///
    /// Absorbs sampling noise along region borders so a visually finished
    /// part reaches the threshold.
    pub completion_buffer: f32,

    /// Default percentage at or above which a part completes
    pub completion_threshold: f32,

    /// Per-part overrides of `completion_threshold`
    ///
    /// Parts whose regions are persistently undercounted get a lower value.
    pub part_thresholds: AHashMap<String, f32>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            grid_resolution: 64,
            high_threshold: 200,
            low_threshold: 25,
            completion_buffer: 2.0,
            completion_threshold: 99.0,
            part_thresholds: AHashMap::new(),
        }
    }
}

impl TrackerConfig {
    /// Completion threshold for a part, honoring per-part overrides
    pub fn threshold_for(&self, part: &str) -> f32 {
        self.part_thresholds
            .get(part)
            .copied()
            .unwrap_or(self.completion_threshold)
    }
}

impl MaskConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: MaskConfig = toml::from_str(content)?;
        config.validate().map_err(MaskError::InvalidConfig)?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.store.resolution == 0 {
            return Err("store.resolution must be positive".into());
        }

        if !(self.store.stubble_level > 0.0 && self.store.stubble_level < 1.0) {
            return Err(format!(
                "store.stubble_level ({}) must be strictly between 0 and 1",
                self.store.stubble_level
            ));
        }

        if self.footprint.max_distortion_ratio <= 1.0 {
            return Err(format!(
                "footprint.max_distortion_ratio ({}) must be greater than 1",
                self.footprint.max_distortion_ratio
            ));
        }

        if self.footprint.uv_per_world <= 0.0 {
            return Err("footprint.uv_per_world must be positive".into());
        }

        if self.tracker.grid_resolution == 0 {
            return Err("tracker.grid_resolution must be positive".into());
        }

        // Shaved cells have to fall below the remaining-hair cutoff
        let stubble_8bit = (self.store.stubble_level * 255.0).round() as u8;
        if stubble_8bit >= self.tracker.high_threshold {
            return Err(format!(
                "tracker.high_threshold ({}) must exceed the stubble level ({})",
                self.tracker.high_threshold, stubble_8bit
            ));
        }

        if !(0.0..=100.0).contains(&self.tracker.completion_threshold) {
            return Err(format!(
                "tracker.completion_threshold ({}) must be within 0..=100",
                self.tracker.completion_threshold
            ));
        }

        for (part, threshold) in &self.tracker.part_thresholds {
            if !(0.0..=100.0).contains(threshold) {
                return Err(format!(
                    "completion threshold for {} ({}) must be within 0..=100",
                    part, threshold
                ));
            }
        }

        self.response.validate()
    }
}
