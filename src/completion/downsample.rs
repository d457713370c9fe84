//! Box downsampling of mask and growth rasters to the counting grid
//!
//! Values leave here on an 8-bit scale so qualification compares integers.

use crate::core::types::SubmeshIndex;
use crate::mask::{MaskStore, Raster};

/// Convert a unit value to the 8-bit scale
#[inline]
pub fn to_8bit(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Source pixel span `[start, end)` covered by grid cell `cell`
#[inline]
fn span(cell: usize, grid: usize, resolution: usize) -> (usize, usize) {
    let start = (cell * resolution / grid).min(resolution - 1);
    let end = ((cell + 1) * resolution / grid).clamp(start + 1, resolution);
    (start, end)
}

/// Average each grid cell's source pixels
fn box_downsample<T: Copy + Default>(raster: &Raster<T>, grid: usize, value: impl Fn(T) -> f32) -> Vec<f32> {
    let resolution = raster.resolution();
    if resolution == 0 || grid == 0 {
        return vec![0.0; grid * grid];
    }

    let mut out = Vec::with_capacity(grid * grid);
    for gy in 0..grid {
        let (y0, y1) = span(gy, grid, resolution);
        for gx in 0..grid {
            let (x0, x1) = span(gx, grid, resolution);
            let mut total = 0.0;
            for y in y0..y1 {
                for x in x0..x1 {
                    total += raster.get(x, y).map(&value).unwrap_or(0.0);
                }
            }
            out.push(total / ((x1 - x0) * (y1 - y0)) as f32);
        }
    }
    out
}

/// Treatment levels downsampled to `grid × grid`, 8-bit
pub fn downsample_treatment(raster: &Raster<f32>, grid: usize) -> Vec<u8> {
    box_downsample(raster, grid, |v| v)
        .into_iter()
        .map(to_8bit)
        .collect()
}

/// Growth values downsampled to `grid × grid`
pub fn downsample_growth(raster: &Raster<u8>, grid: usize) -> Vec<u8> {
    box_downsample(raster, grid, f32::from)
        .into_iter()
        .map(|v| v.round().clamp(0.0, 255.0) as u8)
        .collect()
}

/// One submesh's mask and growth on the counting grid
#[derive(Debug, Clone)]
pub struct SurfaceGrid {
    resolution: usize,
    treatment: Vec<u8>,
    growth: Vec<u8>,
}

impl SurfaceGrid {
    /// `None` when the submesh has no mask (no growth buffer)
    pub fn sample(store: &MaskStore, submesh: SubmeshIndex, grid: usize) -> Option<Self> {
        let mask = store.mask(submesh)?;
        let growth = store.growth(submesh)?;
        Some(Self {
            resolution: grid,
            treatment: downsample_treatment(mask.treatment(), grid),
            growth: downsample_growth(growth.raster(), grid),
        })
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Count cells with remaining hair on growth-eligible skin that pass `filter`
    pub fn count_qualifying(
        &self,
        high_threshold: u8,
        low_threshold: u8,
        filter: impl Fn(usize, usize) -> bool,
    ) -> u32 {
        let mut count = 0;
        for y in 0..self.resolution {
            for x in 0..self.resolution {
                let i = y * self.resolution + x;
                if self.treatment[i] > high_threshold && self.growth[i] > low_threshold && filter(x, y) {
                    count += 1;
                }
            }
        }
        count
    }
}
