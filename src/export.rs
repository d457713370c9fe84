//! PNG import and export of masks, regions and growth buffers
//!
//! Images store row 0 at the top while UV space puts `v = 0` at the bottom,
//! so every conversion flips rows.

use image::{GrayImage, Luma, Rgb, RgbImage};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::completion::downsample::to_8bit;
use crate::core::error::{MaskError, Result};
use crate::mask::{GrowthBuffer, Mask, Raster};
use crate::core::types::SubmeshIndex;
use crate::region::catalog::submesh_name;
use crate::region::{BodyPart, BodyPartRegion, OccupancyBitmap, RegionIndex};

/// Binary mask of a region: white inside, black elsewhere
pub fn render_part_mask(region: &BodyPartRegion, size: u32) -> GrayImage {
    let resolution = size as usize;
    let bitmap = OccupancyBitmap::build(region, resolution);
    GrayImage::from_fn(size, size, |px, py| {
        let y = resolution - 1 - py as usize;
        if bitmap.contains(px as usize, y, resolution) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Write `Mask_{name}.png` for every region in the index
pub fn save_part_masks(index: &RegionIndex, dir: &Path, size: u32) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(index.len());
    for name in index.names() {
        let Some(entry) = index.get(name) else {
            continue;
        };
        let path = dir.join(format!("Mask_{}.png", name));
        render_part_mask(&entry.region, size).save(&path)?;
        tracing::debug!("Saved part mask {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// Combined part-ID mask of one submesh
///
/// Each catalog part's cells carry its `mask_value` in the red channel, and
/// uncovered cells stay black. Where parts overlap the higher value wins.
pub fn render_submesh_id_mask(index: &RegionIndex, submesh: SubmeshIndex, size: u32) -> RgbImage {
    let resolution = size as usize;
    let mut layers: Vec<(u8, OccupancyBitmap)> = index
        .regions_on(submesh)
        .into_iter()
        .filter_map(|region| match BodyPart::from_name(&region.name) {
            Some(part) => Some((
                to_8bit(part.mask_value()),
                OccupancyBitmap::build(region, resolution),
            )),
            None => {
                tracing::warn!("Region '{}' has no part ID and is left out of the ID mask", region.name);
                None
            }
        })
        .collect();
    layers.sort_by_key(|(value, _)| std::cmp::Reverse(*value));

    RgbImage::from_fn(size, size, |px, py| {
        let y = resolution - 1 - py as usize;
        let red = layers
            .iter()
            .find(|(_, bitmap)| bitmap.contains(px as usize, y, resolution))
            .map(|(value, _)| *value)
            .unwrap_or(0);
        Rgb([red, 0, 0])
    })
}

/// Write `{Submesh}_BodyPartMask.png` for every submesh that has regions
pub fn save_submesh_id_masks(index: &RegionIndex, dir: &Path, size: u32) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let submeshes: BTreeSet<SubmeshIndex> = index
        .names()
        .into_iter()
        .filter_map(|name| index.get(name))
        .map(|entry| entry.region.submesh)
        .collect();

    let mut written = Vec::with_capacity(submeshes.len());
    for submesh in submeshes {
        let label = submesh_name(submesh)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Submesh{}", submesh.0));
        let path = dir.join(format!("{}_BodyPartMask.png", label));
        render_submesh_id_mask(index, submesh, size).save(&path)?;
        tracing::debug!("Saved part ID mask {}", path.display());
        written.push(path);
    }
    Ok(written)
}

fn render_channel(raster: &Raster<f32>) -> GrayImage {
    let resolution = raster.resolution();
    let size = resolution as u32;
    GrayImage::from_fn(size, size, |px, py| {
        let value = raster
            .get(px as usize, resolution - 1 - py as usize)
            .unwrap_or_default();
        Luma([to_8bit(value)])
    })
}

/// Treatment channel as a grayscale image (white = untreated hair)
pub fn render_treatment(mask: &Mask) -> GrayImage {
    render_channel(mask.treatment())
}

/// Burn channel as a grayscale image (white = fully burnt)
pub fn render_burn(mask: &Mask) -> GrayImage {
    render_channel(mask.burn())
}

/// Build a growth buffer from a square grayscale image
pub fn growth_from_image(image: &GrayImage) -> Result<GrowthBuffer> {
    let (width, height) = image.dimensions();
    if width != height || width == 0 {
        return Err(MaskError::InvalidGrowthBuffer(format!(
            "growth texture must be square and non-empty, got {}x{}",
            width, height
        )));
    }

    let resolution = width as usize;
    let mut raster = Raster::new(resolution);
    for (px, py, pixel) in image.enumerate_pixels() {
        raster.set(px as usize, resolution - 1 - py as usize, pixel.0[0]);
    }
    Ok(GrowthBuffer::new(raster))
}

/// Load a growth texture (any format `image` decodes) from disk
pub fn load_growth_buffer(path: &Path) -> Result<GrowthBuffer> {
    let image = image::open(path)?.to_luma8();
    growth_from_image(&image)
}
