//! Region index: UV-space body-part regions and their occupancy bitmaps
//!
//! Polygon containment is too expensive to repeat for every grid cell on every
//! completion tick, so each region is rasterized once into a fixed-resolution
//! occupancy bitmap. Lookups at a different grid resolution rescale the query
//! coordinates instead of rebuilding.

pub mod catalog;
pub mod validation;

use ahash::AHashMap;
use geo::{Intersects, LineString, Point, Polygon};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::types::{cell_center_uv, SubmeshIndex, UvRect};

pub use catalog::BodyPart;
pub use validation::{RegionValidator, ValidationError};

/// Default occupancy bitmap resolution
pub const DEFAULT_OCCUPANCY_RESOLUTION: usize = 64;

/// One piece of a region's UV extent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum UvShape {
    Rect(UvRect),
    Polygon { vertices: Vec<[f32; 2]> },
}

/// A treatable anatomical zone on one submesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyPartRegion {
    pub name: String,
    pub submesh: SubmeshIndex,
    #[serde(default)]
    pub shapes: Vec<UvShape>,
}

impl BodyPartRegion {
    pub fn new(name: impl Into<String>, submesh: SubmeshIndex, shapes: Vec<UvShape>) -> Self {
        Self {
            name: name.into(),
            submesh,
            shapes,
        }
    }

    /// Region made of axis-aligned rects
    pub fn from_rects(name: impl Into<String>, submesh: SubmeshIndex, rects: &[UvRect]) -> Self {
        Self::new(name, submesh, rects.iter().copied().map(UvShape::Rect).collect())
    }
}

/// Closed geo polygon over `[u, v]` vertices
pub(crate) fn uv_polygon(vertices: &[[f32; 2]]) -> Polygon<f64> {
    let coords: Vec<(f64, f64)> = vertices
        .iter()
        .map(|[u, v]| (*u as f64, *v as f64))
        .collect();
    // Polygon::new closes the ring
    Polygon::new(LineString::from(coords), vec![])
}

/// Shape converted once for repeated containment tests
enum PreparedShape {
    Rect(UvRect),
    Polygon(Polygon<f64>),
    Empty,
}

impl PreparedShape {
    fn new(shape: &UvShape) -> Self {
        match shape {
            UvShape::Rect(rect) => PreparedShape::Rect(*rect),
            UvShape::Polygon { vertices } if vertices.len() >= 3 => {
                PreparedShape::Polygon(uv_polygon(vertices))
            }
            UvShape::Polygon { .. } => PreparedShape::Empty,
        }
    }

    fn contains(&self, uv: Vec2) -> bool {
        match self {
            PreparedShape::Rect(rect) => rect.contains(uv),
            PreparedShape::Polygon(polygon) => {
                polygon.intersects(&Point::new(uv.x as f64, uv.y as f64))
            }
            PreparedShape::Empty => false,
        }
    }
}

/// Fixed-resolution boolean grid of the cells a region covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyBitmap {
    resolution: usize,
    cells: Vec<bool>,
    filled: usize,
}

impl OccupancyBitmap {
    /// Rasterize a region by testing every cell center against its shapes
    ///
    /// A region without shapes produces an empty bitmap.
    pub fn build(region: &BodyPartRegion, resolution: usize) -> Self {
        let shapes: Vec<PreparedShape> = region.shapes.iter().map(PreparedShape::new).collect();
        let mut cells = vec![false; resolution * resolution];
        let mut filled = 0;

        if !shapes.is_empty() {
            for y in 0..resolution {
                for x in 0..resolution {
                    let uv = cell_center_uv(x, y, resolution);
                    if shapes.iter().any(|shape| shape.contains(uv)) {
                        cells[y * resolution + x] = true;
                        filled += 1;
                    }
                }
            }
        }

        Self {
            resolution,
            cells,
            filled,
        }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Number of occupied cells
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// Membership of cell `(grid_x, grid_y)` of a `grid_resolution` grid
    ///
    /// Coordinates are rescaled to the built resolution when they differ.
    #[inline]
    pub fn contains(&self, grid_x: usize, grid_y: usize, grid_resolution: usize) -> bool {
        if grid_resolution == 0 || grid_x >= grid_resolution || grid_y >= grid_resolution {
            return false;
        }

        let (x, y) = if grid_resolution == self.resolution {
            (grid_x, grid_y)
        } else {
            (
                grid_x * self.resolution / grid_resolution,
                grid_y * self.resolution / grid_resolution,
            )
        };

        self.cells
            .get(y * self.resolution + x)
            .copied()
            .unwrap_or(false)
    }
}

/// A region together with its cached bitmap
#[derive(Debug, Clone)]
pub struct IndexedRegion {
    pub region: BodyPartRegion,
    pub occupancy: OccupancyBitmap,
}

/// Name-keyed lookup of body-part regions
///
/// Immutable once built; share it between trackers with an `Arc`.
#[derive(Debug, Clone)]
pub struct RegionIndex {
    resolution: usize,
    entries: AHashMap<String, IndexedRegion>,
}

impl Default for RegionIndex {
    fn default() -> Self {
        Self::new(DEFAULT_OCCUPANCY_RESOLUTION)
    }
}

impl RegionIndex {
    pub fn new(resolution: usize) -> Self {
        Self {
            resolution,
            entries: AHashMap::new(),
        }
    }

    /// Build an index over a set of regions
    pub fn with_regions(resolution: usize, regions: impl IntoIterator<Item = BodyPartRegion>) -> Self {
        let mut index = Self::new(resolution);
        for region in regions {
            index.insert(region);
        }
        index
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add or replace a region, building its bitmap
    pub fn insert(&mut self, region: BodyPartRegion) {
        if region.shapes.is_empty() {
            tracing::warn!("Region '{}' has no shapes and will never match", region.name);
        }
        let occupancy = OccupancyBitmap::build(&region, self.resolution);
        tracing::debug!(
            "Indexed region '{}' on {:?}: {} of {} cells",
            region.name,
            region.submesh,
            occupancy.filled(),
            self.resolution * self.resolution
        );
        self.entries
            .insert(region.name.clone(), IndexedRegion { region, occupancy });
    }

    /// Rebuild one region's bitmap; `false` if the region is unknown
    pub fn rebuild(&mut self, name: &str) -> bool {
        match self.entries.get_mut(name) {
            Some(entry) => {
                entry.occupancy = OccupancyBitmap::build(&entry.region, self.resolution);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&IndexedRegion> {
        self.entries.get(name)
    }

    /// Is grid cell `(x, y)` inside the named region? Unknown names never match.
    pub fn contains(&self, name: &str, grid_x: usize, grid_y: usize, grid_resolution: usize) -> bool {
        self.entries
            .get(name)
            .map(|entry| entry.occupancy.contains(grid_x, grid_y, grid_resolution))
            .unwrap_or(false)
    }

    /// Region names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Regions belonging to one submesh, sorted by name
    pub fn regions_on(&self, submesh: SubmeshIndex) -> Vec<&BodyPartRegion> {
        let mut regions: Vec<&BodyPartRegion> = self
            .entries
            .values()
            .map(|entry| &entry.region)
            .filter(|region| region.submesh == submesh)
            .collect();
        regions.sort_by(|a, b| a.name.cmp(&b.name));
        regions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(name: &str) -> BodyPartRegion {
        BodyPartRegion::from_rects(name, SubmeshIndex(0), &[UvRect::new(0.0, 0.0, 0.5, 0.5)])
    }

    #[test]
    fn test_rect_occupancy() {
        let bitmap = OccupancyBitmap::build(&square("Chest"), 8);
        assert_eq!(bitmap.filled(), 16);
        assert!(bitmap.contains(0, 0, 8));
        assert!(bitmap.contains(3, 3, 8));
        assert!(!bitmap.contains(4, 3, 8));
    }

    #[test]
    fn test_empty_region_matches_nothing() {
        let region = BodyPartRegion::new("Nothing", SubmeshIndex(0), vec![]);
        let bitmap = OccupancyBitmap::build(&region, 8);
        assert_eq!(bitmap.filled(), 0);
        assert!((0..8).all(|x| (0..8).all(|y| !bitmap.contains(x, y, 8))));
    }

    #[test]
    fn test_rescaled_lookup() {
        let bitmap = OccupancyBitmap::build(&square("Chest"), 64);
        // 16x16 grid: lower-left quarter is cells 0..8
        assert!(bitmap.contains(7, 7, 16));
        assert!(!bitmap.contains(8, 0, 16));
        // Finer grid than the bitmap
        assert!(bitmap.contains(255, 255, 512));
        assert!(!bitmap.contains(256, 0, 512));
    }

    #[test]
    fn test_out_of_range_lookup() {
        let bitmap = OccupancyBitmap::build(&square("Chest"), 8);
        assert!(!bitmap.contains(8, 0, 8));
        assert!(!bitmap.contains(0, 0, 0));
    }

    #[test]
    fn test_polygon_occupancy() {
        // Triangle covering the lower-left half of UV space
        let region = BodyPartRegion::new(
            "Wedge",
            SubmeshIndex(0),
            vec![UvShape::Polygon {
                vertices: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            }],
        );
        let bitmap = OccupancyBitmap::build(&region, 4);
        assert!(bitmap.contains(0, 0, 4));
        assert!(bitmap.contains(2, 0, 4));
        assert!(!bitmap.contains(3, 3, 4));
        assert!(!bitmap.contains(2, 2, 4));
    }

    #[test]
    fn test_build_is_idempotent() {
        let mut index = RegionIndex::with_regions(32, [square("Chest")]);
        let before = index.get("Chest").unwrap().occupancy.clone();
        assert!(index.rebuild("Chest"));
        assert_eq!(index.get("Chest").unwrap().occupancy, before);
        assert!(!index.rebuild("Missing"));
    }

    #[test]
    fn test_index_lookup() {
        let index = RegionIndex::with_regions(16, [square("Chest")]);
        assert!(index.contains("Chest", 0, 0, 16));
        assert!(!index.contains("Abs", 0, 0, 16));
        assert_eq!(index.names(), vec!["Chest"]);
    }

    #[test]
    fn test_regions_on_filters_by_submesh() {
        let other = BodyPartRegion::from_rects("Calf", SubmeshIndex(3), &[UvRect::new(0.0, 0.0, 0.5, 0.3)]);
        let index = RegionIndex::with_regions(16, [square("Chest"), square("Abs"), other]);
        let names: Vec<&str> = index
            .regions_on(SubmeshIndex(0))
            .iter()
            .map(|region| region.name.as_str())
            .collect();
        assert_eq!(names, vec!["Abs", "Chest"]);
        assert_eq!(index.regions_on(SubmeshIndex(3)).len(), 1);
        assert!(index.regions_on(SubmeshIndex(1)).is_empty());
    }

    #[test]
    fn test_region_json_shape() {
        let json = r#"{
            "name": "Back",
            "submesh": 1,
            "shapes": [
                {"shape": "rect", "x": 0.0, "y": 0.2, "width": 0.2, "height": 0.8},
                {"shape": "polygon", "vertices": [[0.8, 0.2], [1.0, 0.2], [1.0, 1.0]]}
            ]
        }"#;
        let region: BodyPartRegion = serde_json::from_str(json).unwrap();
        assert_eq!(region.submesh, SubmeshIndex(1));
        assert_eq!(region.shapes.len(), 2);
        assert!(matches!(region.shapes[1], UvShape::Polygon { .. }));
    }
}
