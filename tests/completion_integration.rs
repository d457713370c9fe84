//! End-to-end completion tracking over painted masks

use glam::Vec2;
use pelt_mask::brush::{BrushStroke, UvFootprint};
use pelt_mask::completion::{CompletionTracker, ForceTarget, PartTarget};
use pelt_mask::core::config::{MaskConfig, StoreConfig, TrackerConfig};
use pelt_mask::core::types::{cell_center_uv, SubmeshIndex, UvRect};
use pelt_mask::region::catalog::{default_regions, load_regions_json, BODY_SUBMESH, HEAD_SUBMESH};
use pelt_mask::region::{BodyPart, BodyPartRegion, RegionIndex};
use pelt_mask::mask::{GrowthBuffer, MaskStore};
use pelt_mask::MaskError;
use std::sync::Arc;

/// 10×10 mask counted on a 10×10 grid, so each pixel is one cell
fn small_session(tracker: TrackerConfig) -> (MaskStore, CompletionTracker) {
    let store_config = StoreConfig { resolution: 10, ..Default::default() };
    let store = MaskStore::new(store_config, vec![Some(Arc::new(GrowthBuffer::uniform(10, 255)))]);
    let tracker = TrackerConfig { grid_resolution: 10, ..tracker };
    let index = Arc::new(RegionIndex::new(10));
    (store, CompletionTracker::new(tracker, index))
}

/// Laser the first `count` pixels in row-major order, one stroke per pixel
fn laser_pixels(store: &mut MaskStore, count: usize) {
    for i in 0..count {
        let center = cell_center_uv(i % 10, i / 10, 10);
        let footprint = UvFootprint::axis_aligned(center, Vec2::splat(0.05));
        store.apply_brush(&BrushStroke::laser(SubmeshIndex(0), footprint, 0.0));
    }
}

fn full_store(resolution: usize, submeshes: usize) -> MaskStore {
    let config = StoreConfig { resolution, ..Default::default() };
    let growth = (0..submeshes)
        .map(|_| Some(Arc::new(GrowthBuffer::uniform(resolution, 255))))
        .collect();
    MaskStore::new(config, growth)
}

#[test]
fn test_exactly_99_percent_completes() {
    let (mut store, mut tracker) = small_session(TrackerConfig::default());
    tracker.register_target_parts(&store, [PartTarget::whole_surface("Sheet", SubmeshIndex(0))]);
    assert_eq!(tracker.targets().baseline("Sheet"), Some(100));

    // 96 removed + 2 buffer = 98%
    laser_pixels(&mut store, 96);
    tracker.tick(&store);
    assert_eq!(tracker.percentage("Sheet"), Some(98.0));
    assert!(!tracker.is_part_complete("Sheet"));

    // 97 removed + 2 buffer = 99%
    laser_pixels(&mut store, 97);
    tracker.tick(&store);
    assert_eq!(tracker.percentage("Sheet"), Some(100.0));
    assert!(tracker.is_part_complete("Sheet"));
}

#[test]
fn test_just_below_threshold_stays_incomplete() {
    let config = TrackerConfig { completion_buffer: 1.9, ..Default::default() };
    let (mut store, mut tracker) = small_session(config);
    tracker.register_target_parts(&store, [PartTarget::whole_surface("Sheet", SubmeshIndex(0))]);

    // 97 removed + 1.9 buffer = 98.9%
    laser_pixels(&mut store, 97);
    tracker.tick(&store);
    let percentage = tracker.percentage("Sheet").unwrap();
    assert!((percentage - 98.9).abs() < 1e-3);
    assert!(!tracker.is_part_complete("Sheet"));
    assert!(tracker.drain_events().is_empty());
}

#[test]
fn test_part_threshold_override() {
    let mut config = TrackerConfig::default();
    config.part_thresholds.insert("Sheet".to_string(), 50.0);
    let (mut store, mut tracker) = small_session(config);
    tracker.register_target_parts(&store, [PartTarget::whole_surface("Sheet", SubmeshIndex(0))]);

    laser_pixels(&mut store, 48);
    tracker.tick(&store);
    assert!(tracker.is_part_complete("Sheet"));
    assert_eq!(tracker.drain_events().len(), 1);
}

#[test]
fn test_half_treated_region_reports_progress() {
    let store_config = StoreConfig { resolution: 64, ..Default::default() };
    let mut store = MaskStore::new(store_config, vec![Some(Arc::new(GrowthBuffer::uniform(64, 255)))]);
    let region = BodyPartRegion::from_rects("Strip", SubmeshIndex(0), &[UvRect::new(0.0, 0.0, 1.0, 0.25)]);
    let index = Arc::new(RegionIndex::with_regions(64, [region]));
    let mut tracker = CompletionTracker::new(TrackerConfig::default(), index);
    tracker.register_target_parts(&store, [PartTarget::region("Strip", SubmeshIndex(0))]);
    assert_eq!(tracker.targets().baseline("Strip"), Some(64 * 16));

    // Left half of the strip
    let footprint = UvFootprint::axis_aligned(Vec2::new(0.25, 0.125), Vec2::new(0.5, 0.25));
    store.apply_brush(&BrushStroke::laser(SubmeshIndex(0), footprint, 0.1));
    tracker.tick(&store);

    let percentage = tracker.percentage("Strip").unwrap();
    assert!((percentage - 52.0).abs() < 1e-3, "got {}", percentage);
    assert!(!tracker.is_part_complete("Strip"));
}

#[test]
fn test_growth_disabled_cells_never_qualify() {
    // No hair may grow on the left half (u < 0.5)
    let growth = GrowthBuffer::from_fn(10, |uv| if uv.x < 0.5 { 0 } else { 255 });
    let store_config = StoreConfig { resolution: 10, ..Default::default() };
    let mut store = MaskStore::new(store_config, vec![Some(Arc::new(growth))]);
    let config = TrackerConfig { grid_resolution: 10, ..Default::default() };
    let mut tracker = CompletionTracker::new(config, Arc::new(RegionIndex::new(10)));
    tracker.register_target_parts(&store, [PartTarget::whole_surface("Sheet", SubmeshIndex(0))]);
    assert_eq!(tracker.targets().baseline("Sheet"), Some(50));

    // Untreated hair on the ineligible half does not hold completion back
    let right_half = UvFootprint::axis_aligned(Vec2::new(0.75, 0.5), Vec2::new(0.5, 1.0));
    store.apply_brush(&BrushStroke::laser(SubmeshIndex(0), right_half, 0.0));
    tracker.tick(&store);

    assert_eq!(tracker.percentage("Sheet"), Some(100.0));
    assert!(tracker.is_part_complete("Sheet"));
    assert_eq!(store.mask(SubmeshIndex(0)).unwrap().treatment_at(0, 0), Some(1.0));
}

#[test]
fn test_growth_at_low_threshold_is_ineligible() {
    // Exactly at the cutoff counts as bare skin
    let low = TrackerConfig::default().low_threshold;
    let growth = GrowthBuffer::from_fn(10, |uv| if uv.y < 0.3 { low } else { low + 1 });
    let store_config = StoreConfig { resolution: 10, ..Default::default() };
    let store = MaskStore::new(store_config, vec![Some(Arc::new(growth))]);
    let config = TrackerConfig { grid_resolution: 10, ..Default::default() };
    let mut tracker = CompletionTracker::new(config, Arc::new(RegionIndex::new(10)));
    tracker.register_target_parts(&store, [PartTarget::whole_surface("Sheet", SubmeshIndex(0))]);
    assert_eq!(tracker.targets().baseline("Sheet"), Some(70));
}

#[test]
fn test_shaved_cells_count_as_treated() {
    let (mut store, mut tracker) = small_session(TrackerConfig::default());
    tracker.register_target_parts(&store, [PartTarget::whole_surface("Sheet", SubmeshIndex(0))]);

    let everywhere = UvFootprint::axis_aligned(Vec2::splat(0.5), Vec2::splat(1.0));
    store.apply_brush(&BrushStroke::shaver(SubmeshIndex(0), everywhere));
    tracker.tick(&store);
    assert!(tracker.is_part_complete("Sheet"));
}

#[test]
fn test_catalog_session_completes_parts_independently() {
    let mut store = full_store(128, 4);
    let index = Arc::new(RegionIndex::with_regions(64, default_regions()));
    let mut tracker = CompletionTracker::new(TrackerConfig::default(), index);
    tracker.register_target_parts(&store, [BodyPart::Chest, BodyPart::Beard].map(PartTarget::from));

    for rect in BodyPart::Chest.uv_rects() {
        let footprint = UvFootprint::axis_aligned(rect.center(), Vec2::new(rect.width, rect.height) * 1.1);
        store.apply_brush(&BrushStroke::laser(BODY_SUBMESH, footprint, 0.3));
    }
    tracker.tick(&store);

    assert!(tracker.is_part_complete("Chest"));
    assert!(!tracker.is_part_complete("Beard"));
    assert!(!tracker.all_complete());

    let events = tracker.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].part, "Chest");
    assert_eq!(events[0].tick, 1);

    // Beard lives on another submesh and was untouched
    assert!(store.mask(HEAD_SUBMESH).unwrap().mean_treatment() == 1.0);
    assert_eq!(tracker.percentage("Beard"), Some(2.0));
}

#[test]
fn test_pooled_reuse_starts_fresh() {
    let mut store = full_store(64, 4);
    let index = Arc::new(RegionIndex::with_regions(64, default_regions()));
    let mut tracker = CompletionTracker::new(TrackerConfig::default(), index);

    tracker.register_target_parts(&store, [PartTarget::from(BodyPart::Abs)]);
    tracker.force_complete(ForceTarget::All);
    assert!(tracker.all_complete());

    store.reset_all();
    tracker.reset_session();
    tracker.register_target_parts(&store, [PartTarget::from(BodyPart::Abs)]);
    assert!(!tracker.is_part_complete("Abs"));
    assert_eq!(tracker.completion_history().len(), 0);
    assert_eq!(tracker.percentage("Abs"), Some(2.0));
}

#[test]
fn test_regions_from_json_drive_tracking() {
    let json = r#"{
        "parts": [
            {
                "name": "Palm",
                "submesh": 0,
                "shapes": [
                    { "shape": "polygon", "vertices": [[0.0, 0.0], [0.5, 0.0], [0.5, 0.5], [0.0, 0.5]] }
                ]
            }
        ]
    }"#;
    let regions = load_regions_json(json).unwrap();
    let store = full_store(64, 1);
    let index = Arc::new(RegionIndex::with_regions(16, regions));
    let config = TrackerConfig { grid_resolution: 16, ..Default::default() };
    let mut tracker = CompletionTracker::new(config, index);
    tracker.register_target_parts(&store, [PartTarget::region("Palm", SubmeshIndex(0))]);

    let baseline = tracker.targets().baseline("Palm").unwrap();
    // 8×8 interior cells plus the inclusive boundary row and column
    assert!((64..=81).contains(&baseline), "baseline {}", baseline);
}

#[test]
fn test_invalid_region_json_rejected() {
    let json = r#"{
        "parts": [
            {
                "name": "Bowtie",
                "submesh": 0,
                "shapes": [
                    { "shape": "polygon", "vertices": [[0.0, 0.0], [0.5, 0.5], [0.5, 0.0], [0.0, 0.5]] }
                ]
            }
        ]
    }"#;
    assert!(matches!(load_regions_json(json), Err(MaskError::InvalidRegion { .. })));
}

#[test]
fn test_config_file_drives_session() {
    let config = MaskConfig::from_toml_str(
        r#"
        [store]
        resolution = 10

        [tracker]
        grid_resolution = 10
        completion_threshold = 60.0
        "#,
    )
    .unwrap();

    let mut store = MaskStore::new(
        config.store.clone(),
        vec![Some(Arc::new(GrowthBuffer::uniform(10, 255)))],
    );
    let mut tracker = CompletionTracker::new(config.tracker.clone(), Arc::new(RegionIndex::new(10)));
    tracker.register_target_parts(&store, [PartTarget::whole_surface("Sheet", SubmeshIndex(0))]);

    laser_pixels(&mut store, 58);
    tracker.tick(&store);
    assert!(tracker.is_part_complete("Sheet"));
}
