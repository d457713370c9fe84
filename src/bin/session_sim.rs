//! Headless Treatment Session Runner
//!
//! Paints seeded random strokes over the built-in body catalog until every
//! target part completes or the stroke budget runs out, then prints the
//! per-part progress as text or JSON.

use clap::Parser;
use glam::{Vec2, Vec3};
use pelt_mask::brush::{
    BrushStroke, FootprintCalculator, FootprintMode, SurfaceHit, SurfaceProbe, TangentData,
    TreatmentKind,
};
use pelt_mask::completion::{CompletionTracker, PartTarget};
use pelt_mask::core::config::MaskConfig;
use pelt_mask::core::error::Result;
use pelt_mask::export;
use pelt_mask::mask::{GrowthBuffer, MaskStore};
use pelt_mask::region::catalog::default_regions;
use pelt_mask::region::{BodyPart, RegionIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Headless Treatment Session Runner
#[derive(Parser, Debug)]
#[command(name = "session_sim")]
#[command(about = "Run a scripted treatment session and report per-part completion")]
struct Args {
    /// Comma-separated part names to target (default: every catalog part)
    #[arg(long, value_delimiter = ',')]
    parts: Vec<String>,

    /// Tool to paint with: laser or shaver
    #[arg(long, default_value = "laser")]
    tool: String,

    /// Maximum number of strokes before giving up
    #[arg(long, default_value_t = 5000)]
    max_strokes: u32,

    /// Brush width and height in world units
    #[arg(long, default_value_t = 0.08)]
    brush_size: f32,

    /// Burn written by each laser stroke
    #[arg(long, default_value_t = 0.2)]
    burn: f32,

    /// Override the mask resolution from the config
    #[arg(long)]
    resolution: Option<usize>,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,

    /// Directory to write part masks and final treatment images into
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

#[derive(Serialize)]
struct PartReport {
    name: String,
    percentage: f32,
    complete: bool,
}

#[derive(Serialize)]
struct SessionReport {
    seed: u64,
    tool: String,
    strokes: u32,
    skipped_strokes: u32,
    mean_response: f32,
    all_complete: bool,
    overall_percentage: f32,
    parts: Vec<PartReport>,
    completion_order: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pelt_mask=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => MaskConfig::load(path)?,
        None => MaskConfig::default(),
    };
    if let Some(resolution) = args.resolution {
        config.store.resolution = resolution;
    }

    let kind = match args.tool.as_str() {
        "shaver" => TreatmentKind::Shaver,
        "laser" => TreatmentKind::Laser,
        other => {
            tracing::warn!("Unknown tool '{}', using laser", other);
            TreatmentKind::Laser
        }
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);

    let targets: Vec<BodyPart> = if args.parts.is_empty() {
        BodyPart::all().to_vec()
    } else {
        args.parts
            .iter()
            .filter_map(|name| {
                let part = BodyPart::from_name(name.trim());
                if part.is_none() {
                    tracing::warn!("Unknown part '{}' skipped", name);
                }
                part
            })
            .collect()
    };
    if targets.is_empty() {
        tracing::warn!("No known parts to treat");
        return Ok(());
    }

    // Four submeshes (head, body, arm, leg), hair allowed everywhere
    let growth = (0..4)
        .map(|_| Some(Arc::new(GrowthBuffer::uniform(config.store.resolution, 255))))
        .collect();
    let mut store = MaskStore::new(config.store.clone(), growth);

    let index = Arc::new(RegionIndex::with_regions(
        config.tracker.grid_resolution,
        default_regions(),
    ));
    let mut tracker = CompletionTracker::new(config.tracker.clone(), index.clone());
    tracker.register_target_parts(&store, targets.iter().copied().map(PartTarget::from));

    let calculator = FootprintCalculator::new(config.footprint.clone());
    // Flat unit sheet: world XY maps straight onto UV
    let probe = |origin: Vec3, _direction: Vec3| Some(Vec2::new(origin.x, origin.y));

    let mut strokes = 0;
    let mut skipped = 0;
    let mut response_total = 0.0;
    while strokes < args.max_strokes && !tracker.all_complete() {
        let pending: Vec<BodyPart> = targets
            .iter()
            .copied()
            .filter(|part| !tracker.is_part_complete(part.name()))
            .collect();
        let part = pending[rng.gen_range(0..pending.len())];
        let rects = part.uv_rects();
        let rect = rects[rng.gen_range(0..rects.len())];
        let uv = Vec2::new(
            rect.x + rng.gen::<f32>() * rect.width,
            rect.y + rng.gen::<f32>() * rect.height,
        );

        let hit = SurfaceHit::new(uv.extend(0.0), uv, Vec3::Z, TangentData::NoTangentChannel);
        let footprint = calculator.compute(
            &hit,
            args.brush_size,
            args.brush_size,
            FootprintMode::DistortionAware,
            Some(&probe as &dyn SurfaceProbe),
        );
        strokes += 1;

        let average = store.sample_average(part.submesh(), footprint.center, footprint.size);
        response_total += config.response.multiplier(average);

        let stroke = match kind {
            TreatmentKind::Shaver => {
                if store.should_skip_shaver(part.submesh(), footprint.center, footprint.size) {
                    skipped += 1;
                    continue;
                }
                BrushStroke::shaver(part.submesh(), footprint)
            }
            TreatmentKind::Laser => BrushStroke::laser(part.submesh(), footprint, args.burn),
        };
        store.apply_brush(&stroke);
        tracker.tick(&store);

        for event in tracker.drain_events() {
            tracing::debug!("Stroke {}: {} complete", strokes, event.part);
        }
    }

    if let Some(dir) = &args.export_dir {
        export::save_part_masks(&index, dir, 512)?;
        export::save_submesh_id_masks(&index, dir, 512)?;
        for submesh in store.paintable_submeshes() {
            if let Some(mask) = store.mask(submesh) {
                export::render_treatment(mask).save(dir.join(format!("Treatment_{}.png", submesh.0)))?;
                export::render_burn(mask).save(dir.join(format!("Burn_{}.png", submesh.0)))?;
            }
        }
    }

    let report = SessionReport {
        seed,
        tool: args.tool.clone(),
        strokes,
        skipped_strokes: skipped,
        mean_response: if strokes > 0 { response_total / strokes as f32 } else { 0.0 },
        all_complete: tracker.all_complete(),
        overall_percentage: tracker.overall_percentage(),
        parts: tracker
            .percentages()
            .iter()
            .map(|(name, percentage)| PartReport {
                name: name.clone(),
                percentage: *percentage,
                complete: tracker.is_part_complete(name),
            })
            .collect(),
        completion_order: tracker
            .completion_history()
            .iter()
            .map(|event| event.part.clone())
            .collect(),
    };

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("=== SESSION (seed {}, {}) ===", report.seed, report.tool);
        println!("Strokes: {} ({} skipped)", report.strokes, report.skipped_strokes);
        println!("Mean hair response: {:.2}", report.mean_response);
        for part in &report.parts {
            println!(
                "  {:<14} {:>6.1}%{}",
                part.name,
                part.percentage,
                if part.complete { "  done" } else { "" }
            );
        }
        println!("Overall: {:.1}%", report.overall_percentage);
    }

    Ok(())
}
