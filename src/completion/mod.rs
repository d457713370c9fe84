//! Completion tracking: per-part treatment progress for a session
//!
//! Each tick the masks of the targeted submeshes are downsampled to a small
//! grid and the cells that still carry hair are counted per part. The count
//! is compared with the baseline captured at registration:
//!
//! ```text
//! percentage = clamp(removed * 100 / baseline + buffer, 0, 100)
//! ```
//!
//! Reaching the part's threshold snaps it to 100% and completes it for the
//! rest of the session. Each completion produces exactly one
//! `CompletionEvent`.

pub mod downsample;
pub mod events;

use ahash::AHashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::core::config::TrackerConfig;
use crate::core::types::SubmeshIndex;
use crate::mask::MaskStore;
use crate::region::{BodyPart, BodyPartRegion, RegionIndex};

pub use downsample::SurfaceGrid;
pub use events::{CompletionEvent, CompletionEvents};

/// Percentage by part name, sorted for stable display
pub type PartPercentages = BTreeMap<String, f32>;

/// How a target's cells are selected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetScope {
    /// Cells inside the region of the same name in the `RegionIndex`
    Region,
    /// Every growth-eligible cell of the submesh
    WholeSurface,
}

/// A part a session needs treated
#[derive(Debug, Clone, PartialEq)]
pub struct PartTarget {
    pub name: String,
    pub submesh: SubmeshIndex,
    pub scope: TargetScope,
}

impl PartTarget {
    pub fn region(name: impl Into<String>, submesh: SubmeshIndex) -> Self {
        Self {
            name: name.into(),
            submesh,
            scope: TargetScope::Region,
        }
    }

    /// Tracks a whole submesh under a part name
    pub fn whole_surface(name: impl Into<String>, submesh: SubmeshIndex) -> Self {
        Self {
            name: name.into(),
            submesh,
            scope: TargetScope::WholeSurface,
        }
    }
}

impl From<&BodyPartRegion> for PartTarget {
    fn from(region: &BodyPartRegion) -> Self {
        Self::region(region.name.clone(), region.submesh)
    }
}

impl From<BodyPart> for PartTarget {
    fn from(part: BodyPart) -> Self {
        Self::region(part.name(), part.submesh())
    }
}

/// Which parts to force-complete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForceTarget {
    Part(String),
    All,
}

#[derive(Debug, Clone)]
struct TrackedPart {
    name: String,
    submesh: SubmeshIndex,
    scope: TargetScope,
    baseline: u32,
}

/// Targets and completion state of the current session
#[derive(Debug, Clone, Default)]
pub struct SessionTargets {
    parts: Vec<TrackedPart>,
    completed: BTreeSet<String>,
    percentages: PartPercentages,
}

impl SessionTargets {
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|p| p.name == name)
    }

    pub fn baseline(&self, name: &str) -> Option<u32> {
        self.parts.iter().find(|p| p.name == name).map(|p| p.baseline)
    }

    pub fn completed(&self) -> &BTreeSet<String> {
        &self.completed
    }

    pub fn percentages(&self) -> &PartPercentages {
        &self.percentages
    }

    fn clear(&mut self) {
        self.parts.clear();
        self.completed.clear();
        self.percentages.clear();
    }
}

/// Percentage of a part's baseline that has been treated, plus the buffer
///
/// A zero baseline reports 0 rather than dividing by zero.
pub fn completion_percentage(baseline: u32, current: u32, buffer: f32) -> f32 {
    if baseline == 0 {
        return 0.0;
    }
    let removed = baseline.saturating_sub(current) as f32;
    (removed * 100.0 / baseline as f32 + buffer).clamp(0.0, 100.0)
}

/// Tracks completion of a session's target parts
#[derive(Debug, Clone)]
pub struct CompletionTracker {
    config: TrackerConfig,
    index: Arc<RegionIndex>,
    targets: SessionTargets,
    events: CompletionEvents,
    ticks: u64,
}

impl CompletionTracker {
    pub fn new(config: TrackerConfig, index: Arc<RegionIndex>) -> Self {
        Self {
            config,
            index,
            targets: SessionTargets::default(),
            events: CompletionEvents::new(),
            ticks: 0,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn targets(&self) -> &SessionTargets {
        &self.targets
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Register the parts a session needs and capture their baselines
    ///
    /// Call once the store has been cleared for the subject; baselines taken
    /// from an unsettled mask corrupt every later percentage of that part.
    /// Re-registering a name replaces its baseline and keeps its completion.
    pub fn register_target_parts(
        &mut self,
        store: &MaskStore,
        targets: impl IntoIterator<Item = PartTarget>,
    ) {
        let mut grids = AHashMap::new();

        for target in targets {
            let part = self.resolve(target);
            let baseline = self.count_part(&part, store, &mut grids);
            if baseline == 0 {
                tracing::warn!(
                    "Part '{}' registered with a zero baseline; it will report 0%",
                    part.name
                );
            }

            let percentage = if self.targets.completed.contains(&part.name) {
                100.0
            } else {
                completion_percentage(baseline, baseline, self.config.completion_buffer)
            };
            self.targets.percentages.insert(part.name.clone(), percentage);

            let part = TrackedPart { baseline, ..part };
            match self.targets.parts.iter_mut().find(|p| p.name == part.name) {
                Some(existing) => *existing = part,
                None => self.targets.parts.push(part),
            }
        }
    }

    /// Resolve the scope of a target against the region index
    ///
    /// Region targets missing from the index degrade to whole-surface tracking.
    fn resolve(&self, target: PartTarget) -> TrackedPart {
        let (submesh, scope) = match target.scope {
            TargetScope::WholeSurface => (target.submesh, TargetScope::WholeSurface),
            TargetScope::Region => match self.index.get(&target.name) {
                Some(entry) => (entry.region.submesh, TargetScope::Region),
                None => {
                    tracing::warn!(
                        "No region defined for '{}', tracking all of {:?}",
                        target.name,
                        target.submesh
                    );
                    (target.submesh, TargetScope::WholeSurface)
                }
            },
        };

        TrackedPart {
            name: target.name,
            submesh,
            scope,
            baseline: 0,
        }
    }

    /// Qualifying cells of one part, sampling each submesh at most once
    fn count_part(
        &self,
        part: &TrackedPart,
        store: &MaskStore,
        grids: &mut AHashMap<SubmeshIndex, Option<SurfaceGrid>>,
    ) -> u32 {
        let grid_resolution = self.config.grid_resolution;
        let grid = grids
            .entry(part.submesh)
            .or_insert_with(|| SurfaceGrid::sample(store, part.submesh, grid_resolution));

        let Some(grid) = grid else {
            return 0;
        };

        let high = self.config.high_threshold;
        let low = self.config.low_threshold;
        match part.scope {
            TargetScope::WholeSurface => grid.count_qualifying(high, low, |_, _| true),
            TargetScope::Region => match self.index.get(&part.name) {
                Some(entry) => grid.count_qualifying(high, low, |x, y| {
                    entry.occupancy.contains(x, y, grid_resolution)
                }),
                None => 0,
            },
        }
    }

    /// Recount every target and update percentages and completions
    pub fn tick(&mut self, store: &MaskStore) -> &PartPercentages {
        self.ticks += 1;

        let mut grids = AHashMap::new();
        let counts: Vec<u32> = self
            .targets
            .parts
            .iter()
            .map(|part| self.count_part(part, store, &mut grids))
            .collect();

        let mut newly_completed = Vec::new();
        for (part, current) in self.targets.parts.iter().zip(counts) {
            if self.targets.completed.contains(&part.name) {
                self.targets.percentages.insert(part.name.clone(), 100.0);
                continue;
            }

            let percentage =
                completion_percentage(part.baseline, current, self.config.completion_buffer);
            if percentage >= self.config.threshold_for(&part.name) {
                newly_completed.push(part.name.clone());
            } else {
                self.targets.percentages.insert(part.name.clone(), percentage);
            }
        }

        for name in newly_completed {
            self.complete(name, false);
        }

        &self.targets.percentages
    }

    fn complete(&mut self, name: String, forced: bool) -> bool {
        self.targets.percentages.insert(name.clone(), 100.0);
        if !self.targets.completed.insert(name.clone()) {
            return false;
        }

        tracing::info!(
            "Part '{}' complete at tick {}{}",
            name,
            self.ticks,
            if forced { " (forced)" } else { "" }
        );
        self.events.push(CompletionEvent {
            part: name,
            tick: self.ticks,
            forced,
        });
        true
    }

    pub fn is_part_complete(&self, name: &str) -> bool {
        self.targets.completed.contains(name)
    }

    /// Complete parts without treatment; returns how many newly completed
    ///
    /// Names that are not session targets are ignored.
    pub fn force_complete(&mut self, target: ForceTarget) -> usize {
        let names: Vec<String> = match target {
            ForceTarget::All => self.targets.parts.iter().map(|p| p.name.clone()).collect(),
            ForceTarget::Part(name) => {
                if !self.targets.contains(&name) {
                    tracing::warn!("Cannot force-complete '{}': not a session target", name);
                    return 0;
                }
                vec![name]
            }
        };

        names
            .into_iter()
            .filter(|name| self.complete(name.clone(), true))
            .count()
    }

    /// Last computed percentage of a part
    pub fn percentage(&self, name: &str) -> Option<f32> {
        self.targets.percentages.get(name).copied()
    }

    pub fn percentages(&self) -> &PartPercentages {
        &self.targets.percentages
    }

    /// Mean percentage over all targets, 0 without targets
    pub fn overall_percentage(&self) -> f32 {
        let values = &self.targets.percentages;
        if values.is_empty() {
            return 0.0;
        }
        values.values().sum::<f32>() / values.len() as f32
    }

    /// Every target completed (false without targets)
    pub fn all_complete(&self) -> bool {
        !self.targets.is_empty()
            && self
                .targets
                .parts
                .iter()
                .all(|p| self.targets.completed.contains(&p.name))
    }

    /// Take completion events not yet delivered
    pub fn drain_events(&mut self) -> Vec<CompletionEvent> {
        self.events.drain()
    }

    /// Completions of this session in order
    pub fn completion_history(&self) -> &[CompletionEvent] {
        self.events.history()
    }

    /// Forget all targets and completions, for a new session or pooled reuse
    pub fn reset_session(&mut self) {
        self.targets.clear();
        self.events.clear();
        self.ticks = 0;
    }
}
