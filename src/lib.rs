//! Pelt Mask - Progressive surface-treatment mask engine
//!
//! Tracks per-pixel hair state in UV space, paints shaver and laser strokes
//! into it, and reports per-body-part completion.

pub mod brush;
pub mod completion;
pub mod core;
pub mod export;
pub mod mask;
pub mod region;

pub use crate::brush::{BrushShape, BrushStroke, FootprintCalculator, TreatmentKind, UvFootprint};
pub use crate::completion::{CompletionEvent, CompletionTracker, ForceTarget, PartTarget};
pub use crate::core::config::MaskConfig;
pub use crate::core::error::{MaskError, Result};
pub use crate::core::types::SubmeshIndex;
pub use crate::mask::{GrowthBuffer, MaskStore};
pub use crate::region::{BodyPartRegion, RegionIndex};
