//! Built-in body-part catalog (14 parts over 4 submeshes)
//!
//! UV extents are given as `(x, y, width, height)` rects with the UV origin at
//! the bottom-left. Custom catalogs can be loaded from JSON instead.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::{BodyPartRegion, RegionValidator};
use crate::core::error::{MaskError, Result};
use crate::core::types::{SubmeshIndex, UvRect};

pub const HEAD_SUBMESH: SubmeshIndex = SubmeshIndex(0);
pub const BODY_SUBMESH: SubmeshIndex = SubmeshIndex(1);
pub const ARM_SUBMESH: SubmeshIndex = SubmeshIndex(2);
pub const LEG_SUBMESH: SubmeshIndex = SubmeshIndex(3);

/// Body parts of the default character mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyPart {
    Beard,
    Chest,
    Abs,
    /// Split across both UV borders of the body sheet
    Back,
    LeftArmpit,
    RightArmpit,
    LeftUpperArm,
    LeftLowerArm,
    RightUpperArm,
    RightLowerArm,
    LeftThigh,
    LeftCalf,
    RightThigh,
    RightCalf,
}

impl BodyPart {
    /// Returns all body parts
    pub fn all() -> [BodyPart; 14] {
        [
            BodyPart::Beard,
            BodyPart::Chest,
            BodyPart::Abs,
            BodyPart::Back,
            BodyPart::LeftArmpit,
            BodyPart::RightArmpit,
            BodyPart::LeftUpperArm,
            BodyPart::LeftLowerArm,
            BodyPart::RightUpperArm,
            BodyPart::RightLowerArm,
            BodyPart::LeftThigh,
            BodyPart::LeftCalf,
            BodyPart::RightThigh,
            BodyPart::RightCalf,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            BodyPart::Beard => "Beard",
            BodyPart::Chest => "Chest",
            BodyPart::Abs => "Abs",
            BodyPart::Back => "Back",
            BodyPart::LeftArmpit => "LeftArmpit",
            BodyPart::RightArmpit => "RightArmpit",
            BodyPart::LeftUpperArm => "LeftUpperArm",
            BodyPart::LeftLowerArm => "LeftLowerArm",
            BodyPart::RightUpperArm => "RightUpperArm",
            BodyPart::RightLowerArm => "RightLowerArm",
            BodyPart::LeftThigh => "LeftThigh",
            BodyPart::LeftCalf => "LeftCalf",
            BodyPart::RightThigh => "RightThigh",
            BodyPart::RightCalf => "RightCalf",
        }
    }

    pub fn from_name(name: &str) -> Option<BodyPart> {
        Self::all().into_iter().find(|part| part.name() == name)
    }

    /// Which submesh (material slot) carries this part
    pub fn submesh(&self) -> SubmeshIndex {
        match self {
            BodyPart::Beard => HEAD_SUBMESH,
            BodyPart::Chest
            | BodyPart::Abs
            | BodyPart::Back
            | BodyPart::LeftArmpit
            | BodyPart::RightArmpit => BODY_SUBMESH,
            BodyPart::LeftUpperArm
            | BodyPart::LeftLowerArm
            | BodyPart::RightUpperArm
            | BodyPart::RightLowerArm => ARM_SUBMESH,
            _ => LEG_SUBMESH,
        }
    }

    /// Value identifying the part in a combined part-ID mask
    pub fn mask_value(&self) -> f32 {
        match self {
            BodyPart::Beard => 0.05,
            BodyPart::Chest => 0.10,
            BodyPart::Abs => 0.15,
            BodyPart::Back => 0.20,
            BodyPart::LeftUpperArm => 0.25,
            BodyPart::LeftLowerArm => 0.30,
            BodyPart::LeftArmpit => 0.35,
            BodyPart::RightUpperArm => 0.40,
            BodyPart::RightLowerArm => 0.45,
            BodyPart::RightArmpit => 0.50,
            BodyPart::LeftThigh => 0.55,
            BodyPart::LeftCalf => 0.60,
            BodyPart::RightThigh => 0.65,
            BodyPart::RightCalf => 0.70,
        }
    }

    /// UV extent of the part
    pub fn uv_rects(&self) -> Vec<UvRect> {
        match self {
            BodyPart::Beard => vec![UvRect::new(0.25, 0.2, 0.5, 0.5)],
            BodyPart::Chest => vec![UvRect::new(0.28, 0.66, 0.42, 0.34)],
            BodyPart::Abs => vec![UvRect::new(0.37, 0.26, 0.26, 0.38)],
            BodyPart::Back => vec![
                UvRect::new(0.0, 0.2, 0.2, 0.8),
                UvRect::new(0.8, 0.2, 0.2, 0.8),
            ],
            BodyPart::LeftArmpit => vec![UvRect::new(0.7, 0.75, 0.082, 0.09)],
            BodyPart::RightArmpit => vec![UvRect::new(0.199, 0.72, 0.082, 0.12)],
            BodyPart::LeftUpperArm => vec![UvRect::new(0.651, 0.6, 0.349, 0.4)],
            BodyPart::LeftLowerArm => vec![UvRect::new(0.5, 0.31, 0.5, 0.28)],
            BodyPart::RightUpperArm => vec![UvRect::new(0.0, 0.6, 0.349, 0.4)],
            BodyPart::RightLowerArm => vec![UvRect::new(0.0, 0.31, 0.5, 0.28)],
            BodyPart::LeftThigh => vec![UvRect::new(0.5, 0.55, 0.5, 0.45)],
            BodyPart::LeftCalf => vec![UvRect::new(0.5, 0.24, 0.5, 0.3)],
            BodyPart::RightThigh => vec![UvRect::new(0.0, 0.55, 0.5, 0.45)],
            BodyPart::RightCalf => vec![UvRect::new(0.0, 0.24, 0.5, 0.3)],
        }
    }

    pub fn region(&self) -> BodyPartRegion {
        BodyPartRegion::from_rects(self.name(), self.submesh(), &self.uv_rects())
    }
}

/// Display name of a built-in submesh
pub fn submesh_name(submesh: SubmeshIndex) -> Option<&'static str> {
    match submesh {
        HEAD_SUBMESH => Some("Head"),
        BODY_SUBMESH => Some("Body"),
        ARM_SUBMESH => Some("Arm"),
        LEG_SUBMESH => Some("Leg"),
        _ => None,
    }
}

/// Regions of every built-in body part
pub fn default_regions() -> Vec<BodyPartRegion> {
    BodyPart::all().iter().map(BodyPart::region).collect()
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    parts: Vec<BodyPartRegion>,
}

/// Parse and validate a JSON catalog of the form `{"parts": [region, ...]}`
pub fn load_regions_json(content: &str) -> Result<Vec<BodyPartRegion>> {
    let catalog: CatalogFile = serde_json::from_str(content)?;

    for region in &catalog.parts {
        let errors = RegionValidator::validate_region(region);
        if let Some(first) = errors.first() {
            return Err(MaskError::InvalidRegion {
                part: region.name.clone(),
                reason: first.to_string(),
            });
        }
    }

    Ok(catalog.parts)
}

/// Load a JSON catalog from disk
pub fn load_regions_file(path: &Path) -> Result<Vec<BodyPartRegion>> {
    let content = fs::read_to_string(path)?;
    load_regions_json(&content)
}
