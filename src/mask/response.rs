//! Hair response curve
//!
//! Maps the average treatment level under a brush (from
//! `MaskStore::sample_average`) to a multiplier for responses that scale with
//! how much hair was present, such as pain feedback.

use serde::{Deserialize, Serialize};

/// Piecewise-linear response: 0 → stubble regime → long-hair regime
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HairResponseCurve {
    /// Average treatment level separating the stubble and long-hair regimes
    pub stubble_threshold: f32,
    /// Multiplier reached at `stubble_threshold`
    pub stubble_multiplier: f32,
    /// Multiplier reached at full, untreated hair
    pub long_hair_multiplier: f32,
}

impl Default for HairResponseCurve {
    fn default() -> Self {
        Self {
            stubble_threshold: 0.35,
            stubble_multiplier: 0.3,
            long_hair_multiplier: 1.0,
        }
    }
}

impl HairResponseCurve {
    pub fn multiplier(&self, average: f32) -> f32 {
        if !average.is_finite() || average <= 0.0 {
            return 0.0;
        }
        let average = average.min(1.0);

        if average <= self.stubble_threshold {
            let t = average / self.stubble_threshold;
            self.stubble_multiplier * t
        } else {
            let t = (average - self.stubble_threshold) / (1.0 - self.stubble_threshold);
            self.stubble_multiplier + (self.long_hair_multiplier - self.stubble_multiplier) * t
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.stubble_threshold > 0.0 && self.stubble_threshold < 1.0) {
            return Err(format!(
                "response.stubble_threshold ({}) must be strictly between 0 and 1",
                self.stubble_threshold
            ));
        }
        if self.stubble_multiplier < 0.0 || self.long_hair_multiplier < 0.0 {
            return Err("response multipliers must not be negative".into());
        }
        Ok(())
    }
}
