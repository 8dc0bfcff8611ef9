//! Pipeline configuration.
//!
//! Every field defaults to the rover's fixed calibration, so an empty JSON
//! object is a complete configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classify::ClassifierConfig;
use crate::error::PerceptionError;
use crate::homography::CalibrationConfig;
use crate::world_map::MapConfig;

/// Regions of the top-down masks that are kept before mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// Obstacle rows `0..obstacle_min_row` are cleared.
    pub obstacle_min_row: u32,
    /// Obstacle columns outside `[start, end)` are cleared.
    pub obstacle_col_band: [u32; 2],
    /// Navigable rows `0..navigable_min_row` are cleared.
    pub navigable_min_row: u32,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            obstacle_min_row: 110,
            obstacle_col_band: [130, 190],
            navigable_min_row: 80,
        }
    }
}

/// Top-level configuration for [`PerceptionPipeline`](crate::PerceptionPipeline).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Camera frame size `[width, height]`; every frame must match.
    pub image_size: [u32; 2],
    pub classifier: ClassifierConfig,
    pub calibration: CalibrationConfig,
    pub crop: CropConfig,
    pub map: MapConfig,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            image_size: [320, 160],
            classifier: ClassifierConfig::default(),
            calibration: CalibrationConfig::default(),
            crop: CropConfig::default(),
            map: MapConfig::default(),
        }
    }
}

impl PerceptionConfig {
    /// Load from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PerceptionError> {
        let invalid = |msg: String| Err(PerceptionError::InvalidConfig(msg));

        let [w, h] = self.image_size;
        if w == 0 || h == 0 {
            return invalid(format!("image_size must be positive, got {}x{}", w, h));
        }
        if self.map.world_size == 0 {
            return invalid("map.world_size must be positive".into());
        }
        if !self.map.scale.is_finite() || self.map.scale <= 0.0 {
            return invalid(format!(
                "map.scale must be finite and positive, got {}",
                self.map.scale
            ));
        }
        let (lo, hi) = (self.classifier.rock_low, self.classifier.rock_high);
        if (0..3).any(|c| lo[c] > hi[c]) {
            return invalid(format!(
                "classifier.rock_low {:?} exceeds rock_high {:?}",
                lo, hi
            ));
        }
        let [start, end] = self.crop.obstacle_col_band;
        if start >= end {
            return invalid(format!(
                "crop.obstacle_col_band [{}, {}) is empty",
                start, end
            ));
        }
        let cal = &self.calibration;
        if !cal.dst_half_size.is_finite() || cal.dst_half_size <= 0.0 {
            return invalid(format!(
                "calibration.dst_half_size must be positive, got {}",
                cal.dst_half_size
            ));
        }
        if !cal.bottom_offset.is_finite() {
            return invalid("calibration.bottom_offset must be finite".into());
        }
        Ok(())
    }
}
