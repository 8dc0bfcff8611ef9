//! rover-perception: camera-frame perception and world mapping for a
//! rover with a fixed forward camera.
//!
//! Each frame runs through the same stages:
//!
//! 1. **Classify** – per-pixel RGB thresholds into navigable, obstacle and
//!    rock-sample masks.
//! 2. **Warp** – perspective transform of each mask into a top-down view,
//!    using a homography solved once from a calibration quad.
//! 3. **Crop** – discard the unreliable far field of each top-down mask.
//! 4. **Coordinates** – rover-centric Cartesian and polar coordinates of the
//!    set pixels, then rotation, translation and scaling into world cells.
//! 5. **Map** – accumulate obstacle and navigable evidence and flag the
//!    nearest rock sample in a persistent [`WorldMap`].
//!
//! # Public API
//! - [`PerceptionPipeline`] with [`PerceptionConfig`] is the entry point
//! - [`WorldMap`] and [`VisionOverlay`] are owned by the caller and updated
//!   in place by [`PerceptionPipeline::step`]
//! - the individual stages are exported for callers that want to run them
//!   separately

mod classify;
mod config;
mod coords;
mod error;
mod homography;
mod mask;
mod overlay;
mod pipeline;
mod world_map;

#[cfg(test)]
mod test_utils;

pub use classify::{
    is_navigable, is_rock, navigable_mask, obstacle_mask, rock_mask, ClassMasks, ClassifierConfig,
};
pub use config::{CropConfig, PerceptionConfig};
pub use coords::{
    clip_to_grid, rotate, rover_coords, to_polar, to_world_grid, translate_and_scale,
    PolarCoords, RoverCoords, RoverPose, WorldCells,
};
pub use error::PerceptionError;
pub use homography::{
    homography_project, solve_quad_homography, CalibrationConfig, HomographyError,
    HomographyGeometry, PerspectiveWarper, Quad, QuadGeometry,
};
pub use mask::BinaryMask;
pub use overlay::VisionOverlay;
pub use pipeline::{frame_from_raw, FrameStats, PerceptionOutput, PerceptionPipeline, RockSighting};
pub use world_map::{MapConfig, MapUpdate, WorldMap};
