//! Per-frame perception: classify → warp → crop → overlay → coordinates →
//! map update → polar output.
//!
//! The pipeline holds only configuration and the solved calibration. The
//! world map and overlay belong to the caller and are mutated in place; the
//! navigable polar coordinates are returned fresh every frame.

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::classify::ClassMasks;
use crate::config::{CropConfig, PerceptionConfig};
use crate::coords::{rover_coords, to_polar, RoverPose};
use crate::error::PerceptionError;
use crate::homography::{HomographyGeometry, PerspectiveWarper};
use crate::overlay::VisionOverlay;
use crate::world_map::{MapUpdate, WorldMap};


/// Closest rock-sample pixel seen this frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RockSighting {
    /// Rover-centric distance, in top-down pixels.
    pub distance: f64,
    /// Rover-centric bearing in radians, positive to the left.
    pub angle: f64,
    /// World cell `[x, y]` that was flagged.
    pub world_cell: [usize; 2],
}

/// Set-pixel counts of the cropped top-down masks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameStats {
    pub navigable_px: usize,
    pub obstacle_px: usize,
    pub rock_px: usize,
    pub map: MapUpdate,
}

/// Result of one [`PerceptionPipeline::step`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerceptionOutput {
    /// Distance to every navigable top-down pixel.
    pub nav_distances: Vec<f64>,
    /// Bearing of every navigable top-down pixel, index-aligned with
    /// `nav_distances`.
    pub nav_angles: Vec<f64>,
    pub nearest_rock: Option<RockSighting>,
    pub stats: FrameStats,
}

/// Wrap a raw interleaved buffer as an RGB frame.
///
/// Rejects zero dimensions, anything other than 3 channels, and buffers of
/// the wrong length.
pub fn frame_from_raw(
    width: u32,
    height: u32,
    channels: usize,
    data: Vec<u8>,
) -> Result<RgbImage, PerceptionError> {
    if width == 0 || height == 0 {
        return Err(PerceptionError::EmptyImage { width, height });
    }
    if channels != 3 {
        return Err(PerceptionError::ChannelCount {
            expected: 3,
            got: channels,
        });
    }
    let expected = width as usize * height as usize * 3;
    let got = data.len();
    if got != expected {
        return Err(PerceptionError::BufferLength { expected, got });
    }
    RgbImage::from_raw(width, height, data)
        .ok_or(PerceptionError::BufferLength { expected, got })
}

fn crop(masks: &mut ClassMasks, crop: &CropConfig) {
    let [start, end] = crop.obstacle_col_band;
    masks.obstacle.zero_rows_before(crop.obstacle_min_row);
    masks.obstacle.zero_cols_outside(start, end);
    masks.navigable.zero_rows_before(crop.navigable_min_row);
}

#[derive(Debug)]
pub struct PerceptionPipeline {
    config: PerceptionConfig,
    warper: PerspectiveWarper,
}

impl PerceptionPipeline {
    /// Validate `config` and solve the calibration homography.
    pub fn new(config: PerceptionConfig) -> Result<Self, PerceptionError> {
        config.validate()?;
        let [w, h] = config.image_size;
        let warper = PerspectiveWarper::new(&config.calibration, w, h)?;
        Ok(Self { config, warper })
    }

    /// Same as [`new`](Self::new) with a custom geometry backend.
    pub fn with_geometry(
        config: PerceptionConfig,
        geometry: Box<dyn HomographyGeometry + Send + Sync>,
    ) -> Result<Self, PerceptionError> {
        config.validate()?;
        let [w, h] = config.image_size;
        let warper = PerspectiveWarper::with_geometry(&config.calibration, w, h, geometry)?;
        Ok(Self { config, warper })
    }

    pub fn config(&self) -> &PerceptionConfig {
        &self.config
    }

    pub fn warper(&self) -> &PerspectiveWarper {
        &self.warper
    }

    /// Fresh all-zero map sized by the configuration.
    pub fn new_world_map(&self) -> WorldMap {
        WorldMap::new(self.config.map.world_size)
    }

    /// Blank overlay sized to the configured frame.
    pub fn new_overlay(&self) -> VisionOverlay {
        let [w, h] = self.config.image_size;
        VisionOverlay::new(w, h)
    }

    fn check_frame(&self, image: &RgbImage) -> Result<(), PerceptionError> {
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            return Err(PerceptionError::EmptyImage {
                width: w,
                height: h,
            });
        }
        if [w, h] != self.config.image_size {
            return Err(PerceptionError::DimensionMismatch {
                what: "frame",
                expected: self.config.image_size,
                got: [w, h],
            });
        }
        Ok(())
    }

    /// Classify, warp, and crop one frame into top-down masks.
    pub fn top_down_masks(&self, image: &RgbImage) -> Result<ClassMasks, PerceptionError> {
        self.check_frame(image)?;
        Ok(self.warp_and_crop(image))
    }

    /// [`top_down_masks`](Self::top_down_masks) for a frame already checked.
    fn warp_and_crop(&self, image: &RgbImage) -> ClassMasks {
        let raw = ClassMasks::classify(image, &self.config.classifier);
        let mut warped = ClassMasks {
            navigable: self.warper.warp(&raw.navigable),
            obstacle: self.warper.warp(&raw.obstacle),
            rock: self.warper.warp(&raw.rock),
        };
        crop(&mut warped, &self.config.crop);
        warped
    }

    /// Run one frame.
    ///
    /// On error nothing is mutated. On success the overlay is fully
    /// rewritten and the map gains this frame's evidence.
    pub fn step(
        &self,
        image: &RgbImage,
        pose: &RoverPose,
        world_map: &mut WorldMap,
        overlay: &mut VisionOverlay,
    ) -> Result<PerceptionOutput, PerceptionError> {
        let checked = self
            .check_frame(image)
            .and_then(|()| self.check_overlay(image, overlay));
        if let Err(err) = checked {
            tracing::warn!("frame rejected: {}", err);
            return Err(err);
        }
        let masks = self.warp_and_crop(image);

        overlay.write_masks(&masks.obstacle, &masks.rock, &masks.navigable);

        let nav_rover = rover_coords(&masks.navigable);
        let obs_rover = rover_coords(&masks.obstacle);
        let rock_rover = rover_coords(&masks.rock);
        tracing::debug!(
            navigable = nav_rover.len(),
            obstacle = obs_rover.len(),
            rock = rock_rover.len(),
            "top-down pixels after crop"
        );

        let size = world_map.size();
        let scale = self.config.map.scale;
        let nav_world = nav_rover.to_world(pose, size, scale);
        let obs_world = obs_rover.to_world(pose, size, scale);
        let rock_world = rock_rover.to_world(pose, size, scale);

        let update = world_map.accumulate(
            &obs_world,
            &nav_world,
            &rock_rover,
            &rock_world,
            &self.config.map,
        );

        let nearest_rock = rock_rover.nearest().and_then(|(i, distance)| {
            let (_, angle) = to_polar(rock_rover.x[i], rock_rover.y[i]);
            let (wx, wy) = rock_world.get(i)?;
            tracing::trace!(distance, angle, wx, wy, "nearest rock");
            Some(RockSighting {
                distance,
                angle,
                world_cell: [wx, wy],
            })
        });

        let polar = nav_rover.to_polar();
        Ok(PerceptionOutput {
            nav_distances: polar.distances,
            nav_angles: polar.angles,
            nearest_rock,
            stats: FrameStats {
                navigable_px: nav_rover.len(),
                obstacle_px: obs_rover.len(),
                rock_px: rock_rover.len(),
                map: update,
            },
        })
    }

    fn check_overlay(
        &self,
        image: &RgbImage,
        overlay: &VisionOverlay,
    ) -> Result<(), PerceptionError> {
        let (w, h) = overlay.dimensions();
        let expected = [image.width(), image.height()];
        if [w, h] != expected {
            return Err(PerceptionError::DimensionMismatch {
                what: "overlay",
                expected,
                got: [w, h],
            });
        }
        Ok(())
    }
}
