//! Persistent world map: a lifetime evidence log per grid cell.
//!
//! Three independent planes over a square grid. Cell `(x, y)` is stored at
//! row `y`, column `x`. Counters never decay and are never reset during a
//! run; they saturate at `u32::MAX` instead of wrapping.

use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::coords::{RoverCoords, WorldCells};

/// Map geometry and update weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Side of the square grid, in cells.
    pub world_size: usize,
    /// Rover-centric distance units per world cell.
    pub scale: f64,
    /// Added to `obstacle_count` per observed cell per frame.
    pub obstacle_increment: u32,
    /// Added to `navigable_count` per observed cell per frame.
    pub navigable_increment: u32,
    /// Value written to `rock_flag` at the nearest rock sighting.
    pub rock_flag_value: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            world_size: 200,
            scale: 10.0,
            obstacle_increment: 1,
            navigable_increment: 10,
            rock_flag_value: 255,
        }
    }
}

/// Cells touched by one frame's update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapUpdate {
    pub obstacle_cells: usize,
    pub navigable_cells: usize,
    /// World cell flagged as a rock this frame, if any.
    pub rock_cell: Option<[usize; 2]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldMap {
    size: usize,
    obstacle: Vec<u32>,
    rock: Vec<u8>,
    navigable: Vec<u32>,
}

impl WorldMap {
    /// All-zero map of `size × size` cells.
    ///
    /// # Panics
    /// Panics if `size == 0`.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "world map size must be positive");
        let n = size * size;
        Self {
            size,
            obstacle: vec![0; n],
            rock: vec![0; n],
            navigable: vec![0; n],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        assert!(x < self.size && y < self.size, "cell ({x}, {y}) outside map");
        y * self.size + x
    }

    #[inline]
    fn checked_index(size: usize, x: usize, y: usize) -> Option<usize> {
        (x < size && y < size).then(|| y * size + x)
    }

    /// # Panics
    /// Panics if the cell is outside the map.
    pub fn obstacle_count(&self, x: usize, y: usize) -> u32 {
        self.obstacle[self.index(x, y)]
    }

    /// # Panics
    /// Panics if the cell is outside the map.
    pub fn navigable_count(&self, x: usize, y: usize) -> u32 {
        self.navigable[self.index(x, y)]
    }

    /// # Panics
    /// Panics if the cell is outside the map.
    pub fn rock_flag(&self, x: usize, y: usize) -> u8 {
        self.rock[self.index(x, y)]
    }

    /// Every cell with a nonzero rock flag, as `(x, y)`.
    pub fn rock_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let size = self.size;
        self.rock
            .iter()
            .enumerate()
            .filter(|(_, &v)| v != 0)
            .map(move |(i, _)| (i % size, i / size))
    }

    /// Add `step` once to every distinct cell in `cells`.
    ///
    /// A cell hit by several pixels in the same frame still counts once for
    /// that frame. Cells outside the map are skipped. Returns the number of
    /// distinct cells updated.
    fn bump(plane: &mut [u32], size: usize, cells: &WorldCells, step: u32) -> usize {
        let mut idx = Vec::with_capacity(cells.len());
        let mut skipped = 0usize;
        for (x, y) in cells.iter() {
            match Self::checked_index(size, x, y) {
                Some(i) => idx.push(i),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            tracing::warn!(skipped, size, "ignoring cells outside the world map");
        }
        idx.sort_unstable();
        idx.dedup();
        for &i in &idx {
            plane[i] = plane[i].saturating_add(step);
        }
        idx.len()
    }

    /// Fold one frame of evidence into the map.
    ///
    /// `rock_rover` and `rock_world` are index-aligned. When non-empty, only
    /// the candidate closest to the rover is flagged; an empty rock set
    /// leaves every existing flag untouched. Cells outside the map are
    /// ignored; cells produced by [`to_world_grid`](crate::to_world_grid)
    /// for this map's size never are.
    pub fn accumulate(
        &mut self,
        obstacle: &WorldCells,
        navigable: &WorldCells,
        rock_rover: &RoverCoords,
        rock_world: &WorldCells,
        config: &MapConfig,
    ) -> MapUpdate {
        let obstacle_cells = Self::bump(
            &mut self.obstacle,
            self.size,
            obstacle,
            config.obstacle_increment,
        );
        let navigable_cells = Self::bump(
            &mut self.navigable,
            self.size,
            navigable,
            config.navigable_increment,
        );

        let size = self.size;
        let rock_cell = rock_rover
            .nearest()
            .and_then(|(i, _)| rock_world.get(i))
            .and_then(|(x, y)| match Self::checked_index(size, x, y) {
                Some(i) => {
                    self.rock[i] = config.rock_flag_value;
                    Some([x, y])
                }
                None => {
                    tracing::warn!(x, y, size, "nearest rock lies outside the world map");
                    None
                }
            });

        tracing::debug!(
            obstacle_cells,
            navigable_cells,
            rock = ?rock_cell,
            "world map updated"
        );

        MapUpdate {
            obstacle_cells,
            navigable_cells,
            rock_cell,
        }
    }

    /// Display snapshot, image row = map `y`: red = obstacle count, green =
    /// rock flag, blue = navigable count, each clipped to 255.
    pub fn to_rgb_image(&self) -> RgbImage {
        let size = self.size as u32;
        RgbImage::from_fn(size, size, |x, y| {
            let i = self.index(x as usize, y as usize);
            Rgb([
                self.obstacle[i].min(255) as u8,
                self.rock[i],
                self.navigable[i].min(255) as u8,
            ])
        })
    }
}
