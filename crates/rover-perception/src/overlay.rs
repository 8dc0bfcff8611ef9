//! Debug overlay of the current frame's top-down masks.

use image::{Rgb, RgbImage};

use crate::mask::BinaryMask;

/// Three-channel debug image, rewritten from scratch every frame.
///
/// Red = obstacle, green = rock, blue = navigable; each 0 or 255.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisionOverlay {
    img: RgbImage,
}

impl VisionOverlay {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            img: RgbImage::new(width, height),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.img.dimensions()
    }

    pub fn image(&self) -> &RgbImage {
        &self.img
    }

    pub fn into_image(self) -> RgbImage {
        self.img
    }

    /// Replace every pixel from the three masks.
    ///
    /// # Panics
    /// Panics if any mask is smaller than the overlay.
    pub fn write_masks(
        &mut self,
        obstacle: &BinaryMask,
        rock: &BinaryMask,
        navigable: &BinaryMask,
    ) {
        let full = |m: &BinaryMask, x: u32, y: u32| -> u8 {
            if m.get(x, y) {
                255
            } else {
                0
            }
        };
        for (x, y, px) in self.img.enumerate_pixels_mut() {
            *px = Rgb([full(obstacle, x, y), full(rock, x, y), full(navigable, x, y)]);
        }
    }
}
