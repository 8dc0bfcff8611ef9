//! Shared synthetic frames and geometry stubs for unit tests.

use image::{Rgb, RgbImage};
use nalgebra::Matrix3;

use crate::homography::{HomographyError, HomographyGeometry, Quad};
use crate::mask::BinaryMask;

pub(crate) const SKY: Rgb<u8> = Rgb([40, 40, 60]);
pub(crate) const GROUND: Rgb<u8> = Rgb([200, 190, 180]);
pub(crate) const ROCK: Rgb<u8> = Rgb([200, 150, 30]);

/// Frame of `w × h` filled with `bg`.
pub(crate) fn solid_frame(w: u32, h: u32, bg: Rgb<u8>) -> RgbImage {
    RgbImage::from_pixel(w, h, bg)
}

/// Bright ground from `horizon_row` down, dark sky above.
pub(crate) fn ground_frame(w: u32, h: u32, horizon_row: u32) -> RgbImage {
    RgbImage::from_fn(w, h, |_, y| if y >= horizon_row { GROUND } else { SKY })
}

/// Fill the half-open rectangle `[x0, x1) × [y0, y1)`.
pub(crate) fn paint_rect(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
    for y in y0..y1.min(img.height()) {
        for x in x0..x1.min(img.width()) {
            img.put_pixel(x, y, color);
        }
    }
}

/// Geometry backend whose warp is the identity, so image pixels land on the
/// same top-down pixels.
pub(crate) struct IdentityGeometry;

impl HomographyGeometry for IdentityGeometry {
    fn solve_homography(&self, _: &Quad, _: &Quad) -> Result<Matrix3<f64>, HomographyError> {
        Ok(Matrix3::identity())
    }

    fn warp(&self, mask: &BinaryMask, _: &Matrix3<f64>, _: u32, _: u32) -> BinaryMask {
        mask.clone()
    }
}
