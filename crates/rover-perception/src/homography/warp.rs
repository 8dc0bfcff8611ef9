//! Bird's-eye projection of binary masks.

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use crate::mask::BinaryMask;

use super::core::{homography_project, solve_quad_homography, HomographyError, Quad};

/// Solve-and-resample capability consumed by [`PerspectiveWarper`].
///
/// Implement this to swap in another geometry backend. `warp` must return a
/// mask of exactly `width × height` with every destination pixel whose
/// preimage falls outside the source set to 0.
pub trait HomographyGeometry {
    /// Homography mapping `src` onto `dst`.
    fn solve_homography(&self, src: &Quad, dst: &Quad) -> Result<Matrix3<f64>, HomographyError>;

    /// Resample `mask` through the inverse of `transform`.
    fn warp(
        &self,
        mask: &BinaryMask,
        transform: &Matrix3<f64>,
        width: u32,
        height: u32,
    ) -> BinaryMask;
}

/// Exact four-point solve plus bilinear inverse-mapping with a
/// constant-zero border.
///
/// Interpolated values are thresholded at 0.5 so the output stays 0/1.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadGeometry;

impl HomographyGeometry for QuadGeometry {
    fn solve_homography(&self, src: &Quad, dst: &Quad) -> Result<Matrix3<f64>, HomographyError> {
        solve_quad_homography(src, dst)
    }

    fn warp(
        &self,
        mask: &BinaryMask,
        transform: &Matrix3<f64>,
        width: u32,
        height: u32,
    ) -> BinaryMask {
        let Some(inv) = transform.try_inverse() else {
            return BinaryMask::new(width, height);
        };
        BinaryMask::from_fn(width, height, |x, y| {
            let [sx, sy] = homography_project(&inv, x as f64, y as f64);
            bilinear_sample_zero_border(mask, sx, sy) >= 0.5
        })
    }
}

/// Bilinear sample of a 0/1 mask; taps outside the mask read as 0.
#[inline]
fn bilinear_sample_zero_border(mask: &BinaryMask, x: f64, y: f64) -> f64 {
    if !x.is_finite() || !y.is_finite() {
        return 0.0;
    }
    let (w, h) = mask.dimensions();
    let x0 = x.floor();
    let y0 = y.floor();
    // Entirely outside: no tap can land inside.
    if x0 < -1.0 || y0 < -1.0 || x0 >= w as f64 || y0 >= h as f64 {
        return 0.0;
    }
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);
    let tap = |xi: i64, yi: i64| -> f64 {
        if xi < 0 || yi < 0 || xi >= w as i64 || yi >= h as i64 {
            0.0
        } else if mask.get(xi as u32, yi as u32) {
            1.0
        } else {
            0.0
        }
    };
    (1.0 - fx) * (1.0 - fy) * tap(x0, y0)
        + fx * (1.0 - fy) * tap(x0 + 1, y0)
        + (1.0 - fx) * fy * tap(x0, y0 + 1)
        + fx * fy * tap(x0 + 1, y0 + 1)
}

/// Fixed ground-plane calibration for the forward camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Image-space corners of a known flat-ground rectangle, in the order
    /// bottom-left, bottom-right, top-right, top-left.
    pub source_quad: Quad,
    /// Half the side of the destination square, in pixels.
    pub dst_half_size: f64,
    /// Gap between the image bottom and the destination square, in pixels.
    pub bottom_offset: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            source_quad: [[14.0, 140.0], [301.0, 140.0], [200.0, 96.0], [118.0, 96.0]],
            dst_half_size: 5.0,
            bottom_offset: 6.0,
        }
    }
}

impl CalibrationConfig {
    /// Destination square for an image of `width × height`: centered on the
    /// image column midline, its bottom edge `bottom_offset` above the image
    /// bottom. Corner order matches `source_quad`.
    pub fn destination_quad(&self, width: u32, height: u32) -> Quad {
        let cx = width as f64 / 2.0;
        let bottom = height as f64 - self.bottom_offset;
        let top = bottom - 2.0 * self.dst_half_size;
        let d = self.dst_half_size;
        [[cx - d, bottom], [cx + d, bottom], [cx + d, top], [cx - d, top]]
    }
}

/// Projects image-space masks into a top-down, rover-aligned frame.
///
/// The homography is solved once for the configured image size and reused
/// for every frame.
pub struct PerspectiveWarper {
    geometry: Box<dyn HomographyGeometry + Send + Sync>,
    transform: Matrix3<f64>,
    width: u32,
    height: u32,
}

impl std::fmt::Debug for PerspectiveWarper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerspectiveWarper")
            .field("transform", &self.transform)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl PerspectiveWarper {
    /// Build with the built-in [`QuadGeometry`] backend.
    pub fn new(
        calibration: &CalibrationConfig,
        width: u32,
        height: u32,
    ) -> Result<Self, HomographyError> {
        Self::with_geometry(calibration, width, height, Box::new(QuadGeometry))
    }

    pub fn with_geometry(
        calibration: &CalibrationConfig,
        width: u32,
        height: u32,
        geometry: Box<dyn HomographyGeometry + Send + Sync>,
    ) -> Result<Self, HomographyError> {
        let dst = calibration.destination_quad(width, height);
        let transform = geometry.solve_homography(&calibration.source_quad, &dst)?;
        Ok(Self {
            geometry,
            transform,
            width,
            height,
        })
    }

    /// Image → top-down homography.
    pub fn transform(&self) -> &Matrix3<f64> {
        &self.transform
    }

    /// Warp `mask` into the top-down frame. Output shape equals input shape.
    pub fn warp(&self, mask: &BinaryMask) -> BinaryMask {
        let (w, h) = mask.dimensions();
        self.geometry.warp(mask, &self.transform, w, h)
    }
}
