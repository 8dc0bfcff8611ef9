//! Homography estimation and perspective resampling.

mod core;
mod warp;

pub use self::core::{homography_project, solve_quad_homography, HomographyError, Quad};
pub use self::warp::{CalibrationConfig, HomographyGeometry, PerspectiveWarper, QuadGeometry};
