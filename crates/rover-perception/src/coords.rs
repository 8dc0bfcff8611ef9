//! Coordinate-frame chain: top-down pixel → rover-centric → world grid, and
//! rover-centric → polar.
//!
//! Rover-centric frame: origin at the rover, `x` forward (away from the
//! camera), `y` lateral and positive to the rover's left. World grid: integer
//! cells of a square map, always clipped to `[0, world_size - 1]`.

use serde::{Deserialize, Serialize};

use crate::mask::BinaryMask;

/// Rover position in world units and heading in degrees, counter-clockwise
/// from the world x axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RoverPose {
    pub x: f64,
    pub y: f64,
    pub yaw_deg: f64,
}

impl RoverPose {
    pub fn new(x: f64, y: f64, yaw_deg: f64) -> Self {
        Self { x, y, yaw_deg }
    }
}

/// Rover-centric coordinates of every set pixel of one mask.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoverCoords {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Clipped world-grid cells, index-aligned with the [`RoverCoords`] they
/// were computed from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorldCells {
    pub x: Vec<usize>,
    pub y: Vec<usize>,
}

/// Distance/angle pairs, index-aligned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolarCoords {
    pub distances: Vec<f64>,
    /// Radians in (−π, π].
    pub angles: Vec<f64>,
}

/// Convert every set pixel of a top-down mask to rover-centric coordinates.
///
/// The rover sits at the bottom-centre of the image: `x = height − row`,
/// `y = width / 2 − col`. Output order follows [`BinaryMask::set_pixels`].
pub fn rover_coords(mask: &BinaryMask) -> RoverCoords {
    let h = mask.height() as f64;
    let half_w = mask.width() as f64 / 2.0;
    let n = mask.count_set();
    let mut out = RoverCoords {
        x: Vec::with_capacity(n),
        y: Vec::with_capacity(n),
    };
    for (col, row) in mask.set_pixels() {
        out.x.push(h - row as f64);
        out.y.push(half_w - col as f64);
    }
    out
}

/// `(sqrt(x² + y²), atan2(y, x))`.
#[inline]
pub fn to_polar(x: f64, y: f64) -> (f64, f64) {
    ((x * x + y * y).sqrt(), y.atan2(x))
}

/// Rotate counter-clockwise by `yaw_deg` degrees.
#[inline]
pub fn rotate(x: f64, y: f64, yaw_deg: f64) -> (f64, f64) {
    let (sin, cos) = yaw_deg.to_radians().sin_cos();
    (x * cos - y * sin, x * sin + y * cos)
}

/// Shrink by `scale` (rover units per world cell) and move to the pose.
#[inline]
pub fn translate_and_scale(x: f64, y: f64, pose_x: f64, pose_y: f64, scale: f64) -> (f64, f64) {
    (x / scale + pose_x, y / scale + pose_y)
}

/// Truncate toward zero and clip to `[0, world_size − 1]`.
///
/// Saturating float-to-int casts keep huge magnitudes in range and map NaN
/// to 0, so the result always indexes inside the grid.
#[inline]
pub fn clip_to_grid(v: f64, world_size: usize) -> usize {
    let max = world_size.saturating_sub(1) as i64;
    (v as i64).clamp(0, max) as usize
}

/// Rover-centric point → world cell: rotate, translate/scale, truncate, clip.
pub fn to_world_grid(
    x: f64,
    y: f64,
    pose: &RoverPose,
    world_size: usize,
    scale: f64,
) -> (usize, usize) {
    let (xr, yr) = rotate(x, y, pose.yaw_deg);
    let (xw, yw) = translate_and_scale(xr, yr, pose.x, pose.y, scale);
    (clip_to_grid(xw, world_size), clip_to_grid(yw, world_size))
}

impl RoverCoords {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    pub fn to_polar(&self) -> PolarCoords {
        let (distances, angles) = self.iter().map(|(x, y)| to_polar(x, y)).unzip();
        PolarCoords { distances, angles }
    }

    pub fn to_world(&self, pose: &RoverPose, world_size: usize, scale: f64) -> WorldCells {
        let (x, y) = self
            .iter()
            .map(|(x, y)| to_world_grid(x, y, pose, world_size, scale))
            .unzip();
        WorldCells { x, y }
    }

    /// Index and distance of the point closest to the rover.
    ///
    /// Ties keep the earliest index.
    pub fn nearest(&self) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (i, (x, y)) in self.iter().enumerate() {
            let (d, _) = to_polar(x, y);
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((i, d)),
            }
        }
        best
    }
}

impl WorldCells {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    pub fn get(&self, i: usize) -> Option<(usize, usize)> {
        Some((*self.x.get(i)?, *self.y.get(i)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn rover_coords_use_bottom_centre_origin() {
        let mut mask = BinaryMask::new(320, 160);
        mask.set(160, 150, true);
        mask.set(0, 0, true);
        let rc = rover_coords(&mask);
        // Row-major: (0, 0) first.
        assert_eq!(rc.x, vec![160.0, 10.0]);
        assert_eq!(rc.y, vec![160.0, 0.0]);
    }

    #[test]
    fn rover_coords_of_empty_mask_is_empty() {
        let rc = rover_coords(&BinaryMask::new(10, 10));
        assert!(rc.is_empty());
        assert!(rc.to_polar().distances.is_empty());
        assert!(rc.to_world(&RoverPose::default(), 200, 10.0).is_empty());
        assert_eq!(rc.nearest(), None);
    }

    #[test]
    fn polar_of_axis_points() {
        let (d, a) = to_polar(10.0, 0.0);
        assert_abs_diff_eq!(d, 10.0);
        assert_abs_diff_eq!(a, 0.0);

        let (d, a) = to_polar(3.0, 4.0);
        assert_abs_diff_eq!(d, 5.0);
        assert_abs_diff_eq!(a, 4.0f64.atan2(3.0));

        let (_, a) = to_polar(-1.0, 0.0);
        assert_abs_diff_eq!(a, std::f64::consts::PI);
    }

    #[test]
    fn rotate_zero_is_identity_and_full_turn_matches() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let x: f64 = rng.gen_range(-500.0..500.0);
            let y: f64 = rng.gen_range(-500.0..500.0);
            assert_eq!(rotate(x, y, 0.0), (x, y));
            let (a, b) = rotate(x, y, 360.0);
            assert_abs_diff_eq!(a, x, epsilon = 1e-9);
            assert_abs_diff_eq!(b, y, epsilon = 1e-9);
        }
    }

    #[test]
    fn rotate_quarter_turn_is_counter_clockwise() {
        let (x, y) = rotate(1.0, 0.0, 90.0);
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn translate_and_scale_divides_then_offsets() {
        assert_eq!(translate_and_scale(10.0, -20.0, 5.0, 7.0, 10.0), (6.0, 5.0));
    }

    #[test]
    fn world_grid_reference_chain() {
        // Forward 10, lateral 0, pose (10, 10), yaw 0, scale 10.
        let pose = RoverPose::new(10.0, 10.0, 0.0);
        assert_eq!(to_world_grid(10.0, 0.0, &pose, 200, 10.0), (11, 10));
    }

    #[test]
    fn world_grid_truncates_toward_zero_then_clips() {
        let pose = RoverPose::new(0.0, 0.0, 0.0);
        // -0.5 truncates to 0, not -1.
        assert_eq!(to_world_grid(-5.0, 19.9, &pose, 200, 10.0), (0, 1));
        assert_eq!(to_world_grid(-50.0, 0.0, &pose, 200, 10.0), (0, 0));
    }

    #[test]
    fn world_grid_is_always_clipped() {
        let mut rng = StdRng::seed_from_u64(3);
        let size = 200;
        for _ in 0..1000 {
            let pose = RoverPose::new(
                rng.gen_range(-1e3..1e3),
                rng.gen_range(-1e3..1e3),
                rng.gen_range(-720.0..720.0),
            );
            let x = rng.gen_range(-1e12..1e12);
            let y = rng.gen_range(-1e12..1e12);
            let (wx, wy) = to_world_grid(x, y, &pose, size, 10.0);
            assert!(wx < size && wy < size);
        }
        let pose = RoverPose::default();
        for v in [f64::MAX, f64::MIN, f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let (wx, wy) = to_world_grid(v, v, &pose, size, 10.0);
            assert!(wx < size && wy < size);
        }
    }

    #[test]
    fn nearest_keeps_first_minimum() {
        let rc = RoverCoords {
            x: vec![30.0, 3.0, 0.0, 4.0],
            y: vec![0.0, 4.0, 5.0, -3.0],
        };
        // Indices 1, 2 and 3 all lie at distance 5.
        assert_eq!(rc.nearest(), Some((1, 5.0)));
    }
}
