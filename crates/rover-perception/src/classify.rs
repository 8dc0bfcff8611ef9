//! Per-pixel color classification into navigable / obstacle / rock masks.

use image::{Rgb, RgbImage};

use crate::mask::BinaryMask;

/// Color rules for the three classes.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Navigable terrain: every channel strictly above its entry.
    pub navigable_min: [u8; 3],
    /// Rock sample: every channel within `[rock_low, rock_high]` (inclusive).
    pub rock_low: [u8; 3],
    pub rock_high: [u8; 3],
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            navigable_min: [160, 160, 160],
            rock_low: [170, 120, 0],
            rock_high: [230, 180, 60],
        }
    }
}

/// True iff all three channels are strictly greater than `thresh`.
#[inline]
pub fn is_navigable(px: &Rgb<u8>, thresh: [u8; 3]) -> bool {
    px[0] > thresh[0] && px[1] > thresh[1] && px[2] > thresh[2]
}

/// True iff every channel lies within its inclusive `[low, high]` bound.
#[inline]
pub fn is_rock(px: &Rgb<u8>, low: [u8; 3], high: [u8; 3]) -> bool {
    (0..3).all(|c| px[c] >= low[c] && px[c] <= high[c])
}

/// Bright ground pixels.
pub fn navigable_mask(image: &RgbImage, thresh: [u8; 3]) -> BinaryMask {
    BinaryMask::from_fn(image.width(), image.height(), |x, y| {
        is_navigable(image.get_pixel(x, y), thresh)
    })
}

/// Obstacles are everything that is not navigable.
///
/// Takes the navigable mask rather than the raw image, so the two masks are
/// exact complements before any cropping.
pub fn obstacle_mask(navigable: &BinaryMask) -> BinaryMask {
    navigable.inverted()
}

/// Yellowish rock-sample pixels.
pub fn rock_mask(image: &RgbImage, low: [u8; 3], high: [u8; 3]) -> BinaryMask {
    BinaryMask::from_fn(image.width(), image.height(), |x, y| {
        is_rock(image.get_pixel(x, y), low, high)
    })
}

/// The three masks of one frame, before projection.
#[derive(Debug, Clone)]
pub struct ClassMasks {
    pub navigable: BinaryMask,
    pub obstacle: BinaryMask,
    pub rock: BinaryMask,
}

impl ClassMasks {
    pub fn classify(image: &RgbImage, config: &ClassifierConfig) -> Self {
        let navigable = navigable_mask(image, config.navigable_min);
        let obstacle = obstacle_mask(&navigable);
        let rock = rock_mask(image, config.rock_low, config.rock_high);
        Self {
            navigable,
            obstacle,
            rock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn single(px: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(1, 1, Rgb(px))
    }

    #[test]
    fn navigable_requires_all_channels_strictly_above() {
        let t = [160, 160, 160];
        assert!(navigable_mask(&single([161, 161, 161]), t).get(0, 0));
        // Equality on any channel is not enough.
        assert!(!navigable_mask(&single([160, 200, 200]), t).get(0, 0));
        assert!(!navigable_mask(&single([200, 160, 200]), t).get(0, 0));
        assert!(!navigable_mask(&single([200, 200, 160]), t).get(0, 0));
        assert!(!navigable_mask(&single([160, 160, 160]), t).get(0, 0));
    }

    #[test]
    fn navigable_thresholds_are_per_channel() {
        let t = [10, 100, 200];
        assert!(navigable_mask(&single([11, 101, 201]), t).get(0, 0));
        assert!(!navigable_mask(&single([255, 255, 200]), t).get(0, 0));
    }

    #[test]
    fn obstacle_is_exact_complement_of_navigable() {
        let mut rng = StdRng::seed_from_u64(7);
        let img = RgbImage::from_fn(40, 30, |_, _| Rgb([rng.gen(), rng.gen(), rng.gen()]));
        let nav = navigable_mask(&img, [120, 120, 120]);
        let obs = obstacle_mask(&nav);
        assert!(nav.any());
        for y in 0..30 {
            for x in 0..40 {
                assert_eq!(obs.get(x, y) as u8, 1 - nav.get(x, y) as u8);
            }
        }
        assert_eq!(nav.count_set() + obs.count_set(), 40 * 30);
    }

    #[test]
    fn rock_bounds_are_inclusive() {
        let (lo, hi) = ([170, 120, 0], [230, 180, 60]);
        assert!(rock_mask(&single(lo), lo, hi).get(0, 0));
        assert!(rock_mask(&single(hi), lo, hi).get(0, 0));
        assert!(rock_mask(&single([170, 180, 0]), lo, hi).get(0, 0));
    }

    #[test]
    fn rock_one_unit_outside_any_bound_is_rejected() {
        let (lo, hi) = ([170, 120, 1], [230, 180, 60]);
        assert!(!rock_mask(&single([169, 150, 30]), lo, hi).get(0, 0));
        assert!(!rock_mask(&single([231, 150, 30]), lo, hi).get(0, 0));
        assert!(!rock_mask(&single([200, 119, 30]), lo, hi).get(0, 0));
        assert!(!rock_mask(&single([200, 181, 30]), lo, hi).get(0, 0));
        assert!(!rock_mask(&single([200, 150, 0]), lo, hi).get(0, 0));
        assert!(!rock_mask(&single([200, 150, 61]), lo, hi).get(0, 0));
    }

    #[test]
    fn classify_produces_same_shaped_masks() {
        let img = RgbImage::from_pixel(8, 5, Rgb([200, 150, 30]));
        let masks = ClassMasks::classify(&img, &ClassifierConfig::default());
        assert_eq!(masks.navigable.dimensions(), (8, 5));
        assert_eq!(masks.obstacle.count_set(), 40);
        assert_eq!(masks.rock.count_set(), 40);
    }
}
