//! Binary class masks.
//!
//! A [`BinaryMask`] is a single-channel image whose samples are only ever
//! 0 or 1. All constructors and mutators preserve that invariant.

use image::{GrayImage, Luma};

/// Same-shaped grid of 0/1 values marking class membership per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    img: GrayImage,
}

impl BinaryMask {
    /// All-zero mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            img: GrayImage::new(width, height),
        }
    }

    /// Build a mask by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> bool,
    {
        Self {
            img: GrayImage::from_fn(width, height, |x, y| Luma([f(x, y) as u8])),
        }
    }

    pub fn width(&self) -> u32 {
        self.img.width()
    }

    pub fn height(&self) -> u32 {
        self.img.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.img.dimensions()
    }

    /// Value at column `x`, row `y`.
    ///
    /// # Panics
    /// Panics if the pixel is out of bounds.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.img.get_pixel(x, y)[0] != 0
    }

    /// # Panics
    /// Panics if the pixel is out of bounds.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        self.img.put_pixel(x, y, Luma([value as u8]));
    }

    /// Number of set pixels.
    pub fn count_set(&self) -> usize {
        self.img.as_raw().iter().filter(|&&v| v != 0).count()
    }

    /// True if at least one pixel is set.
    pub fn any(&self) -> bool {
        self.img.as_raw().iter().any(|&v| v != 0)
    }

    /// Set pixels as `(x, y)` in row-major order: rows ascending, then
    /// columns ascending within a row.
    pub fn set_pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.img
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] != 0)
            .map(|(x, y, _)| (x, y))
    }

    /// Clear every row above `row` (rows `0..row`).
    pub fn zero_rows_before(&mut self, row: u32) {
        let w = self.width() as usize;
        let end = (row.min(self.height()) as usize) * w;
        let raw: &mut [u8] = &mut self.img;
        raw[..end].fill(0);
    }

    /// Clear every column outside the half-open band `[start, end)`.
    pub fn zero_cols_outside(&mut self, start: u32, end: u32) {
        let w = self.width();
        if w == 0 {
            return;
        }
        let start = start.min(w) as usize;
        let end = end.min(w) as usize;
        let raw: &mut [u8] = &mut self.img;
        for row in raw.chunks_exact_mut(w as usize) {
            row[..start].fill(0);
            if end >= start {
                row[end..].fill(0);
            } else {
                row[start..].fill(0);
            }
        }
    }

    /// Elementwise complement: every 0 becomes 1 and every 1 becomes 0.
    pub fn inverted(&self) -> Self {
        let mut out = self.clone();
        let raw: &mut [u8] = &mut out.img;
        for v in raw.iter_mut() {
            *v = (*v == 0) as u8;
        }
        out
    }

    /// Borrow the underlying 0/1 image.
    pub fn as_gray(&self) -> &GrayImage {
        &self.img
    }
}
