//! Stride-aware grayscale image view.
//!
//! Detection entry points borrow the pixel buffer for the duration of a
//! call; nothing in the crate ever copies or mutates image data.

use crate::error::{Error, Result};

/// A borrowed view into a grayscale image buffer, one byte per pixel.
///
/// `stride` is the distance in bytes between the starts of two consecutive
/// rows; it equals `cols` for contiguous buffers and may be larger for
/// padded layouts.
#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a> {
    pub pixels: &'a [u8],
    pub rows: usize,
    pub cols: usize,
    pub stride: usize,
}

impl<'a> ImageView<'a> {
    /// Create a view after validating the declared geometry against the
    /// buffer length.
    pub fn new(pixels: &'a [u8], rows: usize, cols: usize, stride: usize) -> Result<Self> {
        if rows == 0 || cols == 0 || stride < cols || pixels.len() < rows * stride {
            return Err(Error::BadImageDim {
                rows,
                cols,
                stride,
                len: pixels.len(),
            });
        }
        Ok(Self {
            pixels,
            rows,
            cols,
            stride,
        })
    }

    /// Create a view over a contiguous buffer (`stride == cols`).
    pub fn contiguous(pixels: &'a [u8], rows: usize, cols: usize) -> Result<Self> {
        Self::new(pixels, rows, cols, cols)
    }

    /// Pixel intensity at (row, col). Panics when out of bounds.
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> u8 {
        debug_assert!(row < self.rows && col < self.cols);
        self.pixels[row * self.stride + col]
    }
}
