//! Borrowed 8-bit grayscale image view.
//!
//! The detector only ever reads pixels, so the view holds a shared slice and
//! validates its shape once at construction. Rows are tightly packed: the
//! stride equals the width.

use crate::ring::RingOffsets;
use crate::Corner;

/// Reasons an [`ImageView`] cannot be built from a raw buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ImageViewError {
    #[error("image dimensions must be non-zero (got {width}x{height})")]
    ZeroSize { width: usize, height: usize },
    #[error("buffer holds {actual} bytes, expected {expected} for {width}x{height}")]
    BufferSize {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
}

/// Immutable row-major view over single-channel 8-bit pixels.
#[derive(Clone, Copy, Debug)]
pub struct ImageView<'a> {
    width: usize,
    height: usize,
    data: &'a [u8],
}

impl<'a> ImageView<'a> {
    /// Wrap `data` as a `width x height` image.
    ///
    /// The buffer must hold exactly `width * height` bytes.
    pub fn from_u8_slice(
        width: usize,
        height: usize,
        data: &'a [u8],
    ) -> Result<Self, ImageViewError> {
        if width == 0 || height == 0 {
            return Err(ImageViewError::ZeroSize { width, height });
        }
        let expected = width
            .checked_mul(height)
            .ok_or(ImageViewError::BufferSize {
                width,
                height,
                expected: usize::MAX,
                actual: data.len(),
            })?;
        if data.len() != expected {
            return Err(ImageViewError::BufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn as_slice(&self) -> &'a [u8] {
        self.data
    }

    /// Intensity at `(x, y)`. Panics when out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn row(&self, y: usize) -> &'a [u8] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    /// Flat buffer index of `c`.
    #[inline]
    pub fn index_of(&self, c: Corner) -> usize {
        c.y * self.width + c.x
    }

    /// True when the full radius-3 ring around `c` lies inside the image.
    #[inline]
    pub fn has_ring_margin(&self, c: Corner) -> bool {
        let m = crate::ring::RING_RADIUS;
        c.x >= m && c.y >= m && c.x + m < self.width && c.y + m < self.height
    }

    /// Intensity of ring sample `k` around `c`, using a precomputed offset table.
    ///
    /// `offsets` must have been built for this view's width and `c` must
    /// satisfy [`ImageView::has_ring_margin`]; otherwise the lookup panics or
    /// reads a pixel from a neighbouring row.
    #[inline]
    pub fn neighbor(&self, c: Corner, offsets: &RingOffsets, k: usize) -> u8 {
        let idx = self.index_of(c) as isize + offsets.get(k);
        self.data[idx as usize]
    }

    /// Gather all 16 ring samples around `c`.
    #[inline]
    pub fn ring_samples(&self, c: Corner, offsets: &RingOffsets) -> [u8; 16] {
        let base = self.index_of(c) as isize;
        let mut s = [0u8; 16];
        for (k, v) in s.iter_mut().enumerate() {
            *v = self.data[(base + offsets.get(k)) as usize];
        }
        s
    }
}
