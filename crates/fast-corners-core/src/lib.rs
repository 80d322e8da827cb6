#![cfg_attr(not(feature = "std"), no_std)]
//! Core primitives for FAST segment-test corner detection.
//!
//! # Overview
//!
//! This crate exposes three building blocks that share one data model, an
//! [`ImageView`] over 8-bit grayscale pixels and raster-ordered lists of
//! [`Corner`] coordinates:
//!
//! - [`detect`] – the segment test for arcs of 9, 10, 11 or 12 contiguous
//!   samples on a 16-sample radius-3 ring (see [`ring`]), with a probe-based
//!   early reject so flat neighbourhoods cost two reads.
//! - [`score`] – the contrast response of a single pixel.
//! - [`nms`] – non-maximum suppression of a candidate list using that score
//!   over 8-connected neighbours.
//!
//! [`find_corners_u8`] chains them for the common "detect, then suppress"
//! call.
//!
//! # Features
//!
//! - `std` *(default)* – enables use of the Rust standard library. When
//!   disabled, the crate is `no_std` + `alloc`.
//! - `rayon` – tests image rows in parallel. Output is identical to the
//!   sequential scan, including its order.
//! - `tracing` – emits spans for the detection and suppression passes and
//!   warnings when inputs violate a precondition.

extern crate alloc;

pub mod detect;
pub mod image;
pub mod nms;
pub mod ring;
pub mod score;

use alloc::vec::Vec;
use core::cmp::Ordering;

pub use crate::detect::{
    detect_corners, detect_corners_u8, fast10_detect, fast11_detect, fast12_detect, fast9_detect,
    FastVariant, SegmentTest, VariantError,
};
pub use crate::image::{ImageView, ImageViewError};
pub use crate::nms::{nonmax_suppression, nonmax_suppression_scored, NmsBuffers};
pub use crate::score::corner_score;

/// Integer pixel coordinate, `(0, 0)` at the top-left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Corner {
    pub x: usize,
    pub y: usize,
}

impl Corner {
    #[inline]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Raster order: by row, then by column.
    #[inline]
    pub fn raster_cmp(&self, other: &Corner) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

/// A suppression survivor and its contrast score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScoredCorner {
    pub x: usize,
    pub y: usize,
    pub score: i32,
}

impl ScoredCorner {
    #[inline]
    pub fn corner(self) -> Corner {
        Corner::new(self.x, self.y)
    }
}

/// Tunable parameters for [`find_corners`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FastParams {
    /// Minimum contiguous arc length.
    pub variant: FastVariant,
    /// Intensity difference a ring sample must exceed to count as brighter
    /// or darker than the center.
    pub barrier: u8,
    /// Run non-maximum suppression on the raw candidates.
    pub nonmax: bool,
}

impl Default for FastParams {
    fn default() -> Self {
        Self {
            variant: FastVariant::Fast9,
            barrier: 20,
            nonmax: true,
        }
    }
}

/// Detect corners on a view, optionally followed by suppression.
///
/// Without suppression every candidate is reported with its score so the
/// output type does not depend on `params.nonmax`.
pub fn find_corners(img: &ImageView<'_>, params: &FastParams) -> Vec<ScoredCorner> {
    let candidates = detect_corners(img, params.variant, params.barrier);
    if params.nonmax {
        nonmax_suppression_scored(img, &candidates, params.barrier)
    } else {
        let offsets = ring::RingOffsets::for_width(img.width());
        candidates
            .into_iter()
            .map(|c| ScoredCorner {
                x: c.x,
                y: c.y,
                score: score::corner_score_with(img, &offsets, c, params.barrier),
            })
            .collect()
    }
}

/// Compute corners starting from a raw 8-bit grayscale buffer.
///
/// This is a convenience that combines:
/// - the segment test selected by `params.variant`
/// - contrast scoring
/// - non-maximum suppression (when `params.nonmax` is set)
///
/// A buffer whose length does not match `w * h` yields no corners.
pub fn find_corners_u8(img: &[u8], w: usize, h: usize, params: &FastParams) -> Vec<ScoredCorner> {
    match ImageView::from_u8_slice(w, h, img) {
        Ok(view) => find_corners(&view, params),
        Err(_) => Vec::new(),
    }
}
