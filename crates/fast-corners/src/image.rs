//! Single-scale image helpers for the FAST detector.
//!
//! These wrappers expose the `fast-corners-core` detection and suppression
//! primitives in terms of `image::GrayImage`, which is convenient for most
//! downstream consumers. An empty image yields no corners.

use fast_corners_core::{detect, nms, Corner, FastParams, FastVariant, ImageView, ScoredCorner};
use image::GrayImage;

/// Borrow a `GrayImage` as a core [`ImageView`].
#[inline]
pub fn gray_view(img: &GrayImage) -> Option<ImageView<'_>> {
    ImageView::from_u8_slice(img.width() as usize, img.height() as usize, img.as_raw()).ok()
}

/// Raw segment-test candidates in raster order.
#[inline]
pub fn detect_corners_image(img: &GrayImage, variant: FastVariant, barrier: u8) -> Vec<Corner> {
    gray_view(img)
        .map(|view| detect::detect_corners(&view, variant, barrier))
        .unwrap_or_default()
}

/// Suppress non-maximal candidates previously detected on `img`.
#[inline]
pub fn nonmax_suppression_image(img: &GrayImage, candidates: &[Corner], barrier: u8) -> Vec<Corner> {
    gray_view(img)
        .map(|view| nms::nonmax_suppression(&view, candidates, barrier))
        .unwrap_or_default()
}

/// Detect scored corners from an `image::GrayImage`.
#[inline]
pub fn find_corners_image(img: &GrayImage, params: &FastParams) -> Vec<ScoredCorner> {
    gray_view(img)
        .map(|view| fast_corners_core::find_corners(&view, params))
        .unwrap_or_default()
}
