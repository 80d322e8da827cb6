//! Ergonomic wrappers over `fast-corners-core` that accept `image::GrayImage` inputs.
//!
//! This crate is organized into a few focused modules:
//! - [`image`] – detection and suppression helpers on `image::GrayImage`.
//! - [`adaptive`] – a caller-owned controller that nudges the barrier between
//!   calls to keep the corner count inside a target band.
//! - [`app`] – JSON-configured detection runs shared by the CLI and demos.
//! - [`logger`] – a simple `log` implementation used by the CLI and examples.

pub mod adaptive;
#[cfg(feature = "image")]
pub mod app;
#[cfg(feature = "image")]
pub mod image;
pub mod logger;

// Re-export a focused subset of core types for convenience. Consumers that
// need lower-level primitives (ring tables, segment tests, scratch buffers)
// are encouraged to depend on `fast-corners-core` directly.
pub use fast_corners_core::{
    Corner, FastParams, FastVariant, ImageView, ImageViewError, ScoredCorner, VariantError,
};

pub use crate::adaptive::{detect_adaptive, AdaptiveBarrier, AdaptiveParams, AdaptiveRun};

#[cfg(feature = "image")]
pub use crate::image::{detect_corners_image, find_corners_image, nonmax_suppression_image};
