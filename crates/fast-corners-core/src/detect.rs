//! Segment-test corner detection (FAST-9 .. FAST-12).
//!
//! A pixel `c` is a corner when at least `K` contiguous samples of the
//! radius-3 ring (see [`crate::ring`]) are all brighter than `I(c) + barrier`
//! or all darker than `I(c) - barrier`. Contiguity wraps around the ring.
//!
//! All four variants share one data-driven test, [`SegmentTest`]. The test
//! first probes a quarter-turn set of four ring positions:
//!
//! 1. the opposite pair `(p, p + 8)`: any arc of 9 or more samples covers at
//!    least one of them, so a pixel where both are "similar" is rejected
//!    after two reads;
//! 2. the remaining pair `(p + 4, p + 12)`: an arc of length `K` covers at
//!    least `K / 4` of the four probes, so a pixel with fewer probe hits of
//!    one polarity cannot carry an arc of that polarity.
//!
//! Only pixels surviving both probe stages classify the full ring and look
//! for a circular run of length `K` in a 16-bit mask.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use crate::image::ImageView;
use crate::ring::{RingOffsets, RING_RADIUS};
use crate::Corner;

#[cfg(feature = "rayon")]
use rayon::prelude::*;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Arc lengths supported by [`SegmentTest`]. Shorter arcs are not
/// guaranteed to cover an opposite probe pair.
pub const MIN_ARC_LENGTH: usize = 9;
pub const MAX_ARC_LENGTH: usize = 12;

/// Invalid detector parameters.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum VariantError {
    #[error("arc length must be in 9..=12 (got {0})")]
    ArcLength(usize),
    #[error("probe phase must be in 0..4 (got {0})")]
    ProbePhase(usize),
    #[error("unknown FAST variant '{0}'")]
    Unknown(String),
}

/// Generic contiguous-arc test.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentTest {
    arc_length: usize,
    /// `[p, p + 8, p + 4, p + 12]` (mod 16).
    probes: [usize; 4],
    probe_mask: u16,
    min_probe_hits: u32,
}

impl SegmentTest {
    /// Build a test for arcs of `arc_length` samples, probing the quarter-turn
    /// set starting at ring index `probe_phase`.
    pub fn new(arc_length: usize, probe_phase: usize) -> Result<Self, VariantError> {
        if !(MIN_ARC_LENGTH..=MAX_ARC_LENGTH).contains(&arc_length) {
            return Err(VariantError::ArcLength(arc_length));
        }
        if probe_phase >= 4 {
            return Err(VariantError::ProbePhase(probe_phase));
        }
        let p = probe_phase;
        let probes = [p, p + 8, p + 4, p + 12];
        let probe_mask = probes.iter().fold(0u16, |m, &k| m | (1 << k));
        Ok(Self {
            arc_length,
            probes,
            probe_mask,
            min_probe_hits: (arc_length / 4) as u32,
        })
    }

    #[inline]
    pub fn arc_length(&self) -> usize {
        self.arc_length
    }

    #[inline]
    pub fn probes(&self) -> [usize; 4] {
        self.probes
    }

    /// Run the test for a pixel of intensity `center`; `sample(k)` returns
    /// ring sample `k`.
    #[inline]
    pub fn is_corner(&self, center: u8, barrier: u8, sample: impl Fn(usize) -> u8) -> bool {
        let cb = center as i32 + barrier as i32;
        let c_b = center as i32 - barrier as i32;

        let mut bright = 0u16;
        let mut dark = 0u16;
        let classify = |k: usize, bright: &mut u16, dark: &mut u16| {
            let v = sample(k) as i32;
            if v > cb {
                *bright |= 1 << k;
            } else if v < c_b {
                *dark |= 1 << k;
            }
        };

        classify(self.probes[0], &mut bright, &mut dark);
        classify(self.probes[1], &mut bright, &mut dark);
        if bright | dark == 0 {
            return false;
        }

        classify(self.probes[2], &mut bright, &mut dark);
        classify(self.probes[3], &mut bright, &mut dark);
        if bright.count_ones() < self.min_probe_hits && dark.count_ones() < self.min_probe_hits {
            return false;
        }

        for k in 0..16 {
            if self.probe_mask & (1 << k) == 0 {
                classify(k, &mut bright, &mut dark);
            }
        }

        has_arc(bright, self.arc_length) || has_arc(dark, self.arc_length)
    }
}

/// True if `mask` holds a circular run of at least `len` set bits.
#[inline]
pub fn has_arc(mask: u16, len: usize) -> bool {
    if (mask.count_ones() as usize) < len {
        return false;
    }
    // Duplicate into 32 bits so runs crossing index 15 -> 0 stay contiguous,
    // then AND-shift: bit i survives iff bits i..i+len are all set.
    let wide = mask as u32 | (mask as u32) << 16;
    let mut run = wide;
    for _ in 1..len {
        run &= run >> 1;
    }
    run != 0
}

/// The four detector variants, named by arc length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FastVariant {
    #[default]
    Fast9,
    Fast10,
    Fast11,
    Fast12,
}

impl FastVariant {
    pub const ALL: [FastVariant; 4] = [
        FastVariant::Fast9,
        FastVariant::Fast10,
        FastVariant::Fast11,
        FastVariant::Fast12,
    ];

    #[inline]
    pub fn arc_length(self) -> usize {
        match self {
            FastVariant::Fast9 => 9,
            FastVariant::Fast10 => 10,
            FastVariant::Fast11 => 11,
            FastVariant::Fast12 => 12,
        }
    }

    #[inline]
    pub fn segment_test(self) -> SegmentTest {
        let arc_length = self.arc_length();
        SegmentTest {
            arc_length,
            probes: [0, 8, 4, 12],
            probe_mask: 0x1111,
            min_probe_hits: (arc_length / 4) as u32,
        }
    }
}

impl TryFrom<usize> for FastVariant {
    type Error = VariantError;

    fn try_from(arc_length: usize) -> Result<Self, Self::Error> {
        match arc_length {
            9 => Ok(FastVariant::Fast9),
            10 => Ok(FastVariant::Fast10),
            11 => Ok(FastVariant::Fast11),
            12 => Ok(FastVariant::Fast12),
            other => Err(VariantError::ArcLength(other)),
        }
    }
}

impl fmt::Display for FastVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FAST-{}", self.arc_length())
    }
}

impl FromStr for FastVariant {
    type Err = VariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        let digits = t
            .strip_prefix("FAST-")
            .or_else(|| t.strip_prefix("fast-"))
            .or_else(|| t.strip_prefix("FAST"))
            .or_else(|| t.strip_prefix("fast"))
            .unwrap_or(t);
        match digits.parse::<usize>() {
            Ok(n) => FastVariant::try_from(n),
            Err(_) => Err(VariantError::Unknown(s.to_string())),
        }
    }
}

/// Scan `img` with `variant` and return corner candidates in raster order.
///
/// Pixels within 3 of any edge are never tested; images of 6 pixels or less
/// in either dimension yield no candidates.
#[inline]
pub fn detect_corners(img: &ImageView<'_>, variant: FastVariant, barrier: u8) -> Vec<Corner> {
    detect_with(img, &variant.segment_test(), barrier)
}

/// Raw-buffer form of [`detect_corners`]. An invalid buffer shape yields no
/// candidates.
pub fn detect_corners_u8(
    img: &[u8],
    w: usize,
    h: usize,
    variant: FastVariant,
    barrier: u8,
) -> Vec<Corner> {
    match ImageView::from_u8_slice(w, h, img) {
        Ok(view) => detect_corners(&view, variant, barrier),
        Err(_e) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_e, "rejecting image buffer");
            Vec::new()
        }
    }
}

/// FAST-9 candidates.
pub fn fast9_detect(img: &ImageView<'_>, barrier: u8) -> Vec<Corner> {
    detect_corners(img, FastVariant::Fast9, barrier)
}

/// FAST-10 candidates.
pub fn fast10_detect(img: &ImageView<'_>, barrier: u8) -> Vec<Corner> {
    detect_corners(img, FastVariant::Fast10, barrier)
}

/// FAST-11 candidates.
pub fn fast11_detect(img: &ImageView<'_>, barrier: u8) -> Vec<Corner> {
    detect_corners(img, FastVariant::Fast11, barrier)
}

/// FAST-12 candidates.
pub fn fast12_detect(img: &ImageView<'_>, barrier: u8) -> Vec<Corner> {
    detect_corners(img, FastVariant::Fast12, barrier)
}

/// Scan with an arbitrary [`SegmentTest`].
///
/// With the `rayon` feature rows are tested in parallel; per-row results are
/// concatenated in row order so the output is identical to the sequential
/// scan.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "debug",
        skip(img, test),
        fields(w = img.width(), h = img.height(), arc = test.arc_length())
    )
)]
pub fn detect_with(img: &ImageView<'_>, test: &SegmentTest, barrier: u8) -> Vec<Corner> {
    let w = img.width();
    let h = img.height();
    let m = RING_RADIUS;

    if w <= 2 * m || h <= 2 * m {
        #[cfg(feature = "tracing")]
        tracing::warn!(w, h, "image too small for a radius-3 ring");
        return Vec::new();
    }

    let offsets = RingOffsets::for_width(w);

    #[cfg(feature = "rayon")]
    let corners: Vec<Corner> = {
        let rows: Vec<Vec<Corner>> = (m..h - m)
            .into_par_iter()
            .map(|y| {
                let mut row = Vec::new();
                detect_row(img, &offsets, test, barrier, y, &mut row);
                row
            })
            .collect();
        rows.concat()
    };

    #[cfg(not(feature = "rayon"))]
    let corners: Vec<Corner> = {
        let mut acc = Vec::new();
        for y in m..h - m {
            detect_row(img, &offsets, test, barrier, y, &mut acc);
        }
        acc
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(candidates = corners.len(), "segment test done");

    corners
}

#[inline]
fn detect_row(
    img: &ImageView<'_>,
    offsets: &RingOffsets,
    test: &SegmentTest,
    barrier: u8,
    y: usize,
    out: &mut Vec<Corner>,
) {
    let data = img.as_slice();
    let w = img.width();
    let m = RING_RADIUS;
    let ring = offsets.as_array();

    for x in m..w - m {
        let idx = (y * w + x) as isize;
        let center = data[idx as usize];
        if test.is_corner(center, barrier, |k| data[(idx + ring[k]) as usize]) {
            out.push(Corner::new(x, y));
        }
    }
}
