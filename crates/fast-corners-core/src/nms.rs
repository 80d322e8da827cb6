//! Non-maximum suppression over a raster-ordered candidate list.
//!
//! Each candidate is scored with [`corner_score`](crate::score::corner_score)
//! and compared with its 8-connected neighbours that are themselves
//! candidates. A candidate is dropped when any such neighbour scores strictly
//! higher, so equal-score plateaus survive as a whole.
//!
//! Neighbours on the same row are the adjacent array entries. Neighbours on
//! the rows above and below are found through a per-row start index and two
//! cursors that only move forward during a pass, so the whole pass is linear
//! in the number of candidates.
//!
//! Every index is evaluated, including the first and the last; lookups past
//! either end of the array are guarded instead of skipping those entries.
use alloc::vec::Vec;

use crate::image::ImageView;
use crate::ring::RingOffsets;
use crate::score::corner_score_with;
use crate::{Corner, ScoredCorner};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Inputs with fewer candidates than this produce an empty result.
pub const MIN_NMS_CANDIDATES: usize = 5;

/// Scratch space for [`nonmax_suppression_with`].
///
/// Holding one of these across video frames avoids reallocating the score
/// table and row index on every call.
#[derive(Clone, Debug, Default)]
pub struct NmsBuffers {
    scores: Vec<i32>,
    row_start: Vec<Option<usize>>,
}

impl NmsBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(candidates: usize, rows: usize) -> Self {
        Self {
            scores: Vec::with_capacity(candidates),
            row_start: Vec::with_capacity(rows),
        }
    }

    fn prepare(&mut self, img: &ImageView<'_>, candidates: &[Corner], barrier: u8) {
        let offsets = RingOffsets::for_width(img.width());
        self.scores.clear();
        self.scores.extend(
            candidates
                .iter()
                .map(|&c| corner_score_with(img, &offsets, c, barrier)),
        );

        self.row_start.clear();
        self.row_start.resize(img.height(), None);
        for (i, c) in candidates.iter().enumerate() {
            let slot = &mut self.row_start[c.y];
            if slot.is_none() {
                *slot = Some(i);
            }
        }
    }
}

/// Suppress non-maximal candidates, returning surviving coordinates in
/// raster order.
pub fn nonmax_suppression(img: &ImageView<'_>, candidates: &[Corner], barrier: u8) -> Vec<Corner> {
    let mut buffers = NmsBuffers::new();
    nonmax_suppression_with(img, candidates, barrier, &mut buffers)
        .into_iter()
        .map(ScoredCorner::corner)
        .collect()
}

/// Like [`nonmax_suppression`] but keeps the score of each survivor.
pub fn nonmax_suppression_scored(
    img: &ImageView<'_>,
    candidates: &[Corner],
    barrier: u8,
) -> Vec<ScoredCorner> {
    let mut buffers = NmsBuffers::new();
    nonmax_suppression_with(img, candidates, barrier, &mut buffers)
}

/// Raw-buffer form of [`nonmax_suppression`]. An invalid buffer shape yields
/// an empty result.
pub fn nonmax_suppression_u8(
    img: &[u8],
    w: usize,
    h: usize,
    candidates: &[Corner],
    barrier: u8,
) -> Vec<Corner> {
    match ImageView::from_u8_slice(w, h, img) {
        Ok(view) => nonmax_suppression(&view, candidates, barrier),
        Err(_e) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_e, "rejecting image buffer");
            Vec::new()
        }
    }
}

/// Check the suppression preconditions: strict raster order and a full ring
/// inside the image for every candidate.
pub fn is_valid_candidate_list(img: &ImageView<'_>, candidates: &[Corner]) -> bool {
    candidates.iter().all(|&c| img.has_ring_margin(c))
        && candidates
            .windows(2)
            .all(|p| p[0].raster_cmp(&p[1]).is_lt())
}

/// Suppression with caller-owned scratch buffers.
///
/// Returns an empty list when fewer than [`MIN_NMS_CANDIDATES`] candidates are
/// given or when the list fails [`is_valid_candidate_list`].
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "debug",
        skip(img, candidates, buffers),
        fields(w = img.width(), h = img.height(), candidates = candidates.len())
    )
)]
pub fn nonmax_suppression_with(
    img: &ImageView<'_>,
    candidates: &[Corner],
    barrier: u8,
    buffers: &mut NmsBuffers,
) -> Vec<ScoredCorner> {
    let n = candidates.len();
    if n < MIN_NMS_CANDIDATES {
        return Vec::new();
    }
    if !is_valid_candidate_list(img, candidates) {
        #[cfg(feature = "tracing")]
        tracing::warn!("candidates out of raster order or too close to the border");
        return Vec::new();
    }

    buffers.prepare(img, candidates, barrier);
    let scores = &buffers.scores;
    let row_start = &buffers.row_start;
    let h = img.height();

    let mut above = 0usize;
    let mut below = 0usize;
    let mut out = Vec::new();

    'candidates: for (i, &c) in candidates.iter().enumerate() {
        let score = scores[i];

        if i > 0 {
            let left = candidates[i - 1];
            if left.y == c.y && left.x + 1 == c.x && scores[i - 1] > score {
                continue;
            }
        }

        if i + 1 < n {
            let right = candidates[i + 1];
            if right.y == c.y && right.x == c.x + 1 && scores[i + 1] > score {
                continue;
            }
        }

        // The margin check guarantees c.y >= 3, so the row above exists.
        if let Some(start) = row_start[c.y - 1] {
            if candidates[above].y < c.y - 1 {
                above = start;
            }
            while candidates[above].y == c.y - 1 && candidates[above].x + 1 < c.x {
                above += 1;
            }
            let mut j = above;
            while candidates[j].y == c.y - 1 && candidates[j].x <= c.x + 1 {
                if scores[j] > score {
                    continue 'candidates;
                }
                j += 1;
            }
        }

        if c.y + 1 < h {
            if let Some(start) = row_start[c.y + 1] {
                if below < n && candidates[below].y < c.y + 1 {
                    below = start;
                }
                while below < n && candidates[below].y == c.y + 1 && candidates[below].x + 1 < c.x
                {
                    below += 1;
                }
                let mut j = below;
                while j < n && candidates[j].y == c.y + 1 && candidates[j].x <= c.x + 1 {
                    if scores[j] > score {
                        continue 'candidates;
                    }
                    j += 1;
                }
            }
        }

        out.push(ScoredCorner {
            x: c.x,
            y: c.y,
            score,
        });
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(survivors = out.len(), "suppression done");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    /// Image whose score at each pixel is controlled by a single bright
    /// center value on a flat background of 0 (barrier 0).
    struct Canvas {
        w: usize,
        h: usize,
        data: Vec<u8>,
    }

    impl Canvas {
        fn new(w: usize, h: usize) -> Self {
            Self {
                w,
                h,
                data: vec![0u8; w * h],
            }
        }

        fn set(&mut self, x: usize, y: usize, v: u8) {
            self.data[y * self.w + x] = v;
        }

        fn view(&self) -> ImageView<'_> {
            ImageView::from_u8_slice(self.w, self.h, &self.data).unwrap()
        }
    }

    fn corners(pts: &[(usize, usize)]) -> Vec<Corner> {
        pts.iter().map(|&(x, y)| Corner::new(x, y)).collect()
    }

    #[test]
    fn fewer_than_five_candidates_yield_nothing() {
        let canvas = Canvas::new(20, 20);
        let img = canvas.view();
        for n in 0..MIN_NMS_CANDIDATES {
            let cands: Vec<Corner> = (0..n).map(|i| Corner::new(4 + 2 * i, 5)).collect();
            assert!(nonmax_suppression(&img, &cands, 0).is_empty(), "n = {n}");
        }
        let single = corners(&[(8, 8)]);
        assert!(nonmax_suppression(&img, &single, 0).is_empty());
        let pair = corners(&[(8, 8), (9, 8)]);
        assert!(nonmax_suppression(&img, &pair, 0).is_empty());
    }

    #[test]
    fn isolated_candidates_all_survive() {
        let mut canvas = Canvas::new(30, 30);
        let pts = [(4, 4), (10, 4), (20, 10), (5, 20), (25, 25)];
        for (k, &(x, y)) in pts.iter().enumerate() {
            canvas.set(x, y, 50 + 10 * k as u8);
        }
        let img = canvas.view();
        let cands = corners(&pts);
        assert_eq!(nonmax_suppression(&img, &cands, 0), cands);
    }

    #[test]
    fn horizontal_neighbours_keep_the_strongest() {
        let mut canvas = Canvas::new(30, 30);
        // row 10: x = 8, 9, 10 with increasing contrast, plus two far points
        canvas.set(8, 10, 10);
        canvas.set(9, 10, 20);
        canvas.set(10, 10, 30);
        canvas.set(4, 4, 5);
        canvas.set(25, 25, 5);
        let img = canvas.view();
        let cands = corners(&[(4, 4), (8, 10), (9, 10), (10, 10), (25, 25)]);
        let kept = nonmax_suppression(&img, &cands, 0);
        assert_eq!(kept, corners(&[(4, 4), (10, 10), (25, 25)]));
    }

    #[test]
    fn vertical_and_diagonal_neighbours_are_compared() {
        let mut canvas = Canvas::new(30, 30);
        // 3x3 block centred at (12, 12) with the peak in the middle
        for y in 11..=13 {
            for x in 11..=13 {
                canvas.set(x, y, 40);
            }
        }
        canvas.set(12, 12, 90);
        let img = canvas.view();
        let mut pts = Vec::new();
        for y in 11..=13 {
            for x in 11..=13 {
                pts.push((x, y));
            }
        }
        let cands = corners(&pts);
        let kept = nonmax_suppression(&img, &cands, 0);
        assert_eq!(kept, corners(&[(12, 12)]));
    }

    #[test]
    fn equal_scores_do_not_suppress_each_other() {
        let mut canvas = Canvas::new(20, 20);
        for x in 5..=10 {
            canvas.set(x, 8, 77);
        }
        let img = canvas.view();
        let cands: Vec<Corner> = (5..=10).map(|x| Corner::new(x, 8)).collect();
        assert_eq!(nonmax_suppression(&img, &cands, 0), cands);
    }

    #[test]
    fn first_and_last_entries_are_evaluated() {
        let mut canvas = Canvas::new(20, 20);
        // first candidate loses to its right neighbour, last loses to its left
        canvas.set(4, 4, 10);
        canvas.set(5, 4, 60);
        canvas.set(10, 9, 5);
        canvas.set(14, 15, 60);
        canvas.set(15, 15, 10);
        let img = canvas.view();
        let cands = corners(&[(4, 4), (5, 4), (10, 9), (14, 15), (15, 15)]);
        let kept = nonmax_suppression(&img, &cands, 0);
        assert_eq!(kept, corners(&[(5, 4), (10, 9), (14, 15)]));
    }

    #[test]
    fn rows_with_gaps_do_not_link() {
        let mut canvas = Canvas::new(30, 30);
        // strong pixel two rows below must not suppress
        canvas.set(10, 10, 10);
        canvas.set(10, 12, 200);
        canvas.set(4, 4, 1);
        canvas.set(20, 20, 1);
        canvas.set(22, 20, 1);
        let img = canvas.view();
        let cands = corners(&[(4, 4), (10, 10), (10, 12), (20, 20), (22, 20)]);
        assert_eq!(nonmax_suppression(&img, &cands, 0), cands);
    }

    #[test]
    fn scored_output_carries_scores() {
        let mut canvas = Canvas::new(20, 20);
        let pts = [(4, 4), (8, 4), (12, 4), (4, 10), (8, 10)];
        for &(x, y) in &pts {
            canvas.set(x, y, 100);
        }
        let img = canvas.view();
        let kept = nonmax_suppression_scored(&img, &corners(&pts), 10);
        assert_eq!(kept.len(), 5);
        // 16 ring samples at 0, center 100, barrier 10: 16 * 90
        assert!(kept.iter().all(|s| s.score == 16 * 90));
    }

    #[test]
    fn invalid_lists_are_rejected() {
        let canvas = Canvas::new(20, 20);
        let img = canvas.view();
        let unordered = corners(&[(4, 4), (8, 4), (6, 4), (4, 10), (8, 10)]);
        assert!(!is_valid_candidate_list(&img, &unordered));
        assert!(nonmax_suppression(&img, &unordered, 0).is_empty());

        let duplicate = corners(&[(4, 4), (4, 4), (6, 4), (4, 10), (8, 10)]);
        assert!(nonmax_suppression(&img, &duplicate, 0).is_empty());

        let near_edge = corners(&[(2, 4), (8, 4), (10, 4), (4, 10), (8, 10)]);
        assert!(nonmax_suppression(&img, &near_edge, 0).is_empty());
        let near_bottom = corners(&[(4, 4), (8, 4), (10, 4), (4, 10), (8, 17)]);
        assert!(nonmax_suppression(&img, &near_bottom, 0).is_empty());
    }

    #[test]
    fn buffers_can_be_reused_across_images() {
        let mut buffers = NmsBuffers::with_capacity(16, 32);
        let mut a = Canvas::new(24, 24);
        let mut b = Canvas::new(16, 12);
        let pts_a = [(4, 4), (5, 4), (9, 9), (12, 15), (18, 18)];
        let pts_b = [(3, 3), (4, 3), (6, 5), (8, 7), (12, 8)];
        for (k, &(x, y)) in pts_a.iter().enumerate() {
            a.set(x, y, 30 + k as u8);
        }
        for (k, &(x, y)) in pts_b.iter().enumerate() {
            b.set(x, y, 90 - k as u8);
        }
        let first = nonmax_suppression_with(&a.view(), &corners(&pts_a), 0, &mut buffers);
        let second = nonmax_suppression_with(&b.view(), &corners(&pts_b), 0, &mut buffers);
        assert_eq!(
            first,
            nonmax_suppression_scored(&a.view(), &corners(&pts_a), 0)
        );
        assert_eq!(
            second,
            nonmax_suppression_scored(&b.view(), &corners(&pts_b), 0)
        );
        // (4,3) is weaker than (3,3) on image b
        assert!(!second.iter().any(|s| s.x == 4 && s.y == 3));
    }
}
