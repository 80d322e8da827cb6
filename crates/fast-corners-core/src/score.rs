//! Scalar corner response used to rank candidates during suppression.
use crate::image::ImageView;
use crate::ring::RingOffsets;
use crate::Corner;

/// Contrast response of the ring around `c`.
///
/// Ring samples brighter than `I(c) + barrier` add their excess to a bright
/// sum, samples darker than `I(c) - barrier` add their deficit to a dark
/// sum; the larger of the two is returned. The caller guarantees `c` has a
/// 3 pixel margin (see [`ImageView::has_ring_margin`]).
#[inline]
pub fn corner_score(img: &ImageView<'_>, c: Corner, barrier: u8) -> i32 {
    let offsets = RingOffsets::for_width(img.width());
    corner_score_with(img, &offsets, c, barrier)
}

/// [`corner_score`] with a caller-provided offset table, for scoring many
/// pixels of the same image.
#[inline]
pub fn corner_score_with(img: &ImageView<'_>, offsets: &RingOffsets, c: Corner, barrier: u8) -> i32 {
    let center = img.get(c.x, c.y) as i32;
    score_samples(center, &img.ring_samples(c, offsets), barrier)
}

#[inline]
pub(crate) fn score_samples(center: i32, samples: &[u8; 16], barrier: u8) -> i32 {
    let cb = center + barrier as i32;
    let c_b = center - barrier as i32;

    let mut sum_bright = 0i32;
    let mut sum_dark = 0i32;
    for &p in samples {
        let p = p as i32;
        if p > cb {
            sum_bright += p - cb;
        } else if p < c_b {
            sum_dark += c_b - p;
        }
    }

    sum_bright.max(sum_dark)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn isolated_bright_pixel_scores_dark_ring() {
        let mut data = vec![100u8; 8 * 8];
        data[4 * 8 + 4] = 200;
        let img = ImageView::from_u8_slice(8, 8, &data).unwrap();
        // every ring sample is 100 < 200 - 20, contributing 80
        assert_eq!(corner_score(&img, Corner::new(4, 4), 20), 16 * 80);
    }

    #[test]
    fn flat_neighbourhood_scores_zero() {
        let data = vec![42u8; 9 * 9];
        let img = ImageView::from_u8_slice(9, 9, &data).unwrap();
        assert_eq!(corner_score(&img, Corner::new(4, 4), 0), 0);
        assert_eq!(corner_score(&img, Corner::new(4, 4), 10), 0);
    }

    #[test]
    fn takes_larger_of_bright_and_dark_sums() {
        // 4 samples at +50, 12 samples at -10, barrier 5
        let mut samples = [90u8; 16];
        for s in samples.iter_mut().take(4) {
            *s = 150;
        }
        assert_eq!(score_samples(100, &samples, 5), 4 * 45);

        let mut samples = [90u8; 16];
        samples[0] = 110;
        // bright: 110 - 105 = 5; dark: 15 * (95 - 90) = 75
        assert_eq!(score_samples(100, &samples, 5), 75);
    }

    #[test]
    fn samples_at_the_barrier_do_not_count() {
        let samples = [120u8; 16];
        assert_eq!(score_samples(100, &samples, 20), 0);
        assert_eq!(score_samples(100, &samples, 19), 16);
    }

    #[test]
    fn score_does_not_increase_with_barrier() {
        let samples: [u8; 16] = [
            10, 200, 30, 180, 90, 100, 110, 250, 0, 60, 140, 170, 5, 95, 105, 220,
        ];
        let mut prev = i32::MAX;
        for b in 0..=255u8 {
            let s = score_samples(100, &samples, b);
            assert!(s <= prev);
            prev = s;
        }
    }
}
