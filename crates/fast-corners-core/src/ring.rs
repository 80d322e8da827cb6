/// Radius of the sampling circle in pixels. Pixels closer than this to any
/// image edge are never tested.
pub const RING_RADIUS: usize = 3;

/// 16 point Bresenham circle of radius 3. Order is clockwise starting at top,
/// so index `k` and `k + 8` are diametrically opposite and `k + 4` is a
/// quarter turn away.
pub const RING3: [(i32, i32); 16] = [
    (0, -3),
    (1, -3),
    (2, -2),
    (3, -1),
    (3, 0),
    (3, 1),
    (2, 2),
    (1, 3),
    (0, 3),
    (-1, 3),
    (-2, 2),
    (-3, 1),
    (-3, 0),
    (-3, -1),
    (-2, -2),
    (-1, -3),
];

/// Flat-buffer offsets `dx + dy * stride` for each ring position.
///
/// Built once per image width and shared by every pixel of a scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RingOffsets {
    stride: usize,
    offsets: [isize; 16],
}

impl RingOffsets {
    pub fn for_width(stride: usize) -> Self {
        let mut offsets = [0isize; 16];
        for (o, &(dx, dy)) in offsets.iter_mut().zip(RING3.iter()) {
            *o = dx as isize + dy as isize * stride as isize;
        }
        Self { stride, offsets }
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn get(&self, k: usize) -> isize {
        self.offsets[k]
    }

    #[inline]
    pub fn as_array(&self) -> &[isize; 16] {
        &self.offsets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_is_closed_circle_of_radius_three() {
        for &(dx, dy) in RING3.iter() {
            let r2 = dx * dx + dy * dy;
            assert!((8..=10).contains(&r2), "offset ({dx},{dy}) is off the circle");
        }
        // consecutive samples are 8-connected, including the wrap
        for k in 0..16 {
            let (ax, ay) = RING3[k];
            let (bx, by) = RING3[(k + 1) % 16];
            assert!((ax - bx).abs() <= 1 && (ay - by).abs() <= 1);
        }
    }

    #[test]
    fn opposite_samples_are_mirrored() {
        for k in 0..8 {
            let (ax, ay) = RING3[k];
            let (bx, by) = RING3[k + 8];
            assert_eq!((ax, ay), (-bx, -by));
        }
    }

    #[test]
    fn offsets_depend_on_stride() {
        let o = RingOffsets::for_width(100);
        assert_eq!(o.get(0), -300);
        assert_eq!(o.get(4), 3);
        assert_eq!(o.get(8), 300);
        assert_eq!(o.get(12), -3);
        assert_eq!(o.get(3), 3 - 100);
        assert_eq!(o.stride(), 100);
    }
}
