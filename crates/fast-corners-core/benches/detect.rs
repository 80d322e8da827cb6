use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fast_corners_core::nms::{nonmax_suppression_with, NmsBuffers};
use fast_corners_core::{detect_corners, FastVariant, ImageView};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const W: usize = 640;
const H: usize = 480;

/// Smooth gradient with sparse blocks, closer to a camera frame than noise.
fn synthetic_frame(seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data: Vec<u8> = (0..W * H)
        .map(|i| (((i % W) + (i / W)) / 5 % 256) as u8)
        .collect();
    for _ in 0..200 {
        let x0 = rng.gen_range(0..W - 20);
        let y0 = rng.gen_range(0..H - 20);
        let s = rng.gen_range(4..20);
        let v: u8 = rng.gen();
        for y in y0..y0 + s {
            for x in x0..x0 + s {
                data[y * W + x] = v;
            }
        }
    }
    data
}

fn bench_detect(c: &mut Criterion) {
    let data = synthetic_frame(1);
    let view = ImageView::from_u8_slice(W, H, &data).expect("valid view");

    let mut group = c.benchmark_group("segment_test_640x480");
    for variant in FastVariant::ALL {
        group.bench_function(variant.to_string(), |b| {
            b.iter(|| detect_corners(black_box(&view), variant, black_box(20)))
        });
    }
    group.finish();
}

fn bench_nms(c: &mut Criterion) {
    let data = synthetic_frame(2);
    let view = ImageView::from_u8_slice(W, H, &data).expect("valid view");
    let candidates = detect_corners(&view, FastVariant::Fast9, 10);
    let mut buffers = NmsBuffers::with_capacity(candidates.len(), H);

    c.bench_function("nonmax_suppression_640x480", |b| {
        b.iter(|| nonmax_suppression_with(black_box(&view), &candidates, 10, &mut buffers))
    });
}

criterion_group!(benches, bench_detect, bench_nms);
criterion_main!(benches);
