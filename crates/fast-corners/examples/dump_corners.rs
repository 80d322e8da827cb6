use anyhow::Context;
use fast_corners::app::{draw_corners, write_json, CornerOut};
use fast_corners::image::{detect_corners_image, nonmax_suppression_image};
use fast_corners::{logger, FastVariant};
use image::ImageReader;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Serialize)]
struct CornerDump {
    image: String,
    width: u32,
    height: u32,
    variant: String,
    barrier: u8,
    candidates: usize,
    corners: Vec<CornerOut>,
}

fn main() -> anyhow::Result<()> {
    logger::init_with_level(log::LevelFilter::Info)?;

    let mut args = std::env::args().skip(1);
    let input: PathBuf = args
        .next()
        .context("usage: dump_corners <image> [--variant N] [--barrier B]")?
        .into();

    let mut variant = FastVariant::Fast9;
    let mut barrier: u8 = 20;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--variant" => {
                let v = args.next().context("expected a value after --variant")?;
                variant = v.parse()?;
            }
            "--barrier" => {
                let v = args.next().context("expected an integer after --barrier")?;
                barrier = v
                    .parse()
                    .context("could not parse barrier (use integer 0..=255)")?;
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    let img = ImageReader::open(&input)?.decode()?.to_luma8();

    let started = Instant::now();
    let candidates = detect_corners_image(&img, variant, barrier);
    let detect_ms = started.elapsed().as_secs_f64() * 1000.0;

    let started = Instant::now();
    let kept = nonmax_suppression_image(&img, &candidates, barrier);
    let nms_ms = started.elapsed().as_secs_f64() * 1000.0;

    println!("image {}x{} pixels", img.width(), img.height());
    println!(" - detect: {:5.2} ms ({} candidates)", detect_ms, candidates.len());
    println!(" -    nms: {:5.2} ms ({} corners)", nms_ms, kept.len());

    let scores = fast_corners::image::gray_view(&img)
        .map(|view| {
            kept.iter()
                .map(|&c| fast_corners_core::corner_score(&view, c, barrier))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let dump = CornerDump {
        image: input.to_string_lossy().into_owned(),
        width: img.width(),
        height: img.height(),
        variant: variant.to_string(),
        barrier,
        candidates: candidates.len(),
        corners: kept
            .iter()
            .zip(scores)
            .map(|(c, score)| CornerOut {
                x: c.x,
                y: c.y,
                score,
            })
            .collect(),
    };
    let json_out = input.with_extension("corners.json");
    write_json(&json_out, &dump)?;
    println!("Saved JSON dump to {}", json_out.display());

    let mut vis = img.clone();
    draw_corners(&mut vis, kept.iter().map(|c| (c.x, c.y)));
    let out = input.with_extension("corners.png");
    vis.save(&out)?;
    println!("Saved visualization to {}", out.display());

    Ok(())
}
