//! Shared application-level helpers for the CLI and examples.
//!
//! These functions wire up I/O (load image, JSON/PNG output) around the
//! detection APIs so both the CLI and examples share the same behavior.

use crate::adaptive::{detect_adaptive, AdaptiveBarrier, AdaptiveParams};
use crate::image::{find_corners_image, gray_view};
use anyhow::{Context, Result};
use fast_corners_core::{FastParams, FastVariant, ScoredCorner};
use image::{GrayImage, ImageReader, Luma};
use serde::{Deserialize, Serialize};
use std::{fs::File, io::Write, path::Path, path::PathBuf};

/// JSON run configuration. Unset fields fall back to [`FastParams::default`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DetectionConfig {
    pub image: PathBuf,
    /// Arc length, e.g. `"9"`, `"fast12"` or `"FAST-10"`.
    pub variant: Option<String>,
    pub barrier: Option<u8>,
    pub nonmax: Option<bool>,
    pub output_json: Option<PathBuf>,
    pub output_png: Option<PathBuf>,
    pub log_level: Option<String>,
    /// When present, the barrier is tuned on the input image until the
    /// corner count falls inside the configured band.
    pub adaptive: Option<AdaptiveParams>,
}

impl DetectionConfig {
    pub fn new(image: impl Into<PathBuf>) -> Self {
        Self {
            image: image.into(),
            ..Self::default()
        }
    }

    /// Resolve the detector parameters, validating the variant name.
    pub fn params(&self) -> Result<FastParams> {
        let mut params = FastParams::default();
        if let Some(v) = &self.variant {
            params.variant = v
                .parse::<FastVariant>()
                .with_context(|| format!("invalid variant '{v}'"))?;
        }
        if let Some(b) = self.barrier {
            params.barrier = b;
        }
        if let Some(n) = self.nonmax {
            params.nonmax = n;
        }
        Ok(params)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CornerOut {
    pub x: usize,
    pub y: usize,
    pub score: i32,
}

impl From<ScoredCorner> for CornerOut {
    fn from(c: ScoredCorner) -> Self {
        Self {
            x: c.x,
            y: c.y,
            score: c.score,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectionDump {
    pub image: String,
    pub width: u32,
    pub height: u32,
    pub variant: String,
    pub barrier: u8,
    pub nonmax: bool,
    /// Number of passes when the adaptive barrier was used.
    pub adaptive_passes: Option<u32>,
    pub corners: Vec<CornerOut>,
}

/// Detect corners on an already loaded image according to `cfg`.
pub fn detect(img: &GrayImage, cfg: &DetectionConfig) -> Result<DetectionDump> {
    let params = cfg.params()?;

    let (corners, barrier, passes) = match cfg.adaptive {
        Some(adaptive) => {
            let view = gray_view(img).context("image has zero width or height")?;
            let mut controller = AdaptiveBarrier::new(params.barrier, adaptive)?;
            let run = detect_adaptive(&view, params.variant, params.nonmax, &mut controller);
            if !run.converged {
                log::warn!(
                    "adaptive barrier did not reach {}..={} corners (got {})",
                    adaptive.target_min,
                    adaptive.target_max,
                    run.corners.len()
                );
            }
            (run.corners, run.barrier, Some(run.passes))
        }
        None => (find_corners_image(img, &params), params.barrier, None),
    };

    log::debug!(
        "{} {}x{} barrier {} nonmax {} -> {} corners",
        params.variant,
        img.width(),
        img.height(),
        barrier,
        params.nonmax,
        corners.len()
    );

    Ok(DetectionDump {
        image: cfg.image.to_string_lossy().into_owned(),
        width: img.width(),
        height: img.height(),
        variant: params.variant.to_string(),
        barrier,
        nonmax: params.nonmax,
        adaptive_passes: passes,
        corners: corners.into_iter().map(CornerOut::from).collect(),
    })
}

/// Load the configured image, detect, and write the JSON dump and PNG
/// overlay next to the input unless explicit outputs are given.
pub fn run_detection(cfg: &DetectionConfig) -> Result<DetectionDump> {
    let img = ImageReader::open(&cfg.image)
        .with_context(|| format!("opening image {}", cfg.image.display()))?
        .decode()
        .with_context(|| format!("decoding image {}", cfg.image.display()))?
        .to_luma8();

    let dump = detect(&img, cfg)?;
    log::info!(
        "{}: {} corners ({}, barrier {})",
        dump.image,
        dump.corners.len(),
        dump.variant,
        dump.barrier
    );

    let json_out = cfg
        .output_json
        .clone()
        .unwrap_or_else(|| cfg.image.with_extension("corners.json"));
    write_json(&json_out, &dump)?;
    log::info!("saved JSON dump to {}", json_out.display());

    let png_out = cfg
        .output_png
        .clone()
        .unwrap_or_else(|| cfg.image.with_extension("corners.png"));
    let mut vis = img;
    draw_corners(&mut vis, dump.corners.iter().map(|c| (c.x, c.y)));
    vis.save(&png_out)
        .with_context(|| format!("writing {}", png_out.display()))?;
    log::info!("saved visualization to {}", png_out.display());

    Ok(dump)
}

/// Mark each corner with a 3x3 white square, clipped to the image.
pub fn draw_corners(vis: &mut GrayImage, corners: impl Iterator<Item = (usize, usize)>) {
    let (w, h) = (vis.width() as i64, vis.height() as i64);
    for (x, y) in corners {
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                let xx = x as i64 + dx;
                let yy = y as i64 + dy;
                if xx >= 0 && yy >= 0 && xx < w && yy < h {
                    vis.put_pixel(xx as u32, yy as u32, Luma([255u8]));
                }
            }
        }
    }
}

pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let mut json_file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(&mut json_file, value)?;
    json_file.write_all(b"\n")?;
    Ok(())
}

pub fn load_config(path: &Path) -> Result<DetectionConfig> {
    let file = File::open(path).with_context(|| format!("opening config {}", path.display()))?;
    let cfg: DetectionConfig = serde_json::from_reader(file)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}
