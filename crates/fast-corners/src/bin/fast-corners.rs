//! fast-corners CLI: detect FAST corners in an image and dump them as JSON and PNG.

use anyhow::{bail, Context, Result};
use clap::Parser;
use fast_corners::adaptive::AdaptiveParams;
use fast_corners::app::{load_config, run_detection, DetectionConfig};
use fast_corners::logger;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fast-corners")]
#[command(about = "Detect FAST segment-test corners in a grayscale image")]
#[command(version)]
struct Cli {
    /// JSON run configuration; command-line flags override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input image (any format supported by the `image` crate).
    #[arg(long)]
    image: Option<PathBuf>,

    /// Arc length variant: 9, 10, 11 or 12 (also accepts fast9, FAST-12, ...).
    #[arg(long)]
    variant: Option<String>,

    /// Intensity barrier a ring sample must exceed.
    #[arg(long)]
    barrier: Option<u8>,

    /// Keep every raw candidate instead of suppressing non-maxima.
    #[arg(long)]
    no_nonmax: bool,

    /// Tune the barrier until the corner count is in MIN..MAX.
    #[arg(long, value_name = "MIN..MAX")]
    adaptive_target: Option<String>,

    #[arg(long)]
    out_json: Option<PathBuf>,

    #[arg(long)]
    out_png: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    log_level: Option<String>,

    /// Emit tracing spans as JSON instead of the plain logger.
    #[cfg(feature = "tracing")]
    #[arg(long)]
    trace_json: bool,
}

fn parse_target(s: &str) -> Result<(usize, usize)> {
    let (lo, hi) = s
        .split_once("..")
        .with_context(|| format!("expected MIN..MAX, got '{s}'"))?;
    let lo: usize = lo.trim().parse().context("parsing adaptive target minimum")?;
    let hi: usize = hi.trim().parse().context("parsing adaptive target maximum")?;
    if lo > hi {
        bail!("adaptive target minimum {lo} exceeds maximum {hi}");
    }
    Ok((lo, hi))
}

fn build_config(cli: Cli) -> Result<DetectionConfig> {
    let mut cfg = match (&cli.config, &cli.image) {
        (Some(path), _) => load_config(path)?,
        (None, Some(image)) => DetectionConfig::new(image.clone()),
        (None, None) => bail!("either --config or --image is required"),
    };
    if let Some(image) = cli.image {
        cfg.image = image;
    }
    if cli.variant.is_some() {
        cfg.variant = cli.variant;
    }
    if cli.barrier.is_some() {
        cfg.barrier = cli.barrier;
    }
    if cli.no_nonmax {
        cfg.nonmax = Some(false);
    }
    if let Some(target) = cli.adaptive_target.as_deref() {
        let (target_min, target_max) = parse_target(target)?;
        cfg.adaptive = Some(AdaptiveParams {
            target_min,
            target_max,
            ..cfg.adaptive.unwrap_or_default()
        });
    }
    if cli.out_json.is_some() {
        cfg.output_json = cli.out_json;
    }
    if cli.out_png.is_some() {
        cfg.output_png = cli.out_png;
    }
    if cli.log_level.is_some() {
        cfg.log_level = cli.log_level;
    }
    Ok(cfg)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    #[cfg(feature = "tracing")]
    let trace_json = cli.trace_json;

    let cfg = build_config(cli)?;

    let level = logger::parse_level(cfg.log_level.as_deref());
    #[cfg(feature = "tracing")]
    logger::init_tracing(trace_json, level);
    #[cfg(not(feature = "tracing"))]
    logger::init_with_level(level)?;

    let dump = run_detection(&cfg)?;
    println!(
        "{} corners ({}, barrier {})",
        dump.corners.len(),
        dump.variant,
        dump.barrier
    );
    Ok(())
}
