//! Product staging CLI tool
//!
//! Command-line interface for compositing product photos onto background
//! image sets using the staging pipeline.

use super::config::CliConfigBuilder;
use crate::pipeline::StagePipeline;
use crate::tracing_config::init_cli_tracing;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::path::PathBuf;
use std::time::Duration;

/// Product staging CLI tool
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "bgstage")]
pub struct Cli {
    /// Directory of product images
    #[arg(long, value_name = "DIR", default_value = "images/products")]
    pub products: PathBuf,

    /// Directory of background images
    #[arg(long, value_name = "DIR", default_value = "images/backgrounds")]
    pub backgrounds: PathBuf,

    /// Output directory for composited images
    #[arg(short, long, value_name = "DIR", default_value = "output")]
    pub output: PathBuf,

    /// Directory holding the segmentation model weights
    #[arg(short, long, value_name = "DIR", default_value = "models")]
    pub models: PathBuf,

    /// Class label treated as product foreground
    #[arg(long, default_value_t = 1)]
    pub foreground_label: u8,

    /// Resampling filter for cutout scaling
    #[arg(long, value_enum, default_value_t = CliResizeFilter::Lanczos3)]
    pub filter: CliResizeFilter,

    /// JPEG quality for JPEG-encoded outputs (0-100)
    #[arg(long, default_value_t = 90)]
    pub jpeg_quality: u8,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Lanczos3,
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();

    init_cli_tracing(cli.verbose).context("Failed to initialize tracing")?;

    CliConfigBuilder::validate_cli(&cli).context("Invalid CLI arguments")?;
    let config = CliConfigBuilder::from_cli(&cli).context("Failed to build configuration")?;

    info!("Starting product staging CLI");
    info!(
        "Products: {}, Backgrounds: {}, Output: {}",
        config.product_dir.display(),
        config.background_dir.display(),
        config.output_dir.display()
    );
    info!("Model directory: {}", config.model_dir.display());

    let mut pipeline = build_pipeline(config)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("staging products onto backgrounds...");
    spinner.enable_steady_tick(Duration::from_millis(120));

    let report = pipeline.run();
    spinner.finish_and_clear();
    let report = report.context("Staging run failed")?;

    println!(
        "Staged {} composite(s) from {} product(s) x {} background(s) in {:.2}s",
        report.staged,
        report.products,
        report.backgrounds,
        report.elapsed.as_secs_f64()
    );
    if !report.is_clean() {
        println!(
            "Skipped {} pair(s) and {} product(s); see the log for details",
            report.failed_pairs, report.failed_products
        );
    }

    Ok(())
}

#[cfg(feature = "tract")]
fn build_pipeline(config: crate::config::StageConfig) -> Result<StagePipeline> {
    StagePipeline::with_tract_backend(config)
        .context("Failed to initialize segmentation backend")
}

#[cfg(not(feature = "tract"))]
fn build_pipeline(_config: crate::config::StageConfig) -> Result<StagePipeline> {
    anyhow::bail!("No segmentation backend compiled in. Rebuild with --features tract")
}
