#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # bgstage
//!
//! Segmentation-driven compositing of product photos onto background image
//! sets. A learned per-pixel class mask separates product pixels from their
//! original surroundings; the resulting cutout is resized together with its
//! mask to each background canvas and merged per pixel, producing one
//! deterministic artifact per (product, background) pair.
//!
//! ## Features
//!
//! - **Opaque predictor boundary**: any segmentation backend fits behind the
//!   [`Segmenter`] trait; the bundled backend runs ONNX graphs with Tract
//!   (pure Rust, no external dependencies)
//! - **Validity-tagged cutouts**: undefined pixels are tracked in an alpha
//!   channel, never as a sentinel color
//! - **Deterministic outputs**: sorted enumeration, stable arg-max, and
//!   collision-guarded `{product_stem}_{background_file_name}` naming
//! - **Format Support**: JPEG, PNG, WebP, TIFF via the image crate
//! - **CLI Integration**: optional command-line interface (enable with the
//!   `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bgstage::{StageConfig, StagePipeline};
//!
//! # fn example() -> bgstage::Result<()> {
//! let config = StageConfig::builder()
//!     .product_dir("images/products")
//!     .background_dir("images/backgrounds")
//!     .output_dir("output")
//!     .model_dir("models")
//!     .build()?;
//!
//! let mut pipeline = StagePipeline::with_tract_backend(config)?;
//! let report = pipeline.run()?;
//! println!("staged {} composites", report.staged);
//! # Ok(())
//! # }
//! ```
//!
//! ## Library vs CLI Usage
//!
//! All pipeline functionality is available by default as a library; enable
//! the `cli` feature for the `bgstage` binary and progress reporting.
//!
//! ### Feature Flags
//!
//! - `tract` (default): pure Rust inference backend
//! - `cli` (default): command-line interface
//! - `webp-support` (default): WebP image format support

pub mod backends;
#[cfg(feature = "cli")]
pub mod cli;
pub mod compositor;
pub mod config;
pub mod cutout;
pub mod error;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod segmentation;
pub mod services;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;
pub mod utils;

// Public API exports
#[cfg(feature = "tract")]
pub use backends::TractSegmenter;
pub use compositor::Compositor;
pub use config::{ResizeFilter, StageConfig, StageConfigBuilder};
pub use cutout::ForegroundExtractor;
pub use error::{Result, StageError};
pub use models::{ModelManager, PreprocessingConfig};
pub use normalize::GeometricNormalizer;
pub use pipeline::{output_file_name, StagePipeline};
pub use segmentation::Segmenter;
pub use services::ImageIoService;
pub use types::{ClassMask, Cutout, StageReport};
pub use utils::ImagePreprocessor;

#[cfg(feature = "cli")]
pub use tracing_config::{init_cli_tracing, TracingConfig};

use image::DynamicImage;

/// Composite one product onto one background entirely in memory
///
/// Runs the full pipeline for a single pair: predict, extract, co-resize
/// cutout and mask to the background's dimensions, merge. Useful for
/// library callers that manage their own I/O.
///
/// # Arguments
///
/// * `product` - Decoded product image
/// * `background` - Decoded background canvas
/// * `segmenter` - Segmentation backend handle
/// * `config` - Foreground label and resampling filter are honored; paths
///   are ignored
///
/// # Examples
///
/// ```rust,no_run
/// use bgstage::{composite_onto_background, ModelManager, StageConfig, TractSegmenter};
///
/// # fn example() -> bgstage::Result<()> {
/// let config = StageConfig::default();
/// let manager = ModelManager::from_dir(&config.model_dir)?;
/// let mut segmenter = TractSegmenter::from_model_manager(&manager)?;
///
/// let product = bgstage::ImageIoService::load_image("shoe.png")?;
/// let background = bgstage::ImageIoService::load_image("beach.jpg")?;
/// let staged = composite_onto_background(&product, &background, &mut segmenter, &config)?;
/// staged.save("shoe_beach.jpg")?;
/// # Ok(())
/// # }
/// ```
pub fn composite_onto_background(
    product: &DynamicImage,
    background: &DynamicImage,
    segmenter: &mut dyn Segmenter,
    config: &StageConfig,
) -> Result<DynamicImage> {
    let mask = segmenter.predict(product)?;
    let cutout = ForegroundExtractor::extract(product, &mask, config.foreground_label)?;

    let mut canvas = background.to_rgb8();
    let (canvas_width, canvas_height) = canvas.dimensions();
    let (normalized_cutout, normalized_mask) = GeometricNormalizer::resize_pair(
        &cutout,
        &mask,
        canvas_width,
        canvas_height,
        config.resize_filter,
    )?;
    Compositor::composite(
        &mut canvas,
        &normalized_cutout,
        &normalized_mask,
        config.foreground_label,
    )?;

    Ok(DynamicImage::ImageRgb8(canvas))
}
