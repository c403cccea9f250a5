//! Pipeline driver: products x backgrounds -> composited artifacts
//!
//! Runs segmentation and extraction once per product, then normalizes and
//! composites against every background, persisting each artifact under a
//! deterministic name.

use crate::{
    compositor::Compositor,
    config::StageConfig,
    cutout::ForegroundExtractor,
    error::{Result, StageError},
    normalize::GeometricNormalizer,
    segmentation::Segmenter,
    services::ImageIoService,
    types::{ClassMask, Cutout, StageReport},
};
use image::DynamicImage;
use instant::Instant;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Derive the deterministic artifact name for a (product, background) pair
///
/// The name is `{product_stem}_{background_file_name}`, so the artifact is
/// encoded in the background's format.
///
/// # Errors
/// Returns [`StageError::InvalidInput`] when either path has no usable
/// UTF-8 file name.
pub fn output_file_name(product: &Path, background: &Path) -> Result<String> {
    let product_stem = product
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| {
            StageError::invalid_input(format!(
                "product path '{}' has no usable file stem",
                product.display()
            ))
        })?;
    let background_name = background
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            StageError::invalid_input(format!(
                "background path '{}' has no usable file name",
                background.display()
            ))
        })?;
    Ok(format!("{product_stem}_{background_name}"))
}

/// Drives the staging pipeline over product and background directories
pub struct StagePipeline {
    config: StageConfig,
    segmenter: Box<dyn Segmenter>,
}

impl StagePipeline {
    /// Create a pipeline with an explicit segmenter handle
    #[must_use]
    pub fn new(config: StageConfig, segmenter: Box<dyn Segmenter>) -> Self {
        Self { config, segmenter }
    }

    /// Create a pipeline backed by the Tract segmenter
    ///
    /// Loads the model from the configured model directory; the handle
    /// lives for the pipeline's lifetime.
    ///
    /// # Errors
    /// Returns [`StageError::ModelUnavailable`] when the weights cannot be
    /// resolved or loaded.
    #[cfg(feature = "tract")]
    pub fn with_tract_backend(config: StageConfig) -> Result<Self> {
        let manager = crate::models::ModelManager::from_dir(&config.model_dir)?;
        let segmenter = crate::backends::TractSegmenter::from_model_manager(&manager)?;
        Ok(Self::new(config, Box::new(segmenter)))
    }

    /// The configuration this pipeline runs with
    #[must_use]
    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Stage every product against every background
    ///
    /// Pair-level failures are reported and skipped; a predictor failure on
    /// a product skips that product's remaining backgrounds. Only
    /// environment-level problems (unreadable input directories, no
    /// backgrounds at all, output directory creation) fail the run itself.
    ///
    /// # Errors
    /// See above; everything else lands in the returned [`StageReport`].
    pub fn run(&mut self) -> Result<StageReport> {
        let run_start = Instant::now();

        let products = ImageIoService::list_images(&self.config.product_dir)?;
        let backgrounds = ImageIoService::list_images(&self.config.background_dir)?;
        if backgrounds.is_empty() {
            return Err(StageError::invalid_input(format!(
                "no background images found in '{}'",
                self.config.background_dir.display()
            )));
        }

        std::fs::create_dir_all(&self.config.output_dir).map_err(|e| {
            StageError::file_io_error("create output directory", &self.config.output_dir, e)
        })?;

        tracing::info!(
            products = products.len(),
            backgrounds = backgrounds.len(),
            backend = self.segmenter.name(),
            "starting staging run"
        );

        let mut report = StageReport::new(products.len(), backgrounds.len());
        let mut emitted_names = HashSet::new();

        for product in &products {
            let product_start = Instant::now();
            match self.stage_product(product, &backgrounds, &mut emitted_names, &mut report) {
                Ok(()) => {
                    tracing::debug!(
                        product = %product.display(),
                        elapsed_ms = product_start.elapsed().as_millis() as u64,
                        "product processed"
                    );
                },
                Err(e) => {
                    report.failed_products += 1;
                    tracing::error!(
                        product = %product.display(),
                        error = %e,
                        "skipping product, mask could not be derived"
                    );
                },
            }
        }

        report.elapsed = run_start.elapsed();
        tracing::info!(
            staged = report.staged,
            failed_pairs = report.failed_pairs,
            failed_products = report.failed_products,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "staging run finished"
        );

        Ok(report)
    }

    /// Segment one product and stage it against all backgrounds
    ///
    /// Errors returned here are product-level: the mask is a prerequisite
    /// for every pair, so nothing can be staged without it.
    fn stage_product(
        &mut self,
        product: &Path,
        backgrounds: &[PathBuf],
        emitted_names: &mut HashSet<String>,
        report: &mut StageReport,
    ) -> Result<()> {
        let image = ImageIoService::load_image(product)?;
        let mask = self.segmenter.predict(&image)?;
        let cutout = ForegroundExtractor::extract(&image, &mask, self.config.foreground_label)?;

        for background in backgrounds {
            match self.stage_onto(product, &cutout, &mask, background, emitted_names) {
                Ok(output_path) => {
                    report.staged += 1;
                    tracing::info!(
                        product = %product.display(),
                        background = %background.display(),
                        output = %output_path.display(),
                        "staged"
                    );
                },
                Err(e) => {
                    report.failed_pairs += 1;
                    tracing::warn!(
                        product = %product.display(),
                        background = %background.display(),
                        error = %e,
                        "skipping pair"
                    );
                },
            }
        }

        Ok(())
    }

    /// Stage one (product, background) pair and persist the artifact
    fn stage_onto(
        &self,
        product: &Path,
        cutout: &Cutout,
        mask: &ClassMask,
        background: &Path,
        emitted_names: &mut HashSet<String>,
    ) -> Result<PathBuf> {
        let name = output_file_name(product, background)?;
        if !emitted_names.insert(name.clone()) {
            return Err(StageError::invalid_input(format!(
                "output name '{name}' was already produced by an earlier pair"
            )));
        }

        let mut canvas = ImageIoService::load_image(background)?.to_rgb8();
        let (canvas_width, canvas_height) = canvas.dimensions();

        let (normalized_cutout, normalized_mask) = GeometricNormalizer::resize_pair(
            cutout,
            mask,
            canvas_width,
            canvas_height,
            self.config.resize_filter,
        )?;
        Compositor::composite(
            &mut canvas,
            &normalized_cutout,
            &normalized_mask,
            self.config.foreground_label,
        )?;

        let output_path = self.config.output_dir.join(&name);
        ImageIoService::save_image(
            &DynamicImage::ImageRgb8(canvas),
            &output_path,
            self.config.jpeg_quality,
        )?;

        Ok(output_path)
    }
}
