//! Configuration types for the staging pipeline

use crate::error::{Result, StageError};
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Resampling filter used when scaling cutouts to a canvas
///
/// The choice affects output bytes but not structural correctness; masks are
/// always resampled nearest-neighbor regardless of this setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    /// Nearest neighbor, no interpolation
    Nearest,
    /// Linear interpolation
    Triangle,
    /// Cubic interpolation
    CatmullRom,
    /// Windowed sinc, highest quality
    Lanczos3,
}

impl ResizeFilter {
    /// Map onto the image crate's filter type
    #[must_use]
    pub fn to_filter_type(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl Default for ResizeFilter {
    fn default() -> Self {
        Self::Lanczos3
    }
}

/// Configuration for a staging run
#[derive(Debug, Clone)]
pub struct StageConfig {
    /// Directory holding product images
    pub product_dir: PathBuf,
    /// Directory holding background images
    pub background_dir: PathBuf,
    /// Directory receiving the composited artifacts
    pub output_dir: PathBuf,
    /// Directory holding the segmentation model weights
    pub model_dir: PathBuf,
    /// Class label treated as product foreground
    pub foreground_label: u8,
    /// Resampling filter for cutout scaling
    pub resize_filter: ResizeFilter,
    /// JPEG quality for JPEG-encoded outputs (0-100)
    pub jpeg_quality: u8,
}

impl StageConfig {
    /// Create a new configuration builder
    #[must_use]
    pub fn builder() -> StageConfigBuilder {
        StageConfigBuilder::new()
    }

    /// Validate the configuration
    ///
    /// # Errors
    /// Returns [`StageError::InvalidConfig`] for out-of-range values or
    /// empty paths.
    pub fn validate(&self) -> Result<()> {
        if self.jpeg_quality > 100 {
            return Err(StageError::invalid_config(format!(
                "JPEG quality {} outside 0-100",
                self.jpeg_quality
            )));
        }
        for (name, path) in [
            ("product directory", &self.product_dir),
            ("background directory", &self.background_dir),
            ("output directory", &self.output_dir),
            ("model directory", &self.model_dir),
        ] {
            if path.as_os_str().is_empty() {
                return Err(StageError::invalid_config(format!("{} path is empty", name)));
            }
        }
        Ok(())
    }
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            product_dir: PathBuf::from("images/products"),
            background_dir: PathBuf::from("images/backgrounds"),
            output_dir: PathBuf::from("output"),
            model_dir: PathBuf::from("models"),
            foreground_label: 1,
            resize_filter: ResizeFilter::default(),
            jpeg_quality: 90,
        }
    }
}

/// Builder for [`StageConfig`]
pub struct StageConfigBuilder {
    config: StageConfig,
}

impl StageConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: StageConfig::default(),
        }
    }

    #[must_use]
    pub fn product_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.product_dir = dir.into();
        self
    }

    #[must_use]
    pub fn background_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.background_dir = dir.into();
        self
    }

    #[must_use]
    pub fn output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    #[must_use]
    pub fn model_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.model_dir = dir.into();
        self
    }

    #[must_use]
    pub fn foreground_label(mut self, label: u8) -> Self {
        self.config.foreground_label = label;
        self
    }

    #[must_use]
    pub fn resize_filter(mut self, filter: ResizeFilter) -> Self {
        self.config.resize_filter = filter;
        self
    }

    #[must_use]
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.clamp(0, 100);
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    /// Returns [`StageError::InvalidConfig`] when validation fails.
    pub fn build(self) -> Result<StageConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for StageConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
