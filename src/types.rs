//! Core types for product staging operations

use crate::error::{Result, StageError};
use image::{imageops, GrayImage, Rgba, RgbaImage};
use instant::Duration;
use ndarray::ArrayView3;
use serde::{Deserialize, Serialize};

/// Per-pixel class labeling aligned to a source image
///
/// Labels are stored row-major; one distinguished label value marks the
/// product foreground, every other value is background/other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMask {
    /// Class label per pixel, row-major
    labels: Vec<u8>,

    /// Mask dimensions (width, height)
    dimensions: (u32, u32),
}

impl ClassMask {
    /// Create a mask from a raw label buffer
    ///
    /// # Errors
    /// Returns [`StageError::InvalidInput`] if the buffer length does not
    /// match the dimensions.
    pub fn new(labels: Vec<u8>, dimensions: (u32, u32)) -> Result<Self> {
        let expected = dimensions.0 as usize * dimensions.1 as usize;
        if labels.len() != expected {
            return Err(StageError::invalid_input(format!(
                "label buffer holds {} entries but {}x{} mask needs {}",
                labels.len(),
                dimensions.0,
                dimensions.1,
                expected
            )));
        }
        Ok(Self { labels, dimensions })
    }

    /// Build a mask by arg-maxing per-pixel class scores
    ///
    /// Expects scores in `(class, height, width)` layout. Each pixel gets the
    /// label of its highest-scoring class; ties resolve to the lowest label,
    /// keeping the result deterministic.
    ///
    /// # Errors
    /// Returns [`StageError::Inference`] for an empty score tensor or one
    /// with more classes than the `u8` label space can carry.
    pub fn from_class_scores(scores: ArrayView3<'_, f32>) -> Result<Self> {
        let (classes, height, width) = scores.dim();
        if classes == 0 || height == 0 || width == 0 {
            return Err(StageError::inference(format!(
                "class score tensor has degenerate shape {}x{}x{}",
                classes, height, width
            )));
        }
        if classes > usize::from(u8::MAX) + 1 {
            return Err(StageError::inference(format!(
                "{} classes exceed the 256-label space",
                classes
            )));
        }

        let mut labels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let mut best_label = 0u8;
                let mut best_score = scores[[0, y, x]];
                for class in 1..classes {
                    let score = scores[[class, y, x]];
                    if score > best_score {
                        best_score = score;
                        best_label = class as u8;
                    }
                }
                labels.push(best_label);
            }
        }

        Ok(Self {
            labels,
            dimensions: (width as u32, height as u32),
        })
    }

    /// Mask dimensions as (width, height)
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    /// Class label at a pixel position
    ///
    /// # Panics
    /// Panics if the position lies outside the mask.
    #[must_use]
    pub fn label_at(&self, x: u32, y: u32) -> u8 {
        let (width, height) = self.dimensions;
        assert!(x < width && y < height, "mask position out of bounds");
        #[allow(clippy::indexing_slicing)] // bounds asserted above
        let label = self.labels[y as usize * width as usize + x as usize];
        label
    }

    /// Whether the pixel at (x, y) carries the given foreground label
    #[must_use]
    pub fn is_foreground(&self, x: u32, y: u32, foreground_label: u8) -> bool {
        self.label_at(x, y) == foreground_label
    }

    /// Number of pixels carrying the given foreground label
    #[must_use]
    pub fn foreground_count(&self, foreground_label: u8) -> usize {
        self.labels
            .iter()
            .filter(|label| **label == foreground_label)
            .count()
    }

    /// Resample the mask to new dimensions
    ///
    /// Always uses nearest-neighbor so class labels stay crisp and never
    /// blend into values that were not present in the source.
    ///
    /// # Errors
    /// Returns [`StageError::InvalidDimension`] for a zero-sized target.
    pub fn resized(&self, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(StageError::invalid_dimension(format!(
                "mask resize target {}x{} must be positive",
                width, height
            )));
        }
        if (width, height) == self.dimensions {
            return Ok(self.clone());
        }

        let (current_width, current_height) = self.dimensions;
        let label_image = GrayImage::from_raw(current_width, current_height, self.labels.clone())
            .ok_or_else(|| StageError::internal("mask label buffer disagrees with dimensions"))?;
        let resized = imageops::resize(
            &label_image,
            width,
            height,
            imageops::FilterType::Nearest,
        );

        Ok(Self {
            labels: resized.into_raw(),
            dimensions: (width, height),
        })
    }

    /// Raw label buffer, row-major
    #[must_use]
    pub fn labels(&self) -> &[u8] {
        &self.labels
    }
}

/// Product pixels with explicit validity tagging
///
/// Backed by an RGBA buffer where alpha marks definedness: 255 for a
/// preserved product pixel, 0 for undefined. Undefined positions carry no
/// canonical color; zero RGB under zero alpha is meaningless and must never
/// leak into a canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cutout {
    pixels: RgbaImage,
}

impl Cutout {
    /// Wrap an RGBA buffer whose alpha channel already tags validity
    #[must_use]
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// Cutout dimensions as (width, height)
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Whether the pixel at (x, y) holds defined product data
    #[must_use]
    pub fn is_defined(&self, x: u32, y: u32) -> bool {
        self.pixels.get_pixel(x, y)[3] > 0
    }

    /// Pixel value including the validity alpha
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.pixels.get_pixel(x, y)
    }

    /// Number of pixels with any coverage
    #[must_use]
    pub fn defined_count(&self) -> usize {
        self.pixels.pixels().filter(|pixel| pixel[3] > 0).count()
    }

    /// True when no pixel is defined (degenerate all-background mask)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defined_count() == 0
    }

    /// Borrow the underlying RGBA buffer
    #[must_use]
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Resample to new dimensions with the given filter
    ///
    /// The validity channel is resampled alongside color, so partially
    /// covered border pixels come out with fractional alpha.
    pub(crate) fn resampled(&self, width: u32, height: u32, filter: imageops::FilterType) -> Self {
        Self::new(imageops::resize(&self.pixels, width, height, filter))
    }
}

/// Summary of one pipeline run
#[derive(Debug, Clone, Default)]
pub struct StageReport {
    /// Product images found
    pub products: usize,
    /// Background images found
    pub backgrounds: usize,
    /// Output artifacts written
    pub staged: usize,
    /// (product, background) pairs that failed and were skipped
    pub failed_pairs: usize,
    /// Products whose mask could not be derived at all
    pub failed_products: usize,
    /// Wall-clock time for the whole run
    pub elapsed: Duration,
}

impl StageReport {
    /// Create a report for a run over the given inputs
    #[must_use]
    pub fn new(products: usize, backgrounds: usize) -> Self {
        Self {
            products,
            backgrounds,
            ..Self::default()
        }
    }

    /// Pairs that were actually attempted
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.staged + self.failed_pairs
    }

    /// True when every discovered pair produced an artifact
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed_pairs == 0 && self.failed_products == 0
    }
}
