//! Segmentation adapter boundary
//!
//! The pipeline only ever sees this trait; any segmentation backend
//! (learned or classic) can be substituted behind it without touching the
//! compositing stages.

use crate::{
    error::{Result, StageError},
    types::ClassMask,
};
use image::{DynamicImage, GenericImageView};

/// Trait for segmentation backends
///
/// Implementations are purely functional with respect to the input image;
/// the only cross-call state is the loaded model.
pub trait Segmenter {
    /// Produce a per-pixel class mask for the image
    ///
    /// The returned mask has exactly one label per pixel, chosen as the
    /// highest-scoring class, and its dimensions equal the input's.
    ///
    /// # Errors
    /// - [`StageError::InvalidInput`] for images the predictor cannot accept
    /// - [`StageError::Inference`] for backend failures
    fn predict(&mut self, image: &DynamicImage) -> Result<ClassMask>;

    /// Human-readable backend name for logs
    fn name(&self) -> &str {
        "segmenter"
    }
}

/// Reject images that cannot be coerced into the predictor's tensor shape
///
/// # Errors
/// Returns [`StageError::InvalidInput`] for a zero-sized dimension.
pub fn validate_predictor_input(image: &DynamicImage) -> Result<()> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(StageError::invalid_input(format!(
            "image with zero-sized dimension ({}x{}) cannot be segmented",
            width, height
        )));
    }
    Ok(())
}
