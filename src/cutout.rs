//! Foreground extraction from a class mask

use crate::{
    error::{Result, StageError},
    types::{ClassMask, Cutout},
};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

/// Derives a product cutout from an image and its class mask
pub struct ForegroundExtractor;

impl ForegroundExtractor {
    /// Extract the foreground-labeled pixels into a validity-tagged cutout
    ///
    /// Foreground positions keep their original color with full alpha; every
    /// other position is tagged undefined (alpha 0). A mask with no
    /// foreground pixel produces an entirely undefined cutout, which the
    /// compositor later treats as a no-op paste rather than an error.
    ///
    /// # Errors
    /// Returns [`StageError::ShapeMismatch`] when mask and image dimensions
    /// disagree.
    pub fn extract(
        image: &DynamicImage,
        mask: &ClassMask,
        foreground_label: u8,
    ) -> Result<Cutout> {
        let (width, height) = image.dimensions();
        if mask.dimensions() != (width, height) {
            return Err(StageError::shape_mismatch(
                "mask",
                mask.dimensions(),
                (width, height),
            ));
        }

        let rgb_image = image.to_rgb8();
        let mut pixels = RgbaImage::new(width, height);
        let mut defined = 0usize;
        for (x, y, pixel) in rgb_image.enumerate_pixels() {
            if mask.is_foreground(x, y, foreground_label) {
                pixels.put_pixel(x, y, Rgba([pixel[0], pixel[1], pixel[2], 255]));
                defined += 1;
            }
        }

        if defined == 0 {
            tracing::debug!(
                foreground_label,
                "mask labels no pixel as foreground; cutout is entirely undefined"
            );
        }

        Ok(Cutout::new(pixels))
    }
}
