//! Geometric normalization of cutout and mask to a target canvas

use crate::{
    config::ResizeFilter,
    error::{Result, StageError},
    types::{ClassMask, Cutout},
};

/// Resamples a cutout and its mask to a canvas's dimensions
pub struct GeometricNormalizer;

impl GeometricNormalizer {
    /// Resize cutout and mask together to exactly `target_width` x `target_height`
    ///
    /// The cutout's color and validity channels are resampled with the
    /// configured filter; the mask always uses nearest-neighbor so labels
    /// stay crisp. Resizing them together is what keeps the compositor's
    /// per-pixel rule well-defined on canvases of arbitrary dimensions.
    ///
    /// Resampling a partially-undefined cutout bleeds undefined regions
    /// into neighboring defined pixels; that is an accepted limitation, not
    /// repaired by inpainting.
    ///
    /// # Errors
    /// - [`StageError::InvalidDimension`] for a zero-sized target
    /// - [`StageError::ShapeMismatch`] when cutout and mask disagree before
    ///   resampling
    pub fn resize_pair(
        cutout: &Cutout,
        mask: &ClassMask,
        target_width: u32,
        target_height: u32,
        filter: ResizeFilter,
    ) -> Result<(Cutout, ClassMask)> {
        if target_width == 0 || target_height == 0 {
            return Err(StageError::invalid_dimension(format!(
                "resize target {}x{} must be positive",
                target_width, target_height
            )));
        }
        if cutout.dimensions() != mask.dimensions() {
            return Err(StageError::shape_mismatch(
                "cutout",
                cutout.dimensions(),
                mask.dimensions(),
            ));
        }

        // Identity resize is a structural no-op
        if cutout.dimensions() == (target_width, target_height) {
            return Ok((cutout.clone(), mask.clone()));
        }

        let resized_cutout =
            cutout.resampled(target_width, target_height, filter.to_filter_type());
        let resized_mask = mask.resized(target_width, target_height)?;

        Ok((resized_cutout, resized_mask))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn rect_fixture(width: u32, height: u32) -> (Cutout, ClassMask) {
        // Left half foreground, right half undefined
        let mut pixels = RgbaImage::new(width, height);
        let mut labels = vec![0u8; width as usize * height as usize];
        for y in 0..height {
            for x in 0..width / 2 {
                pixels.put_pixel(x, y, Rgba([200, 100, 50, 255]));
                labels[y as usize * width as usize + x as usize] = 1;
            }
        }
        (
            Cutout::new(pixels),
            ClassMask::new(labels, (width, height)).unwrap(),
        )
    }

    #[test]
    fn test_pair_resizes_to_target() {
        let (cutout, mask) = rect_fixture(8, 4);
        let (resized_cutout, resized_mask) =
            GeometricNormalizer::resize_pair(&cutout, &mask, 16, 10, ResizeFilter::Triangle)
                .unwrap();
        assert_eq!(resized_cutout.dimensions(), (16, 10));
        assert_eq!(resized_mask.dimensions(), (16, 10));
    }

    #[test]
    fn test_identity_resize_is_noop() {
        let (cutout, mask) = rect_fixture(6, 6);
        let (resized_cutout, resized_mask) =
            GeometricNormalizer::resize_pair(&cutout, &mask, 6, 6, ResizeFilter::Lanczos3)
                .unwrap();
        assert_eq!(cutout, resized_cutout);
        assert_eq!(mask, resized_mask);
    }

    #[test]
    fn test_zero_target_rejected() {
        let (cutout, mask) = rect_fixture(4, 4);
        for (w, h) in [(0, 4), (4, 0), (0, 0)] {
            let result =
                GeometricNormalizer::resize_pair(&cutout, &mask, w, h, ResizeFilter::Nearest);
            assert!(matches!(result, Err(StageError::InvalidDimension(_))));
        }
    }

    #[test]
    fn test_disagreeing_pair_rejected() {
        let (cutout, _) = rect_fixture(4, 4);
        let mask = ClassMask::new(vec![0; 6], (3, 2)).unwrap();
        let result = GeometricNormalizer::resize_pair(&cutout, &mask, 8, 8, ResizeFilter::Nearest);
        assert!(matches!(result, Err(StageError::ShapeMismatch(_))));
    }

    #[test]
    fn test_nearest_keeps_validity_binary() {
        let (cutout, mask) = rect_fixture(8, 8);
        let (resized_cutout, _) =
            GeometricNormalizer::resize_pair(&cutout, &mask, 4, 4, ResizeFilter::Nearest).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                let alpha = resized_cutout.pixel(x, y)[3];
                assert!(alpha == 0 || alpha == 255);
            }
        }
    }

    #[test]
    fn test_upscale_preserves_interior_coverage() {
        let (cutout, mask) = rect_fixture(8, 8);
        let (resized_cutout, resized_mask) =
            GeometricNormalizer::resize_pair(&cutout, &mask, 32, 32, ResizeFilter::Triangle)
                .unwrap();
        // Deep inside the foreground half both stay fully covered
        assert!(resized_cutout.is_defined(2, 16));
        assert_eq!(resized_cutout.pixel(2, 16)[3], 255);
        assert!(resized_mask.is_foreground(2, 16, 1));
        // Deep inside the undefined half nothing appears
        assert!(!resized_cutout.is_defined(30, 16));
        assert!(!resized_mask.is_foreground(30, 16, 1));
    }
}
