//! Per-pixel merge of a normalized cutout onto a background canvas

use crate::{
    error::{Result, StageError},
    types::{ClassMask, Cutout},
};
use image::{Rgb, RgbImage};

/// Merges a normalized cutout onto a canvas under its co-resized mask
pub struct Compositor;

impl Compositor {
    /// Composite the cutout onto the canvas in place
    ///
    /// Cutout and mask must already be normalized to the canvas's
    /// dimensions. For every position the mask labels background, the
    /// canvas pixel is overwritten with the cutout pixel where the cutout
    /// carries coverage; positions the mask labels foreground keep the
    /// canvas's own pixel. Undefined cutout positions are never written, so
    /// an entirely undefined cutout pastes nothing and the canvas survives
    /// unchanged.
    ///
    /// The canvas's dimensions never change.
    ///
    /// # Errors
    /// Returns [`StageError::ShapeMismatch`] when cutout or mask dimensions
    /// differ from the canvas's.
    pub fn composite(
        canvas: &mut RgbImage,
        cutout: &Cutout,
        mask: &ClassMask,
        foreground_label: u8,
    ) -> Result<()> {
        let canvas_dims = canvas.dimensions();
        if cutout.dimensions() != canvas_dims {
            return Err(StageError::shape_mismatch(
                "cutout",
                cutout.dimensions(),
                canvas_dims,
            ));
        }
        if mask.dimensions() != canvas_dims {
            return Err(StageError::shape_mismatch(
                "mask",
                mask.dimensions(),
                canvas_dims,
            ));
        }

        let (width, height) = canvas_dims;
        let mut written = 0usize;
        for y in 0..height {
            for x in 0..width {
                if mask.is_foreground(x, y, foreground_label) {
                    continue;
                }
                let pixel = cutout.pixel(x, y);
                if pixel[3] > 0 {
                    canvas.put_pixel(x, y, Rgb([pixel[0], pixel[1], pixel[2]]));
                    written += 1;
                }
            }
        }

        tracing::trace!(written, width, height, "composited cutout onto canvas");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn solid_canvas(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
        let mut canvas = RgbImage::new(width, height);
        for pixel in canvas.pixels_mut() {
            *pixel = Rgb(color);
        }
        canvas
    }

    fn covered_cutout(width: u32, height: u32, color: [u8; 3]) -> Cutout {
        let mut pixels = RgbaImage::new(width, height);
        for pixel in pixels.pixels_mut() {
            *pixel = Rgba([color[0], color[1], color[2], 255]);
        }
        Cutout::new(pixels)
    }

    #[test]
    fn test_background_positions_take_covered_cutout_pixels() {
        let mut canvas = solid_canvas(2, 2, [0, 0, 255]);
        let cutout = covered_cutout(2, 2, [255, 0, 0]);
        // Left column foreground, right column background
        let mask = ClassMask::new(vec![1, 0, 1, 0], (2, 2)).unwrap();

        Compositor::composite(&mut canvas, &cutout, &mask, 1).unwrap();

        // Foreground-labeled positions keep the canvas's own pixel
        assert_eq!(canvas.get_pixel(0, 0).0, [0, 0, 255]);
        assert_eq!(canvas.get_pixel(0, 1).0, [0, 0, 255]);
        // Background-labeled positions take the covered cutout pixel
        assert_eq!(canvas.get_pixel(1, 0).0, [255, 0, 0]);
        assert_eq!(canvas.get_pixel(1, 1).0, [255, 0, 0]);
    }

    #[test]
    fn test_all_foreground_mask_leaves_canvas_unchanged() {
        let mut canvas = solid_canvas(3, 3, [10, 20, 30]);
        let reference = canvas.clone();
        let cutout = covered_cutout(3, 3, [255, 255, 255]);
        let mask = ClassMask::new(vec![1; 9], (3, 3)).unwrap();

        Compositor::composite(&mut canvas, &cutout, &mask, 1).unwrap();
        assert_eq!(canvas, reference);
    }

    #[test]
    fn test_undefined_cutout_is_noop_paste() {
        let mut canvas = solid_canvas(3, 3, [40, 50, 60]);
        let reference = canvas.clone();
        // Entirely undefined cutout from an all-background mask
        let cutout = Cutout::new(RgbaImage::new(3, 3));
        let mask = ClassMask::new(vec![0; 9], (3, 3)).unwrap();

        Compositor::composite(&mut canvas, &cutout, &mask, 1).unwrap();
        assert_eq!(canvas, reference);
    }

    #[test]
    fn test_dimensions_never_change() {
        let mut canvas = solid_canvas(5, 7, [1, 2, 3]);
        let cutout = covered_cutout(5, 7, [9, 9, 9]);
        let mask = ClassMask::new(vec![0; 35], (5, 7)).unwrap();

        Compositor::composite(&mut canvas, &cutout, &mask, 1).unwrap();
        assert_eq!(canvas.dimensions(), (5, 7));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let mut canvas = solid_canvas(4, 4, [0, 0, 0]);
        let mask = ClassMask::new(vec![0; 16], (4, 4)).unwrap();

        let small_cutout = covered_cutout(3, 3, [1, 1, 1]);
        assert!(matches!(
            Compositor::composite(&mut canvas, &small_cutout, &mask, 1),
            Err(StageError::ShapeMismatch(_))
        ));

        let cutout = covered_cutout(4, 4, [1, 1, 1]);
        let small_mask = ClassMask::new(vec![0; 9], (3, 3)).unwrap();
        assert!(matches!(
            Compositor::composite(&mut canvas, &cutout, &small_mask, 1),
            Err(StageError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_one_by_one_degenerate_canvas() {
        let mut canvas = solid_canvas(1, 1, [120, 130, 140]);
        let cutout = Cutout::new(RgbaImage::new(1, 1));
        let mask = ClassMask::new(vec![0], (1, 1)).unwrap();

        Compositor::composite(&mut canvas, &cutout, &mask, 1).unwrap();
        assert_eq!(canvas.get_pixel(0, 0).0, [120, 130, 140]);
    }
}
