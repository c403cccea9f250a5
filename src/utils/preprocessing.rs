//! Image preprocessing for model inference

use crate::{
    error::{Result, StageError},
    models::PreprocessingConfig,
};
use image::{imageops, DynamicImage};
use ndarray::Array4;

/// Shared image preprocessing utilities
pub struct ImagePreprocessor;

impl ImagePreprocessor {
    /// Convert an image to a normalized NCHW tensor for inference
    ///
    /// The full frame is resized to the model's native input size (no
    /// letterbox padding), so the resulting class map covers the whole
    /// frame and scales back to the source dimensions without offset
    /// bookkeeping.
    ///
    /// # Arguments
    /// * `image` - Input image to preprocess
    /// * `preprocessing_config` - Model preprocessing configuration
    ///
    /// # Returns
    /// * `Ok(tensor)` - Normalized `1x3xHxW` tensor ready for inference
    /// * `Err(StageError)` - On preprocessing errors
    pub fn to_tensor(
        image: &DynamicImage,
        preprocessing_config: &PreprocessingConfig,
    ) -> Result<Array4<f32>> {
        let [target_height, target_width] = preprocessing_config.target_size;
        if target_height == 0 || target_width == 0 {
            return Err(StageError::invalid_config(format!(
                "model input size {}x{} must be positive",
                target_width, target_height
            )));
        }

        let rgb_image = image.to_rgb8();
        let resized = imageops::resize(
            &rgb_image,
            target_width,
            target_height,
            imageops::FilterType::Triangle,
        );

        let height: usize = target_height.try_into().map_err(|_| {
            StageError::invalid_config("model input size too large for tensor allocation")
        })?;
        let width: usize = target_width.try_into().map_err(|_| {
            StageError::invalid_config("model input size too large for tensor allocation")
        })?;

        let mean = preprocessing_config.normalization_mean;
        let std = preprocessing_config.normalization_std;
        let mut tensor = Array4::<f32>::zeros((1, 3, height, width));

        #[allow(clippy::indexing_slicing)]
        // Safe: tensor dimensions pre-allocated to match the resized frame
        for (y, row) in resized.rows().enumerate() {
            for (x, pixel) in row.enumerate() {
                tensor[[0, 0, y, x]] = (f32::from(pixel[0]) / 255.0 - mean[0]) / std[0];
                tensor[[0, 1, y, x]] = (f32::from(pixel[1]) / 255.0 - mean[1]) / std[1];
                tensor[[0, 2, y, x]] = (f32::from(pixel[2]) / 255.0 - mean[2]) / std[2];
            }
        }

        Ok(tensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn config_with_size(size: u32) -> PreprocessingConfig {
        PreprocessingConfig {
            target_size: [size, size],
            normalization_mean: [0.5, 0.5, 0.5],
            normalization_std: [0.5, 0.5, 0.5],
        }
    }

    #[test]
    fn test_tensor_shape_matches_model_input() {
        let image = DynamicImage::new_rgb8(37, 91);
        let tensor = ImagePreprocessor::to_tensor(&image, &config_with_size(64)).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 64, 64]);
    }

    #[test]
    fn test_normalization_values() {
        // Solid white normalizes to (1.0 - 0.5) / 0.5 = 1.0 in all channels
        let mut buffer = RgbImage::new(4, 4);
        for pixel in buffer.pixels_mut() {
            *pixel = Rgb([255, 255, 255]);
        }
        let image = DynamicImage::ImageRgb8(buffer);

        let tensor = ImagePreprocessor::to_tensor(&image, &config_with_size(4)).unwrap();
        for value in &tensor {
            assert!((value - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_black_normalizes_to_negative_one() {
        let image = DynamicImage::new_rgb8(4, 4);
        let tensor = ImagePreprocessor::to_tensor(&image, &config_with_size(4)).unwrap();
        for value in &tensor {
            assert!((value + 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_zero_model_input_rejected() {
        let image = DynamicImage::new_rgb8(4, 4);
        let mut config = config_with_size(4);
        config.target_size = [0, 4];
        assert!(ImagePreprocessor::to_tensor(&image, &config).is_err());
    }
}
