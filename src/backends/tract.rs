//! Tract backend for the segmentation boundary
//!
//! Runs the segmentation model with Tract, a pure Rust neural network
//! inference library with no external dependencies. The graph is loaded
//! once at construction; the resulting handle is what the pipeline carries
//! around, so model lifetime stays explicit and fakeable.

use crate::{
    error::{Result, StageError},
    models::{ModelManager, PreprocessingConfig},
    segmentation::{validate_predictor_input, Segmenter},
    types::ClassMask,
    utils::ImagePreprocessor,
};
use image::{DynamicImage, GenericImageView};
use ndarray::Array3;
use tract_onnx::prelude::*;

/// Type alias for the complex Tract model type to reduce complexity warnings
type TractModel = RunnableModel<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

// Use instant crate for cross-platform time compatibility
use instant::Instant;

/// Segmentation backend running ONNX graphs through Tract
pub struct TractSegmenter {
    model: TractModel,
    preprocessing: PreprocessingConfig,
    name: String,
}

impl TractSegmenter {
    /// Load the model resolved by a [`ModelManager`]
    ///
    /// # Errors
    /// Returns [`StageError::ModelUnavailable`] when the weights cannot be
    /// read or do not decode into a runnable graph.
    pub fn from_model_manager(manager: &ModelManager) -> Result<Self> {
        let load_start = Instant::now();
        let model_data = manager.load_weights()?;
        let name = manager.model_name();

        log::info!("Initializing Tract segmentation backend");
        log::info!("Model: {} ({} bytes)", name, model_data.len());

        let model = onnx()
            .model_for_read(&mut std::io::Cursor::new(model_data))
            .map_err(|e| {
                StageError::model_unavailable(format!("Failed to load ONNX model '{name}': {e}"))
            })?
            .into_optimized()
            .map_err(|e| {
                StageError::model_unavailable(format!("Failed to optimize model '{name}': {e}"))
            })?
            .into_runnable()
            .map_err(|e| {
                StageError::model_unavailable(format!(
                    "Failed to create runnable model '{name}': {e}"
                ))
            })?;

        log::info!(
            "Tract backend initialized in {:.2}ms",
            load_start.elapsed().as_millis()
        );

        Ok(Self {
            model,
            preprocessing: manager.preprocessing_config().clone(),
            name,
        })
    }

    /// Preprocessing parameters this backend runs with
    #[must_use]
    pub fn preprocessing_config(&self) -> &PreprocessingConfig {
        &self.preprocessing
    }
}

impl Segmenter for TractSegmenter {
    fn predict(&mut self, image: &DynamicImage) -> Result<ClassMask> {
        validate_predictor_input(image)?;
        let (width, height) = image.dimensions();

        let input = ImagePreprocessor::to_tensor(image, &self.preprocessing)?;

        log::debug!("Running Tract inference");
        log::debug!("  - Input tensor: {:?}", input.shape());

        let inference_start = Instant::now();

        // Convert ndarray to Tract tensor
        let input_tensor = Tensor::from(input);

        // Run inference
        let outputs = self
            .model
            .run(tvec![input_tensor.into()])
            .map_err(|e| StageError::inference(format!("Tract inference failed: {e}")))?;

        // Extract the class score tensor
        let output_tensor = outputs
            .into_iter()
            .next()
            .ok_or_else(|| StageError::inference("No output tensor found"))?
            .into_arc_tensor();

        let scores = output_tensor
            .to_array_view::<f32>()
            .map_err(|e| StageError::inference(format!("Failed to convert output tensor: {e}")))?;

        let scores = scores
            .into_dimensionality::<tract_ndarray::Ix4>()
            .map_err(|e| {
                StageError::inference(format!("Expected 1xCxHxW output tensor: {e}"))
            })?;
        let (batch, classes, mask_height, mask_width) = scores.dim();
        if batch != 1 {
            return Err(StageError::inference(format!(
                "Expected batch size 1 in output tensor, got {batch}"
            )));
        }

        // Copy into (class, height, width) layout for the arg-max
        let class_scores = Array3::from_shape_fn((classes, mask_height, mask_width), |(c, y, x)| {
            scores[[0, c, y, x]]
        });

        let mask = ClassMask::from_class_scores(class_scores.view())?;

        let inference_time = inference_start.elapsed();
        log::debug!(
            "Tract inference completed in {:.2}ms",
            inference_time.as_millis()
        );

        // Bring the labels back to the input frame; nearest keeps them crisp
        mask.resized(width, height)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
