//! Model weight resolution and preprocessing metadata
//!
//! Weights live in a configurable directory; obtaining them (download,
//! cache population) is an external collaborator's responsibility. This
//! module only resolves and loads what is already on disk.

use crate::error::{Result, StageError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the optional metadata file next to the weights
const PREPROCESSING_FILE: &str = "preprocessing.json";

/// Preprocessing parameters for the segmentation model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    /// Model input size as [height, width]
    pub target_size: [u32; 2],
    /// Per-channel normalization mean (RGB, 0-1 range)
    pub normalization_mean: [f32; 3],
    /// Per-channel normalization std (RGB, 0-1 range)
    pub normalization_std: [f32; 3],
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        // ImageNet statistics, the convention the supported checkpoints follow
        Self {
            target_size: [512, 512],
            normalization_mean: [0.485, 0.456, 0.406],
            normalization_std: [0.229, 0.224, 0.225],
        }
    }
}

/// Resolves and loads segmentation model weights from a directory
///
/// Construction resolves the weight file eagerly so a missing model surfaces
/// as [`StageError::ModelUnavailable`] before any image work starts.
#[derive(Debug, Clone)]
pub struct ModelManager {
    model_path: PathBuf,
    preprocessing: PreprocessingConfig,
}

impl ModelManager {
    /// Resolve the model inside the given directory
    ///
    /// Picks the lexicographically first `.onnx` file so repeated runs bind
    /// to the same weights. An optional `preprocessing.json` beside the
    /// weights overrides the default preprocessing parameters.
    ///
    /// # Errors
    /// Returns [`StageError::ModelUnavailable`] when the directory or a
    /// usable weight file is missing, or when the metadata file is present
    /// but unparseable.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(StageError::model_error_with_context(
                "locate",
                dir,
                "model directory does not exist",
                &["create the directory", "point --models at the weight location"],
            ));
        }

        let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(|e| StageError::file_io_error("read model directory", dir, e))?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("onnx"))
            })
            .collect();
        candidates.sort();

        let model_path = candidates.into_iter().next().ok_or_else(|| {
            StageError::model_error_with_context(
                "locate",
                dir,
                "no .onnx weight file found",
                &["place the segmentation weights in the model directory"],
            )
        })?;

        let preprocessing = Self::load_preprocessing(dir)?;

        log::debug!(
            "Resolved segmentation model '{}' (input {}x{})",
            model_path.display(),
            preprocessing.target_size[1],
            preprocessing.target_size[0]
        );

        Ok(Self {
            model_path,
            preprocessing,
        })
    }

    fn load_preprocessing(dir: &Path) -> Result<PreprocessingConfig> {
        let metadata_path = dir.join(PREPROCESSING_FILE);
        if !metadata_path.is_file() {
            log::debug!(
                "No {} in '{}', using default preprocessing",
                PREPROCESSING_FILE,
                dir.display()
            );
            return Ok(PreprocessingConfig::default());
        }

        let raw = std::fs::read_to_string(&metadata_path)
            .map_err(|e| StageError::file_io_error("read preprocessing metadata", &metadata_path, e))?;
        serde_json::from_str(&raw).map_err(|e| {
            StageError::model_error_with_context(
                "parse metadata for",
                &metadata_path,
                &e.to_string(),
                &["fix or remove preprocessing.json"],
            )
        })
    }

    /// Load the raw weight bytes
    ///
    /// # Errors
    /// Returns [`StageError::ModelUnavailable`] for an unreadable or empty
    /// weight file.
    pub fn load_weights(&self) -> Result<Vec<u8>> {
        let data = std::fs::read(&self.model_path).map_err(|e| {
            StageError::model_error_with_context(
                "read",
                &self.model_path,
                &e.to_string(),
                &["verify file permissions"],
            )
        })?;
        if data.is_empty() {
            return Err(StageError::model_error_with_context(
                "read",
                &self.model_path,
                "weight file is empty",
                &["re-download the weights"],
            ));
        }
        Ok(data)
    }

    /// Preprocessing parameters resolved for this model
    #[must_use]
    pub fn preprocessing_config(&self) -> &PreprocessingConfig {
        &self.preprocessing
    }

    /// Path of the resolved weight file
    #[must_use]
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Display name derived from the weight file stem
    #[must_use]
    pub fn model_name(&self) -> String {
        self.model_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("unknown")
            .to_owned()
    }
}
