//! Error types for product staging operations

use thiserror::Error;

/// Result type alias for product staging operations
pub type Result<T> = std::result::Result<T, StageError>;

/// Comprehensive error types for product staging operations
#[derive(Error, Debug)]
pub enum StageError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image format or codec errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Malformed or undecodable input image
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Dimension mismatches between mask, cutout and canvas
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Non-positive or otherwise unusable resize target
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    /// Model weights missing or corrupt
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Backend inference errors
    #[error("Inference error: {0}")]
    Inference(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StageError {
    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new invalid dimension error
    pub fn invalid_dimension<S: Into<String>>(msg: S) -> Self {
        Self::InvalidDimension(msg.into())
    }

    /// Create a new model unavailable error
    pub fn model_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::ModelUnavailable(msg.into())
    }

    /// Create a new inference error
    pub fn inference<S: Into<String>>(msg: S) -> Self {
        Self::Inference(msg.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a shape mismatch error from expected and actual dimensions
    pub fn shape_mismatch(subject: &str, actual: (u32, u32), expected: (u32, u32)) -> Self {
        Self::ShapeMismatch(format!(
            "{} is {}x{} but {}x{} was required",
            subject, actual.0, actual.1, expected.0, expected.1
        ))
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create model error with troubleshooting context
    pub fn model_error_with_context<P: AsRef<std::path::Path>>(
        operation: &str,
        model_path: P,
        error: &str,
        suggestions: &[&str],
    ) -> Self {
        let path_display = model_path.as_ref().display();
        let suggestion_text = if suggestions.is_empty() {
            String::new()
        } else {
            format!(" Suggestions: {}", suggestions.join(", "))
        };

        Self::ModelUnavailable(format!(
            "Failed to {} model '{}': {}.{}",
            operation, path_display, error, suggestion_text
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_creation() {
        let err = StageError::invalid_input("zero-sized image");
        assert!(matches!(err, StageError::InvalidInput(_)));

        let err = StageError::model_unavailable("weights missing");
        assert!(matches!(err, StageError::ModelUnavailable(_)));
    }

    #[test]
    fn test_error_display() {
        let err = StageError::invalid_config("foreground label out of range");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: foreground label out of range"
        );
    }

    #[test]
    fn test_shape_mismatch_context() {
        let err = StageError::shape_mismatch("mask", (10, 20), (30, 40));
        let message = err.to_string();
        assert!(message.contains("mask"));
        assert!(message.contains("10x20"));
        assert!(message.contains("30x40"));
    }

    #[test]
    fn test_file_io_error_context() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = StageError::file_io_error("read product image", Path::new("/images/a.png"), io_error);
        let message = err.to_string();
        assert!(message.contains("read product image"));
        assert!(message.contains("/images/a.png"));
    }

    #[test]
    fn test_model_error_with_suggestions() {
        let err = StageError::model_error_with_context(
            "load",
            Path::new("/models/missing.onnx"),
            "file not found",
            &["check the model directory", "download the weights"],
        );
        let message = err.to_string();
        assert!(message.contains("load"));
        assert!(message.contains("/models/missing.onnx"));
        assert!(message.contains("Suggestions"));
    }
}
