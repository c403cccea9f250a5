//! Mock segmenters for backend and pipeline testing

use crate::{
    error::{Result, StageError},
    segmentation::{validate_predictor_input, Segmenter},
    types::ClassMask,
};
use image::{DynamicImage, GenericImageView};

/// What a [`MockSegmenter`] answers with
enum MockResponse {
    /// Every pixel gets the same label
    Constant(u8),
    /// A rectangle gets the label, everything else label 0
    Rect {
        label: u8,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    /// Predictor failure
    Fail(String),
}

/// Scriptable segmenter standing in for a real model
pub struct MockSegmenter {
    response: MockResponse,
    /// Number of predict calls served
    pub calls: usize,
}

impl MockSegmenter {
    /// Mask every pixel with the same label
    pub fn constant(label: u8) -> Self {
        Self {
            response: MockResponse::Constant(label),
            calls: 0,
        }
    }

    /// Mask a rectangle with `label`, everything else with 0
    pub fn foreground_rect(label: u8, x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            response: MockResponse::Rect {
                label,
                x,
                y,
                width,
                height,
            },
            calls: 0,
        }
    }

    /// Fail every prediction with an inference error
    pub fn failing<S: Into<String>>(message: S) -> Self {
        Self {
            response: MockResponse::Fail(message.into()),
            calls: 0,
        }
    }
}

impl Segmenter for MockSegmenter {
    fn predict(&mut self, image: &DynamicImage) -> Result<ClassMask> {
        validate_predictor_input(image)?;
        self.calls += 1;

        let (image_width, image_height) = image.dimensions();
        match &self.response {
            MockResponse::Constant(label) => ClassMask::new(
                vec![*label; image_width as usize * image_height as usize],
                (image_width, image_height),
            ),
            MockResponse::Rect {
                label,
                x,
                y,
                width,
                height,
            } => {
                let mut labels = vec![0u8; image_width as usize * image_height as usize];
                for py in *y..(*y + *height).min(image_height) {
                    for px in *x..(*x + *width).min(image_width) {
                        let index = py as usize * image_width as usize + px as usize;
                        if let Some(slot) = labels.get_mut(index) {
                            *slot = *label;
                        }
                    }
                }
                ClassMask::new(labels, (image_width, image_height))
            },
            MockResponse::Fail(message) => Err(StageError::inference(message.clone())),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_mock_labels_everything() {
        let mut segmenter = MockSegmenter::constant(3);
        let mask = segmenter.predict(&DynamicImage::new_rgb8(2, 2)).unwrap();
        assert_eq!(mask.foreground_count(3), 4);
        assert_eq!(segmenter.calls, 1);
    }

    #[test]
    fn test_rect_mock_labels_only_rect() {
        let mut segmenter = MockSegmenter::foreground_rect(1, 1, 1, 2, 1);
        let mask = segmenter.predict(&DynamicImage::new_rgb8(4, 4)).unwrap();
        assert_eq!(mask.foreground_count(1), 2);
        assert!(mask.is_foreground(1, 1, 1));
        assert!(mask.is_foreground(2, 1, 1));
        assert!(!mask.is_foreground(0, 0, 1));
    }

    #[test]
    fn test_failing_mock_reports_inference_error() {
        let mut segmenter = MockSegmenter::failing("synthetic failure");
        let result = segmenter.predict(&DynamicImage::new_rgb8(2, 2));
        assert!(matches!(result, Err(StageError::Inference(_))));
    }
}
