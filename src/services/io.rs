//! Image I/O operations service
//!
//! Separates file I/O from the compositing stages, keeping those stages
//! testable on in-memory buffers.

use crate::error::{Result, StageError};
use image::DynamicImage;
use std::path::{Path, PathBuf};

/// Service for handling image file input/output operations
pub struct ImageIoService;

impl ImageIoService {
    /// Load an image from a file path
    ///
    /// Tries extension-based format detection first and falls back to
    /// content-based detection, so a mislabeled extension still decodes.
    ///
    /// # Errors
    /// - [`StageError::Io`] when the file is missing or unreadable
    /// - [`StageError::InvalidInput`] when the data does not decode
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(StageError::file_io_error(
                "read image file",
                path_ref,
                std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
            ));
        }

        match image::open(path_ref) {
            Ok(img) => Ok(img),
            Err(e) => {
                log::debug!(
                    "Extension-based loading failed for {}: {}. Attempting content-based detection.",
                    path_ref.display(),
                    e
                );

                let data = std::fs::read(path_ref).map_err(|io_err| {
                    StageError::file_io_error("read image data", path_ref, io_err)
                })?;

                image::load_from_memory(&data).map_err(|content_err| {
                    StageError::invalid_input(format!(
                        "Failed to decode image '{}' ({} bytes): extension error: {}; content error: {}",
                        path_ref.display(),
                        data.len(),
                        e,
                        content_err
                    ))
                })
            },
        }
    }

    /// Save an image in the format implied by the path's extension
    ///
    /// JPEG output honors the given quality; every other format uses the
    /// codec defaults. Parent directories are created as needed.
    ///
    /// # Errors
    /// - [`StageError::Image`] for an extension no encoder covers
    /// - [`StageError::Io`] on write failures
    pub fn save_image<P: AsRef<Path>>(
        image: &DynamicImage,
        path: P,
        jpeg_quality: u8,
    ) -> Result<()> {
        let path_ref = path.as_ref();

        if let Some(parent) = path_ref.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StageError::file_io_error("create output directory", parent, e)
                })?;
            }
        }

        let format = image::ImageFormat::from_path(path_ref)?;
        if format == image::ImageFormat::Jpeg {
            let file = std::fs::File::create(path_ref)
                .map_err(|e| StageError::file_io_error("create output file", path_ref, e))?;
            let mut encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(file, jpeg_quality);
            encoder.encode_image(&image.to_rgb8())?;
        } else {
            image.save_with_format(path_ref, format)?;
        }

        Ok(())
    }

    /// Check if a file path has a supported image extension
    pub fn is_supported_format<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| {
                matches!(
                    extension.to_lowercase().as_str(),
                    "jpg" | "jpeg" | "png" | "webp" | "tiff" | "tif"
                )
            })
    }

    /// List supported images directly inside a directory, sorted by path
    ///
    /// Sorting keeps enumeration (and therefore run output) deterministic.
    /// Subdirectories are not descended into.
    ///
    /// # Errors
    /// Returns [`StageError::Io`] when the directory cannot be read.
    pub fn list_images<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let dir_ref = dir.as_ref();
        let entries = std::fs::read_dir(dir_ref)
            .map_err(|e| StageError::file_io_error("read image directory", dir_ref, e))?;

        let mut images: Vec<PathBuf> = entries
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && Self::is_supported_format(path))
            .collect();
        images.sort();

        Ok(images)
    }
}
