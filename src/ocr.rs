//! Text extraction from question photos.
//!
//! [`TextExtractor`] is the narrow contract the answer pipeline consumes;
//! [`TesseractExtractor`] implements it on top of `leptess`.

use async_trait::async_trait;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::{Arc, PoisonError};
use tracing::{debug, info, warn};

use crate::instance_manager::OcrInstanceManager;
use crate::ocr_config::OcrConfig;
use crate::ocr_errors::OcrError;

/// Turns an image on disk into recognized text.
///
/// Empty or garbled output is a valid result; only engine or file failures
/// are errors.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, image_path: &Path) -> Result<String, OcrError>;
}

/// Tesseract-backed extractor with pooled engine instances
pub struct TesseractExtractor {
    config: OcrConfig,
    instances: Arc<OcrInstanceManager>,
}

impl TesseractExtractor {
    pub fn new(config: OcrConfig, instances: Arc<OcrInstanceManager>) -> Self {
        Self { config, instances }
    }
}

#[async_trait]
impl TextExtractor for TesseractExtractor {
    async fn extract_text(&self, image_path: &Path) -> Result<String, OcrError> {
        info!(image_path = %image_path.display(), "Starting OCR text extraction");

        validate_image(image_path, &self.config)?;

        let engine = self.instances.get_instance(&self.config)?;
        let path = image_path.to_string_lossy().to_string();
        let languages = self.config.languages.clone();

        let raw = tokio::task::spawn_blocking(move || {
            let mut tess = engine.lock().map_err(|e: PoisonError<_>| {
                OcrError::InstanceCorruption(format!("OCR instance lock poisoned: {e}"))
            })?;
            tess.set_image(path.as_str())
                .map_err(|e| OcrError::ImageLoad(format!("Failed to load image for OCR: {e}")))?;
            tess.get_utf8_text()
                .map_err(|e| OcrError::Extraction(format!("Failed to extract text from image: {e}")))
        })
        .await
        .map_err(|e| OcrError::Extraction(format!("OCR task aborted: {e}")))?;

        let text = match raw {
            Ok(text) => text,
            Err(e @ OcrError::InstanceCorruption(_)) => {
                warn!(languages = %languages, error = %e, "Discarding corrupted OCR instance");
                self.instances.remove_instance(&languages);
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let cleaned = normalize_text(&text);
        info!(chars_extracted = cleaned.len(), "OCR extraction completed");
        Ok(cleaned)
    }
}

/// Trim every line and drop blank ones
pub fn normalize_text(raw: &str) -> String {
    raw.trim()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Check size limits and magic bytes before handing a file to Tesseract
pub fn validate_image(image_path: &Path, config: &OcrConfig) -> Result<(), OcrError> {
    let metadata = std::fs::metadata(image_path).map_err(|e| {
        OcrError::Validation(format!("Cannot read image file {}: {e}", image_path.display()))
    })?;

    if metadata.len() > config.max_file_size {
        return Err(OcrError::Validation(format!(
            "Image is too large ({} bytes, limit {} bytes)",
            metadata.len(),
            config.max_file_size
        )));
    }

    if !is_supported_image_format(image_path, config) {
        return Err(OcrError::Validation(
            "Unsupported image format (expected PNG, JPEG, BMP or TIFF)".to_string(),
        ));
    }

    Ok(())
}

/// Validate if an image file is supported for OCR processing using `image::guess_format`
pub fn is_supported_image_format(file_path: &Path, config: &OcrConfig) -> bool {
    let file = match File::open(file_path) {
        Ok(file) => file,
        Err(e) => {
            debug!(file_path = %file_path.display(), error = %e, "Could not open image file for format detection");
            return false;
        }
    };

    let mut reader = BufReader::new(file);
    let mut buffer = vec![0; config.buffer_size];

    match reader.read(&mut buffer) {
        Ok(bytes_read) if bytes_read >= config.min_format_bytes => {
            buffer.truncate(bytes_read);
            match image::guess_format(&buffer) {
                Ok(format) => {
                    // Tesseract supports: PNG, JPEG/JPG, BMP, TIFF
                    let supported = matches!(
                        format,
                        image::ImageFormat::Png
                            | image::ImageFormat::Jpeg
                            | image::ImageFormat::Bmp
                            | image::ImageFormat::Tiff
                    );
                    debug!(format = ?format, supported, "Detected image format");
                    supported
                }
                Err(e) => {
                    debug!(file_path = %file_path.display(), error = %e, "Could not determine image format");
                    false
                }
            }
        }
        Ok(bytes_read) => {
            debug!(bytes_read, "Not enough bytes to determine image format");
            false
        }
        Err(e) => {
            debug!(file_path = %file_path.display(), error = %e, "Error reading image file for format detection");
            false
        }
    }
}
