//! # OCR Error Types Module
//!
//! Error types raised by the text extraction collaborator. Each variant
//! carries a human-readable message that ends up in the user-facing
//! `Error: ...` reply when extraction fails.

use thiserror::Error;

/// Custom error types for OCR operations
#[derive(Debug, Clone, Error)]
pub enum OcrError {
    /// File validation errors (size, format)
    #[error("Validation error: {0}")]
    Validation(String),
    /// OCR engine initialization errors
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// Image loading errors
    #[error("Image load error: {0}")]
    ImageLoad(String),
    /// Text extraction errors
    #[error("Extraction error: {0}")]
    Extraction(String),
    /// A pooled engine instance was left unusable by a panicking holder
    #[error("Instance corruption error: {0}")]
    InstanceCorruption(String),
}
