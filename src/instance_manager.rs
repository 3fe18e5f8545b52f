//! # OCR Instance Manager Module
//!
//! Keeps one Tesseract instance per language set so repeated photo
//! submissions skip the engine initialization cost.

use leptess::LepTess;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

use crate::ocr_config::OcrConfig;
use crate::ocr_errors::OcrError;

/// Shared handle to a pooled Tesseract engine
pub type SharedEngine = Arc<Mutex<LepTess>>;

/// Thread-safe pool of Tesseract instances keyed by language configuration
///
/// Instances are created on first request for a language combination and
/// reused afterwards. Recognition holds the instance lock for the whole
/// `set_image` + `get_utf8_text` sequence, so concurrent photos that share a
/// language set are recognized one after the other.
pub struct OcrInstanceManager {
    instances: Mutex<HashMap<String, SharedEngine>>,
}

impl OcrInstanceManager {
    /// Create an empty instance pool
    pub fn new() -> Self {
        Self {
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Get or create an OCR instance for the given configuration
    ///
    /// # Errors
    ///
    /// Returns [`OcrError::Initialization`] if Tesseract cannot be created for
    /// the configured languages (missing traineddata, invalid codes).
    pub fn get_instance(&self, config: &OcrConfig) -> Result<SharedEngine, OcrError> {
        let key = config.languages.clone();
        let mut instances = self
            .instances
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(instance) = instances.get(&key) {
            return Ok(Arc::clone(instance));
        }

        info!(languages = %key, "Creating new OCR instance");
        let tess = LepTess::new(None, &key)
            .map_err(|e| OcrError::Initialization(format!("Failed to initialize Tesseract: {e}")))?;

        let instance = Arc::new(Mutex::new(tess));
        instances.insert(key, Arc::clone(&instance));
        Ok(instance)
    }

    /// Drop a pooled instance, e.g. after it was found corrupted
    pub fn remove_instance(&self, languages: &str) {
        let mut instances = self
            .instances
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if instances.remove(languages).is_some() {
            info!(languages = %languages, "Removed OCR instance");
        }
    }

    /// Number of cached instances
    pub fn instance_count(&self) -> usize {
        self.instances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for OcrInstanceManager {
    fn default() -> Self {
        Self::new()
    }
}
