//! # Configuration Module
//!
//! Process configuration read from the environment (a `.env` file is loaded
//! first by `main`).

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::answer::DEFAULT_MODEL;
use crate::dialogue::{DEFAULT_MAX_PENDING, DEFAULT_PROMPT_TTL};
use crate::ocr_config::{OcrConfig, DEFAULT_LANGUAGES};
use crate::pipeline::{
    PipelineSettings, DEFAULT_DOWNLOAD_TIMEOUT, DEFAULT_GENERATION_TIMEOUT, DEFAULT_OCR_TIMEOUT,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Everything the bot needs at startup
#[derive(Clone)]
pub struct BotConfig {
    pub telegram_token: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub model: String,
    pub ocr_languages: String,
    pub download_timeout: Duration,
    pub ocr_timeout: Duration,
    pub generation_timeout: Duration,
    pub subject_prompt_ttl: Duration,
    pub max_pending_prompts: usize,
    pub temp_dir: Option<PathBuf>,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any key lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let telegram_token =
            non_empty("TELEGRAM_BOT_TOKEN").ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;

        let seconds = |name: &'static str, default: Duration| -> Result<Duration, ConfigError> {
            match non_empty(name) {
                Some(value) => parse_positive(name, &value).map(Duration::from_secs),
                None => Ok(default),
            }
        };

        let max_pending_prompts = match non_empty("MAX_PENDING_PROMPTS") {
            Some(value) => parse_positive("MAX_PENDING_PROMPTS", &value)? as usize,
            None => DEFAULT_MAX_PENDING,
        };

        Ok(Self {
            telegram_token,
            openai_api_key: non_empty("OPENAI_API_KEY"),
            openai_base_url: non_empty("OPENAI_BASE_URL"),
            model: non_empty("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            ocr_languages: non_empty("OCR_LANGUAGES").unwrap_or_else(|| DEFAULT_LANGUAGES.to_string()),
            download_timeout: seconds("DOWNLOAD_TIMEOUT_SECS", DEFAULT_DOWNLOAD_TIMEOUT)?,
            ocr_timeout: seconds("OCR_TIMEOUT_SECS", DEFAULT_OCR_TIMEOUT)?,
            generation_timeout: seconds("GENERATION_TIMEOUT_SECS", DEFAULT_GENERATION_TIMEOUT)?,
            subject_prompt_ttl: seconds("SUBJECT_PROMPT_TTL_SECS", DEFAULT_PROMPT_TTL)?,
            max_pending_prompts,
            temp_dir: non_empty("TEMP_DIR").map(PathBuf::from),
        })
    }

    pub fn ocr_config(&self) -> OcrConfig {
        OcrConfig::with_languages(self.ocr_languages.clone())
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            download_timeout: self.download_timeout,
            ocr_timeout: self.ocr_timeout,
            generation_timeout: self.generation_timeout,
            temp_dir: self.temp_dir.clone(),
        }
    }
}

// Credentials stay out of logs
impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("telegram_token", &"<redacted>")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .field("openai_base_url", &self.openai_base_url)
            .field("model", &self.model)
            .field("ocr_languages", &self.ocr_languages)
            .field("download_timeout", &self.download_timeout)
            .field("ocr_timeout", &self.ocr_timeout)
            .field("generation_timeout", &self.generation_timeout)
            .field("subject_prompt_ttl", &self.subject_prompt_ttl)
            .field("max_pending_prompts", &self.max_pending_prompts)
            .field("temp_dir", &self.temp_dir)
            .finish()
    }
}

fn parse_positive(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(ConfigError::InvalidNumber {
            name,
            value: value.to_string(),
        }),
    }
}
