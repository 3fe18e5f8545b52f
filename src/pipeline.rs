//! Photo-to-answer pipeline.
//!
//! A photo runs through fetch → stage → extract → generate → record → reply.
//! The stamped record is stored only after the reply is delivered.
//! Each stage returns a `Result` and the first failure short-circuits into a
//! single `Error: <message>` reply threaded to the photo. The staged image is
//! owned by a `NamedTempFile`, so it is removed on every exit path.

use std::fmt;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use teloxide::types::{ChatId, MessageId, PhotoSize, UserId};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::answer::{build_system_prompt, AnswerGenerator, GenerationError, PLACEHOLDER_ANSWER};
use crate::bot::ui_builder::{format_answer_reply, format_error_reply};
use crate::ocr::TextExtractor;
use crate::ocr_errors::OcrError;
use crate::session::{AnswerRecord, SessionStore};
use crate::transport::{SendOptions, Transport, TransportError};

pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_OCR_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(90);

/// One resolution variant of a received photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoVariant {
    pub file_id: String,
    pub width: u32,
    pub height: u32,
    pub file_size: u32,
}

impl From<&PhotoSize> for PhotoVariant {
    fn from(size: &PhotoSize) -> Self {
        Self {
            file_id: size.file.id.0.clone(),
            width: size.width,
            height: size.height,
            file_size: size.file.size,
        }
    }
}

/// Pick the variant with the most pixels, then the largest file; later variants win ties
pub fn select_largest(variants: &[PhotoVariant]) -> Option<&PhotoVariant> {
    variants
        .iter()
        .max_by_key(|v| (u64::from(v.width) * u64::from(v.height), v.file_size))
}

/// A photo submission to answer
#[derive(Debug, Clone)]
pub struct PhotoRequest {
    pub chat_id: ChatId,
    /// The photo message; replies are threaded to it
    pub message_id: MessageId,
    pub user_id: UserId,
    pub photo: PhotoVariant,
}

/// External call guarded by a timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Download,
    Extraction,
    Generation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Download => write!(f, "Download"),
            Stage::Extraction => write!(f, "Text extraction"),
            Stage::Generation => write!(f, "Answer generation"),
        }
    }
}

/// Failure of any pipeline stage; displays the underlying message as-is
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Download(TransportError),
    #[error("Failed to store image: {0}")]
    Staging(#[source] std::io::Error),
    #[error(transparent)]
    Extraction(#[from] OcrError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Reply(TransportError),
    #[error("{stage} timed out after {secs}s")]
    Timeout { stage: Stage, secs: u64 },
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub download_timeout: Duration,
    pub ocr_timeout: Duration,
    pub generation_timeout: Duration,
    /// Directory for staged images; the system temp dir when unset
    pub temp_dir: Option<PathBuf>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            ocr_timeout: DEFAULT_OCR_TIMEOUT,
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
            temp_dir: None,
        }
    }
}

pub struct AnswerPipeline {
    transport: Arc<dyn Transport>,
    extractor: Arc<dyn TextExtractor>,
    generator: Arc<dyn AnswerGenerator>,
    sessions: Arc<dyn SessionStore>,
    settings: PipelineSettings,
}

impl AnswerPipeline {
    pub fn new(
        transport: Arc<dyn Transport>,
        extractor: Arc<dyn TextExtractor>,
        generator: Arc<dyn AnswerGenerator>,
        sessions: Arc<dyn SessionStore>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            transport,
            extractor,
            generator,
            sessions,
            settings,
        }
    }

    /// Run the pipeline and report a failure to the user.
    ///
    /// Only a failure to deliver the error reply itself is returned.
    pub async fn handle(&self, request: &PhotoRequest) -> Result<(), TransportError> {
        info!(user_id = request.user_id.0, "Received photo from user");

        let error = match self.run(request).await {
            Ok(answer) => {
                info!(user_id = request.user_id.0, answer_len = answer.len(), "Answers sent");
                return Ok(());
            }
            Err(error) => error,
        };

        error!(user_id = request.user_id.0, error = %error, "Error processing photo");
        let reply = format_error_reply(&error.to_string());
        self.transport
            .send_text(request.chat_id, &reply, SendOptions::reply_to(request.message_id))
            .await?;
        Ok(())
    }

    /// Answer the photo, returning the recorded answer text
    pub async fn run(&self, request: &PhotoRequest) -> Result<String, PipelineError> {
        let bytes = self.fetch(request).await?;
        let staged = self.stage(request, &bytes)?;
        let staged_path = staged.path().to_path_buf();

        let outcome = self.answer_staged(request, &staged_path).await;

        match staged.close() {
            Ok(()) => debug!(temp_path = %staged_path.display(), "Temporary file cleaned up"),
            Err(e) => {
                warn!(temp_path = %staged_path.display(), error = %e, "Failed to clean up temporary file")
            }
        }

        outcome
    }

    async fn fetch(&self, request: &PhotoRequest) -> Result<Vec<u8>, PipelineError> {
        debug!(user_id = request.user_id.0, file_id = %request.photo.file_id, "Fetching photo");
        let bytes = with_timeout(
            Stage::Download,
            self.settings.download_timeout,
            self.transport.download_file(&request.photo.file_id),
        )
        .await?
        .map_err(PipelineError::Download)?;
        debug!(user_id = request.user_id.0, bytes = bytes.len(), "Photo downloaded");
        Ok(bytes)
    }

    /// Write the image to a temp file unique to this user and invocation
    fn stage(&self, request: &PhotoRequest, bytes: &[u8]) -> Result<NamedTempFile, PipelineError> {
        let prefix = format!("mcq-{}-", request.user_id.0);
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix).suffix(".img");

        let mut file = match &self.settings.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(PipelineError::Staging)?;

        file.write_all(bytes).map_err(PipelineError::Staging)?;
        file.flush().map_err(PipelineError::Staging)?;
        debug!(temp_path = %file.path().display(), "Image saved");
        Ok(file)
    }

    async fn answer_staged(
        &self,
        request: &PhotoRequest,
        image_path: &Path,
    ) -> Result<String, PipelineError> {
        let questions = with_timeout(
            Stage::Extraction,
            self.settings.ocr_timeout,
            self.extractor.extract_text(image_path),
        )
        .await??;
        debug!(user_id = request.user_id.0, chars = questions.len(), "Extracted question text");

        let subject = self.sessions.subject(request.user_id);
        let system_prompt = build_system_prompt(subject.as_deref());
        let generated = with_timeout(
            Stage::Generation,
            self.settings.generation_timeout,
            self.generator.generate(&system_prompt, &questions),
        )
        .await??;

        let answer = match generated {
            Some(text) if !text.trim().is_empty() => text,
            _ => {
                warn!(user_id = request.user_id.0, "Model returned no content, using placeholder");
                PLACEHOLDER_ANSWER.to_string()
            }
        };

        let record = AnswerRecord::now(answer.clone());

        let reply = format_answer_reply(subject.as_deref(), &answer);
        self.transport
            .send_text(request.chat_id, &reply, SendOptions::reply_to(request.message_id))
            .await
            .map_err(PipelineError::Reply)?;

        // Stored only once the reply is delivered
        self.sessions.append_history(request.user_id, record);

        Ok(answer)
    }
}

async fn with_timeout<T>(
    stage: Stage,
    limit: Duration,
    future: impl Future<Output = T>,
) -> Result<T, PipelineError> {
    tokio::time::timeout(limit, future)
        .await
        .map_err(|_| PipelineError::Timeout {
            stage,
            secs: limit.as_secs(),
        })
}
