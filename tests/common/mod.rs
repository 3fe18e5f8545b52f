//! Recording fakes for the collaborator traits

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use teloxide::types::{ChatId, MessageId, UserId};
use tempfile::TempDir;

use mcq_solver_bot::answer::{AnswerGenerator, GenerationError};
use mcq_solver_bot::bot::{BotContext, IncomingMessage};
use mcq_solver_bot::dialogue::PendingSubjectPrompts;
use mcq_solver_bot::ocr::TextExtractor;
use mcq_solver_bot::ocr_errors::OcrError;
use mcq_solver_bot::pipeline::{AnswerPipeline, PhotoRequest, PhotoVariant, PipelineSettings};
use mcq_solver_bot::session::InMemorySessionStore;
use mcq_solver_bot::transport::{SendOptions, Transport, TransportError};

pub const CHAT: ChatId = ChatId(1001);
pub const USER: UserId = UserId(42);
pub const PHOTO_MESSAGE: MessageId = MessageId(7);

#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub chat_id: ChatId,
    pub text: String,
    pub options: SendOptions,
    pub id: MessageId,
}

pub struct FakeTransport {
    download: Result<Vec<u8>, String>,
    reject_sends: bool,
    sent: Mutex<Vec<SentMessage>>,
    next_id: AtomicI32,
}

impl FakeTransport {
    pub fn downloading(bytes: &[u8]) -> Self {
        Self {
            download: Ok(bytes.to_vec()),
            reject_sends: false,
            sent: Mutex::new(Vec::new()),
            next_id: AtomicI32::new(500),
        }
    }

    pub fn failing_download(message: &str) -> Self {
        Self {
            download: Err(message.to_string()),
            reject_sends: false,
            sent: Mutex::new(Vec::new()),
            next_id: AtomicI32::new(500),
        }
    }

    /// Downloads succeed but every outgoing message is refused
    pub fn rejecting_sends(bytes: &[u8]) -> Self {
        Self {
            reject_sends: true,
            ..Self::downloading(bytes)
        }
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_sent(&self) -> SentMessage {
        self.sent().last().cloned().expect("no message sent")
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn download_file(&self, _file_id: &str) -> Result<Vec<u8>, TransportError> {
        self.download.clone().map_err(TransportError::Other)
    }

    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        options: SendOptions,
    ) -> Result<MessageId, TransportError> {
        if self.reject_sends {
            return Err(TransportError::Other("Forbidden: bot was blocked by the user".to_string()));
        }
        let id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.sent.lock().unwrap().push(SentMessage {
            chat_id,
            text: text.to_string(),
            options,
            id,
        });
        Ok(id)
    }
}

/// Records each path it is asked to read and whether the file existed then
pub struct FakeExtractor {
    result: Result<String, OcrError>,
    delay: Option<Duration>,
    seen: Mutex<Vec<(PathBuf, bool)>>,
}

impl FakeExtractor {
    pub fn returning(text: &str) -> Self {
        Self {
            result: Ok(text.to_string()),
            delay: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: OcrError) -> Self {
        Self {
            result: Err(error),
            delay: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn slow(text: &str, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::returning(text)
        }
    }

    pub fn seen(&self) -> Vec<(PathBuf, bool)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextExtractor for FakeExtractor {
    async fn extract_text(&self, image_path: &Path) -> Result<String, OcrError> {
        self.seen
            .lock()
            .unwrap()
            .push((image_path.to_path_buf(), image_path.exists()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result.clone()
    }
}

pub struct FakeGenerator {
    result: Result<Option<String>, String>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl FakeGenerator {
    pub fn answering(text: Option<&str>) -> Self {
        Self {
            result: Ok(text.map(str::to_string)),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// (system prompt, questions) pairs received so far
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerGenerator for FakeGenerator {
    async fn generate(
        &self,
        system_prompt: &str,
        questions: &str,
    ) -> Result<Option<String>, GenerationError> {
        self.prompts
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), questions.to_string()));
        self.result.clone().map_err(GenerationError::Api)
    }
}

pub struct Harness {
    pub transport: Arc<FakeTransport>,
    pub extractor: Arc<FakeExtractor>,
    pub generator: Arc<FakeGenerator>,
    pub sessions: Arc<InMemorySessionStore>,
    pub pipeline: Arc<AnswerPipeline>,
    pub temp_dir: TempDir,
}

impl Harness {
    pub fn new(transport: FakeTransport, extractor: FakeExtractor, generator: FakeGenerator) -> Self {
        Self::with_settings(transport, extractor, generator, PipelineSettings::default())
    }

    pub fn with_settings(
        transport: FakeTransport,
        extractor: FakeExtractor,
        generator: FakeGenerator,
        settings: PipelineSettings,
    ) -> Self {
        let transport = Arc::new(transport);
        let extractor = Arc::new(extractor);
        let generator = Arc::new(generator);
        let sessions = Arc::new(InMemorySessionStore::new());
        let temp_dir = tempfile::tempdir().unwrap();

        let pipeline = Arc::new(AnswerPipeline::new(
            transport.clone(),
            extractor.clone(),
            generator.clone(),
            sessions.clone(),
            PipelineSettings {
                temp_dir: Some(temp_dir.path().to_path_buf()),
                ..settings
            },
        ));

        Self {
            transport,
            extractor,
            generator,
            sessions,
            pipeline,
            temp_dir,
        }
    }

    pub fn context(&self, prompts: PendingSubjectPrompts) -> Arc<BotContext> {
        Arc::new(BotContext {
            transport: self.transport.clone(),
            sessions: self.sessions.clone(),
            prompts: Arc::new(prompts),
            pipeline: self.pipeline.clone(),
        })
    }

    /// Files left behind in the staging directory
    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.temp_dir.path()).unwrap().count()
    }
}

pub fn photo_request(user: UserId) -> PhotoRequest {
    PhotoRequest {
        chat_id: CHAT,
        message_id: PHOTO_MESSAGE,
        user_id: user,
        photo: PhotoVariant {
            file_id: "AgACAgIAAxkBAAI".to_string(),
            width: 1280,
            height: 960,
            file_size: 120_000,
        },
    }
}

pub fn photo_message(language_code: Option<&str>) -> IncomingMessage {
    IncomingMessage {
        message_id: PHOTO_MESSAGE,
        language_code: language_code.map(str::to_string),
        text: None,
        photos: vec![PhotoVariant {
            file_id: "AgACAgIAAxkBAAI".to_string(),
            width: 1280,
            height: 960,
            file_size: 120_000,
        }],
        ..text_message("")
    }
}

pub fn text_message(text: &str) -> IncomingMessage {
    IncomingMessage {
        chat_id: CHAT,
        message_id: MessageId(20),
        user_id: Some(USER),
        language_code: None,
        text: Some(text.to_string()),
        reply_to: None,
        photos: Vec::new(),
    }
}

pub fn reply_message(text: &str, reply_to: MessageId) -> IncomingMessage {
    IncomingMessage {
        reply_to: Some(reply_to),
        ..text_message(text)
    }
}
