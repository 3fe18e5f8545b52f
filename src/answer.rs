//! Answer generation: the language-model collaborator and its prompt.

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

/// Default chat model
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-16k";

/// Answer used when the model returns no content
pub const PLACEHOLDER_ANSWER: &str = "Could not generate an answer.";

/// Errors raised by the answer generation collaborator
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The request could not be built
    #[error("{0}")]
    Request(String),
    /// The API call failed or returned a malformed response
    #[error("{0}")]
    Api(String),
}

/// Produces answer text for a system instruction and the extracted questions.
///
/// `Ok(None)` means the service answered without content.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(
        &self,
        system_prompt: &str,
        questions: &str,
    ) -> Result<Option<String>, GenerationError>;
}

/// System instruction for answering multiple-choice questions
pub fn build_system_prompt(subject: Option<&str>) -> String {
    let mut prompt = String::from("You are an AI that answers multiple-choice questions");
    if let Some(subject) = subject {
        prompt.push_str(", specializing in ");
        prompt.push_str(subject);
    }
    prompt.push_str(
        ". For each question, answer on its own line using the format \
         \"<n>. <A|B|C|D> - <explanation>\", numbering the answers sequentially starting at 1.",
    );
    prompt
}

/// OpenAI chat-completions backed generator
pub struct OpenAiAnswerGenerator {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiAnswerGenerator {
    pub fn new(api_key: Option<&str>, base_url: Option<&str>, model: impl Into<String>) -> Self {
        let mut config = OpenAIConfig::new();
        if let Some(api_key) = api_key {
            config = config.with_api_key(api_key);
        }
        if let Some(base_url) = base_url {
            config = config.with_api_base(base_url);
        }

        Self {
            client: Client::with_config(config),
            model: model.into(),
        }
    }
}

#[async_trait]
impl AnswerGenerator for OpenAiAnswerGenerator {
    async fn generate(
        &self,
        system_prompt: &str,
        questions: &str,
    ) -> Result<Option<String>, GenerationError> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()
                .map_err(|e| GenerationError::Request(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(questions)
                .build()
                .map_err(|e| GenerationError::Request(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .messages(messages)
            .build()
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        debug!(model = %self.model, "Sending chat completion request");
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| GenerationError::Api(e.to_string()))?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content))
    }
}
