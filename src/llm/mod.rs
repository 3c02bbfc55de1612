//! Language model client.
//!
//! The agent talks to the model through the [`CompletionModel`] trait; the
//! production implementation is [`ChatCompletionsClient`], a non-streaming
//! client for OpenAI-compatible Chat Completions endpoints.
//!
//! # Example
//!
//! ```rust,ignore
//! use query_chat::llm::{ChatCompletionsClient, CompletionRequest, Message};
//!
//! let client = ChatCompletionsClient::new(query_chat::config::load_llm_settings()?);
//! let reply = client
//!     .complete(CompletionRequest::new(vec![Message::user("Hello")], 0.1))
//!     .await?;
//! ```

pub mod chat_completions;
pub mod provider;

pub use chat_completions::ChatCompletionsClient;
pub use provider::Provider;

/// LLM connection and model settings.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// Base URL for the LLM API (e.g., `https://api.openai.com`).
    pub base_url: String,
    /// Optional API key for authentication.
    pub api_key: Option<String>,
    /// Model identifier (e.g., `gpt-4`).
    pub model: String,
    /// Provider type (auto-detected from `base_url`).
    pub provider: Provider,
    /// Azure deployment name (required for Azure `OpenAI`).
    pub deployment_name: Option<String>,
    /// Azure API version.
    pub api_version: Option<String>,
}

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System prompt.
    System,
    /// User message.
    User,
}

/// A message in a completion request.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    /// Role of the message author.
    pub role: MessageRole,
    /// Text content.
    pub content: String,
}

impl Message {
    /// System prompt message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// User message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// One completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Conversation messages.
    pub messages: Vec<Message>,
    /// Sampling temperature.
    pub temperature: f32,
}

impl CompletionRequest {
    #[must_use]
    pub fn new(messages: Vec<Message>, temperature: f32) -> Self {
        Self {
            messages,
            temperature,
        }
    }
}

/// A model that turns a conversation into a single reply.
#[async_trait::async_trait]
pub trait CompletionModel: Send + Sync + std::fmt::Debug {
    /// Return the assistant's reply text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the reply has no content.
    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<String>;
}
