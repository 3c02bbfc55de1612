//! `OpenAI` Chat Completions client.
//!
//! Implements [`CompletionModel`] with single, non-streaming requests to
//! `/v1/chat/completions` (or the Azure deployment route).

use anyhow::Context;

use super::{CompletionModel, CompletionRequest, LlmSettings};

/// Non-streaming client for the Chat Completions API.
#[derive(Clone)]
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    settings: LlmSettings,
    url: String,
}

impl std::fmt::Debug for ChatCompletionsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsClient")
            .field("url", &self.url)
            .field("model", &self.settings.model)
            .field("provider", &self.settings.provider.name())
            .finish()
    }
}

impl ChatCompletionsClient {
    /// Create a client with the given settings.
    #[must_use]
    pub fn new(settings: LlmSettings) -> Self {
        Self::with_client(settings, reqwest::Client::new())
    }

    /// Create a client with a custom reqwest client.
    #[must_use]
    pub fn with_client(settings: LlmSettings, http: reqwest::Client) -> Self {
        let url = settings.provider.build_chat_url(&settings.base_url);
        Self {
            http,
            settings,
            url,
        }
    }

    /// Endpoint this client posts to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl CompletionModel for ChatCompletionsClient {
    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<String> {
        let body = serde_json::json!({
            "model": self.settings.model,
            "stream": false,
            "temperature": req.temperature,
            "messages": req.messages,
        });

        tracing::debug!(
            url = %self.url,
            model = %self.settings.model,
            message_count = req.messages.len(),
            "Requesting chat completion"
        );

        let mut rb = self.http.post(&self.url).json(&body);
        if let Some(key) = &self.settings.api_key {
            rb = if self.settings.provider.uses_api_key_header() {
                rb.header("api-key", key)
            } else {
                rb.bearer_auth(key)
            };
        }

        let resp = rb.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            anyhow::bail!("chat completion failed with status {status}: {detail}");
        }

        let v: serde_json::Value = resp.json().await?;
        let content = v["choices"][0]["message"]["content"]
            .as_str()
            .context("chat completion response has no message content")?;

        tracing::debug!(content_length = content.len(), "Chat completion received");
        Ok(content.to_string())
    }
}
