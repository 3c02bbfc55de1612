//! Provider detection.
//!
//! OpenAI-compatible services differ in endpoint layout and authentication;
//! everything else about a completion request is shared.

/// Default Azure `OpenAI` API version.
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-08-01-preview";

/// Supported LLM providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    /// `OpenAI` (api.openai.com)
    OpenAI,
    /// Azure `OpenAI` Service
    AzureOpenAI {
        /// Deployment that serves the model.
        deployment_name: String,
        /// API version query parameter.
        api_version: String,
    },
    /// `OpenRouter` (openrouter.ai)
    OpenRouter,
    /// Together AI (together.ai, together.xyz)
    TogetherAI,
    /// Groq (groq.com)
    Groq,
    /// Any other OpenAI-compatible server (local runtimes, proxies).
    Generic,
}

impl Provider {
    /// Guess the provider from the API host.
    ///
    /// ```rust,ignore
    /// assert_eq!(Provider::detect_from_url("https://api.groq.com"), Provider::Groq);
    /// ```
    #[must_use]
    pub fn detect_from_url(base_url: &str) -> Self {
        let host = base_url.to_lowercase();
        let has = |needle: &str| host.contains(needle);

        if has("azure.com") {
            Self::AzureOpenAI {
                deployment_name: String::new(),
                api_version: DEFAULT_AZURE_API_VERSION.to_string(),
            }
        } else if has("openrouter.ai") {
            Self::OpenRouter
        } else if has("together.ai") || has("together.xyz") {
            Self::TogetherAI
        } else if has("groq.com") {
            Self::Groq
        } else if has("openai.com") {
            Self::OpenAI
        } else {
            Self::Generic
        }
    }

    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::AzureOpenAI { .. } => "azure-openai",
            Self::OpenRouter => "openrouter",
            Self::TogetherAI => "together",
            Self::Groq => "groq",
            Self::Generic => "generic",
        }
    }

    /// Whether requests authenticate with an `api-key` header instead of a
    /// bearer token.
    #[must_use]
    pub fn uses_api_key_header(&self) -> bool {
        matches!(self, Self::AzureOpenAI { .. })
    }

    /// Chat completions URL under `base_url`. Azure routes by deployment, the
    /// others by the model named in the body.
    #[must_use]
    pub fn build_chat_url(&self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');

        match self {
            Self::AzureOpenAI {
                deployment_name,
                api_version,
            } => format!(
                "{base}/openai/deployments/{deployment_name}/chat/completions?api-version={api_version}"
            ),
            _ => format!("{base}/v1/chat/completions"),
        }
    }
}
