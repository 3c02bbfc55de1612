use crate::llm::provider::DEFAULT_AZURE_API_VERSION;
use crate::llm::{LlmSettings, Provider};
use clap::{Parser, Subcommand};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;

/// Prefix of environment variables read by [`AppConfig::load`]
/// (e.g. `QUERY_CHAT_SERVER__PORT=8000`).
pub const ENV_PREFIX: &str = "QUERY_CHAT";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Disable timeout middleware
    #[arg(long, env = "TIMEOUT_DISABLED")]
    pub timeout_disabled: Option<bool>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// What the binary should do.
#[derive(Subcommand, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server (default)
    #[default]
    Serve,
    /// Create the demo tables and sample rows
    Seed,
    /// Drop every table in the database
    Reset,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub agent: AgentConfig,
    pub resilience: ResilienceConfig,
    pub logging: LoggingConfig,
    pub ui: UiConfig,
    /// Subcommand selected on the command line.
    #[serde(skip)]
    pub command: Command,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Directory served under `/static`.
    pub static_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    /// Sampling temperature for every model call the agent makes.
    pub temperature: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResilienceConfig {
    pub timeout_disabled: bool,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UiConfig {
    pub title: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    /// Priority: CLI flag > CLI env var > `QUERY_CHAT_*` env > config file > defaults.
    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("server.port", 5001)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.static_dir", "static")?
            .set_default("database.url", "sqlite://data/query-chat.db")?
            .set_default("database.max_connections", 5)?
            .set_default("agent.temperature", 0.1)?
            .set_default("resilience.timeout_disabled", false)?
            .set_default("resilience.request_timeout_secs", 60)?
            .set_default("logging.json", false)?
            .set_default("ui.title", "SQL Chat Assistant")?;

        // Explicit file must exist; ./config.{yaml,toml,json} is optional.
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(url) = &cli.database_url {
            builder = builder.set_override("database.url", url.as_str())?;
        }
        if let Some(td) = cli.timeout_disabled {
            builder = builder.set_override("resilience.timeout_disabled", td)?;
        }

        let mut cfg: Self = builder.build()?.try_deserialize()?;
        cfg.command = cli.command.unwrap_or_default();
        Ok(cfg)
    }
}

fn non_blank_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

/// Load model settings from `LLM_*` environment variables.
///
/// Defaults to `OpenAI`'s API with `gpt-4`; `OPENAI_API_KEY` is accepted when
/// `LLM_API_KEY` is unset.
pub fn load_llm_settings() -> Result<LlmSettings, String> {
    let base_url = env::var("LLM_BASE_URL").unwrap_or_else(|_| "https://api.openai.com".to_string());
    if base_url.trim().is_empty() {
        return Err("LLM_BASE_URL cannot be empty".to_string());
    }

    let model = env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4".to_string());
    if model.trim().is_empty() {
        return Err("LLM_MODEL cannot be empty".to_string());
    }

    let api_key = non_blank_env("LLM_API_KEY").or_else(|| non_blank_env("OPENAI_API_KEY"));

    let deployment_name = non_blank_env("AZURE_DEPLOYMENT_NAME");
    let api_version = non_blank_env("AZURE_API_VERSION");

    let mut provider = Provider::detect_from_url(&base_url);
    if let Provider::AzureOpenAI { .. } = provider {
        let Some(deployment) = &deployment_name else {
            return Err("AZURE_DEPLOYMENT_NAME is required for Azure OpenAI".to_string());
        };
        provider = Provider::AzureOpenAI {
            deployment_name: deployment.clone(),
            api_version: api_version
                .clone()
                .unwrap_or_else(|| DEFAULT_AZURE_API_VERSION.to_string()),
        };
    }

    Ok(LlmSettings {
        base_url,
        api_key,
        model,
        provider,
        deployment_name,
        api_version,
    })
}
