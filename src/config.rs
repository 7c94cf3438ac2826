use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_OLLAMA_BASE_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_MODEL: &str = "llama3-8b-8192";
const DEFAULT_SERVER_PORT: u16 = 5000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the DocDigest server and CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Chat-completion backend used for summarization.
    pub llm_provider: LlmProvider,
    /// API key sent as a bearer token to OpenAI-compatible providers.
    pub llm_api_key: Option<String>,
    /// Base URL of the provider API.
    pub llm_base_url: String,
    /// Model identifier passed with every completion request.
    pub llm_model: String,
    /// Sampling temperature for both summarization phases.
    pub llm_temperature: f32,
    /// Output-token ceiling for each per-chunk call.
    pub llm_chunk_max_tokens: u32,
    /// Output-token ceiling for the final combination call.
    pub llm_combine_max_tokens: u32,
    /// Per-call HTTP timeout in seconds.
    pub llm_timeout_secs: u64,
    /// Shape of the completion the prompts ask for.
    pub llm_response_format: ResponseFormat,
    /// Maximum number of characters per chunk sent to the model.
    pub chunk_max_chars: usize,
    /// Tesseract executable used for OCR.
    pub tesseract_cmd: String,
    /// Tesseract language pack.
    pub tesseract_lang: String,
    /// HTTP server port.
    pub server_port: u16,
    /// Origin allowed by CORS on the API routes; `None` allows any origin.
    pub cors_allowed_origin: Option<String>,
    /// Upper bound on the size of an upload request body.
    pub max_upload_bytes: usize,
}

/// Supported chat-completion backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Any OpenAI-compatible `/chat/completions` API (Groq, OpenAI, vLLM, ...).
    OpenAI,
    /// Local Ollama runtime.
    Ollama,
}

/// How the model is asked to lay out its answer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// `Summary:` / `Improvement Suggestions:` text markers.
    #[default]
    Markers,
    /// JSON object with `summary` and `suggestions` fields.
    Json,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let llm_provider = match load_env_optional("LLM_PROVIDER") {
            Some(value) => value
                .parse()
                .map_err(|()| ConfigError::InvalidValue("LLM_PROVIDER".into()))?,
            None => LlmProvider::OpenAI,
        };
        let llm_api_key = load_env_optional("LLM_API_KEY");
        if llm_provider == LlmProvider::OpenAI && llm_api_key.is_none() {
            return Err(ConfigError::MissingVariable("LLM_API_KEY".into()));
        }
        let llm_base_url = load_env_optional("LLM_BASE_URL").unwrap_or_else(|| {
            match llm_provider {
                LlmProvider::OpenAI => DEFAULT_OPENAI_BASE_URL,
                LlmProvider::Ollama => DEFAULT_OLLAMA_BASE_URL,
            }
            .to_string()
        });
        let llm_response_format = match load_env_optional("LLM_RESPONSE_FORMAT") {
            Some(value) => value
                .parse()
                .map_err(|()| ConfigError::InvalidValue("LLM_RESPONSE_FORMAT".into()))?,
            None => ResponseFormat::Markers,
        };
        let chunk_max_chars = parse_optional("CHUNK_MAX_CHARS")?.unwrap_or(8000);
        if chunk_max_chars == 0 {
            return Err(ConfigError::InvalidValue("CHUNK_MAX_CHARS".into()));
        }

        Ok(Self {
            llm_provider,
            llm_api_key,
            llm_base_url,
            llm_model: load_env_optional("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
            llm_temperature: parse_optional("LLM_TEMPERATURE")?.unwrap_or(0.5),
            llm_chunk_max_tokens: parse_optional("LLM_CHUNK_MAX_TOKENS")?.unwrap_or(800),
            llm_combine_max_tokens: parse_optional("LLM_COMBINE_MAX_TOKENS")?.unwrap_or(1000),
            llm_timeout_secs: parse_optional("LLM_TIMEOUT_SECS")?.unwrap_or(120),
            llm_response_format,
            chunk_max_chars,
            tesseract_cmd: load_env_optional("TESSERACT_CMD")
                .unwrap_or_else(|| "tesseract".into()),
            tesseract_lang: load_env_optional("TESSERACT_LANG").unwrap_or_else(|| "eng".into()),
            server_port: parse_optional("SERVER_PORT")?.unwrap_or(DEFAULT_SERVER_PORT),
            cors_allowed_origin: load_env_optional("CORS_ALLOWED_ORIGIN"),
            max_upload_bytes: parse_optional("MAX_UPLOAD_BYTES")?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        })
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

impl std::str::FromStr for LlmProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "groq" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            _ => Err(()),
        }
    }
}

impl std::str::FromStr for ResponseFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "markers" | "text" => Ok(Self::Markers),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        provider = ?config.llm_provider,
        base_url = %config.llm_base_url,
        model = %config.llm_model,
        response_format = ?config.llm_response_format,
        chunk_max_chars = config.chunk_max_chars,
        server_port = config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
