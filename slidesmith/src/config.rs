use serde::Deserialize;
use std::env;
use std::path::PathBuf;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn env_or(var: &str, default: &str) -> String {
    env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_AIPIPE_BASE_URL: &str = "https://aipipe.org/openai/v1";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-sonnet-20240229";
pub const DEFAULT_ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
pub const DEFAULT_GEMINI_VERSION: &str = "v1beta";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for the whole multipart body, template upload included.
    pub max_upload_bytes: usize,
    /// Directory for uploaded templates and rendered decks.
    pub temp_dir: PathBuf,
}

/// Settings for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionsConfig {
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicConfig {
    pub base_url: String,
    pub model: String,
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    /// Full `generateContent` endpoint. Derived from `version` and `model` when unset.
    pub base_url: Option<String>,
    pub model: String,
    pub version: String,
}

impl GeminiConfig {
    pub fn endpoint(&self) -> String {
        match &self.base_url {
            Some(url) => url.clone(),
            None => format!(
                "https://generativelanguage.googleapis.com/{}/models/{}:generateContent",
                self.version, self.model
            ),
        }
    }
}

/// LLM provider endpoints and generation settings shared by every request.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    pub openai: ChatCompletionsConfig,
    pub aipipe: ChatCompletionsConfig,
    pub anthropic: AnthropicConfig,
    pub gemini: GeminiConfig,
    pub timeout_secs: u64,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openai: ChatCompletionsConfig {
                base_url: env_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
                model: env_or("OPENAI_MODEL", DEFAULT_CHAT_MODEL),
            },
            aipipe: ChatCompletionsConfig {
                base_url: env_or("AIPIPE_BASE_URL", DEFAULT_AIPIPE_BASE_URL),
                model: env_or("AIPIPE_MODEL", DEFAULT_CHAT_MODEL),
            },
            anthropic: AnthropicConfig {
                base_url: env_or("ANTHROPIC_BASE_URL", DEFAULT_ANTHROPIC_BASE_URL),
                model: env_or("ANTHROPIC_MODEL", DEFAULT_ANTHROPIC_MODEL),
                version: env_or("ANTHROPIC_VERSION", DEFAULT_ANTHROPIC_VERSION),
            },
            gemini: GeminiConfig {
                base_url: env::var("GEMINI_BASE_URL")
                    .ok()
                    .filter(|value| !value.trim().is_empty()),
                model: env_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
                version: env_or("GEMINI_VERSION", DEFAULT_GEMINI_VERSION),
            },
            timeout_secs: parse_env_or("LLM_TIMEOUT", 120),
            temperature: parse_env_or("LLM_TEMPERATURE", 0.7),
            max_tokens: parse_env_or("LLM_MAX_TOKENS", 1500),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env_or("SLIDESMITH_HOST", "0.0.0.0"),
                port: parse_env_or("SLIDESMITH_PORT", 5000),
                max_upload_bytes: parse_env_or("SLIDESMITH_MAX_UPLOAD_BYTES", 50 * 1024 * 1024),
                temp_dir: env::var("SLIDESMITH_TEMP_DIR")
                    .ok()
                    .filter(|value| !value.trim().is_empty())
                    .map(PathBuf::from)
                    .unwrap_or_else(env::temp_dir),
            },
            providers: ProvidersConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
