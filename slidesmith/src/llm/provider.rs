use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};

use crate::config::ProvidersConfig;
use crate::error::{Result, SlidesmithError};

/// Supported outline providers.
///
/// Each variant owns its wire adapter: endpoint, authentication, request
/// envelope and the path to the generated text in the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAi,
    Anthropic,
    Gemini,
    /// OpenAI-compatible gateway.
    AiPipe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathSegment {
    Key(&'static str),
    Index(usize),
}

use PathSegment::{Index, Key};

const CHAT_COMPLETIONS_PATH: &[PathSegment] =
    &[Key("choices"), Index(0), Key("message"), Key("content")];
const ANTHROPIC_PATH: &[PathSegment] = &[Key("content"), Index(0), Key("text")];
const GEMINI_PATH: &[PathSegment] = &[
    Key("candidates"),
    Index(0),
    Key("content"),
    Key("parts"),
    Index(0),
    Key("text"),
];

/// A fully prepared provider call, independent of the HTTP client.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub query: Vec<(&'static str, String)>,
    pub body: Value,
}

impl Provider {
    pub const ALL: [Provider; 4] = [
        Provider::OpenAi,
        Provider::Anthropic,
        Provider::Gemini,
        Provider::AiPipe,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Gemini => "gemini",
            Provider::AiPipe => "aipipe",
        }
    }

    pub fn build_request(
        &self,
        config: &ProvidersConfig,
        api_key: &str,
        prompt: &str,
    ) -> ProviderRequest {
        match self {
            Provider::OpenAi | Provider::AiPipe => {
                let endpoint = if *self == Provider::OpenAi {
                    &config.openai
                } else {
                    &config.aipipe
                };

                ProviderRequest {
                    url: format!(
                        "{}/chat/completions",
                        endpoint.base_url.trim_end_matches('/')
                    ),
                    headers: vec![("Authorization", format!("Bearer {api_key}"))],
                    query: Vec::new(),
                    body: json!({
                        "model": endpoint.model,
                        "messages": [{"role": "user", "content": prompt}],
                        "temperature": config.temperature,
                        "max_tokens": config.max_tokens,
                    }),
                }
            }
            Provider::Anthropic => ProviderRequest {
                url: format!(
                    "{}/messages",
                    config.anthropic.base_url.trim_end_matches('/')
                ),
                headers: vec![
                    ("x-api-key", api_key.to_string()),
                    ("anthropic-version", config.anthropic.version.clone()),
                ],
                query: Vec::new(),
                body: json!({
                    "model": config.anthropic.model,
                    "max_tokens": config.max_tokens,
                    "messages": [{"role": "user", "content": prompt}],
                }),
            },
            Provider::Gemini => ProviderRequest {
                url: config.gemini.endpoint(),
                headers: Vec::new(),
                query: vec![("key", api_key.to_string())],
                body: json!({
                    "contents": [{"parts": [{"text": prompt}]}],
                }),
            },
        }
    }

    /// Pull the generated text out of a provider response body.
    pub fn extract_text(&self, response: &Value) -> Result<String> {
        let path = self.response_path();

        path.iter()
            .try_fold(response, |value, segment| match segment {
                Key(key) => value.get(*key),
                Index(index) => value.get(*index),
            })
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                SlidesmithError::Provider(format!(
                    "{} response did not contain text at {}",
                    self,
                    describe_path(path)
                ))
            })
    }

    fn response_path(&self) -> &'static [PathSegment] {
        match self {
            Provider::OpenAi | Provider::AiPipe => CHAT_COMPLETIONS_PATH,
            Provider::Anthropic => ANTHROPIC_PATH,
            Provider::Gemini => GEMINI_PATH,
        }
    }
}

fn describe_path(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in path {
        match segment {
            Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            Index(index) => out.push_str(&format!("[{index}]")),
        }
    }
    out
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = SlidesmithError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            "gemini" => Ok(Provider::Gemini),
            "aipipe" => Ok(Provider::AiPipe),
            _ => Err(SlidesmithError::UnsupportedProvider(s.to_string())),
        }
    }
}
