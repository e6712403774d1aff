use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::{
    config::ProvidersConfig,
    error::{Result, SlidesmithError},
    llm::{
        parse::parse_outline,
        prompts::outline_prompt,
        provider::{Provider, ProviderRequest},
    },
    models::Outline,
};

/// HTTP client that turns text into an [`Outline`] with a single provider call.
///
/// Calls are never retried: provider failures surface to the caller as-is.
#[derive(Debug, Clone)]
pub struct OutlineClient {
    client: Client,
    config: Arc<ProvidersConfig>,
}

impl OutlineClient {
    pub fn new(config: &ProvidersConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SlidesmithError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config: Arc::new(config.clone()),
        })
    }

    pub async fn fetch_outline(
        &self,
        text: &str,
        guidance: Option<&str>,
        api_key: &str,
        provider: Provider,
    ) -> Result<Outline> {
        let prompt = outline_prompt(text, guidance);
        let content = self.complete(provider, api_key, &prompt).await?;
        let outline = parse_outline(&content)?;

        debug!(
            provider = %provider,
            slides = outline.slides.len(),
            "Outline received"
        );

        Ok(outline)
    }

    /// Send one prompt to `provider` and return the generated text.
    pub async fn complete(&self, provider: Provider, api_key: &str, prompt: &str) -> Result<String> {
        let ProviderRequest {
            url,
            headers,
            query,
            body,
        } = provider.build_request(&self.config, api_key, prompt);

        debug!(provider = %provider, endpoint = %url, "Sending outline request");

        let mut request = self.client.post(&url).json(&body);
        for (name, value) in &headers {
            request = request.header(*name, value);
        }
        if !query.is_empty() {
            request = request.query(&query);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SlidesmithError::Provider(format!("{provider} request timed out: {e}"))
            } else {
                SlidesmithError::Provider(format!("{provider} request failed: {e}"))
            }
        })?;

        let status = response.status();
        debug!(provider = %provider, status = %status, "Provider responded");

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            return Err(map_http_error(provider, status, &url, &error_body));
        }

        let payload: Value = response.json().await.map_err(|e| {
            SlidesmithError::Provider(format!("Failed to decode {provider} response: {e}"))
        })?;

        provider.extract_text(&payload)
    }
}

fn map_http_error(provider: Provider, status: StatusCode, url: &str, error_body: &str) -> SlidesmithError {
    match (provider, status) {
        (Provider::Gemini, StatusCode::NOT_FOUND) => SlidesmithError::Provider(format!(
            "Gemini API returned 404 Not Found. Endpoint tried: {url}?key=<redacted>. \
             This usually means your API key is valid, but the Gemini API is not enabled \
             for your Google Cloud project, or the model/version/endpoint is incorrect. \
             Please check your Google Cloud Console and API settings."
        )),
        (_, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => SlidesmithError::Provider(format!(
            "{provider} authentication failed ({status}): {error_body}"
        )),
        (_, StatusCode::TOO_MANY_REQUESTS) => SlidesmithError::Provider(format!(
            "{provider} rate limit exceeded ({status}): {error_body}"
        )),
        _ => SlidesmithError::Provider(format!("{provider} API error ({status}): {error_body}")),
    }
}
