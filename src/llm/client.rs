use super::error::{LlmError, Result};
use super::types::{CompletionRequest, CompletionResponseRaw};
use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::{debug, warn};

/// Something that turns a prompt into raw completion text.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Endpoint, credentials and generation parameters for [`CompletionClient`].
#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// HTTP client for a bearer-authenticated text-completion endpoint.
#[derive(Clone)]
pub struct CompletionClient {
    http_client: Client,
    settings: CompletionSettings,
}

impl CompletionClient {
    pub fn new(settings: CompletionSettings) -> Self {
        Self {
            http_client: Client::new(),
            settings,
        }
    }
}

#[async_trait]
impl CompletionBackend for CompletionClient {
    /// Send one completion request and return the first choice's text.
    ///
    /// Single attempt; transport and status failures are returned, not retried.
    async fn complete(&self, prompt: &str) -> Result<String> {
        let start = std::time::Instant::now();
        let request = CompletionRequest {
            prompt: prompt.to_string(),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            model: self.settings.model.clone(),
        };

        let response = self
            .http_client
            .post(&self.settings.api_url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.settings.api_key))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Completion request failed");
                LlmError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let url = response.url().to_string();
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Completion API error");
            return Err(LlmError::Api(format!("{} for url: {}", status, url)));
        }

        let raw: CompletionResponseRaw = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;
        let text = raw
            .first_text()
            .ok_or_else(|| LlmError::Parse("No completion choices in response".into()))?;

        debug!(
            model = %self.settings.model,
            duration_ms = start.elapsed().as_millis(),
            "Completion received"
        );
        Ok(text)
    }
}
