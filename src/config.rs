use crate::llm::CompletionSettings;
use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Largest request body accepted by the gateway.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

const DEFAULT_API_URL: &str = "https://api.sambanova.ai/api/v1/completions";
const DEFAULT_MODEL: &str = "sambanova/falcon-7b";
const DEFAULT_MAX_TOKENS: u32 = 1000;
const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub upload_dir: String,
    pub completion: CompletionSettings,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let completion = CompletionSettings {
            api_key: var("SAMBANOVA_API_KEY")
                .filter(|k| !k.is_empty())
                .context("SAMBANOVA_API_KEY must be set")?,
            api_url: var("SAMBANOVA_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            model: var("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: match var("LLM_MAX_TOKENS") {
                Some(v) => v.parse().context("LLM_MAX_TOKENS must be a valid number")?,
                None => DEFAULT_MAX_TOKENS,
            },
            temperature: match var("LLM_TEMPERATURE") {
                Some(v) => v.parse().context("LLM_TEMPERATURE must be a valid number")?,
                None => DEFAULT_TEMPERATURE,
            },
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: var("PORT")
                .unwrap_or_else(|| "5000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            upload_dir: var("UPLOAD_DIR")
                .unwrap_or_else(|| env::temp_dir().to_string_lossy().into_owned()),
            completion,
        })
    }
}
