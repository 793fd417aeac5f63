//! LLM client: the single point of entry for hosted-model calls.
//!
//! Each provider makes exactly one attempt per `generate` call. Retry, backoff
//! and fallback policy belong to the caller (see `recommend::oracle`).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{Config, LlmProviderKind};

pub mod gemini;
pub mod ollama;
pub mod prompts;

pub use gemini::GeminiClient;
pub use ollama::OllamaClient;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("model call timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// Classifies a reqwest failure, keeping timeouts distinct from other transport errors.
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            LlmError::Timeout(timeout)
        } else {
            LlmError::Http(err)
        }
    }

    /// Timeouts, transport failures, 429 and 5xx are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Timeout(_) | LlmError::Http(_) => true,
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::EmptyContent => false,
        }
    }
}

/// A hosted language model: given a prompt, return text or fail.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn generate(
        &self,
        system: &str,
        prompt: &str,
        timeout: Duration,
    ) -> Result<String, LlmError>;
}

/// Builds the configured provider. `None` means no usable credential is configured,
/// in which case callers serve fallback content without any remote call.
pub fn build_provider(config: &Config) -> anyhow::Result<Option<Arc<dyn ModelProvider>>> {
    match config.llm_provider {
        LlmProviderKind::None => {
            info!("LLM provider disabled");
            Ok(None)
        }
        LlmProviderKind::Ollama => {
            let client: Arc<dyn ModelProvider> =
                Arc::new(OllamaClient::new(&config.ollama_url, &config.ollama_model)?);
            info!(
                "LLM provider: ollama at {} (model: {})",
                config.ollama_url, config.ollama_model
            );
            Ok(Some(client))
        }
        LlmProviderKind::Gemini => match &config.google_api_key {
            Some(key) => {
                let client: Arc<dyn ModelProvider> =
                    Arc::new(GeminiClient::new(key.clone(), &config.gemini_model)?);
                info!("LLM provider: gemini (model: {})", config.gemini_model);
                Ok(Some(client))
            }
            None => {
                warn!("GOOGLE_API_KEY is not set; LLM recommendations will use the fallback list");
                Ok(None)
            }
        },
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
