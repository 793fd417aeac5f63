use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{LlmError, ModelProvider};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Ollama `/api/generate` client for locally hosted Llama models.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    eval_count: Option<u32>,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str) -> Result<Self, LlmError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(LlmError::Http)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }
}

#[async_trait]
impl ModelProvider for OllamaClient {
    async fn generate(
        &self,
        system: &str,
        prompt: &str,
        timeout: Duration,
    ) -> Result<String, LlmError> {
        let body = GenerateRequest {
            model: &self.model,
            system,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(self.endpoint())
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::from_reqwest(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::from_reqwest(e, timeout))?;

        debug!(
            "Ollama call succeeded: model={}, eval_count={:?}",
            self.model, parsed.eval_count
        );

        if parsed.response.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(parsed.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_ignores_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/", "llama3.2").unwrap();
        assert_eq!(client.endpoint(), "http://localhost:11434/api/generate");
    }

    #[test]
    fn test_request_disables_streaming() {
        let body = GenerateRequest {
            model: "llama3.2",
            system: "sys",
            prompt: "hello",
            stream: false,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["stream"], false);
        assert_eq!(value["model"], "llama3.2");
    }

    #[test]
    fn test_response_without_eval_count_parses() {
        let parsed: GenerateResponse =
            serde_json::from_str(r#"{"model":"llama3.2","response":"[]","done":true}"#).unwrap();
        assert_eq!(parsed.response, "[]");
        assert!(parsed.eval_count.is_none());
    }
}
