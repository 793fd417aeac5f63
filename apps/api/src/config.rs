use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::recommend::Engine;

/// Application configuration loaded from environment variables.
/// Every value has a default so a bare checkout runs against a local SQLite file.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    pub recommendation_log_path: String,
    pub recommendation_engine: Engine,
    pub llm_provider: LlmProviderKind,
    pub ollama_url: String,
    pub ollama_model: String,
    pub google_api_key: Option<String>,
    pub gemini_model: String,
    pub llm_timeout: Duration,
    pub llm_max_attempts: u32,
}

/// Which hosted model answers oracle prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProviderKind {
    Ollama,
    Gemini,
    None,
}

impl FromStr for LlmProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" | "llama" => Ok(Self::Ollama),
            "gemini" | "google" => Ok(Self::Gemini),
            "none" | "off" | "" => Ok(Self::None),
            other => Err(anyhow::anyhow!(
                "unknown LLM provider '{other}' (expected ollama, gemini or none)"
            )),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: env_or("DATABASE_URL", "sqlite://books.db"),
            port: env_or("PORT", "8000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            recommendation_log_path: env_or("RECOMMENDATION_LOG_PATH", "logs/recommendations.txt"),
            recommendation_engine: env_or("RECOMMENDATION_ENGINE", "topics")
                .parse()
                .context("RECOMMENDATION_ENGINE must be 'topics' or 'llm'")?,
            llm_provider: env_or("LLM_PROVIDER", "ollama").parse()?,
            ollama_url: env_or("OLLAMA_URL", "http://localhost:11434"),
            ollama_model: env_or("OLLAMA_MODEL", "llama3.2"),
            google_api_key: optional_env("GOOGLE_API_KEY"),
            gemini_model: env_or("GEMINI_MODEL", "gemini-1.5-flash"),
            llm_timeout: Duration::from_secs(
                env_or("LLM_TIMEOUT_SECS", "15")
                    .parse::<u64>()
                    .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            llm_max_attempts: env_or("LLM_MAX_ATTEMPTS", "3")
                .parse::<u32>()
                .context("LLM_MAX_ATTEMPTS must be a positive integer")?
                .max(1),
        })
    }
}

#[cfg(test)]
impl Config {
    /// Defaults with no model provider, for tests that build state by hand.
    pub fn for_tests() -> Self {
        Config {
            database_url: "sqlite::memory:".to_string(),
            port: 8000,
            rust_log: "info".to_string(),
            recommendation_log_path: "logs/recommendations.txt".to_string(),
            recommendation_engine: Engine::Topics,
            llm_provider: LlmProviderKind::None,
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.2".to_string(),
            google_api_key: None,
            gemini_model: "gemini-1.5-flash".to_string(),
            llm_timeout: Duration::from_secs(15),
            llm_max_attempts: 3,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Treats unset and blank variables the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_parses_aliases() {
        assert_eq!("Ollama".parse::<LlmProviderKind>().unwrap(), LlmProviderKind::Ollama);
        assert_eq!("google".parse::<LlmProviderKind>().unwrap(), LlmProviderKind::Gemini);
        assert_eq!("off".parse::<LlmProviderKind>().unwrap(), LlmProviderKind::None);
    }

    #[test]
    fn test_provider_kind_rejects_unknown() {
        let err = "openai".parse::<LlmProviderKind>().unwrap_err();
        assert!(err.to_string().contains("openai"));
    }
}
