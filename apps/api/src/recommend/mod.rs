//! Recommendation engine: topic scoring, selection, the model-backed oracle and
//! the append-only recommendation log.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod fallback;
pub mod handlers;
pub mod log;
pub mod oracle;
pub mod prompts;
pub mod scoring;
pub mod selector;
pub mod service;

/// Which ranking path a recommendation request takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// Local topic-affinity scoring over the catalog.
    Topics,
    /// Ask the configured model, falling back to local scoring.
    Llm,
}

impl FromStr for Engine {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "topics" | "topic" => Ok(Engine::Topics),
            "llm" | "model" => Ok(Engine::Llm),
            other => Err(anyhow::anyhow!(
                "unknown recommendation engine {other:?} (expected \"topics\" or \"llm\")"
            )),
        }
    }
}

/// Where a set of recommendations came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationSource {
    Popularity,
    Topics,
    Model,
    Fallback,
}

impl fmt::Display for RecommendationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecommendationSource::Popularity => "popularity",
            RecommendationSource::Topics => "topics",
            RecommendationSource::Model => "model",
            RecommendationSource::Fallback => "fallback",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_parses_aliases_case_insensitively() {
        assert_eq!("Topics".parse::<Engine>().unwrap(), Engine::Topics);
        assert_eq!(" LLM ".parse::<Engine>().unwrap(), Engine::Llm);
        assert_eq!("model".parse::<Engine>().unwrap(), Engine::Llm);
        assert!("embeddings".parse::<Engine>().is_err());
    }

    #[test]
    fn test_source_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(RecommendationSource::Fallback).unwrap(),
            "fallback"
        );
        assert_eq!(RecommendationSource::Popularity.to_string(), "popularity");
    }
}
