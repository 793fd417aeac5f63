//! Model-backed recommendation oracle.
//!
//! Each attempt is bounded by a timeout. Retryable failures (timeouts, transport
//! errors, 429, 5xx) back off exponentially until attempts run out; everything
//! else, including an unparseable reply, goes straight to the fallback pool.
//! `get_recommendations` never fails.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Config;
use crate::llm_client::{strip_json_fences, LlmError, ModelProvider};
use crate::models::{derive_book_id, BookSummary};
use crate::recommend::fallback::fallback_candidates;
use crate::recommend::prompts::{build_recommendation_prompt, RECOMMENDATION_SYSTEM};
use crate::recommend::RecommendationSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout: Duration::from_secs(15),
            initial_backoff: Duration::from_secs(4),
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.llm_max_attempts,
            attempt_timeout: config.llm_timeout,
            ..Self::default()
        }
    }

    /// Wait before retry number `retry` (1-based): initial × 2^(retry-1), capped.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// A book the user rated highly, as described to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LikedBook {
    pub title: String,
    pub author: String,
    pub rating: i64,
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationCandidate {
    pub id: String,
    pub title: String,
    pub author: String,
    pub explanation: String,
    pub technical_level: Option<String>,
    pub topics: Vec<String>,
}

impl RecommendationCandidate {
    pub fn new(
        title: &str,
        author: &str,
        explanation: &str,
        technical_level: Option<String>,
        topics: Vec<String>,
    ) -> Self {
        Self {
            id: derive_book_id(title, author),
            title: title.to_string(),
            author: author.to_string(),
            explanation: explanation.to_string(),
            technical_level,
            topics,
        }
    }
}

impl From<&RecommendationCandidate> for BookSummary {
    fn from(c: &RecommendationCandidate) -> Self {
        Self {
            id: c.id.clone(),
            title: c.title.clone(),
            author: c.author.clone(),
            description: c.explanation.clone(),
            topics: c.topics.clone(),
            publication_year: None,
            page_count: None,
            average_rating: 0.0,
        }
    }
}

/// Fields are optional so that `null` reads the same as a missing key.
#[derive(Debug, Deserialize)]
struct Suggestion {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    technical_level: Option<String>,
    #[serde(default)]
    topics: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct WrappedSuggestions {
    recommendations: Vec<Suggestion>,
}

/// Models answer with either a bare array or `{"recommendations": [...]}`.
fn parse_suggestions(text: &str) -> anyhow::Result<Vec<Suggestion>> {
    let text = strip_json_fences(text).trim();
    if text.starts_with('{') {
        let wrapped: WrappedSuggestions =
            serde_json::from_str(text).context("model reply is not a recommendations object")?;
        Ok(wrapped.recommendations)
    } else {
        serde_json::from_str(text).context("model reply is not a recommendation array")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleSource {
    Model,
    Fallback,
}

impl From<OracleSource> for RecommendationSource {
    fn from(source: OracleSource) -> Self {
        match source {
            OracleSource::Model => RecommendationSource::Model,
            OracleSource::Fallback => RecommendationSource::Fallback,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OracleRecommendations {
    pub source: OracleSource,
    pub candidates: Vec<RecommendationCandidate>,
}

impl OracleRecommendations {
    fn fallback(n: usize) -> Self {
        Self {
            source: OracleSource::Fallback,
            candidates: fallback_candidates(n),
        }
    }
}

pub struct RecommendationOracle {
    provider: Option<Arc<dyn ModelProvider>>,
    policy: RetryPolicy,
}

impl RecommendationOracle {
    pub fn new(provider: Option<Arc<dyn ModelProvider>>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn get_recommendations(
        &self,
        liked: &[LikedBook],
        recently_viewed: &[String],
        n: usize,
    ) -> OracleRecommendations {
        let Some(provider) = &self.provider else {
            info!("No model provider configured; serving fallback recommendations");
            return OracleRecommendations::fallback(n);
        };

        let prompt = build_recommendation_prompt(liked, recently_viewed, n);
        let text = match self.call_with_retry(provider.as_ref(), &prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Model recommendations unavailable, using fallback: {e}");
                return OracleRecommendations::fallback(n);
            }
        };

        match parse_candidates(&text, n) {
            Ok(candidates) => {
                info!("Model returned {} recommendations", candidates.len());
                OracleRecommendations {
                    source: OracleSource::Model,
                    candidates,
                }
            }
            Err(e) => {
                warn!("Unusable model reply, using fallback: {e:#}");
                OracleRecommendations::fallback(n)
            }
        }
    }

    async fn call_with_retry(
        &self,
        provider: &dyn ModelProvider,
        prompt: &str,
    ) -> Result<String, LlmError> {
        let timeout = self.policy.attempt_timeout;
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let result = tokio::time::timeout(
                timeout,
                provider.generate(RECOMMENDATION_SYSTEM, prompt, timeout),
            )
            .await
            .unwrap_or_else(|_| Err(LlmError::Timeout(timeout)));

            match result {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let wait = self.policy.backoff(attempt);
                    warn!(
                        "Model attempt {attempt}/{max_attempts} failed: {e}; retrying in {wait:?}"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Parses model output into at most `n` candidates with derived ids.
/// Entries without a title or author are skipped, as are repeats.
pub fn parse_candidates(text: &str, n: usize) -> anyhow::Result<Vec<RecommendationCandidate>> {
    let mut seen = HashSet::new();
    let candidates: Vec<RecommendationCandidate> = parse_suggestions(text)?
        .into_iter()
        .filter_map(|s| {
            let title = s.title.unwrap_or_default();
            let author = s.author.unwrap_or_default();
            if title.trim().is_empty() || author.trim().is_empty() {
                return None;
            }
            Some(RecommendationCandidate::new(
                title.trim(),
                author.trim(),
                s.explanation.unwrap_or_default().trim(),
                s.technical_level,
                s.topics.unwrap_or_default(),
            ))
        })
        .filter(|c| seen.insert(c.id.clone()))
        .take(n)
        .collect();

    if candidates.is_empty() {
        anyhow::bail!("model reply contained no usable recommendations");
    }
    Ok(candidates)
}
