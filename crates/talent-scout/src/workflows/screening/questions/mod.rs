//! Technical question providers and the fallback chain that ties them together.
//!
//! Providers are tried in order. A provider that cannot answer signals
//! [`SourceUnavailable`]; the chain logs it, bumps the fallback counter, and moves on.
//! The static table sits last and always answers for the built-in configuration.

mod cache;
mod fallback;
mod openai;

pub use cache::CachedQuestionSource;
pub use fallback::StaticQuestionTable;
pub use openai::{parse_questions, OpenAiQuestionSource};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::personalization::DifficultyLevel;
use crate::config::QuestionServiceConfig;

/// What a question source is asked to produce.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionRequest {
    pub technology: String,
    pub experience_years: u32,
    pub difficulty: DifficultyLevel,
    pub count: usize,
}

/// Uniform failure signal for question providers; never shown to the candidate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceUnavailable {
    #[error("question generation timed out after {0:?}")]
    Timeout(Duration),
    #[error("question provider transport failed: {0}")]
    Transport(String),
    #[error("question provider returned HTTP {0}")]
    Status(u16),
    #[error("question provider response contained no usable questions")]
    EmptyResponse,
    #[error("no questions configured for '{0}'")]
    NotConfigured(String),
}

#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Short identifier used in logs and metrics.
    fn name(&self) -> &'static str;

    async fn questions(&self, request: &QuestionRequest)
        -> Result<Vec<String>, SourceUnavailable>;
}

/// Every provider in the chain failed; the session cannot continue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no question source produced questions for '{technology}'")]
pub struct QuestionsExhausted {
    pub technology: String,
}

/// Ordered provider list with silent fallback.
#[derive(Clone)]
pub struct QuestionChain {
    providers: Vec<Arc<dyn QuestionSource>>,
}

impl QuestionChain {
    pub fn new(providers: Vec<Arc<dyn QuestionSource>>) -> Self {
        Self { providers }
    }

    /// Chain backed by the built-in static table only.
    pub fn offline() -> Self {
        Self::new(vec![Arc::new(StaticQuestionTable::standard())])
    }

    /// AI provider (cached when a TTL is set) first when available, static table last.
    pub fn from_config(config: &QuestionServiceConfig) -> Self {
        let mut providers: Vec<Arc<dyn QuestionSource>> = Vec::new();

        let api_key = config.api_key.as_deref().filter(|_| config.ai_available());
        if let Some(api_key) = api_key {
            match OpenAiQuestionSource::new(
                api_key,
                &config.base_url,
                &config.model,
                config.timeout,
            ) {
                Ok(source) => {
                    info!(endpoint = source.endpoint(), "AI question source enabled");
                    if config.cache_ttl.is_zero() {
                        providers.push(Arc::new(source));
                    } else {
                        providers.push(Arc::new(CachedQuestionSource::new(
                            source,
                            config.cache_ttl,
                        )));
                    }
                }
                Err(err) => warn!(error = %err, "AI question source disabled: client build failed"),
            }
        }

        providers.push(Arc::new(StaticQuestionTable::standard()));
        Self::new(providers)
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|provider| provider.name()).collect()
    }

    pub async fn questions(
        &self,
        request: &QuestionRequest,
    ) -> Result<Vec<String>, QuestionsExhausted> {
        for provider in &self.providers {
            let outcome = match provider.questions(request).await {
                Ok(questions) if questions.is_empty() => Err(SourceUnavailable::EmptyResponse),
                other => other,
            };

            match outcome {
                Ok(mut questions) => {
                    questions.truncate(request.count.max(1));
                    debug!(
                        source = provider.name(),
                        technology = %request.technology,
                        count = questions.len(),
                        "questions ready"
                    );
                    return Ok(questions);
                }
                Err(err) => {
                    warn!(
                        source = provider.name(),
                        technology = %request.technology,
                        error = %err,
                        "question source unavailable, falling back"
                    );
                    metrics::counter!(
                        "screening_question_fallbacks_total",
                        "source" => provider.name()
                    )
                    .increment(1);
                }
            }
        }

        Err(QuestionsExhausted {
            technology: request.technology.clone(),
        })
    }
}

impl std::fmt::Debug for QuestionChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestionChain")
            .field("providers", &self.provider_names())
            .finish()
    }
}
