use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

use super::{QuestionRequest, QuestionSource, SourceUnavailable};
use crate::workflows::screening::personalization::DifficultyLevel;

type CacheKey = (String, DifficultyLevel, usize);

/// Time-bounded memo in front of a slower source. Failures are never cached.
pub struct CachedQuestionSource<S> {
    inner: S,
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, (Instant, Vec<String>)>>,
}

impl<S: QuestionSource> CachedQuestionSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn key(request: &QuestionRequest) -> CacheKey {
        (
            request.technology.trim().to_lowercase(),
            request.difficulty,
            request.count,
        )
    }

    fn lookup(&self, key: &CacheKey) -> Option<Vec<String>> {
        let mut entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());
        match entries.get(key) {
            Some((stored_at, questions)) if stored_at.elapsed() < self.ttl => {
                Some(questions.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn store(&self, key: CacheKey, questions: &[String]) {
        let mut entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());
        entries.insert(key, (Instant::now(), questions.to_vec()));
    }
}

#[async_trait]
impl<S: QuestionSource> QuestionSource for CachedQuestionSource<S> {
    fn name(&self) -> &'static str {
        "cached_openai"
    }

    async fn questions(
        &self,
        request: &QuestionRequest,
    ) -> Result<Vec<String>, SourceUnavailable> {
        let key = Self::key(request);
        if let Some(questions) = self.lookup(&key) {
            debug!(technology = %request.technology, "question cache hit");
            return Ok(questions);
        }

        let questions = self.inner.questions(request).await?;
        if !questions.is_empty() {
            self.store(key, &questions);
        }
        Ok(questions)
    }
}
