//! Verdict cache in front of a remote classifier.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::sync::Cache;
use tracing::debug;

use super::{Classification, Classifier, ClassifierError};

/// Default number of cached verdicts.
pub const DEFAULT_CAPACITY: u64 = 10_000;

/// Remembers definitive verdicts per exact text for a while.
///
/// Spam waves repeat the same text, and replies keep quoting the same
/// message, so the remote model is asked once per distinct text. Errors
/// are never cached.
pub struct CachedClassifier {
    inner: Arc<dyn Classifier>,
    cache: Cache<String, Classification>,
}

impl CachedClassifier {
    pub fn new(inner: Arc<dyn Classifier>, ttl: Duration, capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();

        Self { inner, cache }
    }
}

#[async_trait]
impl Classifier for CachedClassifier {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        if let Some(verdict) = self.cache.get(text) {
            debug!("Classifier cache hit ({:?})", verdict);
            return Ok(verdict);
        }

        let verdict = self.inner.classify(text).await?;
        self.cache.insert(text.to_string(), verdict);
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{BrokenClassifier, ScriptedClassifier};
    use super::*;

    #[tokio::test]
    async fn test_repeated_text_hits_cache() {
        let backend = Arc::new(ScriptedClassifier::ad_for(&["join my channel"]));
        let cached = CachedClassifier::new(backend.clone(), Duration::from_secs(60), 100);

        assert_eq!(cached.classify("join my channel").await.unwrap(), Classification::Ad);
        assert_eq!(cached.classify("join my channel").await.unwrap(), Classification::Ad);
        assert_eq!(cached.classify("hello").await.unwrap(), Classification::NotAd);

        assert_eq!(backend.call_count(), 2);
        assert_eq!(cached.name(), "scripted");
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cached = CachedClassifier::new(Arc::new(BrokenClassifier), Duration::from_secs(60), 100);

        assert!(cached.classify("x").await.is_err());
        assert!(cached.classify("x").await.is_err());
        assert_eq!(cached.cache.get("x"), None);
    }
}
