//! Semantic ad classification.
//!
//! A `Classifier` is one remote backend answering `AD` / `NOT_AD`. The
//! `ClassifierGateway` wraps whichever backend was configured, applies the
//! per-call timeout and is the only place where a failed call is turned
//! into a verdict: any error counts as "not an ad" (fail-open).

mod cached;
mod gemini;
mod openai;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

pub use cached::CachedClassifier;
pub use gemini::GeminiClassifier;
pub use openai::OpenAiClassifier;

use crate::config::{AiProvider, Config};
use crate::utils::{mask_token, preview};

/// Output cap for the remote model; the answer is a single token.
pub const MAX_OUTPUT_TOKENS: u32 = 5;

/// Moderation instruction sent with every classification request.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You moderate a Telegram group and your only job is to spot advertisements.
Be strict: only call something an advertisement when it shows at least one of these traits:
1. Clear intent to promote, sell or market a product or service.
2. Calls to action luring members into private chats, links, purchases or campaigns.
3. Long marketing copy unrelated to the ongoing conversation.
4. Repeated, near-identical promotional content.
Normal chat, technical discussion, everyday sharing and casual recommendations without strong commercial intent are NOT advertisements.
Answer with exactly one of these two tokens and nothing else:
- "AD" if you are sure it is an advertisement
- "NOT_AD" if it is normal conversation or you are unsure"#;

/// Definitive answer from a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Ad,
    NotAd,
}

/// Why a backend produced no definitive answer.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed response: {0:?}")]
    Malformed(String),

    #[error("empty response")]
    Empty,
}

/// A remote ad classifier backend.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Backend label used in logs and moderation reasons.
    fn name(&self) -> &str;

    /// Classify `text`.
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError>;
}

/// Parse the model's raw answer.
///
/// Surrounding whitespace and letter case are ignored; anything other than
/// exactly `AD` or `NOT_AD` is malformed.
pub fn parse_verdict(raw: &str) -> Result<Classification, ClassifierError> {
    let answer = raw.trim().to_ascii_uppercase();
    match answer.as_str() {
        "AD" => Ok(Classification::Ad),
        "NOT_AD" => Ok(Classification::NotAd),
        "" => Err(ClassifierError::Empty),
        _ => Err(ClassifierError::Malformed(raw.to_string())),
    }
}

/// Timeout + fail-open wrapper around the configured backend.
#[derive(Clone)]
pub struct ClassifierGateway {
    backend: Arc<dyn Classifier>,
    timeout: Duration,
}

impl ClassifierGateway {
    pub fn new(backend: Arc<dyn Classifier>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    /// Name of the backing provider.
    pub fn provider(&self) -> &str {
        self.backend.name()
    }

    /// Run the backend under the timeout, keeping the failure explicit.
    pub async fn check(&self, text: &str) -> Result<Classification, ClassifierError> {
        match tokio::time::timeout(self.timeout, self.backend.classify(text)).await {
            Ok(result) => result,
            Err(_) => Err(ClassifierError::Timeout(self.timeout)),
        }
    }

    /// Whether `text` is an ad. Unavailable backends answer `false`.
    pub async fn is_ad(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }

        match self.check(text).await {
            Ok(verdict) => {
                debug!(
                    provider = self.provider(),
                    ?verdict,
                    "Classified '{}'",
                    preview(text, 50)
                );
                verdict == Classification::Ad
            }
            Err(e) => {
                warn!(
                    provider = self.provider(),
                    error = %e,
                    "Classifier unavailable, treating '{}' as not an ad",
                    preview(text, 50)
                );
                false
            }
        }
    }
}

/// Build the gateway described by `config`.
///
/// Returns `None` when the semantic check is disabled or cannot run
/// (missing API key); the bot then moderates lexically only.
pub fn from_config(config: &Config) -> Option<ClassifierGateway> {
    if !config.enable_llm_check {
        info!("Semantic check disabled (ENABLE_LLM_CHECK=false)");
        return None;
    }

    let system_prompt = config
        .classifier_system_prompt
        .clone()
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

    let backend: Arc<dyn Classifier> = match &config.ai_provider {
        AiProvider::OpenAi => {
            let Some(api_key) = config.openai_api_key.clone() else {
                warn!("Disabling semantic check: OPENAI_API_KEY is not set");
                return None;
            };
            info!(
                model = %config.openai_model,
                base_url = %config.openai_base_url,
                api_key = %mask_token(&api_key),
                "OpenAI-compatible classifier configured"
            );
            Arc::new(OpenAiClassifier::new(
                api_key,
                config.openai_base_url.clone(),
                config.openai_model.clone(),
                system_prompt,
            ))
        }
        AiProvider::Gemini => {
            let Some(api_key) = config.gemini_api_key.clone() else {
                warn!("Disabling semantic check: GEMINI_API_KEY is not set");
                return None;
            };
            info!(
                model = %config.gemini_model,
                api_key = %mask_token(&api_key),
                "Gemini classifier configured"
            );
            Arc::new(GeminiClassifier::new(
                api_key,
                config.gemini_base_url.clone(),
                config.gemini_model.clone(),
                system_prompt,
            ))
        }
        AiProvider::Unknown(name) => {
            warn!("Disabling semantic check: unknown AI_PROVIDER '{}'", name);
            return None;
        }
    };

    let backend: Arc<dyn Classifier> = match config.classifier_cache_ttl {
        Some(ttl) => {
            info!("Classifier verdict cache enabled (ttl {:?})", ttl);
            Arc::new(CachedClassifier::new(backend, ttl, cached::DEFAULT_CAPACITY))
        }
        None => backend,
    };

    Some(ClassifierGateway::new(backend, config.classifier_timeout))
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_parse_verdict() {
        assert_eq!(parse_verdict("AD").unwrap(), Classification::Ad);
        assert_eq!(parse_verdict("  not_ad\n").unwrap(), Classification::NotAd);
        assert_eq!(parse_verdict("ad").unwrap(), Classification::Ad);
        assert!(matches!(parse_verdict(""), Err(ClassifierError::Empty)));
        assert!(matches!(
            parse_verdict("Yes, this is an AD"),
            Err(ClassifierError::Malformed(_))
        ));
        assert!(matches!(parse_verdict("\"AD\""), Err(ClassifierError::Malformed(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fails_open() {
        let gateway = ClassifierGateway::new(Arc::new(HangingClassifier), Duration::from_secs(15));

        assert!(matches!(
            gateway.check("buy now").await,
            Err(ClassifierError::Timeout(_))
        ));
        assert!(!gateway.is_ad("buy now").await);
    }

    #[tokio::test]
    async fn test_transport_error_fails_open() {
        let gateway = ClassifierGateway::new(Arc::new(BrokenClassifier), Duration::from_secs(15));
        assert!(!gateway.is_ad("buy now").await);
    }

    #[tokio::test]
    async fn test_blank_text_skips_backend() {
        let backend = Arc::new(ScriptedClassifier::ad_for(&["x"]));
        let gateway = ClassifierGateway::new(backend.clone(), Duration::from_secs(15));

        assert!(!gateway.is_ad("   ").await);
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_ad_verdict_passes_through() {
        let backend = Arc::new(ScriptedClassifier::ad_for(&["cheap followers, DM me"]));
        let gateway = ClassifierGateway::new(backend, Duration::from_secs(15));

        assert!(gateway.is_ad("cheap followers, DM me").await);
        assert!(!gateway.is_ad("what time is the meetup?").await);
        assert_eq!(gateway.provider(), "scripted");
    }
}
