//! Configuration module.
//!
//! Loads configuration from environment variables (and `.env`).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Deserialize;

use crate::moderation::{DEFAULT_NOTICE_TTL, FloodSettings};

/// Bot running mode
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BotMode {
    #[default]
    Polling,
    Webhook,
}

/// Where the keyword list and whitelist are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Json {
        keywords_file: PathBuf,
        whitelist_file: PathBuf,
    },
    MongoDb {
        uri: String,
        database: String,
    },
}

/// Semantic classifier provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiProvider {
    OpenAi,
    Gemini,
    /// Unrecognized name; the semantic check is disabled at startup.
    Unknown(String),
}

impl AiProvider {
    fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "openai" => Self::OpenAi,
            "gemini" => Self::Gemini,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub bot_token: String,
    pub bot_mode: BotMode,
    pub webhook_url: Option<String>,
    pub webhook_port: u16,
    pub webhook_secret: Option<String>,

    /// Static admin identities. They bypass moderation and may run
    /// the list commands.
    pub admin_ids: Vec<i64>,

    /// Language of notices and command replies.
    pub locale: String,

    pub storage: StorageBackend,

    /// `None` when flood protection is disabled.
    pub flood: Option<FloodSettings>,

    // Semantic check
    pub enable_llm_check: bool,
    pub ai_provider: AiProvider,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub classifier_timeout: Duration,
    /// `None` disables the verdict cache.
    pub classifier_cache_ttl: Option<Duration>,
    pub classifier_system_prompt: Option<String>,

    /// How long the moderation notice stays in the chat.
    pub notice_ttl: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Fails if a required variable is missing or a value cannot be parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bot_mode = match var("BOT_MODE").map(|m| m.to_lowercase()).as_deref() {
            Some("webhook") => BotMode::Webhook,
            _ => BotMode::Polling,
        };

        let webhook_url = var("WEBHOOK_URL");
        if bot_mode == BotMode::Webhook && webhook_url.is_none() {
            bail!("WEBHOOK_URL must be set when BOT_MODE is webhook");
        }

        let storage = match var("STORAGE_BACKEND").map(|b| b.to_lowercase()).as_deref() {
            Some("mongodb") | Some("mongo") => StorageBackend::MongoDb {
                uri: var("MONGODB_URI").context("MONGODB_URI must be set for the mongodb backend")?,
                database: var("MONGODB_DATABASE").unwrap_or_else(|| "adsweeper".to_string()),
            },
            Some("json") | None => StorageBackend::Json {
                keywords_file: var("KEYWORDS_FILE")
                    .unwrap_or_else(|| "ad_keywords.json".to_string())
                    .into(),
                whitelist_file: var("WHITELIST_FILE")
                    .unwrap_or_else(|| "whitelist_users.json".to_string())
                    .into(),
            },
            Some(other) => bail!("Unknown STORAGE_BACKEND '{}'", other),
        };

        let flood = if parse_or(&var, "ENABLE_ANTI_FLOOD", false)? {
            Some(FloodSettings {
                limit: parse_or(&var, "FLOOD_MESSAGE_LIMIT", 3)?,
                window: Duration::from_secs(parse_or(&var, "FLOOD_TIME_WINDOW_SECONDS", 2)?),
            })
        } else {
            None
        };

        let cache_ttl: u64 = parse_or(&var, "CLASSIFIER_CACHE_TTL_SECS", 600)?;

        Ok(Self {
            bot_token: var("BOT_TOKEN").context("BOT_TOKEN must be set")?,
            bot_mode,
            webhook_url,
            webhook_port: parse_or(&var, "WEBHOOK_PORT", 8443)?,
            webhook_secret: var("WEBHOOK_SECRET"),
            admin_ids: parse_ids(var("ADMIN_IDS").as_deref().unwrap_or_default()),
            locale: crate::i18n::resolve_locale(var("BOT_LOCALE").as_deref()),
            storage,
            flood,
            enable_llm_check: parse_or(&var, "ENABLE_LLM_CHECK", true)?,
            ai_provider: AiProvider::parse(&var("AI_PROVIDER").unwrap_or_else(|| "openai".to_string())),
            openai_api_key: var("OPENAI_API_KEY"),
            openai_base_url: var("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            openai_model: var("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            gemini_api_key: var("GEMINI_API_KEY"),
            gemini_base_url: var("GEMINI_BASE_URL")
                .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string()),
            gemini_model: var("GEMINI_MODEL").unwrap_or_else(|| "gemini-1.5-flash".to_string()),
            classifier_timeout: Duration::from_secs(parse_or(&var, "CLASSIFIER_TIMEOUT_SECS", 15)?),
            classifier_cache_ttl: (cache_ttl > 0).then(|| Duration::from_secs(cache_ttl)),
            classifier_system_prompt: var("CLASSIFIER_SYSTEM_PROMPT"),
            notice_ttl: Duration::from_secs(parse_or(
                &var,
                "NOTICE_TTL_SECS",
                DEFAULT_NOTICE_TTL.as_secs(),
            )?),
        })
    }
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(raw) => raw
            .to_lowercase()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {} '{}': {}", key, raw, e)),
        None => Ok(default),
    }
}

/// Parse comma-separated identities, skipping anything non-numeric.
fn parse_ids(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|s| s.trim().parse::<i64>().ok())
        .collect()
}
