//! Adsweeper - Telegram group ad moderation bot
//!
//! Deletes promotional messages from group chats and posts a short-lived
//! notice naming the sender and the reason.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `store` - Keyword and whitelist persistence (JSON files or MongoDB)
//! - `moderation` - Normalization, flood tracking, gates and the executor
//! - `classifier` - Semantic ad classification (OpenAI, Gemini)
//! - `bot` - Core bot functionality (with Throttle for API rate limiting)
//! - `plugins` - Admin command handlers
//! - `events` - Group message moderation
//! - `i18n` - Chinese and English message tables
//! - `utils` - Utility functions

mod bot;
mod classifier;
mod config;
mod events;
mod i18n;
mod moderation;
mod plugins;
mod store;
mod utils;

use std::sync::Arc;
use std::time::{Duration, Instant};

use teloxide::adaptors::throttle::Limits;
use teloxide::prelude::*;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use config::{Config, StorageBackend};
use moderation::{DEFAULT_KEYWORDS, FloodTracker, ModerationService};
use store::{Database, JsonFileStore, ListStore, MongoStore, SharedList};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// How often idle flood entries are dropped.
const FLOOD_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Extra time granted to pending notice removals at shutdown.
const NOTICE_DRAIN_SLACK: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("adsweeper=info,teloxide=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Adsweeper bot...");

    i18n::init();

    let config = Config::from_env()?;
    info!("Configuration loaded successfully");
    info!("Bot mode: {:?}", config.bot_mode);
    info!("Language: {}", config.locale);

    if config.admin_ids.is_empty() {
        warn!("No admin IDs configured (ADMIN_IDS is empty), admin commands are unusable");
    } else {
        info!("Bot admins: {:?}", config.admin_ids);
    }

    let (keyword_store, whitelist_store) = open_stores(&config.storage).await?;
    let keywords = SharedList::load(
        "keywords",
        keyword_store,
        DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect(),
    )
    .await?;
    let whitelist = SharedList::load("whitelist", whitelist_store, Vec::new()).await?;
    info!(
        "Loaded {} keywords and {} whitelisted IDs",
        keywords.snapshot().len(),
        whitelist.snapshot().len()
    );

    let classifier = classifier::from_config(&config);
    let moderation = Arc::new(ModerationService::new(
        config.admin_ids.iter().copied(),
        Arc::new(keywords),
        Arc::new(whitelist),
        config.flood,
        classifier,
    ));

    match config.flood {
        Some(flood) => info!(
            "Flood control: {} messages per {:?}",
            flood.limit, flood.window
        ),
        None => info!("Flood control disabled"),
    }

    if let Some(tracker) = moderation.pipeline().flood_tracker() {
        spawn_flood_sweeper(tracker.clone());
    }

    // Throttle respects Telegram's rate limits:
    // - 30 messages per second globally
    // - 1 message per second to the same chat
    // - 20 messages per minute to the same group
    let bot = Bot::new(&config.bot_token).throttle(Limits::default());
    info!("Bot initialized with rate limiting (Throttle)");

    let me = bot.get_me().await?;
    info!("Bot username: @{}", me.username());

    if let Err(e) = plugins::register_commands(&bot, &config.locale).await {
        warn!("Failed to register command menu: {}", e);
    }

    let state = bot::AppState::new(
        bot.clone(),
        moderation,
        config.notice_ttl,
        config.locale.clone(),
    );
    let executor = state.executor.clone();
    let dispatcher = bot::build_dispatcher(bot.clone(), state);

    bot::run(&config, bot, dispatcher).await?;

    // Let posted notices expire instead of leaving them in the chats
    executor.shutdown(config.notice_ttl + NOTICE_DRAIN_SLACK).await;

    info!("Adsweeper stopped");
    Ok(())
}

type Stores = (Arc<dyn ListStore<String>>, Arc<dyn ListStore<i64>>);

/// Open the keyword and whitelist stores for the configured backend.
async fn open_stores(backend: &StorageBackend) -> anyhow::Result<Stores> {
    match backend {
        StorageBackend::Json {
            keywords_file,
            whitelist_file,
        } => {
            info!(
                "Using JSON storage: {} / {}",
                keywords_file.display(),
                whitelist_file.display()
            );
            let keywords: Arc<dyn ListStore<String>> =
                Arc::new(JsonFileStore::new(keywords_file.clone()));
            let whitelist: Arc<dyn ListStore<i64>> =
                Arc::new(JsonFileStore::new(whitelist_file.clone()));
            Ok((keywords, whitelist))
        }
        StorageBackend::MongoDb { uri, database } => {
            info!("Connecting to MongoDB...");
            let db = Database::connect(uri, database).await?;
            info!("Database connected");
            let keywords: Arc<dyn ListStore<String>> = Arc::new(MongoStore::new(&db, "keywords"));
            let whitelist: Arc<dyn ListStore<i64>> = Arc::new(MongoStore::new(&db, "whitelist"));
            Ok((keywords, whitelist))
        }
    }
}

/// Periodically drop flood entries with no recent messages.
fn spawn_flood_sweeper(tracker: FloodTracker) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(FLOOD_SWEEP_INTERVAL);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = tracker.sweep(Instant::now());
            if removed > 0 {
                debug!(
                    "Flood sweep removed {} idle entries, {} tracked",
                    removed,
                    tracker.tracked()
                );
            }
        }
    });
}
