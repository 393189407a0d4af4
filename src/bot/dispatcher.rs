//! Message dispatcher setup.
//!
//! Builds the dispatcher with the command handlers and the moderation
//! event handler.

use std::sync::Arc;

use teloxide::adaptors::Throttle;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;

use super::transport::TelegramTransport;
use crate::events;
use crate::moderation::{ActionExecutor, ModerationService};
use crate::plugins;

/// Bot type with Throttle adaptor for automatic rate limiting.
pub type ThrottledBot = Throttle<Bot>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Moderation lists, admin set and pipeline.
    pub moderation: Arc<ModerationService>,

    /// Carries out deletions and notices.
    pub executor: ActionExecutor,

    /// Language for notices and replies.
    pub locale: String,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        bot: ThrottledBot,
        moderation: Arc<ModerationService>,
        notice_ttl: std::time::Duration,
        locale: String,
    ) -> Self {
        let transport = Arc::new(TelegramTransport::new(bot));
        let executor = ActionExecutor::new(transport, notice_ttl, locale.clone());

        Self {
            moderation,
            executor,
            locale,
        }
    }

    /// Check if a user is a static admin.
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.moderation.is_admin(user_id)
    }
}

/// Build the dispatcher with all handlers.
pub fn build_dispatcher(
    bot: ThrottledBot,
    state: AppState,
) -> Dispatcher<ThrottledBot, anyhow::Error, teloxide::dispatching::DefaultKey> {
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![state])
        .default_handler(|_| async {})
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error from the update handler",
        ))
        .enable_ctrlc_handler()
        .build()
}

/// Build the handler schema.
fn schema() -> UpdateHandler<anyhow::Error> {
    // Commands first; everything else in groups goes through moderation
    let message_handler = Update::filter_message()
        .branch(plugins::command_handler())
        .branch(events::message_event_handler());

    dptree::entry().branch(message_handler)
}
