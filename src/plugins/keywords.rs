//! Keyword list commands: /addkw, /delkw, /listkw.

use teloxide::prelude::*;
use tracing::{error, info};

use super::report::{ListKind, render_added, render_list, render_removed, render_save_failed};
use super::{reply, require_admin, split_args};
use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::i18n::get_text;

/// Handle /addkw.
pub async fn addkw_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
    args: String,
) -> anyhow::Result<()> {
    if !require_admin(&bot, &msg, &state).await? {
        return Ok(());
    }

    let words = split_args(&args);
    if words.is_empty() {
        return reply(&bot, &msg, get_text(&state.locale, "keywords.add_usage")).await;
    }

    let text = match state.moderation.add_keywords(&words).await {
        Ok(report) => {
            info!("Keywords added: {:?}", report.changed);
            render_added(ListKind::Keywords, &state.locale, &report)
        }
        Err(e) => {
            error!("Failed to save keywords: {}", e);
            render_save_failed(&state.locale, &e)
        }
    };

    reply(&bot, &msg, text).await
}

/// Handle /delkw.
pub async fn delkw_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
    args: String,
) -> anyhow::Result<()> {
    if !require_admin(&bot, &msg, &state).await? {
        return Ok(());
    }

    let words = split_args(&args);
    if words.is_empty() {
        return reply(&bot, &msg, get_text(&state.locale, "keywords.remove_usage")).await;
    }

    let text = match state.moderation.remove_keywords(&words).await {
        Ok(report) => {
            info!("Keywords removed: {:?}", report.changed);
            render_removed(ListKind::Keywords, &state.locale, &report)
        }
        Err(e) => {
            error!("Failed to save keywords: {}", e);
            render_save_failed(&state.locale, &e)
        }
    };

    reply(&bot, &msg, text).await
}

/// Handle /listkw.
pub async fn listkw_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    if !require_admin(&bot, &msg, &state).await? {
        return Ok(());
    }

    let keywords = state.moderation.keywords();
    reply(&bot, &msg, render_list(ListKind::Keywords, &state.locale, keywords.as_slice())).await
}
