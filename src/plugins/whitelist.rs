//! Whitelist commands: /addwl, /delwl, /listwl.

use teloxide::prelude::*;
use tracing::{error, info};

use super::report::{ListKind, render_added, render_list, render_removed, render_save_failed};
use super::{reply, require_admin, split_args};
use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::i18n::get_text;

/// Handle /addwl.
pub async fn addwl_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
    args: String,
) -> anyhow::Result<()> {
    if !require_admin(&bot, &msg, &state).await? {
        return Ok(());
    }

    let ids = split_args(&args);
    if ids.is_empty() {
        return reply(&bot, &msg, get_text(&state.locale, "whitelist.add_usage")).await;
    }

    let text = match state.moderation.add_whitelist(&ids).await {
        Ok(report) => {
            info!("Whitelist added: {:?}", report.changed);
            render_added(ListKind::Whitelist, &state.locale, &report)
        }
        Err(e) => {
            error!("Failed to save whitelist: {}", e);
            render_save_failed(&state.locale, &e)
        }
    };

    reply(&bot, &msg, text).await
}

/// Handle /delwl.
pub async fn delwl_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
    args: String,
) -> anyhow::Result<()> {
    if !require_admin(&bot, &msg, &state).await? {
        return Ok(());
    }

    let ids = split_args(&args);
    if ids.is_empty() {
        return reply(&bot, &msg, get_text(&state.locale, "whitelist.remove_usage")).await;
    }

    let text = match state.moderation.remove_whitelist(&ids).await {
        Ok(report) => {
            info!("Whitelist removed: {:?}", report.changed);
            render_removed(ListKind::Whitelist, &state.locale, &report)
        }
        Err(e) => {
            error!("Failed to save whitelist: {}", e);
            render_save_failed(&state.locale, &e)
        }
    };

    reply(&bot, &msg, text).await
}

/// Handle /listwl.
pub async fn listwl_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    if !require_admin(&bot, &msg, &state).await? {
        return Ok(());
    }

    let whitelist = state.moderation.whitelist();
    reply(&bot, &msg, render_list(ListKind::Whitelist, &state.locale, whitelist.as_slice())).await
}
