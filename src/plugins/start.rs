//! /start command plugin.

use teloxide::prelude::*;

use super::reply;
use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::i18n::get_text;

/// Handle the /start command.
pub async fn start_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    reply(&bot, &msg, get_text(&state.locale, "start.greeting")).await
}
