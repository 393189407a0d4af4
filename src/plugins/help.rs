//! /help command plugin.
//!
//! Admin commands are only listed for admins.

use teloxide::prelude::*;

use super::{reply, sender_is_admin};
use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::i18n::get_text;

/// Handle the /help command.
pub async fn help_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    let text = help_text(&state.locale, sender_is_admin(&msg, &state));
    reply(&bot, &msg, text).await
}

/// Help body, with the admin section appended for admins.
pub fn help_text(locale: &str, is_admin: bool) -> String {
    let basic = get_text(locale, "help.basic");
    if is_admin {
        format!("{}\n\n{}", basic, get_text(locale, "help.admin"))
    } else {
        basic
    }
}
