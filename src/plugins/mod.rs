//! Plugin system for command handlers.
//!
//! Add new plugins by:
//! 1. Creating a new file in this directory
//! 2. Adding `pub mod your_plugin;` below
//! 3. Adding the handler to `command_handler()`

pub mod help;
pub mod keywords;
pub mod report;
pub mod start;
pub mod whitelist;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{BotCommand, ReplyParameters};
use teloxide::utils::command::BotCommands;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::i18n::get_text;

/// All bot commands.
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot")]
    Start,

    #[command(description = "Show help")]
    Help,

    // Keyword commands
    #[command(description = "Add ad keywords")]
    Addkw(String),

    #[command(description = "Remove ad keywords")]
    Delkw(String),

    #[command(description = "List ad keywords")]
    Listkw,

    // Whitelist commands
    #[command(description = "Whitelist user or channel IDs")]
    Addwl(String),

    #[command(description = "Remove IDs from the whitelist")]
    Delwl(String),

    #[command(description = "List whitelisted IDs")]
    Listwl,
}

/// Build the combined command handler.
pub fn command_handler() -> UpdateHandler<anyhow::Error> {
    use dptree::case;

    teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start].endpoint(start::start_command))
        .branch(case![Command::Help].endpoint(help::help_command))
        // Keywords
        .branch(case![Command::Addkw(args)].endpoint(keywords::addkw_command))
        .branch(case![Command::Delkw(args)].endpoint(keywords::delkw_command))
        .branch(case![Command::Listkw].endpoint(keywords::listkw_command))
        // Whitelist
        .branch(case![Command::Addwl(args)].endpoint(whitelist::addwl_command))
        .branch(case![Command::Delwl(args)].endpoint(whitelist::delwl_command))
        .branch(case![Command::Listwl].endpoint(whitelist::listwl_command))
}

/// Command menu shown by Telegram clients, in the bot's language.
pub fn command_menu(locale: &str) -> Vec<BotCommand> {
    ["start", "help", "addkw", "delkw", "listkw", "addwl", "delwl", "listwl"]
        .into_iter()
        .map(|name| BotCommand::new(name, get_text(locale, &format!("commands.{}", name))))
        .collect()
}

/// Register the command menu with Telegram.
pub async fn register_commands(bot: &ThrottledBot, locale: &str) -> anyhow::Result<()> {
    bot.set_my_commands(command_menu(locale)).await?;
    Ok(())
}

/// Reply to `msg` with plain text.
pub(crate) async fn reply(bot: &ThrottledBot, msg: &Message, text: impl Into<String>) -> anyhow::Result<()> {
    bot.send_message(msg.chat.id, text)
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;
    Ok(())
}

/// Whether the sender of `msg` is a static admin.
pub(crate) fn sender_is_admin(msg: &Message, state: &AppState) -> bool {
    msg.from
        .as_ref()
        .is_some_and(|user| state.is_admin(user.id.0 as i64))
}

/// Reply with the admin-only refusal unless the sender is an admin.
pub(crate) async fn require_admin(bot: &ThrottledBot, msg: &Message, state: &AppState) -> anyhow::Result<bool> {
    if sender_is_admin(msg, state) {
        return Ok(true);
    }

    reply(bot, msg, get_text(&state.locale, "common.admin_only")).await?;
    Ok(false)
}

/// Whitespace-separated command arguments.
pub(crate) fn split_args(args: &str) -> Vec<&str> {
    args.split_whitespace().collect()
}
