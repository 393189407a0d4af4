//! Telegram implementation of the moderation transport.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::MessageId;

use super::dispatcher::ThrottledBot;
use crate::moderation::ModerationTransport;

/// Sends moderation calls through the throttled bot.
pub struct TelegramTransport {
    bot: ThrottledBot,
}

impl TelegramTransport {
    pub fn new(bot: ThrottledBot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ModerationTransport for TelegramTransport {
    async fn delete_message(&self, chat_id: i64, message_id: i32) -> anyhow::Result<()> {
        self.bot
            .delete_message(ChatId(chat_id), MessageId(message_id))
            .await?;
        Ok(())
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> anyhow::Result<i32> {
        let sent = self.bot.send_message(ChatId(chat_id), text).await?;
        Ok(sent.id.0)
    }
}
