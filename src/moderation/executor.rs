//! Best-effort moderation actions.
//!
//! Delete the offending message, post a notice naming the author and the
//! reason, then remove the notice after a short delay. Every step is tried
//! regardless of how the previous one went. Failures are logged, never
//! returned.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};

use super::event::MessageEvent;
use super::pipeline::Reason;
use crate::i18n::get_text;

/// Default lifetime of the moderation notice.
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(5);

/// Chat platform calls needed to carry out a moderation action.
#[async_trait]
pub trait ModerationTransport: Send + Sync {
    async fn delete_message(&self, chat_id: i64, message_id: i32) -> anyhow::Result<()>;

    /// Send plain text, returning the new message id.
    async fn send_message(&self, chat_id: i64, text: &str) -> anyhow::Result<i32>;
}

/// A decided deletion, detached from the inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationAction {
    pub chat_id: i64,
    pub message_id: i32,
    pub author_name: String,
    pub reason: Reason,
}

impl ModerationAction {
    pub fn new(event: &MessageEvent, reason: Reason) -> Self {
        let author_name = event
            .author
            .as_ref()
            .map(|a| a.display_name())
            .unwrap_or_default();

        Self {
            chat_id: event.chat_id,
            message_id: event.message_id,
            author_name,
            reason,
        }
    }
}

/// What happened while executing an action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub message_deleted: bool,
    /// Notice that was posted and is now scheduled for removal.
    pub notice_id: Option<i32>,
}

/// Carries out moderation actions over a transport.
///
/// The deletion and the notice happen inline. Notice removal runs in the
/// background on a task tracker that `shutdown` drains.
#[derive(Clone)]
pub struct ActionExecutor {
    transport: Arc<dyn ModerationTransport>,
    notice_ttl: Duration,
    locale: String,
    cleanups: TaskTracker,
}

impl ActionExecutor {
    pub fn new(transport: Arc<dyn ModerationTransport>, notice_ttl: Duration, locale: String) -> Self {
        Self {
            transport,
            notice_ttl,
            locale,
            cleanups: TaskTracker::new(),
        }
    }

    /// Notice text for `action`.
    pub fn notice_text(&self, action: &ModerationAction) -> String {
        let name = if action.author_name.is_empty() {
            get_text(&self.locale, "moderation.unknown_author")
        } else {
            action.author_name.clone()
        };

        get_text(&self.locale, "moderation.notice")
            .replace("{name}", &name)
            .replace("{reason}", &action.reason.describe(&self.locale))
    }

    /// Delete the message and post the notice, then schedule the notice
    /// for removal after the TTL.
    pub async fn execute(&self, action: &ModerationAction) -> ExecutionReport {
        let mut report = ExecutionReport::default();
        let chat_id = action.chat_id;

        match self.transport.delete_message(chat_id, action.message_id).await {
            Ok(()) => {
                report.message_deleted = true;
                info!(
                    chat_id,
                    message_id = action.message_id,
                    "Deleted message from {}",
                    action.author_name
                );
            }
            Err(e) => error!(
                chat_id,
                message_id = action.message_id,
                error = %e,
                "Failed to delete message"
            ),
        }

        let notice_id = match self.transport.send_message(chat_id, &self.notice_text(action)).await {
            Ok(id) => id,
            Err(e) => {
                warn!(chat_id, error = %e, "Failed to send moderation notice");
                return report;
            }
        };
        report.notice_id = Some(notice_id);

        let transport = self.transport.clone();
        let ttl = self.notice_ttl;
        self.cleanups.spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Err(e) = transport.delete_message(chat_id, notice_id).await {
                warn!(
                    chat_id,
                    message_id = notice_id,
                    error = %e,
                    "Failed to delete moderation notice"
                );
            }
        });

        report
    }

    /// Number of notices still waiting for removal.
    pub fn pending_cleanups(&self) -> usize {
        self.cleanups.len()
    }

    /// Stop accepting cleanups and wait up to `grace` for pending ones.
    ///
    /// Returns `false` when some notices were still pending at the deadline.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.cleanups.close();
        let pending = self.pending_cleanups();
        if pending > 0 {
            info!("Waiting for {} pending notice removals", pending);
        }

        match tokio::time::timeout(grace, self.cleanups.wait()).await {
            Ok(()) => true,
            Err(_) => {
                warn!(
                    "Gave up on {} notice removals after {:?}",
                    self.pending_cleanups(),
                    grace
                );
                false
            }
        }
    }
}
