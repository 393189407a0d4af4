//! Event handler system.
//!
//! Every non-command group message is run through the moderation pipeline.

mod convert;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use tracing::{debug, info, warn};

use crate::bot::dispatcher::AppState;
use crate::moderation::{ModerationAction, Verdict};
use crate::utils::preview;

pub use convert::to_event;

/// Build the message event handler.
pub fn message_event_handler() -> UpdateHandler<anyhow::Error> {
    dptree::filter(|msg: Message| {
        // Only group messages are moderated
        msg.chat.is_group() || msg.chat.is_supergroup()
    })
    .endpoint(moderate_message)
}

/// Evaluate a message and hand deletions to the executor.
///
/// Failures are logged and never reach the dispatcher.
async fn moderate_message(msg: Message, state: AppState) -> anyhow::Result<()> {
    if msg.text().is_some_and(|t| t.starts_with('/')) {
        return Ok(());
    }

    let event = to_event(&msg);

    match state.moderation.evaluate(&event).await {
        Verdict::Delete(reason) => {
            let action = ModerationAction::new(&event, reason);
            info!(
                chat_id = action.chat_id,
                message_id = action.message_id,
                "Ad detected from {} ({:?}): {}",
                action.author_name,
                action.reason,
                preview(&event.assemble().combined, 50)
            );

            // Notice removal continues on the executor's tracker
            let report = state.executor.execute(&action).await;
            if !report.message_deleted {
                warn!(
                    chat_id = action.chat_id,
                    "Ad left in place, check the bot's delete permission"
                );
            }
            debug!(notice_id = ?report.notice_id, "Moderation action finished");
        }
        Verdict::Ignore(skip) => {
            debug!(
                chat_id = event.chat_id,
                message_id = event.message_id,
                "Message kept: {:?}",
                skip
            );
        }
    }

    Ok(())
}
