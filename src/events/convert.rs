//! Conversion from Telegram messages to moderation events.

use teloxide::types::{Chat, Message, User};

use crate::moderation::{Author, ChatKind, MessageEvent, QuotedMessage};

/// Build the transport-independent view of `msg`.
pub fn to_event(msg: &Message) -> MessageEvent {
    MessageEvent {
        chat_id: msg.chat.id.0,
        chat_kind: chat_kind(&msg.chat),
        message_id: msg.id.0,
        author: author_of(msg),
        text: msg.text().map(str::to_owned),
        caption: msg.caption().map(str::to_owned),
        quoted: msg.reply_to_message().map(|quoted| QuotedMessage {
            text: quoted.text().map(str::to_owned),
            caption: quoted.caption().map(str::to_owned),
        }),
    }
}

fn chat_kind(chat: &Chat) -> ChatKind {
    if chat.is_supergroup() {
        ChatKind::Supergroup
    } else if chat.is_group() {
        ChatKind::Group
    } else if chat.is_channel() {
        ChatKind::Channel
    } else {
        ChatKind::Private
    }
}

/// Sender chat wins over the user: channel posts and anonymous admins carry
/// a placeholder user in `from`.
///
/// An anonymous admin posts as the group itself; the group title is not
/// the author's choice, so it is not offered as a name field.
fn author_of(msg: &Message) -> Option<Author> {
    if let Some(chat) = msg.sender_chat.as_ref() {
        let title = if chat.id == msg.chat.id {
            None
        } else {
            chat.title().map(str::to_owned)
        };
        return Some(Author::Channel {
            id: chat.id.0,
            title,
        });
    }

    msg.from.as_ref().map(user_author)
}

fn user_author(user: &User) -> Author {
    Author::User {
        id: user.id.0 as i64,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        username: user.username.clone(),
    }
}
