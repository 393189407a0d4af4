//! Transport-independent view of an inbound message.

/// Kind of chat a message was posted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

impl ChatKind {
    /// Only group chats are moderated.
    pub fn is_group(self) -> bool {
        matches!(self, Self::Group | Self::Supergroup)
    }
}

/// Identity that authored a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Author {
    User {
        id: i64,
        first_name: String,
        last_name: Option<String>,
        username: Option<String>,
    },
    /// A channel (or anonymous group admin) posting as a chat.
    Channel { id: i64, title: Option<String> },
}

/// Identity-attached text field checked by the lexical gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Content,
    FirstName,
    LastName,
    Username,
    ChannelTitle,
}

impl Field {
    /// Translation key of the field label.
    pub fn i18n_key(self) -> &'static str {
        match self {
            Self::Content => "field.content",
            Self::FirstName => "field.first_name",
            Self::LastName => "field.last_name",
            Self::Username => "field.username",
            Self::ChannelTitle => "field.channel_title",
        }
    }
}

impl Author {
    pub fn id(&self) -> i64 {
        match self {
            Self::User { id, .. } | Self::Channel { id, .. } => *id,
        }
    }

    /// Name shown in notifications.
    pub fn display_name(&self) -> String {
        match self {
            Self::User {
                first_name,
                last_name: Some(last),
                ..
            } if !last.is_empty() => format!("{} {}", first_name, last),
            Self::User { first_name, id, .. } => {
                if first_name.is_empty() {
                    id.to_string()
                } else {
                    first_name.clone()
                }
            }
            Self::Channel { title: Some(title), .. } if !title.is_empty() => title.clone(),
            Self::Channel { id, .. } => id.to_string(),
        }
    }

    /// Name fields in lexical priority order: first name, last name,
    /// username, or the channel title.
    pub fn identity_fields(&self) -> Vec<(Field, &str)> {
        match self {
            Self::User {
                first_name,
                last_name,
                username,
                ..
            } => vec![
                (Field::FirstName, first_name.as_str()),
                (Field::LastName, last_name.as_deref().unwrap_or("")),
                (Field::Username, username.as_deref().unwrap_or("")),
            ],
            Self::Channel { title, .. } => {
                vec![(Field::ChannelTitle, title.as_deref().unwrap_or(""))]
            }
        }
    }
}

/// The message being replied to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotedMessage {
    pub text: Option<String>,
    pub caption: Option<String>,
}

impl QuotedMessage {
    pub fn body(&self) -> &str {
        first_non_empty(self.text.as_deref(), self.caption.as_deref())
    }
}

/// One inbound message, created on receipt and dropped after moderation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    pub chat_id: i64,
    pub chat_kind: ChatKind,
    pub message_id: i32,
    pub author: Option<Author>,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub quoted: Option<QuotedMessage>,
}

impl MessageEvent {
    /// The message's own text, or its caption.
    pub fn own_body(&self) -> &str {
        first_non_empty(self.text.as_deref(), self.caption.as_deref())
    }

    /// Body of the quoted message, empty when there is none.
    pub fn quoted_body(&self) -> &str {
        self.quoted.as_ref().map(QuotedMessage::body).unwrap_or("")
    }

    /// Own body and quoted body joined into the unit checked for ads.
    pub fn assemble(&self) -> AssembledContent {
        let own = self.own_body().to_string();
        let quoted = self.quoted_body().to_string();
        let combined = format!("{}\n{}", own, quoted).trim().to_string();
        AssembledContent {
            own,
            quoted,
            combined,
        }
    }
}

/// Content of a message split by origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledContent {
    /// Text written in the new message.
    pub own: String,
    /// Text of the quoted message.
    pub quoted: String,
    /// Both, newline separated and trimmed.
    pub combined: String,
}

impl AssembledContent {
    /// Whether a hit on the combined content comes from the quote alone,
    /// given a predicate that re-runs the check on a fragment.
    pub fn hit_via_quote(&self, is_hit: impl Fn(&str) -> bool) -> bool {
        !self.quoted.is_empty() && is_hit(&self.quoted) && !is_hit(&self.own)
    }
}

fn first_non_empty<'a>(primary: Option<&'a str>, fallback: Option<&'a str>) -> &'a str {
    primary
        .filter(|s| !s.is_empty())
        .or(fallback.filter(|s| !s.is_empty()))
        .unwrap_or("")
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Builders for message events used across moderation tests.

    use super::*;

    pub fn user(id: i64, first_name: &str) -> Author {
        Author::User {
            id,
            first_name: first_name.to_string(),
            last_name: None,
            username: None,
        }
    }

    pub fn group_message(author: Author, text: &str) -> MessageEvent {
        MessageEvent {
            chat_id: -100500,
            chat_kind: ChatKind::Supergroup,
            message_id: 77,
            author: Some(author),
            text: Some(text.to_string()).filter(|t| !t.is_empty()),
            caption: None,
            quoted: None,
        }
    }

    pub fn reply(author: Author, text: &str, quoted: &str) -> MessageEvent {
        MessageEvent {
            quoted: Some(QuotedMessage {
                text: Some(quoted.to_string()),
                caption: None,
            }),
            ..group_message(author, text)
        }
    }
}
