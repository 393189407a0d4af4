//! Per-message moderation decision.
//!
//! Gates run in a fixed order and the first one that fires decides:
//!
//! 1. scope (group chats with a known author)
//! 2. bypass (admins, whitelisted users and channels)
//! 3. flood (optional, volume only)
//! 4. lexical (content, then name fields)
//! 5. semantic (optional, remote classifier)

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use super::bypass::BypassAuthority;
use super::event::{AssembledContent, Author, Field, MessageEvent};
use super::flood::{FloodSettings, FloodTracker};
use super::keywords;
use crate::classifier::ClassifierGateway;
use crate::i18n::get_text;
use crate::store::SharedList;

/// Why a message was deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// Author exceeded the flood limit.
    Flood,
    /// A keyword hit in `field`.
    Keyword { field: Field, via_quote: bool },
    /// The remote classifier flagged the content.
    Semantic { provider: String, via_quote: bool },
}

impl Reason {
    /// Operator-facing label in the given locale.
    pub fn describe(&self, locale: &str) -> String {
        match self {
            Self::Flood => get_text(locale, "reason.flood"),
            Self::Keyword { field, via_quote } => {
                let key = if *via_quote {
                    "reason.keyword_quoted"
                } else {
                    "reason.keyword"
                };
                get_text(locale, key).replace("{field}", &get_text(locale, field.i18n_key()))
            }
            Self::Semantic { provider, via_quote } => {
                let key = if *via_quote {
                    "reason.semantic_quoted"
                } else {
                    "reason.semantic"
                };
                get_text(locale, key).replace("{provider}", provider)
            }
        }
    }
}

/// Why a message was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /// Not a group message, or no resolvable author.
    OutOfScope,
    /// Author is an admin or whitelisted.
    Exempt,
    /// No gate fired.
    Clean,
}

/// Outcome of moderating one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Ignore(Skip),
    Delete(Reason),
}

#[derive(Clone)]
struct FloodGate {
    tracker: FloodTracker,
    limit: usize,
}

/// Runs the gates for each inbound message.
#[derive(Clone)]
pub struct ModerationPipeline {
    bypass: BypassAuthority,
    keywords: Arc<SharedList<String>>,
    flood: Option<FloodGate>,
    classifier: Option<ClassifierGateway>,
}

impl ModerationPipeline {
    pub fn new(
        bypass: BypassAuthority,
        keywords: Arc<SharedList<String>>,
        flood: Option<FloodSettings>,
        classifier: Option<ClassifierGateway>,
    ) -> Self {
        let flood = flood.map(|settings| FloodGate {
            tracker: FloodTracker::new(settings.window),
            limit: settings.limit,
        });

        Self {
            bypass,
            keywords,
            flood,
            classifier,
        }
    }

    /// Flood state, present only while the subsystem is enabled.
    pub fn flood_tracker(&self) -> Option<&FloodTracker> {
        self.flood.as_ref().map(|gate| &gate.tracker)
    }

    /// Moderate `event` as received now.
    pub async fn evaluate(&self, event: &MessageEvent) -> Verdict {
        self.evaluate_at(event, Instant::now()).await
    }

    /// Moderate `event` as received at `now`.
    pub async fn evaluate_at(&self, event: &MessageEvent, now: Instant) -> Verdict {
        let author = match &event.author {
            Some(author) if event.chat_kind.is_group() => author,
            _ => return Verdict::Ignore(Skip::OutOfScope),
        };
        let author_id = author.id();

        if self.bypass.is_exempt(author_id) {
            if self.bypass.is_whitelisted(author_id) {
                info!(
                    "Author {} ({}) is whitelisted, skipping all checks",
                    author_id,
                    author.display_name()
                );
            }
            return Verdict::Ignore(Skip::Exempt);
        }

        if let Some(gate) = &self.flood {
            let count = gate.tracker.record_and_check(event.chat_id, author_id, now);
            debug!(
                chat_id = event.chat_id,
                author_id, count, "Flood counter updated"
            );
            if count > gate.limit {
                info!(
                    chat_id = event.chat_id,
                    message_id = event.message_id,
                    "Flood limit exceeded by {} ({})",
                    author.display_name(),
                    author_id
                );
                return Verdict::Delete(Reason::Flood);
            }
        }

        let content = event.assemble();

        if let Some(reason) = self.lexical_gate(&content, author) {
            return Verdict::Delete(reason);
        }

        if let Some(reason) = self.semantic_gate(&content).await {
            return Verdict::Delete(reason);
        }

        Verdict::Ignore(Skip::Clean)
    }

    fn lexical_gate(&self, content: &AssembledContent, author: &Author) -> Option<Reason> {
        let list = self.keywords.snapshot();
        let is_hit = |text: &str| keywords::matches(text, list.as_slice());

        if is_hit(&content.combined) {
            return Some(Reason::Keyword {
                field: Field::Content,
                via_quote: content.hit_via_quote(&is_hit),
            });
        }

        author
            .identity_fields()
            .into_iter()
            .find(|&(_, value)| is_hit(value))
            .map(|(field, _)| Reason::Keyword {
                field,
                via_quote: false,
            })
    }

    async fn semantic_gate(&self, content: &AssembledContent) -> Option<Reason> {
        let gateway = self.classifier.as_ref()?;
        if content.combined.is_empty() || !gateway.is_ad(&content.combined).await {
            return None;
        }

        Some(Reason::Semantic {
            provider: gateway.provider().to_string(),
            via_quote: Self::semantic_via_quote(gateway, content).await,
        })
    }

    /// Attribute a positive classification to the quote.
    ///
    /// When one side is empty the answer is already known from the
    /// combined call; otherwise both fragments are classified concurrently.
    async fn semantic_via_quote(gateway: &ClassifierGateway, content: &AssembledContent) -> bool {
        if content.quoted.trim().is_empty() {
            return false;
        }
        if content.own.trim().is_empty() {
            return true;
        }

        let (quoted_is_ad, own_is_ad) =
            futures::join!(gateway.is_ad(&content.quoted), gateway.is_ad(&content.own));
        quoted_is_ad && !own_is_ad
    }
}
