//! Ad moderation core.
//!
//! ## Architecture
//!
//! - `normalize` / `keywords` - lexical matching
//! - `flood` - sliding-window volume tracking
//! - `bypass` - admin and whitelist exemptions
//! - `event` - transport-independent message view
//! - `pipeline` - ordered gates producing a `Verdict`
//! - `executor` - delete + self-expiring notice
//! - `service` - owner of the lists, exposes admin operations

mod bypass;
pub mod event;
mod executor;
mod flood;
pub mod keywords;
pub mod normalize;
mod pipeline;
mod service;

pub use event::{Author, ChatKind, MessageEvent, QuotedMessage};
pub use executor::{ActionExecutor, DEFAULT_NOTICE_TTL, ModerationAction, ModerationTransport};
pub use flood::{FloodSettings, FloodTracker};
pub use pipeline::Verdict;
pub use service::{DEFAULT_KEYWORDS, ListReport, ModerationService};
