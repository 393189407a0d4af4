//! Bot module - Core bot functionality.

pub mod dispatcher;
mod runtime;
mod transport;
pub mod webhook;

pub use dispatcher::{AppState, build_dispatcher};
pub use runtime::run;
