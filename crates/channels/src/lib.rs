//! Human-facing feedback channel: the loopback feedback session, the
//! browser launcher, and the [`proto::FeedbackHandler`] that ties them together.

pub mod browser;
pub mod feedback;
pub mod handler;

/// Browser launcher trait and built-in launchers.
pub use browser::{BrowserLauncher, NoBrowser, SystemBrowser};
/// One-shot loopback feedback session.
pub use feedback::{FeedbackSession, open};
/// Serialized, browser-backed feedback handler.
pub use handler::WebFeedbackHandler;
