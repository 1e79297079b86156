//! Browser-backed [`FeedbackHandler`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use proto::{ChannelError, FeedbackHandler, FeedbackOutcome, FeedbackRequest};
use tokio::sync::Mutex;
use tracing::debug;

use crate::browser::BrowserLauncher;
use crate::feedback;

/// Opens one feedback session per request, one at a time.
///
/// Requests that arrive while a session is active wait for it to resolve
/// instead of opening a second page.
pub struct WebFeedbackHandler {
    browser: Arc<dyn BrowserLauncher>,
    timeout: Duration,
    /// Held for the full lifetime of a session.
    turn: Mutex<()>,
}

impl WebFeedbackHandler {
    /// Creates a handler that launches `browser` and waits up to `timeout`.
    pub fn new(browser: Arc<dyn BrowserLauncher>, timeout: Duration) -> Self {
        Self {
            browser,
            timeout,
            turn: Mutex::new(()),
        }
    }

    /// Configured session timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl FeedbackHandler for WebFeedbackHandler {
    async fn request_feedback(
        &self,
        req: FeedbackRequest,
    ) -> Result<FeedbackOutcome, ChannelError> {
        let _turn = match self.turn.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                debug!("Another feedback session is active, waiting for it to resolve");
                self.turn.lock().await
            }
        };
        feedback::open(&req, self.timeout, self.browser.as_ref()).await
    }
}
