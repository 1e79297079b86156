//! Seam between the tool dispatcher and whatever collects human feedback.

use async_trait::async_trait;

use crate::error::ChannelError;
use crate::feedback::{FeedbackOutcome, FeedbackRequest};

/// Handler for feedback requests.
///
/// The browser-backed implementation opens one local feedback session per
/// call and resolves once the reviewer answers or the session times out.
/// Implementations must not run two sessions at once.
#[async_trait]
pub trait FeedbackHandler: Send + Sync {
    /// Presents `req` to the reviewer and waits for the single outcome.
    async fn request_feedback(
        &self,
        req: FeedbackRequest,
    ) -> Result<FeedbackOutcome, ChannelError>;
}

/// Auto-approve handler that answers every request without asking.
///
/// Used for headless runs and tests.
pub struct AutoApproveHandler;

#[async_trait]
impl FeedbackHandler for AutoApproveHandler {
    async fn request_feedback(
        &self,
        _req: FeedbackRequest,
    ) -> Result<FeedbackOutcome, ChannelError> {
        Ok(FeedbackOutcome::approved(Vec::new()))
    }
}
