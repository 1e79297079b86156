use async_trait::async_trait;
use parking_lot::Mutex;
use proto::{ChannelError, FeedbackHandler, FeedbackOutcome, FeedbackRequest};

/// Feedback handler that answers with a scripted outcome and records every
/// request it receives.
pub(crate) struct ScriptedHandler {
    outcome: Mutex<Option<Result<FeedbackOutcome, ChannelError>>>,
    pub(crate) requests: Mutex<Vec<FeedbackRequest>>,
}

impl ScriptedHandler {
    pub(crate) fn answering(outcome: FeedbackOutcome) -> Self {
        Self {
            outcome: Mutex::new(Some(Ok(outcome))),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(err: ChannelError) -> Self {
        Self {
            outcome: Mutex::new(Some(Err(err))),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl FeedbackHandler for ScriptedHandler {
    async fn request_feedback(
        &self,
        req: FeedbackRequest,
    ) -> Result<FeedbackOutcome, ChannelError> {
        self.requests.lock().push(req);
        self.outcome
            .lock()
            .take()
            .expect("scripted handler answers exactly one request")
    }
}
