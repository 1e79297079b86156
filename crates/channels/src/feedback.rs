//! Feedback session — a one-shot axum server on an ephemeral loopback port.
//!
//! A session serves the rendered page on `GET /`, accepts the reviewer's
//! answer on `POST /submit`, and resolves exactly once: on the first
//! submission or when the timeout fires, whichever comes first. The
//! listener is closed before [`FeedbackSession::wait`] returns.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use parking_lot::Mutex;
use proto::{
    ChannelError, FeedbackOutcome, FeedbackRequest, OutcomeKind, SessionId, SubmitPayload,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::browser::BrowserLauncher;

/// How long in-flight responses may drain after the session resolves.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);
/// Pasted screenshots arrive as base64 data URLs and easily exceed axum's
/// 2 MB default.
const MAX_SUBMISSION_BYTES: usize = 32 * 1024 * 1024;

// ─── Shared state ──────────────────────────────────────────

/// State shared with the axum handlers for one session.
struct SessionState {
    session_id: SessionId,
    page: String,
    /// Resolution slot; `None` once the session has resolved.
    pending: Mutex<Option<oneshot::Sender<FeedbackOutcome>>>,
}

impl SessionState {
    /// Delivers `outcome` if nothing resolved the session yet.
    fn resolve(&self, outcome: FeedbackOutcome) -> bool {
        let Some(tx) = self.pending.lock().take() else {
            return false;
        };
        tx.send(outcome).is_ok()
    }

    /// Closes the resolution slot. Returns `false` if it was already taken.
    fn close(&self) -> bool {
        self.pending.lock().take().is_some()
    }
}

// ─── FeedbackSession ───────────────────────────────────────

/// One bound, not yet resolved feedback session.
pub struct FeedbackSession {
    session_id: SessionId,
    listener: TcpListener,
    addr: SocketAddr,
    page: String,
}

impl FeedbackSession {
    /// Binds `127.0.0.1:0` and renders the page for `request`.
    pub async fn bind(request: &FeedbackRequest) -> Result<Self, ChannelError> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .map_err(|e| ChannelError::ConnectionFailed(format!("bind failed: {e}")))?;
        let addr = listener
            .local_addr()
            .map_err(|e| ChannelError::ConnectionFailed(format!("local addr: {e}")))?;

        Ok(Self {
            session_id: SessionId::new(),
            listener,
            addr,
            page: web::render(&request.prompt, request.theme),
        })
    }

    /// Session identifier used in log lines.
    pub fn id(&self) -> &SessionId {
        &self.session_id
    }

    /// Address of the bound listener.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// URL the reviewer should open.
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Serves the page until the first submission or `timeout`, then tears
    /// the listener down and returns the single outcome.
    pub async fn wait(self, timeout: Duration) -> FeedbackOutcome {
        let (outcome_tx, mut outcome_rx) = oneshot::channel();
        let state = Arc::new(SessionState {
            session_id: self.session_id.clone(),
            page: self.page,
            pending: Mutex::new(Some(outcome_tx)),
        });

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = router(state.clone());
        let listener = self.listener;
        let mut server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        let outcome = match tokio::time::timeout(timeout, &mut outcome_rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => FeedbackOutcome::timed_out(),
            Err(_) => {
                if state.close() {
                    info!(session_id = %self.session_id, ?timeout, "Feedback session timed out");
                    FeedbackOutcome::timed_out()
                } else {
                    // A submission took the slot right at the deadline.
                    outcome_rx.await.unwrap_or_else(|_| FeedbackOutcome::timed_out())
                }
            }
        };

        let _ = shutdown_tx.send(());
        match tokio::time::timeout(SHUTDOWN_GRACE, &mut server).await {
            Ok(Ok(Ok(()))) => debug!(session_id = %self.session_id, "Feedback listener closed"),
            Ok(Ok(Err(e))) => warn!(session_id = %self.session_id, error = %e, "Feedback server error"),
            Ok(Err(e)) => warn!(session_id = %self.session_id, error = %e, "Feedback server task failed"),
            Err(_) => {
                server.abort();
                let _ = server.await;
                debug!(session_id = %self.session_id, "Feedback listener force-closed");
            }
        }

        outcome
    }
}

/// Binds a session, points the browser at it, and waits for the outcome.
pub async fn open(
    request: &FeedbackRequest,
    timeout: Duration,
    browser: &dyn BrowserLauncher,
) -> Result<FeedbackOutcome, ChannelError> {
    let session = FeedbackSession::bind(request).await?;
    let url = session.url();
    info!(session_id = %session.id(), %url, ?timeout, "Feedback session opened");
    browser.open(&url);
    Ok(session.wait(timeout).await)
}

// ─── Axum handlers ─────────────────────────────────────────

fn router(state: Arc<SessionState>) -> Router {
    Router::new()
        .route("/", get(page_handler).fallback(not_found))
        .route("/submit", post(submit_handler).fallback(not_found))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_SUBMISSION_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the rendered feedback page.
async fn page_handler(State(state): State<Arc<SessionState>>) -> Html<String> {
    debug!(session_id = %state.session_id, "Feedback page served");
    Html(state.page.clone())
}

/// Accepts the reviewer's answer. Only the first call resolves the session.
async fn submit_handler(State(state): State<Arc<SessionState>>, body: Bytes) -> Response {
    let outcome = parse_submission(&body);
    let kind = outcome.kind;
    if state.resolve(outcome) {
        info!(session_id = %state.session_id, %kind, "Feedback submitted");
        (StatusCode::OK, Json(serde_json::json!({ "ok": true }))).into_response()
    } else {
        debug!(session_id = %state.session_id, "Ignoring submission to resolved session");
        (StatusCode::CONFLICT, Json(serde_json::json!({ "ok": false }))).into_response()
    }
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

// ─── Helpers ───────────────────────────────────────────────

/// Classifies a submission body. Anything unparsable counts as approval.
fn parse_submission(body: &[u8]) -> FeedbackOutcome {
    let payload = match serde_json::from_slice::<SubmitPayload>(body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "Malformed submission, treating as approval");
            return FeedbackOutcome::approved(Vec::new());
        }
    };

    let submitted = payload.images.len();
    let outcome = payload.into_outcome();
    if matches!(outcome.kind, OutcomeKind::Approved | OutcomeKind::Adjusted)
        && outcome.images.len() < submitted
    {
        warn!(
            dropped = submitted - outcome.images.len(),
            "Dropped malformed image attachments"
        );
    }
    outcome
}

// ─── Tests ─────────────────────────────────────────────────
