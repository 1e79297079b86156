//! Shared protocol types for the feedback session, tool dispatcher, and
//! stdio transport.
//!
//! This crate defines the feedback request/outcome model, MCP tool content
//! structures, and strongly-typed error enums shared across the workspace.

pub mod approval;
pub mod error;
pub mod feedback;
pub mod tool;

/// Re-export of the feedback handler seam.
pub use approval::{AutoApproveHandler, FeedbackHandler};
/// Re-export of all protocol error types.
pub use error::*;
/// Re-export of feedback request/outcome types.
pub use feedback::{
    FeedbackOutcome, FeedbackRequest, ImageAttachment, OutcomeKind, SessionId, SubmitAction,
    SubmitPayload, Theme,
};
/// Re-export of tool definition and result types.
pub use tool::{ContentPart, ToolDefinition, ToolResult};
