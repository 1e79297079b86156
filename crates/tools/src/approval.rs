//! `request_approval` tool implementation.

use std::sync::Arc;

use async_trait::async_trait;
use proto::{FeedbackHandler, FeedbackRequest, Theme, ToolError, ToolResult};
use serde::Deserialize;
use tracing::{info, warn};

use crate::Tool;
use crate::response::{Wording, format_outcome};

#[derive(Debug, Deserialize)]
struct RequestApprovalArgs {
    #[serde(default)]
    action_description: Option<String>,
}

/// Tool that asks the reviewer to approve or adjust the agent's output.
pub struct RequestApprovalTool {
    handler: Arc<dyn FeedbackHandler>,
    theme: Theme,
}

impl RequestApprovalTool {
    /// Creates the tool on top of `handler`, rendering pages with `theme`.
    pub fn new(handler: Arc<dyn FeedbackHandler>, theme: Theme) -> Self {
        Self { handler, theme }
    }
}

#[async_trait]
impl Tool for RequestApprovalTool {
    fn name(&self) -> &str {
        "request_approval"
    }

    fn description(&self) -> &str {
        "Call this after finishing an output so the user can confirm they are satisfied \
         or give adjustment instructions (optionally with screenshots). \
         Blocks until the user answers."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "action_description": {
                    "type": "string",
                    "description": "Summary of the output you just produced, so the user knows what you did"
                }
            },
            "required": ["action_description"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: RequestApprovalArgs =
            serde_json::from_value(args).map_err(|e| ToolError::InvalidArgs(e.to_string()))?;

        let Some(description) = args
            .action_description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
        else {
            warn!("request_approval called without an action_description");
            return Ok(ToolResult::error(
                "❌ Error: action_description must not be empty",
            ));
        };

        info!(description = %description, "Approval requested");
        let request = FeedbackRequest::new(approval_prompt(description), self.theme);
        let outcome = self.handler.request_feedback(request).await?;
        info!(
            kind = %outcome.kind,
            text_len = outcome.text.len(),
            images = outcome.images.len(),
            "Approval feedback received"
        );

        Ok(format_outcome(&outcome, Wording::Approval))
    }
}

/// Fixed prompt shown to the reviewer.
fn approval_prompt(description: &str) -> String {
    format!(
        "The agent has completed the following output:\n\n{description}\n\n\
         Leave the box empty and confirm if you are satisfied, \
         otherwise enter adjustment instructions:"
    )
}
