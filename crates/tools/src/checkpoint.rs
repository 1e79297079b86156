//! `checkpoint` tool implementation.

use std::sync::Arc;

use async_trait::async_trait;
use proto::{FeedbackHandler, FeedbackRequest, Theme, ToolError, ToolResult};
use serde::Deserialize;
use tracing::{info, warn};

use crate::Tool;
use crate::response::{Wording, format_outcome};

#[derive(Debug, Deserialize)]
struct CheckpointArgs {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    options: Option<String>,
}

/// Tool that pauses at a milestone so the reviewer can confirm the direction.
pub struct CheckpointTool {
    handler: Arc<dyn FeedbackHandler>,
    theme: Theme,
}

impl CheckpointTool {
    /// Creates the tool on top of `handler`, rendering pages with `theme`.
    pub fn new(handler: Arc<dyn FeedbackHandler>, theme: Theme) -> Self {
        Self { handler, theme }
    }
}

#[async_trait]
impl Tool for CheckpointTool {
    fn name(&self) -> &str {
        "checkpoint"
    }

    fn description(&self) -> &str {
        "Set a checkpoint at a key point of a discussion or task so the user can \
         confirm the direction is right or choose what happens next."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "summary": {
                    "type": "string",
                    "description": "Short summary of the progress so far"
                },
                "options": {
                    "type": "string",
                    "description": "Optional comma-separated next steps (e.g. \"A: continue, B: change direction, C: stop\")"
                }
            },
            "required": ["summary"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: CheckpointArgs =
            serde_json::from_value(args).map_err(|e| ToolError::InvalidArgs(e.to_string()))?;

        let Some(summary) = args
            .summary
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            warn!("checkpoint called without a summary");
            return Ok(ToolResult::error("❌ Error: summary must not be empty"));
        };
        let options = args
            .options
            .as_deref()
            .map(str::trim)
            .filter(|o| !o.is_empty());

        info!(summary = %summary, options = ?options, "Checkpoint reached");
        let request = FeedbackRequest::new(checkpoint_prompt(summary, options), self.theme);
        let outcome = self.handler.request_feedback(request).await?;
        info!(
            kind = %outcome.kind,
            text_len = outcome.text.len(),
            images = outcome.images.len(),
            "Checkpoint feedback received"
        );

        Ok(format_outcome(&outcome, Wording::Checkpoint))
    }
}

fn checkpoint_prompt(summary: &str, options: Option<&str>) -> String {
    let mut prompt = format!("📍 Checkpoint\n\n{summary}");
    if let Some(options) = options {
        prompt.push_str(&format!("\n\nOptions: {options}"));
    }
    prompt.push_str("\n\nLeave the box empty to continue, otherwise enter instructions:");
    prompt
}
