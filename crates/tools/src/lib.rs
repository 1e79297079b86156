//! Tool trait and the feedback tools exposed to the calling agent.
//!
//! Each tool validates its arguments, composes a prompt, asks a
//! [`proto::FeedbackHandler`] for the reviewer's decision, and formats the
//! outcome as MCP tool content.

pub mod approval;
pub mod checkpoint;
pub mod registry;
mod response;
#[cfg(test)]
mod test_support;

pub use approval::RequestApprovalTool;
pub use checkpoint::CheckpointTool;
pub use registry::ToolRegistry;

use async_trait::async_trait;
use proto::{ToolError, ToolResult};

/// Trait that all tools must implement
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name exposed to the agent.
    fn name(&self) -> &str;
    /// Human-readable description for tool selection.
    fn description(&self) -> &str;
    /// JSON schema for accepted tool arguments.
    fn parameters_schema(&self) -> serde_json::Value;
    /// Executes the tool with the given JSON args.
    ///
    /// Content problems (a blank required field) come back as an error
    /// [`ToolResult`]; `Err` is reserved for calls that could not run at all.
    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError>;
}
