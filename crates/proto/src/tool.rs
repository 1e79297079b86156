//! Tool definition and result types exposed over MCP.

use serde::{Deserialize, Serialize};

use crate::feedback::ImageAttachment;

/// Tool metadata advertised by `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable tool description.
    pub description: String,
    /// JSON schema describing accepted arguments.
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

impl ToolDefinition {
    /// Creates a tool definition.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// One entry of a tool result's content list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentPart {
    Text {
        text: String,
    },
    Image {
        /// Base64 payload.
        data: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
}

impl From<&ImageAttachment> for ContentPart {
    fn from(image: &ImageAttachment) -> Self {
        ContentPart::Image {
            data: image.to_base64(),
            mime_type: image.mime_type.clone(),
        }
    }
}

/// Result payload of a `tools/call`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ContentPart>,
    /// Whether this result represents a tool-level error.
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

impl ToolResult {
    /// Creates a successful text result.
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentPart::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Creates an error text result.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentPart::Text { text: text.into() }],
            is_error: true,
        }
    }

    /// Appends image parts after the existing content.
    pub fn with_images(mut self, images: &[ImageAttachment]) -> Self {
        self.content.extend(images.iter().map(ContentPart::from));
        self
    }

    /// Returns the first text part, if any.
    pub fn text(&self) -> Option<&str> {
        self.content.iter().find_map(|part| match part {
            ContentPart::Text { text } => Some(text.as_str()),
            ContentPart::Image { .. } => None,
        })
    }
}
