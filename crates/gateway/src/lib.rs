//! MCP stdio transport exposing the feedback tools to a coding agent.

pub mod protocol;
pub mod server;

/// JSON-RPC framing types.
pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
/// Newline-delimited JSON-RPC server over any async byte stream.
pub use server::McpServer;
