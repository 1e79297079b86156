//! MCP server loop: one JSON-RPC message per line in, one per line out.

use std::sync::Arc;

use proto::{GatewayError, ToolError};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tools::ToolRegistry;
use tracing::{debug, error, info, warn};

use crate::protocol::{
    INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, InitializeParams, JsonRpcRequest,
    JsonRpcResponse, METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION, ToolCallParams,
};

const SERVER_NAME: &str = "hold-on";
const OUTBOUND_QUEUE: usize = 64;

/// MCP server dispatching `tools/*` calls into a [`ToolRegistry`].
pub struct McpServer {
    registry: ToolRegistry,
    version: String,
}

impl McpServer {
    /// Create a server advertising `version` in `serverInfo`.
    pub fn new(registry: ToolRegistry, version: impl Into<String>) -> Self {
        Self {
            registry,
            version: version.into(),
        }
    }

    /// Serve until `reader` reaches EOF.
    ///
    /// Each request runs on its own task so a blocking tool call does not
    /// stall `ping` or `tools/list`. Responses go through a single writer
    /// task, so output lines never interleave. Calls still in flight at EOF
    /// are awaited before returning.
    pub async fn serve<R, W>(self: Arc<Self>, reader: R, writer: W) -> Result<(), GatewayError>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<JsonRpcResponse>(OUTBOUND_QUEUE);
        let writer_task = tokio::spawn(write_responses(writer, rx));

        let mut lines = BufReader::new(reader).lines();
        let mut in_flight = JoinSet::new();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let server = self.clone();
            let tx = tx.clone();
            in_flight.spawn(async move {
                let Some(response) = server.handle_line(&line).await else {
                    return;
                };
                if tx.send(response).await.is_err() {
                    warn!("Writer closed before response could be sent");
                }
            });

            while let Some(joined) = in_flight.try_join_next() {
                if let Err(e) = joined {
                    error!("Request task failed: {e}");
                }
            }
        }

        if !in_flight.is_empty() {
            info!(pending = in_flight.len(), "Input closed, waiting for in-flight calls");
        }
        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                error!("Request task failed: {e}");
            }
        }

        drop(tx);
        writer_task
            .await
            .map_err(|e| GatewayError::Io(std::io::Error::other(e.to_string())))??;
        info!("MCP server stopped");
        Ok(())
    }

    /// Parse and dispatch one input line.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!("Unparseable message: {e}");
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    PARSE_ERROR,
                    format!("Parse error: {e}"),
                ));
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle(request).await,
            Err(e) => Some(JsonRpcResponse::failure(
                id,
                INVALID_REQUEST,
                format!("Invalid request: {e}"),
            )),
        }
    }

    /// Dispatch one request. Notifications produce no response.
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id else {
            debug!(method = %request.method, "Notification received");
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(id, self.initialize(request.params)),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => {
                JsonRpcResponse::success(id, json!({ "tools": self.registry.definitions() }))
            }
            "tools/call" => self.call_tool(id, request.params).await,
            other => {
                debug!(method = %other, "Unknown method");
                JsonRpcResponse::failure(id, METHOD_NOT_FOUND, format!("Method not found: {other}"))
            }
        };
        Some(response)
    }

    fn initialize(&self, params: Option<Value>) -> Value {
        let requested = params
            .and_then(|p| serde_json::from_value::<InitializeParams>(p).ok())
            .and_then(|p| p.protocol_version);
        let protocol_version = requested.unwrap_or_else(|| PROTOCOL_VERSION.to_string());
        info!(protocol_version = %protocol_version, "Client initialized");

        json!({
            "protocolVersion": protocol_version,
            "capabilities": { "tools": {} },
            "serverInfo": { "name": SERVER_NAME, "version": self.version },
        })
    }

    async fn call_tool(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let Some(params) = params else {
            return JsonRpcResponse::failure(id, INVALID_PARAMS, "Missing params");
        };
        let params: ToolCallParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(e) => {
                return JsonRpcResponse::failure(id, INVALID_PARAMS, format!("Invalid params: {e}"));
            }
        };
        let args = params.arguments.unwrap_or_else(|| json!({}));

        info!(tool = %params.name, "Tool call received");
        match self.registry.execute(&params.name, args).await {
            Ok(result) => match serde_json::to_value(&result) {
                Ok(value) => JsonRpcResponse::success(id, value),
                Err(e) => JsonRpcResponse::failure(id, INTERNAL_ERROR, e.to_string()),
            },
            Err(e @ (ToolError::NotFound(_) | ToolError::InvalidArgs(_))) => {
                warn!(tool = %params.name, "Rejected tool call: {e}");
                JsonRpcResponse::failure(id, INVALID_PARAMS, e.to_string())
            }
            Err(e @ ToolError::Session(_)) => {
                error!(tool = %params.name, "Tool call failed: {e}");
                JsonRpcResponse::failure(id, INTERNAL_ERROR, e.to_string())
            }
        }
    }
}

async fn write_responses<W>(
    mut writer: W,
    mut rx: mpsc::Receiver<JsonRpcResponse>,
) -> Result<(), GatewayError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = serde_json::to_string(&response)
            .map_err(|e| GatewayError::Serialization(e.to_string()))?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proto::{AutoApproveHandler, Theme};
    use tools::{CheckpointTool, RequestApprovalTool};

    fn server() -> McpServer {
        let handler = Arc::new(AutoApproveHandler);
        let mut registry = ToolRegistry::new();
        registry.register(RequestApprovalTool::new(handler.clone(), Theme::Auto));
        registry.register(CheckpointTool::new(handler, Theme::Auto));
        McpServer::new(registry, "0.1.0")
    }

    async fn call(server: &McpServer, line: &str) -> JsonRpcResponse {
        server.handle_line(line).await.expect("response")
    }

    #[tokio::test]
    async fn initialize_echoes_requested_protocol_version() {
        let resp = call(
            &server(),
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26"}}"#,
        )
        .await;
        let result = resp.result.unwrap();
        assert_eq!(result["protocolVersion"], "2025-03-26");
        assert_eq!(result["serverInfo"]["name"], "hold-on");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn initialize_without_params_uses_default_version() {
        let resp = call(&server(), r#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#).await;
        assert_eq!(resp.result.unwrap()["protocolVersion"], PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn notifications_get_no_response() {
        let resp = server()
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(resp.is_none());
    }

    #[tokio::test]
    async fn ping_returns_empty_object() {
        let resp = call(&server(), r#"{"jsonrpc":"2.0","id":"p","method":"ping"}"#).await;
        assert_eq!(resp.id, json!("p"));
        assert_eq!(resp.result, Some(json!({})));
    }

    #[tokio::test]
    async fn tools_list_returns_both_tools() {
        let resp = server()
            .handle(JsonRpcRequest::new(2, "tools/list", None))
            .await
            .expect("response");
        assert_eq!(resp.id, json!(2));
        let result = resp.result.unwrap();
        let names: Vec<&str> = result["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["checkpoint", "request_approval"]);
        assert!(result["tools"][1]["inputSchema"]["properties"]["action_description"].is_object());
    }

    #[tokio::test]
    async fn tools_call_returns_content_and_is_error() {
        let resp = call(
            &server(),
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"request_approval","arguments":{"action_description":"Added tests"}}}"#,
        )
        .await;
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], false);
        assert_eq!(result["content"][0]["type"], "text");
        assert_eq!(
            result["content"][0]["text"],
            "✅ The user is satisfied. Task complete."
        );
    }

    #[tokio::test]
    async fn blank_description_is_a_tool_error_not_a_protocol_error() {
        let resp = call(
            &server(),
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"request_approval","arguments":{"action_description":"  "}}}"#,
        )
        .await;
        assert!(resp.error.is_none());
        assert_eq!(resp.result.unwrap()["isError"], true);
    }

    #[tokio::test]
    async fn unknown_tool_is_invalid_params() {
        let resp = call(
            &server(),
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"nope","arguments":{}}}"#,
        )
        .await;
        assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn wrong_argument_type_is_invalid_params() {
        let resp = server()
            .handle(JsonRpcRequest::new(
                6,
                "tools/call",
                Some(json!({"name": "checkpoint", "arguments": {"summary": ["not", "text"]}})),
            ))
            .await
            .expect("response");
        assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn missing_call_params_is_invalid_params() {
        let resp = call(&server(), r#"{"jsonrpc":"2.0","id":6,"method":"tools/call"}"#).await;
        assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let resp = server()
            .handle(JsonRpcRequest::new(7, "resources/list", None))
            .await
            .expect("response");
        assert_eq!(resp.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn garbage_is_parse_error_with_null_id() {
        let resp = call(&server(), "{not json").await;
        assert_eq!(resp.id, Value::Null);
        assert_eq!(resp.error.unwrap().code, PARSE_ERROR);
    }

    #[tokio::test]
    async fn object_without_method_is_invalid_request() {
        let resp = call(&server(), r#"{"jsonrpc":"2.0","id":8}"#).await;
        assert_eq!(resp.id, json!(8));
        assert_eq!(resp.error.unwrap().code, INVALID_REQUEST);
    }
}
