//! MCP Routes
//!
//! Model Context Protocol (MCP) Streamable HTTP endpoint exposing the Zuper
//! tool catalog, resources and prompts.
//!
//! Routes:
//! - GET /mcp - SSE stream for server-to-client messages
//! - POST /mcp - JSON-RPC 2.0 requests from client

use std::collections::HashMap;
use std::convert::Infallible;
use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::{header::HeaderName, HeaderMap, HeaderValue, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::get,
    Extension, Json, Router,
};
use futures::stream::StreamExt;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::sync::{broadcast, RwLock};
use tokio_stream::wrappers::BroadcastStream;
use zuper_client::RuntimeContext;

use crate::services::{prompts, resources};
use crate::tools::{self, ToolContext};
use crate::{AppState, Error};

pub const SERVER_NAME: &str = "zuper-fsm-server";
const PROTOCOL_VERSION: &str = "2024-11-05";
const SESSION_HEADER: &str = "mcp-session-id";

// ============================================================================
// Session Management
// ============================================================================

/// An active MCP session with a broadcast channel for SSE events.
struct McpSession {
    created_at: Instant,
    tx: broadcast::Sender<String>,
}

static MCP_SESSIONS: Lazy<RwLock<HashMap<String, McpSession>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Session expiry time (1 hour).
const SESSION_TTL_SECS: u64 = 3600;

/// Cleanup interval (5 minutes).
const CLEANUP_INTERVAL_SECS: u64 = 300;

/// Start background task to clean up expired sessions.
pub fn start_session_cleanup() {
    tokio::spawn(async {
        loop {
            tokio::time::sleep(Duration::from_secs(CLEANUP_INTERVAL_SECS)).await;
            let removed = purge_expired_sessions(Instant::now()).await;
            if removed > 0 {
                tracing::debug!(removed, "Cleaned up MCP sessions");
            }
        }
    });
}

async fn purge_expired_sessions(now: Instant) -> usize {
    let mut sessions = MCP_SESSIONS.write().await;
    let before = sessions.len();
    sessions.retain(|_, session| {
        now.duration_since(session.created_at) < Duration::from_secs(SESSION_TTL_SECS)
    });
    before - sessions.len()
}

/// Build MCP routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(handle_mcp_sse).post(handle_mcp_post))
}

// ============================================================================
// JSON-RPC Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Option<Value>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: None,
            error: Some(JsonRpcError { code, message }),
        }
    }
}

// JSON-RPC error codes
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

/// JSON-RPC code for a failed resource or prompt request.
fn rpc_code(error: &Error) -> i32 {
    match error {
        Error::InvalidParams(_) | Error::InvalidInput(_) | Error::NotFound(_) => INVALID_PARAMS,
        _ => INTERNAL_ERROR,
    }
}

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct ResourceReadParams {
    uri: String,
}

#[derive(Debug, Deserialize)]
struct PromptGetParams {
    name: String,
    #[serde(default)]
    arguments: Map<String, Value>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /mcp
///
/// Opens an SSE stream for the session. Requires valid Mcp-Session-Id header.
async fn handle_mcp_sse(
    headers: HeaderMap,
) -> std::result::Result<
    Sse<impl futures::Stream<Item = std::result::Result<Event, Infallible>>>,
    Response,
> {
    let session_id = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Missing Mcp-Session-Id header"})),
            )
                .into_response()
        })?;

    let sessions = MCP_SESSIONS.read().await;
    let session = sessions.get(session_id).ok_or_else(|| {
        (StatusCode::NOT_FOUND, Json(json!({"error": "Session not found"}))).into_response()
    })?;
    let rx = session.tx.subscribe();
    drop(sessions);

    let stream = BroadcastStream::new(rx).filter_map(|result| async {
        match result {
            Ok(data) => Some(Ok(Event::default().event("message").data(data))),
            Err(_) => None,
        }
    });

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    ))
}

/// POST /mcp
///
/// Creates sessions on initialize, validates sessions on other methods.
/// The body is parsed here so malformed JSON gets a JSON-RPC parse error.
async fn handle_mcp_post(
    headers: HeaderMap,
    State(state): State<AppState>,
    runtime: Option<Extension<RuntimeContext>>,
    body: String,
) -> Response {
    let request: JsonRpcRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            return Json(JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {}", e)))
                .into_response();
        }
    };

    if request.jsonrpc != "2.0" {
        return Json(JsonRpcResponse::error(
            request.id,
            INVALID_REQUEST,
            "Invalid JSON-RPC version".into(),
        ))
        .into_response();
    }

    match request.method.as_str() {
        "initialize" => {
            let session_id = uuid::Uuid::new_v4().to_string();
            let (tx, _) = broadcast::channel(100);
            let session = McpSession {
                created_at: Instant::now(),
                tx,
            };
            MCP_SESSIONS.write().await.insert(session_id.clone(), session);
            tracing::debug!(session_id = %session_id, "Created MCP session");

            let response = Json(handle_initialize(request.id));
            match HeaderValue::from_str(&session_id) {
                Ok(value) => ([(HeaderName::from_static(SESSION_HEADER), value)], response).into_response(),
                Err(_) => response.into_response(),
            }
        }
        "notifications/initialized" | "initialized" => StatusCode::ACCEPTED.into_response(),
        _ => {
            let session_id = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok());
            if let Some(sid) = session_id {
                if !MCP_SESSIONS.read().await.contains_key(sid) {
                    return (
                        StatusCode::NOT_FOUND,
                        Json(json!({"error": "Session not found or expired"})),
                    )
                        .into_response();
                }
            }

            let ctx = state.tool_context(runtime.map(|Extension(r)| r));
            let id = request.id;
            let response = match request.method.as_str() {
                "tools/list" => handle_tools_list(id),
                "tools/call" => handle_tools_call(&ctx, id, request.params).await,
                "resources/list" => handle_resources_list(id),
                "resources/read" => handle_resources_read(&ctx, id, request.params).await,
                "prompts/list" => handle_prompts_list(id),
                "prompts/get" => handle_prompts_get(id, request.params),
                "ping" => JsonRpcResponse::success(id, json!({})),
                _ => JsonRpcResponse::error(
                    id,
                    METHOD_NOT_FOUND,
                    format!("Method not found: {}", request.method),
                ),
            };

            Json(response).into_response()
        }
    }
}

fn handle_initialize(id: Option<Value>) -> JsonRpcResponse {
    JsonRpcResponse::success(
        id,
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            },
            "capabilities": {
                "tools": {},
                "resources": {},
                "prompts": {}
            }
        }),
    )
}

fn handle_tools_list(id: Option<Value>) -> JsonRpcResponse {
    let tools: Vec<Value> = tools::catalog()
        .iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "inputSchema": tool.input_schema,
            })
        })
        .collect();

    JsonRpcResponse::success(id, json!({ "tools": tools }))
}

fn tool_result(text: String, is_error: bool) -> Value {
    let mut result = json!({
        "content": [{"type": "text", "text": text}],
    });
    if is_error {
        result["isError"] = json!(true);
    }
    result
}

async fn handle_tools_call(ctx: &ToolContext, id: Option<Value>, params: Value) -> JsonRpcResponse {
    let call: ToolCallParams = match serde_json::from_value(params) {
        Ok(p) => p,
        Err(e) => {
            return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {}", e));
        }
    };

    if tools::find(&call.name).is_none() {
        return JsonRpcResponse::error(
            id,
            METHOD_NOT_FOUND,
            format!("Tool not found: {}", call.name),
        );
    }

    match tools::execute(ctx, &call.name, call.arguments).await {
        Ok(value) => {
            let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
            JsonRpcResponse::success(id, tool_result(text, false))
        }
        Err(e) => JsonRpcResponse::success(id, tool_result(format!("Error: {}", e), true)),
    }
}

fn handle_resources_list(id: Option<Value>) -> JsonRpcResponse {
    JsonRpcResponse::success(id, json!({ "resources": resources::RESOURCES }))
}

async fn handle_resources_read(ctx: &ToolContext, id: Option<Value>, params: Value) -> JsonRpcResponse {
    let params: ResourceReadParams = match serde_json::from_value(params) {
        Ok(p) => p,
        Err(e) => {
            return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {}", e));
        }
    };

    match resources::read(ctx, &params.uri).await {
        Ok(text) => JsonRpcResponse::success(
            id,
            json!({
                "contents": [{
                    "uri": params.uri,
                    "mimeType": resources::MIME_TYPE,
                    "text": text,
                }]
            }),
        ),
        Err(e) => {
            tracing::warn!(uri = %params.uri, error = %e, "Resource read failed");
            JsonRpcResponse::error(id, rpc_code(&e), e.to_string())
        }
    }
}

fn handle_prompts_list(id: Option<Value>) -> JsonRpcResponse {
    JsonRpcResponse::success(id, json!({ "prompts": prompts::PROMPTS }))
}

fn handle_prompts_get(id: Option<Value>, params: Value) -> JsonRpcResponse {
    let params: PromptGetParams = match serde_json::from_value(params) {
        Ok(p) => p,
        Err(e) => {
            return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {}", e));
        }
    };

    match prompts::render(&params.name, &params.arguments) {
        Ok(text) => {
            let description = prompts::find(&params.name).map(|p| p.description);
            JsonRpcResponse::success(
                id,
                json!({
                    "description": description,
                    "messages": [{
                        "role": "user",
                        "content": {"type": "text", "text": text}
                    }]
                }),
            )
        }
        Err(e) => JsonRpcResponse::error(id, rpc_code(&e), e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_advertises_prompts() {
        let response = handle_initialize(Some(json!(1)));
        let result = response.result.unwrap();
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
        assert!(result["capabilities"].get("prompts").is_some());
    }

    #[test]
    fn test_prompts_get_missing_argument() {
        let response = handle_prompts_get(Some(json!(2)), json!({"name": "generate-invoice"}));
        let error = response.error.unwrap();
        assert_eq!(error.code, INVALID_PARAMS);
        assert!(error.message.contains("jobId"));
    }

    #[test]
    fn test_prompts_get_renders_user_message() {
        let response = handle_prompts_get(
            Some(json!(3)),
            json!({"name": "generate-invoice", "arguments": {"jobId": "job-1"}}),
        );
        let result = response.result.unwrap();
        assert_eq!(result["messages"][0]["role"], "user");
        assert!(result["messages"][0]["content"]["text"]
            .as_str()
            .unwrap()
            .contains("job-1"));
    }

    #[test]
    fn test_tool_result_shape() {
        assert!(tool_result("ok".into(), false).get("isError").is_none());
        assert_eq!(tool_result("Error: x".into(), true)["isError"], true);
    }

    #[tokio::test]
    async fn test_expired_sessions_are_purged() {
        let (tx, _) = broadcast::channel(1);
        let id = uuid::Uuid::new_v4().to_string();
        MCP_SESSIONS.write().await.insert(
            id.clone(),
            McpSession {
                created_at: Instant::now(),
                tx,
            },
        );

        let later = Instant::now() + Duration::from_secs(SESSION_TTL_SECS + 1);
        assert!(purge_expired_sessions(later).await >= 1);
        assert!(!MCP_SESSIONS.read().await.contains_key(&id));
    }
}
