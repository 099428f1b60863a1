// crates/admin-gate-mcp/src/server.rs
// ============================================================================
// Module: MCP Server
// Description: MCP server implementations for stdio, HTTP, and SSE transports.
// Purpose: Expose Admin Gate tools via JSON-RPC 2.0.
// Dependencies: admin-gate-core, axum, time, tokio
// ============================================================================

//! ## Overview
//! The MCP server exposes the tool catalogue using JSON-RPC 2.0 over stdio,
//! HTTP, or SSE and always routes calls through [`ToolRouter`]. Every request
//! is admitted by [`ToolAuthz`] before it is parsed.
//!
//! stdio accepts newline-delimited JSON or `Content-Length` framed messages
//! and answers each message in the framing it arrived in.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::convert::Infallible;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;

use admin_gate_core::Downstream;
use admin_gate_core::TokenCodec;
use axum::Json;
use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::response::Sse;
use axum::response::sse::Event;
use axum::routing::get;
use axum::routing::post;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::net::TcpListener;
use tokio_stream::wrappers::ReceiverStream;

use crate::audit::AuditSink;
use crate::audit::audit_sink_from_config;
use crate::auth::ADMIN_API_KEY_HEADER;
use crate::auth::ADMIN_AUTH_TYPE_HEADER;
use crate::auth::ADMIN_AUTHORIZATION_HEADER;
use crate::auth::DefaultToolAuthz;
use crate::auth::MCP_API_KEY_HEADER;
use crate::auth::RequestContext;
use crate::auth::ToolAuthz;
use crate::auth::auth_audit_event;
use crate::auth::credential_override_from_headers;
use crate::config::AdminGateConfig;
use crate::config::ServerAuthMode;
use crate::config::ServerTransport;
use crate::downstream::HttpDownstream;
use crate::downstream::HttpDownstreamConfig;
use crate::tooling::ToolDefinition;
use crate::tools::SERVICE_NAME;
use crate::tools::ServerInfo;
use crate::tools::ToolError;
use crate::tools::ToolRouter;
use crate::tools::ToolRouterConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Protocol version answered when the client does not name one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2025-03-26";

/// JSON-RPC path.
const RPC_PATH: &str = "/mcp";

/// Health probe path.
const HEALTH_PATH: &str = "/health";

// ============================================================================
// SECTION: MCP Server
// ============================================================================

/// MCP server instance.
pub struct McpServer {
    /// Server configuration.
    config: AdminGateConfig,
    /// Shared request handling state.
    state: Arc<ServerState>,
}

impl McpServer {
    /// Builds a new MCP server from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when validation or initialization fails.
    pub fn from_config(mut config: AdminGateConfig) -> Result<Self, McpServerError> {
        config.validate().map_err(|err| McpServerError::Config(err.to_string()))?;
        let audit = audit_sink_from_config(&config.audit)
            .map_err(|err| McpServerError::Init(format!("audit sink: {err}")))?;
        let downstream = HttpDownstream::new(HttpDownstreamConfig::from_config(&config.downstream))
            .map_err(|err| McpServerError::Init(err.to_string()))?;
        let server = Self::with_downstream(config, Arc::new(downstream), audit)?;
        emit_startup_warnings(&server.config);
        Ok(server)
    }

    /// Builds a server around an existing downstream executor and audit sink.
    ///
    /// `config` must already be validated.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError::Init`] when the token codec cannot be built.
    pub fn with_downstream(
        config: AdminGateConfig,
        downstream: Arc<dyn Downstream>,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self, McpServerError> {
        let codec = config
            .confirm
            .signing_secret()
            .map(|secret| TokenCodec::new(secret.as_bytes()))
            .transpose()
            .map_err(|err| McpServerError::Init(err.to_string()))?;
        let gate = admin_gate_core::ConfirmationGate::new(
            config.policy.guard(),
            codec,
            Arc::clone(&downstream),
            config.gate_settings(),
        );
        let router = ToolRouter::new(ToolRouterConfig {
            gate,
            downstream,
            audit,
            info: ServerInfo::from_config(&config),
            max_upload_bytes: config.downstream.max_upload_bytes,
            default_credential: config.downstream.default_credential(),
        });
        let state = Arc::new(ServerState {
            router,
            authz: Arc::new(DefaultToolAuthz::from_config(config.server.auth.as_ref())),
            max_body_bytes: config.server.max_body_bytes,
        });
        Ok(Self {
            config,
            state,
        })
    }

    /// Returns the tool router.
    #[must_use]
    pub fn router(&self) -> &ToolRouter {
        &self.state.router
    }

    /// Serves requests using the configured transport.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when the server fails.
    pub async fn serve(self) -> Result<(), McpServerError> {
        match self.config.server.transport {
            ServerTransport::Stdio => {
                let mut reader = BufReader::new(tokio::io::stdin());
                let mut writer = tokio::io::stdout();
                serve_stream(&self.state, &mut reader, &mut writer).await
            }
            ServerTransport::Http | ServerTransport::Sse => {
                let addr = self
                    .config
                    .server
                    .bind_addr()
                    .map_err(|err| McpServerError::Config(err.to_string()))?;
                let listener = TcpListener::bind(addr)
                    .await
                    .map_err(|err| McpServerError::Transport(format!("bind failed: {err}")))?;
                self.serve_listener(listener).await
            }
        }
    }

    /// Serves HTTP or SSE requests on an already bound listener.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when the server fails or the transport is
    /// stdio.
    pub async fn serve_listener(self, listener: TcpListener) -> Result<(), McpServerError> {
        let rpc = match self.config.server.transport {
            ServerTransport::Http => post(handle_http),
            ServerTransport::Sse => post(handle_sse),
            ServerTransport::Stdio => {
                return Err(McpServerError::Config(
                    "stdio transport cannot serve a listener".to_string(),
                ));
            }
        };
        let app = Router::new()
            .route(RPC_PATH, rpc)
            .route(HEALTH_PATH, get(handle_health))
            .with_state(Arc::clone(&self.state));
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .map_err(|err| McpServerError::Transport(format!("http server failed: {err}")))
    }

    /// Serves JSON-RPC over arbitrary byte streams using stdio framing rules.
    ///
    /// Returns when the reader reaches end of input.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError::Transport`] on I/O failure, malformed
    /// framing, or an oversized message.
    pub async fn serve_io<R, W>(&self, reader: &mut R, writer: &mut W) -> Result<(), McpServerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        serve_stream(&self.state, reader, writer).await
    }
}

// ============================================================================
// SECTION: Shared State
// ============================================================================

/// Shared server state for all transports.
struct ServerState {
    /// Tool router for request dispatch.
    router: ToolRouter,
    /// Inbound admission policy.
    authz: Arc<dyn ToolAuthz>,
    /// Maximum allowed request body size.
    max_body_bytes: usize,
}

impl ServerState {
    /// Runs admission for a request and records the decision.
    fn admit(&self, context: &RequestContext) -> Result<(), ToolError> {
        let result = self.authz.authorize(context);
        self.router.audit().record_auth(&auth_audit_event(context, &result));
        result.map(|_| ()).map_err(|err| ToolError::Unauthenticated(err.to_string()))
    }
}

// ============================================================================
// SECTION: Stdio Transport
// ============================================================================

/// Serves JSON-RPC messages until the reader is exhausted.
async fn serve_stream<R, W>(
    state: &ServerState,
    reader: &mut R,
    writer: &mut W,
) -> Result<(), McpServerError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    while let Some(frame) = read_message(reader, state.max_body_bytes).await? {
        let context = RequestContext::stdio();
        let reply = match state.admit(&context) {
            Err(err) => Some(jsonrpc_error(Value::Null, err)),
            Ok(()) => match serde_json::from_slice::<JsonRpcRequest>(&frame.payload) {
                Ok(request) => handle_request(&state.router, &context, request).await,
                Err(_) => Some(invalid_request()),
            },
        };
        if let Some((_, response)) = reply {
            let payload = serde_json::to_vec(&response).map_err(|_| {
                McpServerError::Transport("json-rpc serialization failed".to_string())
            })?;
            write_message(writer, frame.framing, &payload).await?;
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: HTTP Transport
// ============================================================================

/// Outcome of HTTP request processing.
enum HttpReply {
    /// Admission failed.
    Unauthorized,
    /// Notification; nothing to return.
    Accepted,
    /// JSON-RPC response.
    Rpc(StatusCode, JsonRpcResponse),
}

/// Handles HTTP JSON-RPC requests.
async fn handle_http(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let context = http_request_context(ServerTransport::Http, peer, &headers);
    match process_http(&state, &context, body).await {
        HttpReply::Unauthorized => unauthorized_response(),
        HttpReply::Accepted => StatusCode::ACCEPTED.into_response(),
        HttpReply::Rpc(status, response) => (status, Json(response)).into_response(),
    }
}

/// Handles SSE JSON-RPC requests.
async fn handle_sse(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let context = http_request_context(ServerTransport::Sse, peer, &headers);
    let response = match process_http(&state, &context, body).await {
        HttpReply::Unauthorized => return unauthorized_response(),
        HttpReply::Accepted => return StatusCode::ACCEPTED.into_response(),
        HttpReply::Rpc(_, response) => response,
    };
    let (tx, rx) = tokio::sync::mpsc::channel::<Result<Event, Infallible>>(1);
    let payload = serde_json::to_string(&response).unwrap_or_else(|_| {
        "{\"jsonrpc\":\"2.0\",\"id\":null,\"error\":{\"code\":-32060,\"message\":\"serialization \
         failed\"}}"
            .to_string()
    });
    let _ = tx.send(Ok(Event::default().data(payload))).await;
    Sse::new(ReceiverStream::new(rx)).into_response()
}

/// Handles `GET /health`.
async fn handle_health() -> Json<Value> {
    let time = OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default();
    Json(json!({ "ok": true, "service": SERVICE_NAME, "time": time }))
}

/// Admits, reads and dispatches an HTTP request body.
async fn process_http(state: &ServerState, context: &RequestContext, body: Body) -> HttpReply {
    if state.admit(context).is_err() {
        return HttpReply::Unauthorized;
    }
    let Ok(bytes) = axum::body::to_bytes(body, state.max_body_bytes).await else {
        return HttpReply::Rpc(
            StatusCode::PAYLOAD_TOO_LARGE,
            error_response(Value::Null, -32070, "request body too large".to_string()),
        );
    };
    let Ok(request) = serde_json::from_slice::<JsonRpcRequest>(&bytes) else {
        let (status, response) = invalid_request();
        return HttpReply::Rpc(status, response);
    };
    match handle_request(&state.router, context, request).await {
        Some((status, response)) => HttpReply::Rpc(status, response),
        None => HttpReply::Accepted,
    }
}

/// Builds the 401 body for rejected requests.
fn unauthorized_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "ok": false, "error": { "message": "Unauthorized" } })),
    )
        .into_response()
}

/// Builds a request context from HTTP headers.
fn http_request_context(
    transport: ServerTransport,
    peer: SocketAddr,
    headers: &HeaderMap,
) -> RequestContext {
    let header = |name: &str| headers.get(name).and_then(|value| value.to_str().ok());
    let credential_override = credential_override_from_headers(
        header(ADMIN_AUTHORIZATION_HEADER),
        header(ADMIN_API_KEY_HEADER),
        header(ADMIN_AUTH_TYPE_HEADER),
    );
    RequestContext::http(
        transport,
        Some(peer.ip()),
        header(AUTHORIZATION.as_str()).map(str::to_string),
        header(MCP_API_KEY_HEADER).map(str::to_string),
    )
    .with_credential_override(credential_override)
}

// ============================================================================
// SECTION: JSON-RPC Handling
// ============================================================================

/// Incoming JSON-RPC request payload.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    /// JSON-RPC protocol version.
    jsonrpc: String,
    /// Request identifier; absent for notifications.
    #[serde(default)]
    id: Value,
    /// Method name.
    method: String,
    /// Optional parameters payload.
    #[serde(default)]
    params: Option<Value>,
}

/// JSON-RPC response envelope.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    /// JSON-RPC protocol version.
    jsonrpc: &'static str,
    /// Request identifier.
    id: Value,
    /// Successful result payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    /// Error payload when the request fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC error payload.
#[derive(Debug, Serialize)]
struct JsonRpcError {
    /// Error code.
    code: i64,
    /// Human-readable error message.
    message: String,
}

/// Tool call parameters for JSON-RPC requests.
#[derive(Debug, Deserialize)]
struct ToolCallParams {
    /// Tool name.
    name: String,
    /// Raw JSON arguments.
    #[serde(default)]
    arguments: Value,
}

/// Tool list response payload.
#[derive(Debug, Serialize)]
struct ToolListResult {
    /// Registered tool definitions.
    tools: Vec<ToolDefinition>,
}

/// Tool call response payload.
#[derive(Debug, Serialize)]
struct ToolCallResult {
    /// Tool output content.
    content: Vec<ToolContent>,
    /// Set when the tool reports a failure.
    #[serde(rename = "isError", skip_serializing_if = "std::ops::Not::not")]
    is_error: bool,
}

/// Tool output payloads for JSON-RPC responses.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ToolContent {
    /// Text tool output.
    Text {
        /// Pretty-printed JSON payload.
        text: String,
    },
}

/// Dispatches a JSON-RPC request. Returns `None` for notifications.
async fn handle_request(
    router: &ToolRouter,
    base_context: &RequestContext,
    request: JsonRpcRequest,
) -> Option<(StatusCode, JsonRpcResponse)> {
    if request.method.starts_with("notifications/") {
        return None;
    }
    let id = request.id;
    if request.jsonrpc != "2.0" {
        return Some((
            StatusCode::BAD_REQUEST,
            error_response(id, -32600, "invalid json-rpc version".to_string()),
        ));
    }
    let context = base_context.clone().with_request_id(id.to_string());
    let reply = match request.method.as_str() {
        "initialize" => {
            let requested = request
                .params
                .as_ref()
                .and_then(|params| params.get("protocolVersion"))
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_PROTOCOL_VERSION);
            success(
                id,
                json!({
                    "protocolVersion": requested,
                    "capabilities": { "tools": { "listChanged": false } },
                    "serverInfo": { "name": SERVICE_NAME, "version": env!("CARGO_PKG_VERSION") },
                }),
            )
        }
        "ping" => success(id, json!({})),
        "tools/list" => match serde_json::to_value(ToolListResult {
            tools: router.list_tools(),
        }) {
            Ok(value) => success(id, value),
            Err(_) => jsonrpc_error(id, ToolError::Serialization),
        },
        "tools/call" => {
            let params = request.params.unwrap_or(Value::Null);
            match serde_json::from_value::<ToolCallParams>(params) {
                Ok(call) => {
                    let result =
                        router.handle_tool_call(&context, &call.name, call.arguments).await;
                    match result {
                        Ok(response) => {
                            render_tool_result(id, &response.payload, response.is_error)
                        }
                        Err(err) => jsonrpc_error(id, err),
                    }
                }
                Err(_) => (
                    StatusCode::BAD_REQUEST,
                    error_response(id, -32602, "invalid tool params".to_string()),
                ),
            }
        }
        _ => (StatusCode::BAD_REQUEST, error_response(id, -32601, "method not found".to_string())),
    };
    Some(reply)
}

/// Wraps a tool payload as MCP text content.
fn render_tool_result(id: Value, payload: &Value, is_error: bool) -> (StatusCode, JsonRpcResponse) {
    let Ok(text) = serde_json::to_string_pretty(payload) else {
        return jsonrpc_error(id, ToolError::Serialization);
    };
    match serde_json::to_value(ToolCallResult {
        content: vec![ToolContent::Text {
            text,
        }],
        is_error,
    }) {
        Ok(value) => success(id, value),
        Err(_) => jsonrpc_error(id, ToolError::Serialization),
    }
}

/// Builds a success response.
const fn success(id: Value, result: Value) -> (StatusCode, JsonRpcResponse) {
    (
        StatusCode::OK,
        JsonRpcResponse {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        },
    )
}

/// Builds an error envelope.
const fn error_response(id: Value, code: i64, message: String) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0",
        id,
        result: None,
        error: Some(JsonRpcError {
            code,
            message,
        }),
    }
}

/// Response for unparseable requests.
const fn invalid_request() -> (StatusCode, JsonRpcResponse) {
    (
        StatusCode::BAD_REQUEST,
        error_response(Value::Null, -32600, String::new()),
    )
}

/// Builds a JSON-RPC error response for a tool failure.
fn jsonrpc_error(id: Value, error: ToolError) -> (StatusCode, JsonRpcResponse) {
    let (status, code, message) = match error {
        ToolError::UnknownTool => (StatusCode::BAD_REQUEST, -32601, "unknown tool".to_string()),
        ToolError::Unauthenticated(_) => {
            (StatusCode::UNAUTHORIZED, -32001, "unauthenticated".to_string())
        }
        ToolError::InvalidParams(message) => (StatusCode::BAD_REQUEST, -32602, message),
        ToolError::Gate(err) => (StatusCode::OK, -32010, err.to_string()),
        ToolError::Downstream(err) => (StatusCode::OK, -32020, err.to_string()),
        ToolError::Internal(message) => (StatusCode::OK, -32050, message),
        ToolError::Serialization => (StatusCode::OK, -32060, "serialization failed".to_string()),
    };
    (status, error_response(id, code, message))
}

/// Writes startup posture warnings to stderr.
fn emit_startup_warnings(config: &AdminGateConfig) {
    let mut stderr = std::io::stderr();
    if config.server.transport != ServerTransport::Stdio
        && config.server.auth_mode() == ServerAuthMode::LocalOnly
    {
        let _ = writeln!(
            stderr,
            "admin-gate: WARNING: server running in local-only mode without explicit auth; \
             configure server.auth to enable bearer_token"
        );
    }
    if !config.confirm.require_confirm {
        let _ = writeln!(
            stderr,
            "admin-gate: WARNING: confirmation disabled; write tools execute immediately unless \
             dry_run is true"
        );
    }
    if config.downstream.default_credential().is_none() {
        let _ = writeln!(
            stderr,
            "admin-gate: WARNING: no default downstream credential; calls without override \
             headers are sent unauthenticated"
        );
    }
}

// ============================================================================
// SECTION: Framing Helpers
// ============================================================================

/// Framing used by one stdio message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
    /// One JSON document per line.
    Newline,
    /// MCP `Content-Length` header block.
    ContentLength,
}

/// One inbound stdio message.
#[derive(Debug)]
struct Frame {
    /// Framing the message arrived in.
    framing: Framing,
    /// Raw JSON bytes.
    payload: Vec<u8>,
}

/// Reads one message; `None` at end of input.
async fn read_message<R>(
    reader: &mut R,
    max_body_bytes: usize,
) -> Result<Option<Frame>, McpServerError>
where
    R: AsyncBufRead + Unpin,
{
    let line_limit = u64::try_from(max_body_bytes).unwrap_or(u64::MAX).saturating_add(2);
    let mut line = String::new();
    loop {
        line.clear();
        let read = read_bounded_line(reader, &mut line, line_limit).await?;
        if read == 0 {
            return Ok(None);
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !is_header_line(trimmed) {
            if trimmed.len() > max_body_bytes {
                return Err(McpServerError::Transport("payload too large".to_string()));
            }
            return Ok(Some(Frame {
                framing: Framing::Newline,
                payload: trimmed.as_bytes().to_vec(),
            }));
        }
        let mut content_length = parse_content_length(trimmed)?;
        loop {
            line.clear();
            let read = read_bounded_line(reader, &mut line, line_limit).await?;
            if read == 0 {
                return Err(McpServerError::Transport("stdio closed".to_string()));
            }
            let header = line.trim();
            if header.is_empty() {
                break;
            }
            if let Some(len) = parse_content_length(header)? {
                content_length = Some(len);
            }
        }
        let len = content_length
            .ok_or_else(|| McpServerError::Transport("missing content length".to_string()))?;
        if len > max_body_bytes {
            return Err(McpServerError::Transport("payload too large".to_string()));
        }
        let mut payload = vec![0u8; len];
        reader
            .read_exact(&mut payload)
            .await
            .map_err(|_| McpServerError::Transport("stdio read failed".to_string()))?;
        return Ok(Some(Frame {
            framing: Framing::ContentLength,
            payload,
        }));
    }
}

/// Reads one line of at most `limit` bytes.
async fn read_bounded_line<R>(
    reader: &mut R,
    line: &mut String,
    limit: u64,
) -> Result<usize, McpServerError>
where
    R: AsyncBufRead + Unpin,
{
    let read = (&mut *reader)
        .take(limit)
        .read_line(line)
        .await
        .map_err(|_| McpServerError::Transport("stdio read failed".to_string()))?;
    if u64::try_from(read).unwrap_or(u64::MAX) >= limit && !line.ends_with('\n') {
        return Err(McpServerError::Transport("payload too large".to_string()));
    }
    Ok(read)
}

/// Returns true when a line starts a header block rather than a JSON document.
fn is_header_line(line: &str) -> bool {
    !line.starts_with('{') && !line.starts_with('[') && line.contains(':')
}

/// Parses a `Content-Length` header; `None` for other headers.
fn parse_content_length(line: &str) -> Result<Option<usize>, McpServerError> {
    let Some((name, value)) = line.split_once(':') else {
        return Ok(None);
    };
    if !name.trim().eq_ignore_ascii_case("content-length") {
        return Ok(None);
    }
    value
        .trim()
        .parse::<usize>()
        .map(Some)
        .map_err(|_| McpServerError::Transport("invalid content length".to_string()))
}

/// Writes one message in the given framing.
async fn write_message<W>(
    writer: &mut W,
    framing: Framing,
    payload: &[u8],
) -> Result<(), McpServerError>
where
    W: AsyncWrite + Unpin,
{
    let write_failed =
        |_: std::io::Error| McpServerError::Transport("stdio write failed".to_string());
    match framing {
        Framing::Newline => {
            writer.write_all(payload).await.map_err(write_failed)?;
            writer.write_all(b"\n").await.map_err(write_failed)?;
        }
        Framing::ContentLength => {
            let header = format!("Content-Length: {}\r\n\r\n", payload.len());
            writer.write_all(header.as_bytes()).await.map_err(write_failed)?;
            writer.write_all(payload).await.map_err(write_failed)?;
        }
    }
    writer.flush().await.map_err(write_failed)
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// MCP server errors.
#[derive(Debug, thiserror::Error)]
pub enum McpServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        clippy::dbg_macro,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        reason = "Test-only framing assertions."
    )]

    use super::Framing;
    use super::read_message;
    use super::write_message;

    const PAYLOAD: &[u8] = br#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#;

    fn framed(payload: &[u8]) -> Vec<u8> {
        let mut bytes = format!("Content-Length: {}\r\n\r\n", payload.len()).into_bytes();
        bytes.extend_from_slice(payload);
        bytes
    }

    #[tokio::test]
    async fn read_message_rejects_framed_payload_over_limit() {
        let bytes = framed(PAYLOAD);
        let mut reader = bytes.as_slice();
        let result = read_message(&mut reader, PAYLOAD.len() - 1).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn read_message_accepts_framed_payload_at_limit() {
        let bytes = framed(PAYLOAD);
        let mut reader = bytes.as_slice();
        let frame = read_message(&mut reader, PAYLOAD.len()).await.unwrap().expect("frame");
        assert_eq!(frame.framing, Framing::ContentLength);
        assert_eq!(frame.payload, PAYLOAD);
    }

    #[tokio::test]
    async fn read_message_accepts_extra_headers_before_length() {
        let mut bytes = format!(
            "Content-Type: application/vscode-jsonrpc; charset=utf-8\r\nContent-Length: {}\r\n\r\n",
            PAYLOAD.len()
        )
        .into_bytes();
        bytes.extend_from_slice(PAYLOAD);
        let mut reader = bytes.as_slice();
        let frame = read_message(&mut reader, 4096).await.unwrap().expect("frame");
        assert_eq!(frame.framing, Framing::ContentLength);
        assert_eq!(frame.payload, PAYLOAD);
    }

    #[tokio::test]
    async fn read_message_reads_newline_delimited_json() {
        let mut bytes = b"\n".to_vec();
        bytes.extend_from_slice(PAYLOAD);
        bytes.extend_from_slice(b"\n");
        bytes.extend_from_slice(PAYLOAD);
        bytes.extend_from_slice(b"\n");
        let mut reader = bytes.as_slice();
        let first = read_message(&mut reader, 4096).await.unwrap().expect("first");
        let second = read_message(&mut reader, 4096).await.unwrap().expect("second");
        assert_eq!(first.framing, Framing::Newline);
        assert_eq!(first.payload, PAYLOAD);
        assert_eq!(second.payload, PAYLOAD);
        assert!(read_message(&mut reader, 4096).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn read_message_rejects_long_lines() {
        let mut bytes = PAYLOAD.to_vec();
        bytes.extend_from_slice(b"\n");
        let mut reader = bytes.as_slice();
        assert!(read_message(&mut reader, 8).await.is_err());
    }

    #[tokio::test]
    async fn write_message_uses_requested_framing() {
        let mut out = Vec::new();
        write_message(&mut out, Framing::Newline, b"{}").await.unwrap();
        assert_eq!(out, b"{}\n");
        let mut out = Vec::new();
        write_message(&mut out, Framing::ContentLength, b"{}").await.unwrap();
        assert_eq!(out, b"Content-Length: 2\r\n\r\n{}");
    }
}
