// crates/admin-gate-mcp/src/audit.rs
// ============================================================================
// Module: MCP Audit Logging
// Description: Structured audit events for tool calls and inbound auth.
// Purpose: Emit redacted JSON-line audit records without a logging framework.
// Dependencies: admin-gate-core, serde
// ============================================================================

//! ## Overview
//! Audit events are serialized as single JSON lines. Sinks write to stderr, to
//! an append-only file, or nowhere. Events never carry credential values or
//! raw confirm tokens; tokens appear only as a SHA-256 fingerprint prefix.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use admin_gate_core::CredentialSource;
use admin_gate_core::Method;
use serde::Serialize;

use crate::config::AuditConfig;
use crate::config::ServerTransport;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome label for a tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolOutcome {
    /// Non-gated tool completed.
    Ok,
    /// Tool failed.
    Error,
    /// A proposal was minted.
    DryRun,
    /// A mutation or confirmed proposal was dispatched.
    Executed,
}

/// Tool call audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct ToolCallAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Request identifier when provided.
    pub request_id: Option<String>,
    /// Transport used for the request.
    pub transport: ServerTransport,
    /// Tool name as requested.
    pub tool: String,
    /// Call outcome.
    pub outcome: ToolOutcome,
    /// Downstream method, when an operation was built.
    pub method: Option<Method>,
    /// Downstream path, when an operation was built.
    pub path: Option<String>,
    /// Downstream HTTP status for rejected calls.
    pub downstream_status: Option<u16>,
    /// Provenance of the downstream credential.
    pub credential_source: Option<CredentialSource>,
    /// Confirm token fingerprint (minted or presented).
    pub token_fingerprint: Option<String>,
    /// Error message for failed calls.
    pub error: Option<String>,
}

/// Inputs required to construct a tool call audit event.
pub struct ToolCallAuditEventParams {
    /// Request identifier when provided.
    pub request_id: Option<String>,
    /// Transport used for the request.
    pub transport: ServerTransport,
    /// Tool name as requested.
    pub tool: String,
    /// Call outcome.
    pub outcome: ToolOutcome,
    /// Downstream method.
    pub method: Option<Method>,
    /// Downstream path.
    pub path: Option<String>,
    /// Downstream HTTP status.
    pub downstream_status: Option<u16>,
    /// Credential provenance.
    pub credential_source: Option<CredentialSource>,
    /// Confirm token fingerprint.
    pub token_fingerprint: Option<String>,
    /// Error message.
    pub error: Option<String>,
}

impl ToolCallAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: ToolCallAuditEventParams) -> Self {
        Self {
            event: "tool_call",
            timestamp_ms: now_millis(),
            request_id: params.request_id,
            transport: params.transport,
            tool: params.tool,
            outcome: params.outcome,
            method: params.method,
            path: params.path,
            downstream_status: params.downstream_status,
            credential_source: params.credential_source,
            token_fingerprint: params.token_fingerprint,
            error: params.error,
        }
    }
}

/// Inbound auth audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct AuthAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Decision outcome (`allow` or `deny`).
    pub decision: &'static str,
    /// Transport used for the request.
    pub transport: ServerTransport,
    /// Caller IP address (if available).
    pub peer_ip: Option<String>,
    /// Auth method label.
    pub auth_method: Option<&'static str>,
    /// Bearer key fingerprint.
    pub key_fingerprint: Option<String>,
    /// Failure reason (for deny events).
    pub reason: Option<String>,
    /// Request identifier (if provided).
    pub request_id: Option<String>,
}

impl AuthAuditEvent {
    /// Builds an event with a consistent timestamp.
    #[must_use]
    pub fn new(decision: &'static str, transport: ServerTransport) -> Self {
        Self {
            event: "auth",
            timestamp_ms: now_millis(),
            decision,
            transport,
            peer_ip: None,
            auth_method: None,
            key_fingerprint: None,
            reason: None,
            request_id: None,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for MCP events.
pub trait AuditSink: Send + Sync {
    /// Record a tool call event.
    fn record(&self, event: &ToolCallAuditEvent);

    /// Record an inbound auth event.
    fn record_auth(&self, _event: &AuthAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &ToolCallAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_auth(&self, event: &AuthAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one serialized line.
    fn append(&self, payload: &str) {
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &ToolCallAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            self.append(&payload);
        }
    }

    fn record_auth(&self, event: &AuthAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            self.append(&payload);
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &ToolCallAuditEvent) {}

    fn record_auth(&self, _event: &AuthAuditEvent) {}
}

/// Builds the configured sink.
///
/// # Errors
///
/// Returns an error when the audit file cannot be opened.
pub fn audit_sink_from_config(config: &AuditConfig) -> io::Result<Arc<dyn AuditSink>> {
    if !config.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match &config.path {
        Some(path) => Ok(Arc::new(FileAuditSink::new(Path::new(path))?)),
        None => Ok(Arc::new(StderrAuditSink)),
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Milliseconds since the Unix epoch.
fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        reason = "Test-only audit assertions."
    )]

    use super::AuditSink;
    use super::AuthAuditEvent;
    use super::FileAuditSink;
    use super::ToolCallAuditEvent;
    use super::ToolCallAuditEventParams;
    use super::ToolOutcome;
    use crate::config::ServerTransport;

    #[test]
    fn file_sink_appends_json_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("audit.jsonl");
        let sink = FileAuditSink::new(&path).expect("open sink");
        sink.record(&ToolCallAuditEvent::new(ToolCallAuditEventParams {
            request_id: Some("1".to_string()),
            transport: ServerTransport::Stdio,
            tool: "admin_delete_product".to_string(),
            outcome: ToolOutcome::DryRun,
            method: None,
            path: Some("/admin/products/p1".to_string()),
            downstream_status: None,
            credential_source: None,
            token_fingerprint: Some("0123456789abcdef".to_string()),
            error: None,
        }));
        sink.record_auth(&AuthAuditEvent::new("deny", ServerTransport::Http));

        let content = std::fs::read_to_string(&path).expect("read audit");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).expect("json line");
        assert_eq!(first["event"], "tool_call");
        assert_eq!(first["outcome"], "dry_run");
        assert_eq!(first["transport"], "stdio");
        let second: serde_json::Value = serde_json::from_str(lines[1]).expect("json line");
        assert_eq!(second["event"], "auth");
        assert_eq!(second["decision"], "deny");
    }
}
