// crates/admin-gate-mcp/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Recording downstream, audit capture and router builders.
// Purpose: Drive the tool router without a live admin API.
// Dependencies: admin-gate-mcp, admin-gate-core
// ============================================================================

//! ## Overview
//! Shared fixtures for admin-gate-mcp integration tests.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use admin_gate_core::CallContext;
use admin_gate_core::Downstream;
use admin_gate_core::DownstreamError;
use admin_gate_core::OperationDescriptor;
use admin_gate_core::UploadFile;
use admin_gate_core::UploadOptions;
use admin_gate_core::current_context;
use admin_gate_mcp::AdminGateConfig;
use admin_gate_mcp::AuditSink;
use admin_gate_mcp::AuthAuditEvent;
use admin_gate_mcp::McpServer;
use admin_gate_mcp::RequestContext;
use admin_gate_mcp::ToolCallAuditEvent;
use admin_gate_mcp::ToolRouter;
use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Downstream
// ============================================================================

/// Signing secret used by test configs.
pub const TEST_SECRET: &str = "test-signing-secret";

/// One observed upload.
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    /// Upload path.
    pub path: String,
    /// Uploaded file.
    pub file: UploadFile,
    /// Upload flags.
    pub options: UploadOptions,
}

/// Downstream that records calls and echoes them back.
#[derive(Debug, Default)]
pub struct RecordingDownstream {
    /// Dispatched operations with their ambient context.
    pub calls: Mutex<Vec<(OperationDescriptor, Option<CallContext>)>>,
    /// Uploads in call order.
    pub uploads: Mutex<Vec<RecordedUpload>>,
    /// Error returned instead of a body, when set.
    pub fail_with: Mutex<Option<DownstreamError>>,
}

impl RecordingDownstream {
    /// Returns the number of dispatched operations.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns the dispatched operations.
    pub fn operations(&self) -> Vec<OperationDescriptor> {
        self.calls.lock().unwrap().iter().map(|(op, _)| op.clone()).collect()
    }

    /// Returns the ambient context of the last dispatch.
    pub fn last_context(&self) -> Option<CallContext> {
        self.calls.lock().unwrap().last().and_then(|(_, ctx)| ctx.clone())
    }
}

#[async_trait]
impl Downstream for RecordingDownstream {
    async fn dispatch(&self, operation: &OperationDescriptor) -> Result<Value, DownstreamError> {
        self.calls.lock().unwrap().push((operation.clone(), current_context()));
        if let Some(err) = self.fail_with.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(json!({"echo": {"method": operation.method, "url": operation.path}}))
    }

    async fn upload_binary(
        &self,
        path: &str,
        file: UploadFile,
        options: UploadOptions,
    ) -> Result<Value, DownstreamError> {
        let filename = file.filename.clone();
        let len = file.bytes.len();
        self.uploads.lock().unwrap().push(RecordedUpload {
            path: path.to_string(),
            file,
            options,
        });
        Ok(json!({"files": [{"filename": filename, "size": len}]}))
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink that keeps events in memory.
#[derive(Debug, Default)]
pub struct CapturingAudit {
    /// Tool call events.
    pub calls: Mutex<Vec<ToolCallAuditEvent>>,
    /// Auth events.
    pub auth: Mutex<Vec<AuthAuditEvent>>,
}

impl CapturingAudit {
    /// Returns the tool call events serialized to JSON.
    pub fn call_events(&self) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|event| serde_json::to_value(event).unwrap())
            .collect()
    }
}

impl AuditSink for CapturingAudit {
    fn record(&self, event: &ToolCallAuditEvent) {
        self.calls.lock().unwrap().push(event.clone());
    }

    fn record_auth(&self, event: &AuthAuditEvent) {
        self.auth.lock().unwrap().push(event.clone());
    }
}

// ============================================================================
// SECTION: Builders
// ============================================================================

/// Base config pointing at a placeholder admin API.
pub fn base_config() -> AdminGateConfig {
    let mut config = AdminGateConfig::default();
    config.downstream.base_url = "http://127.0.0.1:9".to_string();
    config.downstream.secret = Some("sk_default".to_string());
    config.confirm.secret = Some(TEST_SECRET.to_string());
    config
}

/// Harness bundling a router with its recording collaborators.
pub struct Harness {
    /// Router under test.
    pub router: ToolRouter,
    /// Recording downstream.
    pub downstream: Arc<RecordingDownstream>,
    /// Captured audit events.
    pub audit: Arc<CapturingAudit>,
}

impl Harness {
    /// Calls a tool from a stdio context.
    pub async fn call(&self, name: &str, arguments: Value) -> (Value, bool) {
        self.call_with(&RequestContext::stdio(), name, arguments).await
    }

    /// Calls a tool with an explicit request context.
    pub async fn call_with(
        &self,
        context: &RequestContext,
        name: &str,
        arguments: Value,
    ) -> (Value, bool) {
        let response = self.router.handle_tool_call(context, name, arguments).await.unwrap();
        (response.payload, response.is_error)
    }
}

/// Builds a harness from `config`.
pub fn harness_with(mut config: AdminGateConfig) -> Harness {
    config.validate().unwrap();
    let downstream = Arc::new(RecordingDownstream::default());
    let audit = Arc::new(CapturingAudit::default());
    let server = McpServer::with_downstream(config, downstream.clone(), audit.clone()).unwrap();
    Harness {
        router: server.router().clone(),
        downstream,
        audit,
    }
}

/// Builds a harness with default posture.
pub fn harness() -> Harness {
    harness_with(base_config())
}
