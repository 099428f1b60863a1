// crates/admin-gate-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Recording downstream and codec helpers for gate tests.
// Purpose: Observe exactly which operations reach the downstream API.
// Dependencies: admin-gate-core
// ============================================================================

//! ## Overview
//! Shared fixtures for admin-gate-core integration tests.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use admin_gate_core::CallContext;
use admin_gate_core::ConfirmationGate;
use admin_gate_core::Downstream;
use admin_gate_core::DownstreamError;
use admin_gate_core::FixedClock;
use admin_gate_core::GateSettings;
use admin_gate_core::OperationDescriptor;
use admin_gate_core::PolicyGuard;
use admin_gate_core::TokenCodec;
use admin_gate_core::UploadFile;
use admin_gate_core::UploadOptions;
use admin_gate_core::current_context;
use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Secret used by test codecs.
pub const TEST_SECRET: &[u8] = b"test-signing-secret";

/// Fixed start time for deterministic tokens.
pub const T0: u64 = 1_700_000_000;

/// One observed downstream call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Operation as dispatched.
    pub operation: OperationDescriptor,
    /// Ambient context at dispatch time.
    pub context: Option<CallContext>,
}

/// Downstream that records calls and answers with a fixed body.
#[derive(Debug, Default)]
pub struct RecordingDownstream {
    /// Calls in dispatch order.
    pub calls: Mutex<Vec<RecordedCall>>,
    /// Error returned instead of a body, when set.
    pub fail_with: Mutex<Option<DownstreamError>>,
}

impl RecordingDownstream {
    /// Returns the number of dispatched calls.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns a snapshot of dispatched calls.
    pub fn recorded(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Downstream for RecordingDownstream {
    async fn dispatch(&self, operation: &OperationDescriptor) -> Result<Value, DownstreamError> {
        self.calls.lock().unwrap().push(RecordedCall {
            operation: operation.clone(),
            context: current_context(),
        });
        if let Some(err) = self.fail_with.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(json!({"echo": {"method": operation.method, "url": operation.path}}))
    }

    async fn upload_binary(
        &self,
        path: &str,
        file: UploadFile,
        _options: UploadOptions,
    ) -> Result<Value, DownstreamError> {
        Ok(json!({"path": path, "filename": file.filename}))
    }
}

/// Builds a codec pinned to `clock`.
pub fn codec(clock: &Arc<FixedClock>) -> TokenCodec {
    TokenCodec::with_clock(TEST_SECRET, clock.clone()).unwrap()
}

/// Builds a gate over a recording downstream with default prefixes.
pub fn gate(
    require_confirm: bool,
    clock: &Arc<FixedClock>,
) -> (ConfirmationGate, Arc<RecordingDownstream>) {
    let downstream = Arc::new(RecordingDownstream::default());
    let gate = ConfirmationGate::new(
        PolicyGuard::default(),
        Some(codec(clock)),
        downstream.clone(),
        GateSettings {
            require_confirm,
            ttl_seconds: 300,
        },
    );
    (gate, downstream)
}
