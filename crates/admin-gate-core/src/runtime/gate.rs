// crates/admin-gate-core/src/runtime/gate.rs
// ============================================================================
// Module: Confirmation Gate
// Description: Plan-or-execute decision and confirm replay for mutations.
// Purpose: Turn writes into signed proposals unless the caller opts out.
// Dependencies: crate::core, crate::interfaces, serde_json
// ============================================================================

//! ## Overview
//! [`ConfirmationGate::plan_or_execute`] guards the path, then either mints a
//! proposal token (dry run) or dispatches immediately.
//! [`ConfirmationGate::confirm`] verifies a token, re-checks the embedded path
//! against the current allow-list, and dispatches unconditionally.
//!
//! ## Invariants
//! - No downstream call happens before the path passes the guard.
//! - Dry run defaults to the resolved confirmation requirement.
//! - A missing signing secret fails closed whenever a token would be minted
//!   or verified.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::core::OperationDescriptor;
use crate::core::PolicyGuard;
use crate::core::PolicyViolation;
use crate::core::TokenCodec;
use crate::core::TokenError;
use crate::core::token::DEFAULT_TTL_SECONDS;
use crate::interfaces::Downstream;
use crate::interfaces::DownstreamError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Tool name callers use to confirm a proposal.
pub const CONFIRM_TOOL_NAME: &str = "admin_confirm";

/// Guidance attached to every plan result.
const PLAN_NOTE: &str = "No changes were made. Review the plan, then call admin_confirm with \
                         confirm_token to execute it before the token expires.";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Gate failures. All are caller-visible and none are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// Path rejected by the allow-list.
    #[error(transparent)]
    Policy(#[from] PolicyViolation),
    /// Token protocol failure.
    #[error(transparent)]
    Token(#[from] TokenError),
    /// Downstream API failure.
    #[error(transparent)]
    Downstream(#[from] DownstreamError),
    /// A proposal was requested but no signing secret is configured.
    #[error("confirmation tokens are unavailable: no signing secret is configured")]
    ConfirmUnavailable,
}

impl GateError {
    /// Returns the downstream HTTP status, when the failure carries one.
    #[must_use]
    pub const fn downstream_status(&self) -> Option<u16> {
        match self {
            Self::Downstream(err) => err.status(),
            Self::Policy(_) | Self::Token(_) | Self::ConfirmUnavailable => None,
        }
    }
}

// ============================================================================
// SECTION: Settings and Options
// ============================================================================

/// Process-wide gate policy, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateSettings {
    /// Whether mutations default to a dry-run proposal.
    pub require_confirm: bool,
    /// Proposal lifetime in seconds.
    pub ttl_seconds: u64,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            require_confirm: true,
            ttl_seconds: DEFAULT_TTL_SECONDS,
        }
    }
}

/// Per-call overrides for [`ConfirmationGate::plan_or_execute`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateOptions {
    /// Overrides [`GateSettings::require_confirm`] for this call.
    pub require_confirm: Option<bool>,
    /// Explicit dry-run choice; defaults to the resolved confirm requirement.
    pub dry_run: Option<bool>,
}

impl GateOptions {
    /// Options carrying only a caller dry-run flag.
    #[must_use]
    pub const fn dry_run(dry_run: Option<bool>) -> Self {
        Self {
            require_confirm: None,
            dry_run,
        }
    }
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Minted proposal awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    /// Normalized operation embedded in the token.
    pub plan: OperationDescriptor,
    /// Signed confirm token.
    pub confirm_token: String,
    /// Token lifetime in seconds.
    pub ttl_seconds: u64,
}

/// Completed downstream call.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    /// Operation that was dispatched.
    pub operation: OperationDescriptor,
    /// Parsed downstream response body.
    pub data: Value,
}

impl Execution {
    /// Renders the read result shape.
    #[must_use]
    pub fn to_read_json(&self) -> Value {
        json!({ "ok": true, "data": self.data })
    }

    /// Renders the confirm result shape.
    #[must_use]
    pub fn to_confirm_json(&self) -> Value {
        let mut executed = json!({
            "method": self.operation.method,
            "url": self.operation.path,
        });
        if let (Some(query), Some(map)) = (&self.operation.query, executed.as_object_mut()) {
            map.insert("query".to_string(), json!(query));
        }
        json!({
            "ok": true,
            "mode": "executed",
            "executed": executed,
            "data": self.data,
        })
    }
}

/// Result of [`ConfirmationGate::plan_or_execute`].
#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    /// A proposal was minted; nothing was sent downstream.
    DryRun(Proposal),
    /// The operation was dispatched.
    Executed(Execution),
}

impl GateOutcome {
    /// Returns true when the outcome is a proposal.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        matches!(self, Self::DryRun(_))
    }

    /// Renders the caller-facing result shape.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::DryRun(proposal) => json!({
                "ok": true,
                "mode": "dry_run",
                "plan": proposal.plan,
                "confirm_tool": CONFIRM_TOOL_NAME,
                "confirm_token": proposal.confirm_token,
                "ttl_seconds": proposal.ttl_seconds,
                "note": PLAN_NOTE,
            }),
            Self::Executed(execution) => json!({
                "ok": true,
                "mode": "executed",
                "data": execution.data,
            }),
        }
    }
}

// ============================================================================
// SECTION: Gate
// ============================================================================

/// Plan-or-execute decision point for mutating operations.
#[derive(Clone)]
pub struct ConfirmationGate {
    /// Path allow-list.
    guard: PolicyGuard,
    /// Token codec; `None` when no signing secret is configured.
    codec: Option<TokenCodec>,
    /// Downstream executor.
    downstream: Arc<dyn Downstream>,
    /// Startup policy.
    settings: GateSettings,
}

impl std::fmt::Debug for ConfirmationGate {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ConfirmationGate")
            .field("guard", &self.guard)
            .field("codec", &self.codec)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ConfirmationGate {
    /// Builds a gate.
    #[must_use]
    pub fn new(
        guard: PolicyGuard,
        codec: Option<TokenCodec>,
        downstream: Arc<dyn Downstream>,
        settings: GateSettings,
    ) -> Self {
        Self {
            guard,
            codec,
            downstream,
            settings,
        }
    }

    /// Returns the startup policy.
    #[must_use]
    pub const fn settings(&self) -> GateSettings {
        self.settings
    }

    /// Returns the path guard.
    #[must_use]
    pub const fn guard(&self) -> &PolicyGuard {
        &self.guard
    }

    /// Returns the token codec, when one is configured.
    #[must_use]
    pub const fn codec(&self) -> Option<&TokenCodec> {
        self.codec.as_ref()
    }

    /// Plans or executes a mutating operation.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Policy`] before any downstream call when the path
    /// is not allowed, [`GateError::ConfirmUnavailable`] when a proposal is
    /// needed but no secret is configured, and [`GateError::Downstream`] when
    /// immediate execution fails.
    pub async fn plan_or_execute(
        &self,
        operation: OperationDescriptor,
        options: GateOptions,
    ) -> Result<GateOutcome, GateError> {
        let path = self.guard.assert_allowed(&operation.path)?;
        let operation = operation.normalized(path);
        let require_confirm = options.require_confirm.unwrap_or(self.settings.require_confirm);
        let dry_run = options.dry_run.unwrap_or(require_confirm);
        if dry_run {
            let codec = self.codec.as_ref().ok_or(GateError::ConfirmUnavailable)?;
            let confirm_token = codec.mint(&operation, self.settings.ttl_seconds)?;
            return Ok(GateOutcome::DryRun(Proposal {
                plan: operation,
                confirm_token,
                ttl_seconds: self.settings.ttl_seconds,
            }));
        }
        let data = self.downstream.dispatch(&operation).await?;
        Ok(GateOutcome::Executed(Execution {
            operation,
            data,
        }))
    }

    /// Verifies a proposal token and executes its operation.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Token`] for any token protocol failure,
    /// [`GateError::Policy`] when the embedded path is no longer allowed, and
    /// [`GateError::Downstream`] when execution fails.
    pub async fn confirm(&self, token: &str) -> Result<Execution, GateError> {
        let codec = self.codec.as_ref().ok_or(GateError::ConfirmUnavailable)?;
        let operation = codec.verify(token)?;
        let path = self.guard.assert_allowed(&operation.path)?;
        let operation = operation.normalized(path);
        let data = self.downstream.dispatch(&operation).await?;
        Ok(Execution {
            operation,
            data,
        })
    }

    /// Executes a non-mutating operation after the path guard, without a
    /// proposal.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Policy`] or [`GateError::Downstream`].
    pub async fn read(&self, operation: OperationDescriptor) -> Result<Execution, GateError> {
        let path = self.guard.assert_allowed(&operation.path)?;
        let operation = operation.normalized(path);
        let data = self.downstream.dispatch(&operation).await?;
        Ok(Execution {
            operation,
            data,
        })
    }
}
