// crates/admin-gate-core/src/lib.rs
// ============================================================================
// Module: Admin Gate Core
// Description: Write-action governance for a downstream admin API.
// Purpose: Plan mutations as signed proposals and execute them on confirm.
// Dependencies: async-trait, base64, hmac, serde, sha2, subtle, tokio
// ============================================================================

//! ## Overview
//! Admin Gate Core turns every mutating request into a signed, time-boxed
//! proposal that must be confirmed before it runs, and carries per-call
//! credential overrides through async execution without global state.
//!
//! Flow: [`ConfirmationGate`] → [`PolicyGuard`] → either [`TokenCodec::mint`]
//! or [`Downstream::dispatch`]. Confirm re-enters through
//! [`TokenCodec::verify`] → [`PolicyGuard`] → [`Downstream::dispatch`].
//!
//! Security posture: paths, tokens and payloads arrive from an untrusted
//! agent; every check fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::CallContext;
pub use crate::core::Clock;
pub use crate::core::CredentialKind;
pub use crate::core::CredentialOverride;
pub use crate::core::CredentialSource;
pub use crate::core::DEFAULT_ALLOWED_PREFIXES;
pub use crate::core::DEFAULT_TTL_SECONDS;
pub use crate::core::DefaultCredential;
pub use crate::core::FixedClock;
pub use crate::core::MAX_CLOCK_SKEW_SECONDS;
pub use crate::core::Method;
pub use crate::core::OperationDescriptor;
pub use crate::core::PolicyGuard;
pub use crate::core::PolicyViolation;
pub use crate::core::ProposalClaims;
pub use crate::core::QueryParams;
pub use crate::core::ResolvedCredential;
pub use crate::core::SystemClock;
pub use crate::core::TOKEN_VERSION;
pub use crate::core::TokenCodec;
pub use crate::core::TokenError;
pub use crate::core::canonical_path;
pub use crate::core::current_context;
pub use crate::core::resolve_credential;
pub use crate::core::run_with_context;
pub use crate::core::spawn_with_context;
pub use crate::core::token_fingerprint;
pub use crate::interfaces::Downstream;
pub use crate::interfaces::DownstreamError;
pub use crate::interfaces::UploadFile;
pub use crate::interfaces::UploadOptions;
pub use crate::runtime::CONFIRM_TOOL_NAME;
pub use crate::runtime::ConfirmationGate;
pub use crate::runtime::Execution;
pub use crate::runtime::GateError;
pub use crate::runtime::GateOptions;
pub use crate::runtime::GateOutcome;
pub use crate::runtime::GateSettings;
pub use crate::runtime::Proposal;
