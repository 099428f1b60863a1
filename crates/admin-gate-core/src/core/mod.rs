// crates/admin-gate-core/src/core/mod.rs
// ============================================================================
// Module: Admin Gate Core Types
// Description: Operation descriptors, path policy, proposal tokens, call context.
// Purpose: Group the pure building blocks used by the confirmation gate.
// Dependencies: base64, hmac, serde, sha2, subtle, tokio
// ============================================================================

//! ## Overview
//! Pure data types and functions. Nothing in this module performs I/O; the
//! only ambient input is the [`time::Clock`] read during token issuance and
//! verification.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod context;
pub mod operation;
pub mod policy;
pub mod time;
pub mod token;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use context::CallContext;
pub use context::CredentialKind;
pub use context::CredentialOverride;
pub use context::CredentialSource;
pub use context::DefaultCredential;
pub use context::ResolvedCredential;
pub use context::current_context;
pub use context::resolve_credential;
pub use context::run_with_context;
pub use context::spawn_with_context;
pub use operation::Method;
pub use operation::OperationDescriptor;
pub use operation::QueryParams;
pub use policy::DEFAULT_ALLOWED_PREFIXES;
pub use policy::PolicyGuard;
pub use policy::PolicyViolation;
pub use policy::canonical_path;
pub use time::Clock;
pub use time::FixedClock;
pub use time::SystemClock;
pub use token::DEFAULT_TTL_SECONDS;
pub use token::MAX_CLOCK_SKEW_SECONDS;
pub use token::ProposalClaims;
pub use token::TOKEN_VERSION;
pub use token::TokenCodec;
pub use token::TokenError;
pub use token::token_fingerprint;
