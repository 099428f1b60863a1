// crates/admin-gate-config/src/lib.rs
// ============================================================================
// Module: Admin Gate Config Library
// Description: Canonical config model, environment overrides, validation.
// Purpose: Single source of truth for admin-gate.toml semantics.
// Dependencies: admin-gate-core, serde, toml, url
// ============================================================================

//! ## Overview
//! `admin-gate-config` defines the configuration read once at process start:
//! downstream base URL and default credential, the proposal signing secret and
//! TTL, the confirmation default, the path allow-list, and the MCP server
//! transport. Validation is strict and fails closed.
//!
//! Security posture: config inputs are untrusted and carry secrets; secrets
//! are redacted from `Debug` output.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
