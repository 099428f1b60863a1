// crates/admin-gate-mcp/src/config.rs
// ============================================================================
// Module: MCP Configuration (Re-export)
// Description: Re-export canonical Admin Gate config types.
// Purpose: Let server callers use one import path for config and server.
// Dependencies: admin-gate-config
// ============================================================================

//! ## Overview
//! This module re-exports the configuration model from `admin-gate-config` so
//! the server, router and CLI share a single source of truth.

/// Re-export canonical config types and helpers.
pub use admin_gate_config::*;
