// crates/admin-gate-mcp/src/lib.rs
// ============================================================================
// Module: Admin Gate MCP
// Description: MCP server and admin API adapters for Admin Gate.
// Purpose: Expose governed admin operations as MCP tools.
// Dependencies: admin-gate-core, admin-gate-config, axum, reqwest, tokio
// ============================================================================

//! ## Overview
//! Admin Gate MCP exposes the e-commerce admin API through MCP tools. Reads
//! pass straight through; writes go through the
//! [`admin_gate_core::ConfirmationGate`] and are executed by
//! [`HttpDownstream`] with the per-call credential.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod auth;
pub mod config;
pub mod downstream;
pub mod server;
pub mod tooling;
pub mod tools;

#[cfg(test)]
mod tests {
    //! Test-only lint relaxations for panic-based assertions and debug output.
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
        reason = "Test-only output and panic-based assertions are permitted."
    )]
}

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditSink;
pub use audit::AuthAuditEvent;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use audit::ToolCallAuditEvent;
pub use audit::ToolOutcome;
pub use auth::AuthContext;
pub use auth::DefaultToolAuthz;
pub use auth::RequestContext;
pub use auth::ToolAuthz;
pub use config::AdminGateConfig;
pub use downstream::HttpDownstream;
pub use downstream::HttpDownstreamConfig;
pub use server::McpServer;
pub use server::McpServerError;
pub use tooling::ToolDefinition;
pub use tooling::ToolName;
pub use tools::ServerInfo;
pub use tools::ToolError;
pub use tools::ToolResponse;
pub use tools::ToolRouter;
pub use tools::ToolRouterConfig;
