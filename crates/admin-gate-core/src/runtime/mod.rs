// crates/admin-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Admin Gate Runtime
// Description: Confirmation gate orchestration.
// Purpose: Wire the guard, codec and downstream into the plan/confirm flow.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules sequence the pure building blocks from [`crate::core`]
//! against a [`crate::Downstream`]. Every tool that mutates downstream state
//! goes through [`ConfirmationGate`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod gate;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use gate::CONFIRM_TOOL_NAME;
pub use gate::ConfirmationGate;
pub use gate::Execution;
pub use gate::GateError;
pub use gate::GateOptions;
pub use gate::GateOutcome;
pub use gate::GateSettings;
pub use gate::Proposal;
