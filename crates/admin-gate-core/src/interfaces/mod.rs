// crates/admin-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Admin Gate Interfaces
// Description: Contract for performing operations against the downstream API.
// Purpose: Keep the gate independent of the HTTP client that executes calls.
// Dependencies: async-trait, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The gate consumes a single capability from the outside world: "perform this
//! operation against the downstream admin API". Implementations resolve the
//! effective credential from the ambient [`crate::CallContext`], classify the
//! response, and never retry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::core::OperationDescriptor;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Downstream dispatch failures. None are retried by this layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownstreamError {
    /// The downstream API answered with a non-2xx status.
    #[error("downstream request failed ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },
    /// No response within the configured timeout.
    #[error("downstream request timed out")]
    Timeout,
    /// Connection-level failure before a status was received.
    #[error("downstream transport error: {0}")]
    Transport(String),
    /// The request could not be built.
    #[error("invalid downstream request: {0}")]
    InvalidRequest(String),
}

impl DownstreamError {
    /// Returns the downstream HTTP status, when one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected {
                status, ..
            } => Some(*status),
            Self::Timeout | Self::Transport(_) | Self::InvalidRequest(_) => None,
        }
    }
}

// ============================================================================
// SECTION: Upload Types
// ============================================================================

/// Binary payload for multipart uploads.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// File name reported to the downstream API.
    pub filename: String,
    /// MIME type of the payload.
    pub content_type: String,
    /// Raw bytes.
    pub bytes: Vec<u8>,
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("UploadFile")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Upload flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadOptions {
    /// Marks the uploaded file private when set.
    pub is_private: Option<bool>,
}

// ============================================================================
// SECTION: Downstream
// ============================================================================

/// Executes operations against the downstream admin API.
#[async_trait]
pub trait Downstream: Send + Sync {
    /// Issues `operation` and returns the parsed response body.
    ///
    /// # Errors
    ///
    /// Returns [`DownstreamError`] for non-2xx responses, timeouts, and
    /// transport failures.
    async fn dispatch(&self, operation: &OperationDescriptor) -> Result<Value, DownstreamError>;

    /// Posts a multipart upload to `path`.
    ///
    /// # Errors
    ///
    /// Same classification as [`Downstream::dispatch`].
    async fn upload_binary(
        &self,
        path: &str,
        file: UploadFile,
        options: UploadOptions,
    ) -> Result<Value, DownstreamError>;
}
