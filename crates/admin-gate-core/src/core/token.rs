// crates/admin-gate-core/src/core/token.rs
// ============================================================================
// Module: Proposal Token Codec
// Description: Signed, time-boxed encoding of operation descriptors.
// Purpose: Let a write be planned now and executed later without server state.
// Dependencies: base64, hmac, serde_jcs, sha2, subtle
// ============================================================================

//! ## Overview
//! A proposal token is `base64url(claims) "." base64url(hmac)`, both parts
//! without padding. Claims are serialized as canonical JSON (RFC 8785) so the
//! payload is deterministic for a given operation and timestamps. The MAC is
//! HMAC-SHA256 over the encoded payload part, keyed with the server secret.
//!
//! ## Invariants
//! - Signatures are compared in constant time; a length mismatch is a
//!   signature failure, not a format failure.
//! - The signature is checked before the payload is decoded.
//! - Tokens are valid from `iat - 30s` through `exp` inclusive.
//! - No server-side state: the same token verifies repeatedly until expiry.
//! - Verification returns the operation as canonical JSON reads back. Numbers
//!   keep their value but not their spelling: a float-typed `1.0` in a body
//!   comes back as the integer `1`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::Hmac;
use hmac::Mac;
use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::core::operation::OperationDescriptor;
use crate::core::time::Clock;
use crate::core::time::SystemClock;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Current claims schema version.
pub const TOKEN_VERSION: u8 = 1;
/// Separator between the payload and signature parts.
pub const TOKEN_DELIMITER: char = '.';
/// Tolerated clock skew for tokens issued in the future.
pub const MAX_CLOCK_SKEW_SECONDS: u64 = 30;
/// Default proposal lifetime.
pub const DEFAULT_TTL_SECONDS: u64 = 300;

/// HMAC-SHA256 instance.
type HmacSha256 = Hmac<Sha256>;

// ============================================================================
// SECTION: Claims
// ============================================================================

/// Signed token contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalClaims {
    /// Schema version discriminator.
    #[serde(rename = "v")]
    pub version: u8,
    /// Issue time in unix seconds.
    #[serde(rename = "iat")]
    pub issued_at: u64,
    /// Expiry time in unix seconds.
    #[serde(rename = "exp")]
    pub expires_at: u64,
    /// Operation to execute on confirmation.
    #[serde(rename = "req")]
    pub operation: OperationDescriptor,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Token protocol errors. None of these are retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Token structure or payload could not be parsed.
    #[error("malformed confirm token: {0}")]
    Malformed(String),
    /// MAC did not match.
    #[error("invalid confirm token signature")]
    InvalidSignature,
    /// Token lifetime elapsed.
    #[error("confirm token expired at {expires_at} (now {now})")]
    Expired {
        /// Expiry time in unix seconds.
        expires_at: u64,
        /// Verification time in unix seconds.
        now: u64,
    },
    /// Token claims an issue time beyond the skew window.
    #[error("confirm token issued in the future at {issued_at} (now {now})")]
    NotYetValid {
        /// Claimed issue time in unix seconds.
        issued_at: u64,
        /// Verification time in unix seconds.
        now: u64,
    },
    /// Signing secret missing or unusable.
    #[error("confirm token signing secret is not configured")]
    SecretRequired,
    /// Claims could not be serialized.
    #[error("confirm token encoding failed: {0}")]
    Encoding(String),
}

// ============================================================================
// SECTION: Codec
// ============================================================================

/// Mints and verifies proposal tokens.
#[derive(Clone)]
pub struct TokenCodec {
    /// HMAC key.
    secret: Arc<[u8]>,
    /// Time source.
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("TokenCodec").field("secret", &"<redacted>").finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Builds a codec using the wall clock.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::SecretRequired`] when `secret` is empty.
    pub fn new(secret: &[u8]) -> Result<Self, TokenError> {
        Self::with_clock(secret, Arc::new(SystemClock))
    }

    /// Builds a codec using the supplied clock.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::SecretRequired`] when `secret` is empty.
    pub fn with_clock(secret: &[u8], clock: Arc<dyn Clock>) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::SecretRequired);
        }
        Ok(Self {
            secret: Arc::from(secret),
            clock,
        })
    }

    /// Mints a token for `operation` valid for `ttl_seconds` from now.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encoding`] when the claims cannot be serialized.
    pub fn mint(
        &self,
        operation: &OperationDescriptor,
        ttl_seconds: u64,
    ) -> Result<String, TokenError> {
        let now = self.clock.now_unix();
        let claims = ProposalClaims {
            version: TOKEN_VERSION,
            issued_at: now,
            expires_at: now.saturating_add(ttl_seconds),
            operation: operation.clone(),
        };
        self.sign(&claims)
    }

    /// Signs arbitrary claims. Exposed for tooling and tests that need to
    /// construct edge-case tokens.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encoding`] when the claims cannot be serialized.
    pub fn sign(&self, claims: &ProposalClaims) -> Result<String, TokenError> {
        let json =
            serde_jcs::to_vec(claims).map_err(|err| TokenError::Encoding(err.to_string()))?;
        let payload = URL_SAFE_NO_PAD.encode(json);
        let signature = URL_SAFE_NO_PAD.encode(self.mac(payload.as_bytes())?);
        Ok(format!("{payload}{TOKEN_DELIMITER}{signature}"))
    }

    /// Verifies `token` and returns the embedded operation.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] when the token is malformed, forged, expired, or
    /// issued beyond the clock-skew window.
    pub fn verify(&self, token: &str) -> Result<OperationDescriptor, TokenError> {
        self.inspect(token).map(|claims| claims.operation)
    }

    /// Verifies `token` and returns the full claims.
    ///
    /// # Errors
    ///
    /// Same as [`TokenCodec::verify`].
    pub fn inspect(&self, token: &str) -> Result<ProposalClaims, TokenError> {
        let parts: Vec<&str> = token.trim().split(TOKEN_DELIMITER).collect();
        let [payload, signature] = parts.as_slice() else {
            return Err(TokenError::Malformed("expected payload.signature".to_string()));
        };
        let provided =
            URL_SAFE_NO_PAD.decode(signature).map_err(|_| TokenError::InvalidSignature)?;
        let expected = self.mac(payload.as_bytes())?;
        if !bool::from(expected.as_slice().ct_eq(provided.as_slice())) {
            return Err(TokenError::InvalidSignature);
        }
        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed("payload is not base64url".to_string()))?;
        let claims: ProposalClaims = serde_json::from_slice(&json)
            .map_err(|err| TokenError::Malformed(format!("payload is not valid claims: {err}")))?;
        if claims.version != TOKEN_VERSION {
            return Err(TokenError::Malformed(format!(
                "unsupported token version {}",
                claims.version
            )));
        }
        let now = self.clock.now_unix();
        if now > claims.expires_at {
            return Err(TokenError::Expired {
                expires_at: claims.expires_at,
                now,
            });
        }
        if claims.issued_at > now.saturating_add(MAX_CLOCK_SKEW_SECONDS) {
            return Err(TokenError::NotYetValid {
                issued_at: claims.issued_at,
                now,
            });
        }
        Ok(claims)
    }

    /// Computes the MAC over `data`.
    fn mac(&self, data: &[u8]) -> Result<Vec<u8>, TokenError> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|_| TokenError::SecretRequired)?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

/// Returns a short, non-reversible fingerprint of a token for audit logs.
#[must_use]
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest.iter().take(8).map(|byte| format!("{byte:02x}")).collect()
}
