// crates/admin-gate-core/src/core/policy.rs
// ============================================================================
// Module: Path Policy Guard
// Description: Allow-list check applied to every candidate downstream path.
// Purpose: Keep agent-issued calls inside the admin surface.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`PolicyGuard::assert_allowed`] normalizes a path to begin with `/` and
//! accepts it only when it starts with one of the configured prefixes. The
//! check is pure and is repeated at plan, immediate execution and confirm
//! time, because the allow-list may change between minting and confirming a
//! proposal.
//!
//! Downstream URLs are built by concatenation and then parsed with WHATWG
//! rules, which treat `\` as a separator, strip tabs and newlines, and read
//! `%2e` as a dot. The guard therefore rejects backslashes, control
//! characters, query separators, fragments and any segment that decodes to
//! `.` or `..`, so the path that passes the prefix check is the path that
//! reaches the wire.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefixes admitted when no explicit allow-list is configured.
pub const DEFAULT_ALLOWED_PREFIXES: &[&str] = &["/admin", "/auth"];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Path rejected by the allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("policy violation: {reason} (path: {path})")]
pub struct PolicyViolation {
    /// Normalized path that was rejected.
    pub path: String,
    /// Why the path was rejected.
    pub reason: String,
}

// ============================================================================
// SECTION: Guard
// ============================================================================

/// Pure prefix allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyGuard {
    /// Accepted path prefixes, each beginning with `/`.
    allowed_prefixes: Vec<String>,
}

impl Default for PolicyGuard {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_PREFIXES.iter().map(|prefix| (*prefix).to_string()))
    }
}

impl PolicyGuard {
    /// Builds a guard from a prefix list. Prefixes are normalized to begin with `/`.
    #[must_use]
    pub fn new(prefixes: impl IntoIterator<Item = String>) -> Self {
        Self {
            allowed_prefixes: prefixes.into_iter().map(|prefix| normalize_path(&prefix)).collect(),
        }
    }

    /// Returns the configured prefixes.
    #[must_use]
    pub fn allowed_prefixes(&self) -> &[String] {
        &self.allowed_prefixes
    }

    /// Normalizes `path` and checks it against the allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyViolation`] when the normalized path is outside every
    /// allowed prefix or contains a traversal segment, query or fragment.
    pub fn assert_allowed(&self, path: &str) -> Result<String, PolicyViolation> {
        let normalized = canonical_path(path)?;
        if self.allowed_prefixes.iter().any(|prefix| normalized.starts_with(prefix.as_str())) {
            return Ok(normalized);
        }
        Err(PolicyViolation {
            reason: format!("only {} routes are allowed", self.allowed_prefixes.join(" or ")),
            path: normalized,
        })
    }
}

/// Normalizes `path` to begin with `/` and rejects any form a WHATWG URL
/// parser would rewrite before it reaches the wire.
///
/// # Errors
///
/// Returns [`PolicyViolation`] for query separators, fragments, backslashes,
/// control characters and segments that decode to `.` or `..`.
pub fn canonical_path(path: &str) -> Result<String, PolicyViolation> {
    let normalized = normalize_path(path);
    if normalized.contains('?') || normalized.contains('#') {
        return Err(PolicyViolation {
            path: normalized,
            reason: "query strings and fragments belong in the query field".to_string(),
        });
    }
    if normalized.contains('\\') || normalized.chars().any(char::is_control) {
        return Err(PolicyViolation {
            path: normalized,
            reason: "backslashes and control characters are not allowed".to_string(),
        });
    }
    if normalized.split('/').any(is_dot_segment) {
        return Err(PolicyViolation {
            path: normalized,
            reason: "path traversal segments are not allowed".to_string(),
        });
    }
    Ok(normalized)
}

/// Returns true when a segment resolves to `.` or `..` after decoding `%2e`.
fn is_dot_segment(segment: &str) -> bool {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    decoded == "." || decoded == ".."
}

/// Ensures the path begins with a single leading slash.
fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.starts_with('/') { trimmed.to_string() } else { format!("/{trimmed}") }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
