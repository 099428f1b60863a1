// crates/admin-gate-core/src/core/context.rs
// ============================================================================
// Module: Call Context Carrier
// Description: Task-scoped per-call credential overrides.
// Purpose: Reach nested downstream calls without threading parameters.
// Dependencies: serde, tokio
// ============================================================================

//! ## Overview
//! Each inbound tool call runs inside [`run_with_context`], which binds a
//! [`CallContext`] to the logical task through a tokio task-local. Code at any
//! depth reads it back with [`current_context`]. Two calls multiplexed on the
//! same worker threads never see each other's context, and the previous
//! binding is restored when the scoped future completes or is dropped.
//!
//! Task-locals do not cross `tokio::spawn`; use [`spawn_with_context`] for
//! work scheduled from inside a call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::future::Future;

use serde::Deserialize;
use serde::Serialize;
use tokio::task::JoinHandle;

// ============================================================================
// SECTION: Credential Types
// ============================================================================

/// Credential scheme used in the `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    /// `Authorization: Basic <token>`.
    #[default]
    Basic,
    /// `Authorization: Bearer <token>`.
    Bearer,
}

impl CredentialKind {
    /// Parses a kind label. Anything other than `bearer` is basic.
    #[must_use]
    pub fn parse_lenient(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("bearer") { Self::Bearer } else { Self::Basic }
    }

    /// Returns the stable lower-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Bearer => "bearer",
        }
    }

    /// Renders an `Authorization` header value for `token`.
    #[must_use]
    pub fn render(self, token: &str) -> String {
        match self {
            Self::Basic => format!("Basic {token}"),
            Self::Bearer => format!("Bearer {token}"),
        }
    }
}

/// Caller-supplied replacement for the default downstream credential.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialOverride {
    /// Full header value used verbatim.
    Authorization(String),
    /// Raw credential rendered with the given scheme.
    Credential {
        /// Header scheme.
        kind: CredentialKind,
        /// Raw credential.
        token: String,
    },
}

impl fmt::Debug for CredentialOverride {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authorization(_) => formatter.write_str("Authorization(<redacted>)"),
            Self::Credential {
                kind, ..
            } => write!(formatter, "Credential({})", kind.as_str()),
        }
    }
}

impl CredentialOverride {
    /// Renders the `Authorization` header value.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Authorization(value) => value.clone(),
            Self::Credential {
                kind,
                token,
            } => kind.render(token),
        }
    }
}

/// Process-wide default credential.
#[derive(Clone, PartialEq, Eq)]
pub struct DefaultCredential {
    /// Header scheme.
    pub kind: CredentialKind,
    /// Raw credential.
    pub secret: String,
}

impl fmt::Debug for DefaultCredential {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("DefaultCredential")
            .field("kind", &self.kind)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Where the credential for a dispatched call came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSource {
    /// Full header override from the caller.
    OverrideHeader,
    /// Kind + raw credential override from the caller.
    OverrideCredential,
    /// Configured default.
    Default,
    /// No credential available.
    None,
}

/// Resolved `Authorization` header plus its provenance.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedCredential {
    /// Header value, when any credential is available.
    pub authorization: Option<String>,
    /// Provenance label for auditing.
    pub source: CredentialSource,
}

impl fmt::Debug for ResolvedCredential {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("ResolvedCredential").field("source", &self.source).finish()
    }
}

/// Picks the effective credential: override first, then the default.
#[must_use]
pub fn resolve_credential(
    context: Option<&CallContext>,
    default: Option<&DefaultCredential>,
) -> ResolvedCredential {
    if let Some(credential) = context.and_then(|ctx| ctx.credential_override.as_ref()) {
        let source = match credential {
            CredentialOverride::Authorization(_) => CredentialSource::OverrideHeader,
            CredentialOverride::Credential {
                ..
            } => CredentialSource::OverrideCredential,
        };
        return ResolvedCredential {
            authorization: Some(credential.render()),
            source,
        };
    }
    match default {
        Some(default) if !default.secret.is_empty() => ResolvedCredential {
            authorization: Some(default.kind.render(&default.secret)),
            source: CredentialSource::Default,
        },
        _ => ResolvedCredential {
            authorization: None,
            source: CredentialSource::None,
        },
    }
}

// ============================================================================
// SECTION: Call Context
// ============================================================================

/// Ambient per-call state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallContext {
    /// Optional credential override for downstream calls.
    pub credential_override: Option<CredentialOverride>,
    /// Inbound request identifier, when the transport supplied one.
    pub request_id: Option<String>,
}

impl CallContext {
    /// Context carrying a credential override.
    #[must_use]
    pub const fn with_override(credential_override: CredentialOverride) -> Self {
        Self {
            credential_override: Some(credential_override),
            request_id: None,
        }
    }

    /// Returns a copy with the request identifier set.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

tokio::task_local! {
    /// Context bound to the current logical call.
    static CALL_CONTEXT: CallContext;
}

/// Runs `body` with `context` as the ambient call context.
pub async fn run_with_context<F>(context: CallContext, body: F) -> F::Output
where
    F: Future,
{
    CALL_CONTEXT.scope(context, body).await
}

/// Returns the context bound to the current task, if any.
#[must_use]
pub fn current_context() -> Option<CallContext> {
    CALL_CONTEXT.try_with(Clone::clone).ok()
}

/// Spawns `body` on the runtime, carrying the current context into the task.
pub fn spawn_with_context<F>(body: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let context = current_context();
    tokio::spawn(async move {
        match context {
            Some(context) => run_with_context(context, body).await,
            None => body.await,
        }
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::CallContext;
    use super::CredentialKind;
    use super::CredentialOverride;
    use super::CredentialSource;
    use super::DefaultCredential;
    use super::resolve_credential;

    #[test]
    fn full_override_renders_verbatim() {
        let ctx = CallContext::with_override(CredentialOverride::Authorization(
            "Token abc".to_string(),
        ));
        let default = DefaultCredential {
            kind: CredentialKind::Bearer,
            secret: "server".to_string(),
        };
        let resolved = resolve_credential(Some(&ctx), Some(&default));
        assert_eq!(resolved.authorization.as_deref(), Some("Token abc"));
        assert_eq!(resolved.source, CredentialSource::OverrideHeader);
    }

    #[test]
    fn kind_override_renders_scheme() {
        let ctx = CallContext::with_override(CredentialOverride::Credential {
            kind: CredentialKind::Bearer,
            token: "sk_1".to_string(),
        });
        let resolved = resolve_credential(Some(&ctx), None);
        assert_eq!(resolved.authorization.as_deref(), Some("Bearer sk_1"));
    }

    #[test]
    fn default_used_without_override() {
        let default = DefaultCredential {
            kind: CredentialKind::Basic,
            secret: "sk_default".to_string(),
        };
        let resolved = resolve_credential(Some(&CallContext::default()), Some(&default));
        assert_eq!(resolved.authorization.as_deref(), Some("Basic sk_default"));
        assert_eq!(resolved.source, CredentialSource::Default);
    }

    #[test]
    fn nothing_configured_renders_no_header() {
        let empty = DefaultCredential {
            kind: CredentialKind::Basic,
            secret: String::new(),
        };
        let resolved = resolve_credential(None, Some(&empty));
        assert!(resolved.authorization.is_none());
        assert_eq!(resolved.source, CredentialSource::None);
    }

    #[test]
    fn lenient_kind_parsing_defaults_to_basic() {
        assert_eq!(CredentialKind::parse_lenient("BEARER"), CredentialKind::Bearer);
        assert_eq!(CredentialKind::parse_lenient("digest"), CredentialKind::Basic);
    }
}
