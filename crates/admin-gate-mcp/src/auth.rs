// crates/admin-gate-mcp/src/auth.rs
// ============================================================================
// Module: MCP Inbound Auth
// Description: Authentication for inbound MCP requests and header intake.
// Purpose: Fail-closed request admission plus per-call credential overrides.
// Dependencies: admin-gate-core, subtle, thiserror
// ============================================================================

//! ## Overview
//! Every inbound request is admitted by [`ToolAuthz`] before JSON-RPC parsing.
//! `local_only` admits stdio and loopback peers; `bearer_token` requires a
//! configured key in `Authorization: Bearer` or `x-mcp-api-key`, compared in
//! constant time. Override headers destined for the downstream API are parsed
//! here into a [`CredentialOverride`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::net::IpAddr;

use admin_gate_core::CallContext;
use admin_gate_core::CredentialKind;
use admin_gate_core::CredentialOverride;
use admin_gate_core::token_fingerprint;
use subtle::Choice;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::audit::AuthAuditEvent;
use crate::config::ServerAuthConfig;
use crate::config::ServerAuthMode;
use crate::config::ServerTransport;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Upper bound on any auth header we inspect.
const MAX_AUTH_HEADER_BYTES: usize = 8 * 1024;

/// Header carrying the MCP API key as an alternative to `Authorization`.
pub const MCP_API_KEY_HEADER: &str = "x-mcp-api-key";

/// Full downstream `Authorization` override.
pub const ADMIN_AUTHORIZATION_HEADER: &str = "x-admin-authorization";

/// Raw downstream credential override.
pub const ADMIN_API_KEY_HEADER: &str = "x-admin-api-key";

/// Scheme for [`ADMIN_API_KEY_HEADER`] (`basic` or `bearer`).
pub const ADMIN_AUTH_TYPE_HEADER: &str = "x-admin-auth-type";

// ============================================================================
// SECTION: Request Context
// ============================================================================

/// Per-request context used for auth decisions and call setup.
#[derive(Clone)]
pub struct RequestContext {
    /// Transport used by the caller.
    pub transport: ServerTransport,
    /// Peer IP address when available.
    pub peer_ip: Option<IpAddr>,
    /// Authorization header value (HTTP/SSE).
    pub auth_header: Option<String>,
    /// `x-mcp-api-key` header value (HTTP/SSE).
    pub api_key_header: Option<String>,
    /// Downstream credential override from the caller.
    pub credential_override: Option<CredentialOverride>,
    /// Optional request identifier for auditing.
    pub request_id: Option<String>,
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RequestContext")
            .field("transport", &self.transport)
            .field("peer_ip", &self.peer_ip)
            .field("auth_header", &self.auth_header.as_ref().map(|_| "<redacted>"))
            .field("api_key_header", &self.api_key_header.as_ref().map(|_| "<redacted>"))
            .field("credential_override", &self.credential_override)
            .field("request_id", &self.request_id)
            .finish()
    }
}

impl RequestContext {
    /// Builds a stdio request context.
    #[must_use]
    pub const fn stdio() -> Self {
        Self {
            transport: ServerTransport::Stdio,
            peer_ip: None,
            auth_header: None,
            api_key_header: None,
            credential_override: None,
            request_id: None,
        }
    }

    /// Builds an HTTP/SSE request context.
    #[must_use]
    pub const fn http(
        transport: ServerTransport,
        peer_ip: Option<IpAddr>,
        auth_header: Option<String>,
        api_key_header: Option<String>,
    ) -> Self {
        Self {
            transport,
            peer_ip,
            auth_header,
            api_key_header,
            credential_override: None,
            request_id: None,
        }
    }

    /// Returns a copy with the downstream credential override set.
    #[must_use]
    pub fn with_credential_override(mut self, credential: Option<CredentialOverride>) -> Self {
        self.credential_override = credential;
        self
    }

    /// Returns a copy with the request identifier set.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Returns true when the peer IP is loopback.
    #[must_use]
    pub fn peer_is_loopback(&self) -> bool {
        self.peer_ip.is_some_and(|ip| ip.is_loopback())
    }

    /// Builds the ambient call context carried into tool execution.
    #[must_use]
    pub fn call_context(&self) -> CallContext {
        CallContext {
            credential_override: self.credential_override.clone(),
            request_id: self.request_id.clone(),
        }
    }
}

/// Parses downstream override headers.
///
/// A full `Authorization` override wins; otherwise a raw credential with an
/// optional scheme (default basic). Blank values are ignored.
#[must_use]
pub fn credential_override_from_headers(
    authorization: Option<&str>,
    api_key: Option<&str>,
    auth_type: Option<&str>,
) -> Option<CredentialOverride> {
    let non_blank = |value: Option<&str>| {
        value.map(str::trim).filter(|value| !value.is_empty()).map(str::to_string)
    };
    if let Some(header) = non_blank(authorization) {
        return Some(CredentialOverride::Authorization(header));
    }
    non_blank(api_key).map(|token| CredentialOverride::Credential {
        kind: auth_type.map_or(CredentialKind::Basic, CredentialKind::parse_lenient),
        token,
    })
}

// ============================================================================
// SECTION: Auth Context
// ============================================================================

/// Authentication method used for the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// Local-only loopback or stdio access.
    Local,
    /// Bearer key authentication.
    BearerToken,
}

impl AuthMethod {
    /// Returns the stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::BearerToken => "bearer_token",
        }
    }
}

/// Authenticated caller context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Authentication method.
    pub method: AuthMethod,
    /// Key fingerprint for bearer auth.
    pub key_fingerprint: Option<String>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Authentication errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Missing or invalid authentication.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
}

// ============================================================================
// SECTION: Traits
// ============================================================================

/// Admission check for inbound MCP requests.
pub trait ToolAuthz: Send + Sync {
    /// Authorizes a request. Returns an authenticated context on success.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the request is not admitted.
    fn authorize(&self, ctx: &RequestContext) -> Result<AuthContext, AuthError>;
}

// ============================================================================
// SECTION: Default Policy
// ============================================================================

/// Default authz implementation derived from server config.
pub struct DefaultToolAuthz {
    /// Active auth mode.
    mode: ServerAuthMode,
    /// Accepted bearer keys.
    bearer_tokens: Vec<String>,
}

impl DefaultToolAuthz {
    /// Builds a default authz policy from server auth configuration.
    #[must_use]
    pub fn from_config(config: Option<&ServerAuthConfig>) -> Self {
        let mode = config.map_or(ServerAuthMode::LocalOnly, |cfg| cfg.mode);
        let bearer_tokens = config.map(|cfg| cfg.bearer_tokens.clone()).unwrap_or_default();
        Self {
            mode,
            bearer_tokens,
        }
    }

    /// Returns the configured auth mode.
    #[must_use]
    pub const fn mode(&self) -> ServerAuthMode {
        self.mode
    }
}

impl ToolAuthz for DefaultToolAuthz {
    fn authorize(&self, ctx: &RequestContext) -> Result<AuthContext, AuthError> {
        match self.mode {
            ServerAuthMode::LocalOnly => authorize_local_only(ctx),
            ServerAuthMode::BearerToken => authorize_bearer(ctx, &self.bearer_tokens),
        }
    }
}

/// Builds the audit record for an admission decision.
#[must_use]
pub fn auth_audit_event(
    ctx: &RequestContext,
    result: &Result<AuthContext, AuthError>,
) -> AuthAuditEvent {
    let decision = if result.is_ok() { "allow" } else { "deny" };
    let mut event = AuthAuditEvent::new(decision, ctx.transport);
    event.peer_ip = ctx.peer_ip.map(|ip| ip.to_string());
    event.request_id.clone_from(&ctx.request_id);
    match result {
        Ok(auth) => {
            event.auth_method = Some(auth.method.as_str());
            event.key_fingerprint.clone_from(&auth.key_fingerprint);
        }
        Err(err) => event.reason = Some(err.to_string()),
    }
    event
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Admits stdio and loopback peers.
fn authorize_local_only(ctx: &RequestContext) -> Result<AuthContext, AuthError> {
    let admitted = match ctx.transport {
        ServerTransport::Stdio => true,
        ServerTransport::Http | ServerTransport::Sse => ctx.peer_is_loopback(),
    };
    if !admitted {
        return Err(AuthError::Unauthenticated(
            "local-only mode requires loopback access".to_string(),
        ));
    }
    Ok(AuthContext {
        method: AuthMethod::Local,
        key_fingerprint: None,
    })
}

/// Admits callers presenting a configured key.
fn authorize_bearer(ctx: &RequestContext, tokens: &[String]) -> Result<AuthContext, AuthError> {
    let key = presented_key(ctx)?;
    if !key_matches(&key, tokens) {
        return Err(AuthError::Unauthenticated("invalid bearer token".to_string()));
    }
    Ok(AuthContext {
        method: AuthMethod::BearerToken,
        key_fingerprint: Some(token_fingerprint(&key)),
    })
}

/// Extracts the key from `Authorization: Bearer` or `x-mcp-api-key`.
fn presented_key(ctx: &RequestContext) -> Result<String, AuthError> {
    if let Some(header) = ctx.auth_header.as_deref()
        && let Some(token) = parse_bearer_token(header)?
    {
        return Ok(token);
    }
    let key = ctx
        .api_key_header
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| AuthError::Unauthenticated("missing authorization".to_string()))?;
    if key.len() > MAX_AUTH_HEADER_BYTES {
        return Err(AuthError::Unauthenticated("api key header too large".to_string()));
    }
    Ok(key.to_string())
}

/// Parses a bearer header; `None` when another scheme is used.
fn parse_bearer_token(header: &str) -> Result<Option<String>, AuthError> {
    if header.len() > MAX_AUTH_HEADER_BYTES {
        return Err(AuthError::Unauthenticated("authorization header too large".to_string()));
    }
    let mut parts = header.trim().splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default().trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Ok(None);
    }
    Ok(Some(token.to_string()))
}

/// Compares `candidate` against every configured key without early exit.
fn key_matches(candidate: &str, tokens: &[String]) -> bool {
    let mut matched = Choice::from(0);
    for token in tokens {
        matched |= candidate.as_bytes().ct_eq(token.as_bytes());
    }
    matched.into()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
