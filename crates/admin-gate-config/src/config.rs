// crates/admin-gate-config/src/config.rs
// ============================================================================
// Module: Admin Gate Configuration
// Description: Configuration loading, environment overrides and validation.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: admin-gate-core, serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is resolved from an explicit path, then `ADMIN_GATE_CONFIG`,
//! then `admin-gate.toml` in the working directory. The default file is
//! optional; built-in defaults apply when it is absent. Environment overrides
//! are layered on top before validation, and the validated value is treated as
//! immutable for the life of the process.
//! Security posture: config inputs are untrusted; missing secrets fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fmt;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use admin_gate_core::CredentialKind;
use admin_gate_core::DEFAULT_ALLOWED_PREFIXES;
use admin_gate_core::DEFAULT_TTL_SECONDS;
use admin_gate_core::DefaultCredential;
use admin_gate_core::GateSettings;
use admin_gate_core::PolicyGuard;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "admin-gate.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "ADMIN_GATE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of server auth tokens.
pub(crate) const MAX_AUTH_TOKENS: usize = 64;
/// Maximum length of a server auth token.
pub(crate) const MAX_AUTH_TOKEN_LENGTH: usize = 256;
/// Maximum number of allow-listed path prefixes.
pub(crate) const MAX_ALLOWED_PREFIXES: usize = 32;
/// Longest accepted proposal lifetime.
pub const MAX_TTL_SECONDS: u64 = 86_400;

/// Environment override: downstream base URL.
pub const ENV_DOWNSTREAM_BASE_URL: &str = "ADMIN_GATE_DOWNSTREAM_BASE_URL";
/// Environment override: default credential kind.
pub const ENV_DOWNSTREAM_AUTH_KIND: &str = "ADMIN_GATE_DOWNSTREAM_AUTH_KIND";
/// Environment override: default credential secret.
pub const ENV_DOWNSTREAM_SECRET: &str = "ADMIN_GATE_DOWNSTREAM_SECRET";
/// Environment override: proposal signing secret.
pub const ENV_CONFIRM_SECRET: &str = "ADMIN_GATE_CONFIRM_SECRET";
/// Environment override: proposal lifetime.
pub const ENV_CONFIRM_TTL_SECONDS: &str = "ADMIN_GATE_CONFIRM_TTL_SECONDS";
/// Environment override: confirmation default.
pub const ENV_REQUIRE_CONFIRM: &str = "ADMIN_GATE_REQUIRE_CONFIRM";
/// Environment override: inbound bearer token.
pub const ENV_SERVER_BEARER_TOKEN: &str = "ADMIN_GATE_SERVER_BEARER_TOKEN";
/// Environment override: server bind address.
pub const ENV_BIND: &str = "ADMIN_GATE_BIND";
/// Environment override: server transport.
pub const ENV_TRANSPORT: &str = "ADMIN_GATE_TRANSPORT";

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Admin gate configuration loaded from TOML and the environment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminGateConfig {
    /// MCP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Downstream admin API configuration.
    #[serde(default)]
    pub downstream: DownstreamConfig,
    /// Proposal token configuration.
    #[serde(default)]
    pub confirm: ConfirmConfig,
    /// Path allow-list configuration.
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl AdminGateConfig {
    /// Loads configuration using the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading, overriding or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |key| env::var(key).ok())
    }

    /// Loads configuration, reading environment values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading, overriding or validation fails.
    pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match resolve_path(path, &lookup)? {
            ConfigSource::Required(resolved) => Self::read_file(&resolved)?,
            ConfigSource::Optional(resolved) => {
                if resolved.is_file() {
                    Self::read_file(&resolved)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_overrides(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document without environment overrides or validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the document is not valid TOML for
    /// this model.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Reads and parses a config file with size and encoding limits.
    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        validate_path(path)?;
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Layers environment values over the file configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when an override cannot be parsed.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(base_url) = read(ENV_DOWNSTREAM_BASE_URL) {
            self.downstream.base_url = base_url;
        }
        if let Some(kind) = read(ENV_DOWNSTREAM_AUTH_KIND) {
            self.downstream.auth_kind = CredentialKind::parse_lenient(&kind);
        }
        if let Some(secret) = read(ENV_DOWNSTREAM_SECRET) {
            self.downstream.secret = Some(secret);
        }
        if let Some(secret) = read(ENV_CONFIRM_SECRET) {
            self.confirm.secret = Some(secret);
        }
        if let Some(ttl) = read(ENV_CONFIRM_TTL_SECONDS) {
            self.confirm.ttl_seconds = ttl.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("{ENV_CONFIRM_TTL_SECONDS} must be an integer"))
            })?;
        }
        if let Some(flag) = read(ENV_REQUIRE_CONFIRM) {
            self.confirm.require_confirm = !flag.trim().eq_ignore_ascii_case("false");
        }
        if let Some(transport) = read(ENV_TRANSPORT) {
            self.server.transport = ServerTransport::parse(&transport).ok_or_else(|| {
                ConfigError::Invalid(format!("{ENV_TRANSPORT} must be stdio, http or sse"))
            })?;
        }
        if let Some(bind) = read(ENV_BIND) {
            self.server.bind = Some(bind);
        }
        if let Some(token) = read(ENV_SERVER_BEARER_TOKEN) {
            let auth = self.server.auth.get_or_insert_with(ServerAuthConfig::default);
            auth.mode = ServerAuthMode::BearerToken;
            if !auth.bearer_tokens.contains(&token) {
                auth.bearer_tokens.push(token);
            }
        }
        Ok(())
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.downstream.validate()?;
        self.confirm.validate()?;
        self.policy.validate()?;
        self.audit.validate()?;
        Ok(())
    }

    /// Returns the gate policy derived from `[confirm]`.
    #[must_use]
    pub const fn gate_settings(&self) -> GateSettings {
        GateSettings {
            require_confirm: self.confirm.require_confirm,
            ttl_seconds: self.confirm.ttl_seconds,
        }
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Server configuration for MCP transports.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Transport type for MCP.
    #[serde(default)]
    pub transport: ServerTransport,
    /// Bind address for HTTP or SSE transports.
    #[serde(default)]
    pub bind: Option<String>,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Optional authentication configuration for inbound tool calls.
    #[serde(default)]
    pub auth: Option<ServerAuthConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: ServerTransport::Stdio,
            bind: None,
            max_body_bytes: default_max_body_bytes(),
            auth: None,
        }
    }
}

impl ServerConfig {
    /// Returns the effective inbound auth mode.
    #[must_use]
    pub fn auth_mode(&self) -> ServerAuthMode {
        self.auth.as_ref().map_or(ServerAuthMode::LocalOnly, |auth| auth.mode)
    }

    /// Parses the bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the address is missing or invalid.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let bind = self.bind.as_deref().unwrap_or_default().trim();
        if bind.is_empty() {
            return Err(ConfigError::Invalid(
                "http/sse transport requires bind address".to_string(),
            ));
        }
        bind.parse().map_err(|_| ConfigError::Invalid("invalid bind address".to_string()))
    }

    /// Validates server transport configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if let Some(auth) = &self.auth {
            auth.validate()?;
        }
        let auth_mode = self.auth_mode();
        match self.transport {
            ServerTransport::Http | ServerTransport::Sse => {
                let addr = self.bind_addr()?;
                if !addr.ip().is_loopback() && auth_mode == ServerAuthMode::LocalOnly {
                    return Err(ConfigError::Invalid(
                        "non-loopback bind disallowed without auth policy".to_string(),
                    ));
                }
            }
            ServerTransport::Stdio => {
                if auth_mode != ServerAuthMode::LocalOnly {
                    return Err(ConfigError::Invalid(
                        "stdio transport only supports local_only auth".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Supported MCP transport types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServerTransport {
    /// Use stdin/stdout transport.
    #[default]
    Stdio,
    /// Use HTTP JSON-RPC transport.
    Http,
    /// Use SSE transport for responses.
    Sse,
}

impl ServerTransport {
    /// Parses a transport label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "stdio" => Some(Self::Stdio),
            "http" => Some(Self::Http),
            "sse" => Some(Self::Sse),
            _ => None,
        }
    }

    /// Returns the stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::Http => "http",
            Self::Sse => "sse",
        }
    }
}

/// Inbound auth modes for MCP server tool calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServerAuthMode {
    /// Local-only loopback or stdio access.
    #[default]
    LocalOnly,
    /// Bearer token authentication.
    BearerToken,
}

/// Server authentication configuration for inbound tool calls.
#[derive(Clone, Default, Deserialize)]
pub struct ServerAuthConfig {
    /// Auth mode for inbound MCP tool calls.
    #[serde(default)]
    pub mode: ServerAuthMode,
    /// Accepted bearer tokens (required for `bearer_token` mode).
    #[serde(default)]
    pub bearer_tokens: Vec<String>,
}

impl fmt::Debug for ServerAuthConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ServerAuthConfig")
            .field("mode", &self.mode)
            .field("bearer_tokens", &self.bearer_tokens.len())
            .finish()
    }
}

impl ServerAuthConfig {
    /// Validates auth configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.bearer_tokens.len() > MAX_AUTH_TOKENS {
            return Err(ConfigError::Invalid("too many auth tokens".to_string()));
        }
        for token in &self.bearer_tokens {
            if token.trim().is_empty() {
                return Err(ConfigError::Invalid("auth token must be non-empty".to_string()));
            }
            if token.len() > MAX_AUTH_TOKEN_LENGTH {
                return Err(ConfigError::Invalid("auth token too long".to_string()));
            }
            if token.trim() != token {
                return Err(ConfigError::Invalid(
                    "auth token must not contain whitespace".to_string(),
                ));
            }
        }
        if self.mode == ServerAuthMode::BearerToken && self.bearer_tokens.is_empty() {
            return Err(ConfigError::Invalid(
                "bearer_token mode requires at least one bearer token".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Downstream
// ============================================================================

/// Downstream admin API configuration.
#[derive(Clone, Deserialize)]
pub struct DownstreamConfig {
    /// Base URL of the admin API, without a trailing slash after validation.
    #[serde(default)]
    pub base_url: String,
    /// Scheme of the default credential.
    #[serde(default)]
    pub auth_kind: CredentialKind,
    /// Default credential used when a call carries no override.
    #[serde(default)]
    pub secret: Option<String>,
    /// Timeout for ordinary calls in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Timeout for multipart uploads in milliseconds.
    #[serde(default = "default_upload_timeout_ms")]
    pub upload_timeout_ms: u64,
    /// Largest accepted upload payload in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            auth_kind: CredentialKind::default(),
            secret: None,
            timeout_ms: default_timeout_ms(),
            upload_timeout_ms: default_upload_timeout_ms(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl fmt::Debug for DownstreamConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("DownstreamConfig")
            .field("base_url", &self.base_url)
            .field("auth_kind", &self.auth_kind)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("timeout_ms", &self.timeout_ms)
            .field("upload_timeout_ms", &self.upload_timeout_ms)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl DownstreamConfig {
    /// Returns the default credential, when a non-empty secret is configured.
    #[must_use]
    pub fn default_credential(&self) -> Option<DefaultCredential> {
        self.secret.as_ref().filter(|secret| !secret.trim().is_empty()).map(|secret| {
            DefaultCredential {
                kind: self.auth_kind,
                secret: secret.clone(),
            }
        })
    }

    /// Validates and normalizes the downstream configuration.
    fn validate(&mut self) -> Result<(), ConfigError> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ConfigError::Invalid("downstream.base_url is required".to_string()));
        }
        let parsed = Url::parse(trimmed)
            .map_err(|err| ConfigError::Invalid(format!("downstream.base_url invalid: {err}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(
                "downstream.base_url must use http or https".to_string(),
            ));
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(ConfigError::Invalid(
                "downstream.base_url must not contain a query or fragment".to_string(),
            ));
        }
        self.base_url = trimmed.to_string();
        if self.timeout_ms == 0 || self.upload_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "downstream timeouts must be greater than zero".to_string(),
            ));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "downstream.max_upload_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Confirmation
// ============================================================================

/// Proposal token configuration.
#[derive(Clone, Deserialize)]
pub struct ConfirmConfig {
    /// Whether mutations default to dry-run proposals.
    #[serde(default = "default_require_confirm")]
    pub require_confirm: bool,
    /// HMAC signing secret for proposal tokens.
    #[serde(default)]
    pub secret: Option<String>,
    /// Proposal lifetime in seconds.
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
}

impl Default for ConfirmConfig {
    fn default() -> Self {
        Self {
            require_confirm: default_require_confirm(),
            secret: None,
            ttl_seconds: default_ttl_seconds(),
        }
    }
}

impl fmt::Debug for ConfirmConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ConfirmConfig")
            .field("require_confirm", &self.require_confirm)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl ConfirmConfig {
    /// Returns the signing secret when one is configured.
    #[must_use]
    pub fn signing_secret(&self) -> Option<&str> {
        self.secret.as_deref().filter(|secret| !secret.is_empty())
    }

    /// Validates confirmation configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl_seconds == 0 || self.ttl_seconds > MAX_TTL_SECONDS {
            return Err(ConfigError::Invalid(format!(
                "confirm.ttl_seconds must be between 1 and {MAX_TTL_SECONDS}"
            )));
        }
        if self.require_confirm && self.signing_secret().is_none() {
            return Err(ConfigError::Invalid(
                "confirm.secret is required when require_confirm is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Path allow-list configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Accepted downstream path prefixes.
    #[serde(default = "default_allowed_prefixes")]
    pub allowed_prefixes: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            allowed_prefixes: default_allowed_prefixes(),
        }
    }
}

impl PolicyConfig {
    /// Builds the path guard for this allow-list.
    #[must_use]
    pub fn guard(&self) -> PolicyGuard {
        PolicyGuard::new(self.allowed_prefixes.iter().cloned())
    }

    /// Validates the allow-list.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed_prefixes.is_empty() {
            return Err(ConfigError::Invalid(
                "policy.allowed_prefixes must not be empty".to_string(),
            ));
        }
        if self.allowed_prefixes.len() > MAX_ALLOWED_PREFIXES {
            return Err(ConfigError::Invalid("too many policy.allowed_prefixes".to_string()));
        }
        for prefix in &self.allowed_prefixes {
            if !prefix.starts_with('/') || prefix.trim() == "/" || prefix.trim() != prefix {
                return Err(ConfigError::Invalid(format!(
                    "policy prefix must start with '/' and name a route: {prefix}"
                )));
            }
            if prefix.contains(['?', '#']) || prefix.split('/').any(|segment| segment == "..") {
                return Err(ConfigError::Invalid(format!("policy prefix invalid: {prefix}")));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Enable structured audit logging.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional audit log path (JSON lines); stderr when absent.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Where the configuration file comes from.
enum ConfigSource {
    /// Explicitly named; must exist.
    Required(PathBuf),
    /// Default location; may be absent.
    Optional(PathBuf),
}

/// Resolves the config path from CLI or environment defaults.
fn resolve_path<F>(path: Option<&Path>, lookup: &F) -> Result<ConfigSource, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = path {
        return Ok(ConfigSource::Required(path.to_path_buf()));
    }
    if let Some(env_path) = lookup(CONFIG_ENV_VAR).filter(|value| !value.trim().is_empty()) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(ConfigSource::Required(PathBuf::from(env_path)));
    }
    Ok(ConfigSource::Optional(PathBuf::from(DEFAULT_CONFIG_NAME)))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Default maximum request body size in bytes.
pub(crate) const fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

/// Default downstream timeout in milliseconds.
pub(crate) const fn default_timeout_ms() -> u64 {
    30_000
}

/// Default upload timeout in milliseconds.
pub(crate) const fn default_upload_timeout_ms() -> u64 {
    60_000
}

/// Default upload size ceiling in bytes.
pub(crate) const fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

/// Confirmation is required unless disabled.
pub(crate) const fn default_require_confirm() -> bool {
    true
}

/// Default proposal lifetime.
pub(crate) const fn default_ttl_seconds() -> u64 {
    DEFAULT_TTL_SECONDS
}

/// Default path allow-list.
pub(crate) fn default_allowed_prefixes() -> Vec<String> {
    DEFAULT_ALLOWED_PREFIXES.iter().map(|prefix| (*prefix).to_string()).collect()
}

/// Audit logging is on by default.
pub(crate) const fn default_audit_enabled() -> bool {
    true
}
