// crates/admin-gate-mcp/src/downstream.rs
// ============================================================================
// Module: HTTP Downstream
// Description: reqwest-backed executor for admin API operations.
// Purpose: Issue guarded operations with the effective per-call credential.
// Dependencies: admin-gate-core, reqwest
// ============================================================================

//! ## Overview
//! [`HttpDownstream`] implements [`Downstream`] over HTTP. The credential is
//! resolved from the ambient [`admin_gate_core::CallContext`] at dispatch time,
//! so concurrent calls with different overrides never observe each other.
//!
//! Header precedence, lowest first: `Content-Type: application/json`, the
//! resolved `Authorization`, then the operation's own headers.
//!
//! Invariants:
//! - Paths that a URL parser would rewrite are refused before any request.
//! - Redirects are not followed.
//! - Non-2xx responses fail with the status and body text; nothing is retried.
//! - Response bodies are capped at [`MAX_RESPONSE_BYTES`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use admin_gate_core::DefaultCredential;
use admin_gate_core::Downstream;
use admin_gate_core::DownstreamError;
use admin_gate_core::Method;
use admin_gate_core::OperationDescriptor;
use admin_gate_core::ResolvedCredential;
use admin_gate_core::UploadFile;
use admin_gate_core::UploadOptions;
use admin_gate_core::canonical_path;
use admin_gate_core::current_context;
use admin_gate_core::resolve_credential;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::RequestBuilder;
use reqwest::header::AUTHORIZATION;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use reqwest::multipart::Form;
use reqwest::multipart::Part;
use reqwest::redirect::Policy;
use serde_json::Value;
use url::Url;

use crate::config::DownstreamConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Largest response body accepted from the admin API.
pub const MAX_RESPONSE_BYTES: usize = 16 * 1024 * 1024;

/// Multipart field carrying uploaded files.
const UPLOAD_FIELD: &str = "files";

/// Multipart field carrying the privacy flag.
const PRIVATE_FIELD: &str = "is_private";

// ============================================================================
// SECTION: HTTP Downstream
// ============================================================================

/// Settings for [`HttpDownstream`].
#[derive(Debug, Clone)]
pub struct HttpDownstreamConfig {
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// Credential used when the call carries no override.
    pub default_credential: Option<DefaultCredential>,
    /// Timeout for ordinary operations.
    pub timeout: Duration,
    /// Timeout for multipart uploads.
    pub upload_timeout: Duration,
}

impl HttpDownstreamConfig {
    /// Derives settings from the validated downstream configuration.
    #[must_use]
    pub fn from_config(config: &DownstreamConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            default_credential: config.default_credential(),
            timeout: Duration::from_millis(config.timeout_ms),
            upload_timeout: Duration::from_millis(config.upload_timeout_ms),
        }
    }
}

/// Admin API executor over HTTP.
pub struct HttpDownstream {
    /// Shared HTTP client.
    client: Client,
    /// Base URL without a trailing slash.
    base_url: String,
    /// Fallback credential.
    default_credential: Option<DefaultCredential>,
    /// Per-request timeout for uploads.
    upload_timeout: Duration,
}

impl HttpDownstream {
    /// Builds an executor.
    ///
    /// # Errors
    ///
    /// Returns [`DownstreamError::InvalidRequest`] when the client cannot be
    /// constructed.
    pub fn new(config: HttpDownstreamConfig) -> Result<Self, DownstreamError> {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(config.timeout)
            .build()
            .map_err(|err| DownstreamError::InvalidRequest(format!("http client: {err}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            default_credential: config.default_credential,
            upload_timeout: config.upload_timeout,
        })
    }

    /// Returns the credential the current call would use.
    #[must_use]
    pub fn effective_credential(&self) -> ResolvedCredential {
        resolve_credential(current_context().as_ref(), self.default_credential.as_ref())
    }

    /// Joins the base URL and a canonical absolute path.
    fn url(&self, path: &str) -> Result<Url, DownstreamError> {
        let path = canonical_path(path)
            .map_err(|err| DownstreamError::InvalidRequest(err.to_string()))?;
        Url::parse(&format!("{}{path}", self.base_url))
            .map_err(|err| DownstreamError::InvalidRequest(format!("invalid url: {err}")))
    }

    /// Builds the credential header map for the current call.
    fn credential_headers(&self) -> Result<HeaderMap, DownstreamError> {
        let mut headers = HeaderMap::new();
        if let Some(value) = self.effective_credential().authorization {
            let value = HeaderValue::from_str(&value).map_err(|_| {
                DownstreamError::InvalidRequest("invalid authorization header value".to_string())
            })?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl Downstream for HttpDownstream {
    async fn dispatch(&self, operation: &OperationDescriptor) -> Result<Value, DownstreamError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.extend(self.credential_headers()?);
        for (name, value) in &operation.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                DownstreamError::InvalidRequest(format!("invalid header name: {name}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|_| {
                DownstreamError::InvalidRequest(format!("invalid value for header {name}"))
            })?;
            headers.insert(name, value);
        }
        let mut request = self
            .client
            .request(http_method(operation.method), self.url(&operation.path)?)
            .headers(headers);
        let pairs = operation.query_pairs();
        if !pairs.is_empty() {
            request = request.query(&pairs);
        }
        if let Some(body) = &operation.body {
            request = request.json(body);
        }
        let label = format!("{} {}", operation.method, operation.path);
        send(request, &label).await
    }

    async fn upload_binary(
        &self,
        path: &str,
        file: UploadFile,
        options: UploadOptions,
    ) -> Result<Value, DownstreamError> {
        let part = Part::bytes(file.bytes)
            .file_name(file.filename)
            .mime_str(&file.content_type)
            .map_err(|_| {
                DownstreamError::InvalidRequest(format!(
                    "invalid content type: {}",
                    file.content_type
                ))
            })?;
        let mut form = Form::new().part(UPLOAD_FIELD, part);
        if let Some(is_private) = options.is_private {
            form = form.text(PRIVATE_FIELD, is_private.to_string());
        }
        let request = self
            .client
            .post(self.url(path)?)
            .headers(self.credential_headers()?)
            .timeout(self.upload_timeout)
            .multipart(form);
        let label = format!("POST {path}");
        send(request, &label).await
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps an operation method to the HTTP method.
const fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// Sends a request and classifies the response.
async fn send(request: RequestBuilder, label: &str) -> Result<Value, DownstreamError> {
    let response = request.send().await.map_err(classify_error)?;
    let status = response.status();
    if response.content_length().is_some_and(|len| len > MAX_RESPONSE_BYTES as u64) {
        return Err(DownstreamError::Transport("response body too large".to_string()));
    }
    let bytes = response.bytes().await.map_err(classify_error)?;
    if bytes.len() > MAX_RESPONSE_BYTES {
        return Err(DownstreamError::Transport("response body too large".to_string()));
    }
    let text = String::from_utf8_lossy(&bytes);
    if !status.is_success() {
        return Err(DownstreamError::Rejected {
            status: status.as_u16(),
            message: format!("{label}: {text}"),
        });
    }
    Ok(parse_body(&text))
}

/// Parses a success body: JSON when possible, raw text otherwise.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Maps a client error onto the downstream taxonomy.
fn classify_error(err: reqwest::Error) -> DownstreamError {
    if err.is_timeout() {
        DownstreamError::Timeout
    } else if err.is_builder() {
        DownstreamError::InvalidRequest(err.to_string())
    } else {
        DownstreamError::Transport(err.without_url().to_string())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use serde_json::json;

    use super::parse_body;

    #[test]
    fn parse_body_handles_json_text_and_empty() {
        assert_eq!(parse_body(r#"{"id":"p1"}"#), json!({"id": "p1"}));
        assert_eq!(parse_body("plain text"), Value::String("plain text".to_string()));
        assert_eq!(parse_body("  "), Value::Null);
    }
}
