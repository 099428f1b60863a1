// crates/admin-gate-mcp/tests/downstream_http.rs
// ============================================================================
// Module: HTTP Downstream Tests
// Description: Wire-level checks for the reqwest downstream executor.
// Purpose: Validate credential resolution, header precedence and failures.
// Dependencies: admin-gate-mcp, admin-gate-core, tiny_http
// ============================================================================

//! ## Overview
//! Runs [`admin_gate_mcp::HttpDownstream`] against a local `tiny_http` server
//! and inspects what arrives on the wire.
//!
//! Security posture: per-call overrides must never leak into other calls, and
//! redirects must not be followed.

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

use std::io::Read;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use admin_gate_core::CallContext;
use admin_gate_core::CredentialKind;
use admin_gate_core::CredentialOverride;
use admin_gate_core::DefaultCredential;
use admin_gate_core::Downstream;
use admin_gate_core::DownstreamError;
use admin_gate_core::Method;
use admin_gate_core::OperationDescriptor;
use admin_gate_core::UploadFile;
use admin_gate_core::UploadOptions;
use admin_gate_core::run_with_context;
use admin_gate_mcp::HttpDownstream;
use admin_gate_mcp::HttpDownstreamConfig;
use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Request as observed by the local server.
#[derive(Debug, Clone)]
struct Captured {
    /// HTTP method.
    method: String,
    /// Path and query.
    url: String,
    /// Lower-cased header names with values.
    headers: Vec<(String, String)>,
    /// Raw body.
    body: String,
}

impl Captured {
    /// Returns the first value of a header.
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == &name.to_ascii_lowercase())
            .map(|(_, value)| value.as_str())
    }
}

/// Canned response for the local server.
#[derive(Clone)]
struct Canned {
    /// Status code.
    status: u16,
    /// Response body.
    body: &'static str,
    /// Extra response headers.
    headers: Vec<(&'static str, &'static str)>,
    /// Delay before answering.
    delay: Duration,
}

impl Canned {
    fn ok(body: &'static str) -> Self {
        Self {
            status: 200,
            body,
            headers: Vec::new(),
            delay: Duration::ZERO,
        }
    }
}

/// Spawns a server that answers `count` requests and reports what it saw.
fn spawn_server(count: usize, canned: Canned) -> (String, mpsc::Receiver<Captured>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for _ in 0..count {
            let Ok(mut request) = server.recv() else {
                return;
            };
            let mut body = String::new();
            let _ = request.as_reader().read_to_string(&mut body);
            let captured = Captured {
                method: request.method().to_string(),
                url: request.url().to_string(),
                headers: request
                    .headers()
                    .iter()
                    .map(|header| {
                        (
                            header.field.as_str().as_str().to_ascii_lowercase(),
                            header.value.as_str().to_string(),
                        )
                    })
                    .collect(),
                body,
            };
            let _ = tx.send(captured);
            thread::sleep(canned.delay);
            let mut response =
                Response::from_string(canned.body).with_status_code(canned.status);
            for (name, value) in &canned.headers {
                response = response.with_header(Header::from_bytes(*name, *value).unwrap());
            }
            let _ = request.respond(response);
        }
    });
    (format!("http://{addr}"), rx)
}

/// Builds an executor for `base_url`.
fn downstream(base_url: &str, default_credential: Option<DefaultCredential>) -> HttpDownstream {
    HttpDownstream::new(HttpDownstreamConfig {
        base_url: base_url.to_string(),
        default_credential,
        timeout: Duration::from_secs(5),
        upload_timeout: Duration::from_secs(5),
    })
    .unwrap()
}

/// Default basic credential.
fn basic_default() -> Option<DefaultCredential> {
    Some(DefaultCredential {
        kind: CredentialKind::Basic,
        secret: "sk_default".to_string(),
    })
}

// ============================================================================
// SECTION: Credentials
// ============================================================================

#[tokio::test]
async fn default_credential_and_query_are_sent() {
    let (url, rx) = spawn_server(1, Canned::ok(r#"{"products":[]}"#));
    let executor = downstream(&url, basic_default());
    let op = OperationDescriptor::new(Method::Get, "/admin/products")
        .with_query([("limit".to_string(), json!(5))].into_iter().collect());

    let data = executor.dispatch(&op).await.unwrap();

    assert_eq!(data, json!({"products": []}));
    let seen = rx.recv().unwrap();
    assert_eq!(seen.method, "GET");
    assert_eq!(seen.url, "/admin/products?limit=5");
    assert_eq!(seen.header("authorization"), Some("Basic sk_default"));
    assert_eq!(seen.header("content-type"), Some("application/json"));
}

#[tokio::test]
async fn override_replaces_default_credential() {
    let (url, rx) = spawn_server(2, Canned::ok("{}"));
    let executor = downstream(&url, basic_default());
    let op = OperationDescriptor::new(Method::Get, "/admin/regions");

    let header_override =
        CallContext::with_override(CredentialOverride::Authorization("Bearer caller".to_string()));
    run_with_context(header_override, executor.dispatch(&op)).await.unwrap();
    assert_eq!(rx.recv().unwrap().header("authorization"), Some("Bearer caller"));

    let raw_override = CallContext::with_override(CredentialOverride::Credential {
        kind: CredentialKind::Bearer,
        token: "tok_raw".to_string(),
    });
    run_with_context(raw_override, executor.dispatch(&op)).await.unwrap();
    assert_eq!(rx.recv().unwrap().header("authorization"), Some("Bearer tok_raw"));
}

#[tokio::test]
async fn missing_credential_sends_no_authorization() {
    let (url, rx) = spawn_server(1, Canned::ok(""));
    let executor = downstream(&url, None);

    let data =
        executor.dispatch(&OperationDescriptor::new(Method::Get, "/admin/regions")).await.unwrap();

    assert_eq!(data, Value::Null);
    assert_eq!(rx.recv().unwrap().header("authorization"), None);
}

#[tokio::test]
async fn concurrent_overrides_stay_isolated() {
    let (url, rx) = spawn_server(2, Canned::ok("{}"));
    let executor = std::sync::Arc::new(downstream(&url, basic_default()));

    let mut tasks = Vec::new();
    for caller in ["alpha", "beta"] {
        let executor = executor.clone();
        let context = CallContext::with_override(CredentialOverride::Authorization(format!(
            "Bearer {caller}"
        )));
        tasks.push(tokio::spawn(run_with_context(context, async move {
            let op = OperationDescriptor::new(Method::Get, format!("/admin/{caller}"));
            executor.dispatch(&op).await
        })));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    for _ in 0..2 {
        let seen = rx.recv().unwrap();
        let caller = seen.url.trim_start_matches("/admin/");
        assert_eq!(seen.header("authorization"), Some(format!("Bearer {caller}").as_str()));
    }
}

// ============================================================================
// SECTION: Headers and Bodies
// ============================================================================

#[tokio::test]
async fn operation_headers_override_defaults() {
    let (url, rx) = spawn_server(1, Canned::ok(r#"{"id":"p1"}"#));
    let executor = downstream(&url, basic_default());
    let op = OperationDescriptor::new(Method::Post, "/admin/products/p1")
        .with_header("Content-Type", "application/merge-patch+json")
        .with_header("Authorization", "Bearer per-op")
        .with_header("X-Trace", "t-1")
        .with_body(json!({"title": "Hat"}));

    executor.dispatch(&op).await.unwrap();

    let seen = rx.recv().unwrap();
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.header("content-type"), Some("application/merge-patch+json"));
    assert_eq!(seen.header("authorization"), Some("Bearer per-op"));
    assert_eq!(seen.header("x-trace"), Some("t-1"));
    let body: Value = serde_json::from_str(&seen.body).unwrap();
    assert_eq!(body, json!({"title": "Hat"}));
}

#[tokio::test]
async fn non_json_success_body_is_returned_as_text() {
    let (url, _rx) = spawn_server(1, Canned::ok("accepted"));
    let executor = downstream(&url, None);
    let data =
        executor.dispatch(&OperationDescriptor::new(Method::Delete, "/admin/x/1")).await.unwrap();
    assert_eq!(data, Value::String("accepted".to_string()));
}

#[tokio::test]
async fn invalid_operation_header_is_rejected_locally() {
    let (url, _rx) = spawn_server(0, Canned::ok("{}"));
    let executor = downstream(&url, None);
    let op =
        OperationDescriptor::new(Method::Get, "/admin/products").with_header("bad header", "x");
    let err = executor.dispatch(&op).await.unwrap_err();
    assert!(matches!(err, DownstreamError::InvalidRequest(_)));
}

#[tokio::test]
async fn encoded_traversal_is_refused_before_the_wire() {
    let (url, rx) = spawn_server(1, Canned::ok("{}"));
    let executor = downstream(&url, basic_default());
    for path in [
        "/admin/%2e%2e/store/carts",
        "/admin\\..\\store\\carts",
        "/admin/.%2E/store/carts",
    ] {
        let op = OperationDescriptor::new(Method::Delete, path);
        let err = executor.dispatch(&op).await.unwrap_err();
        assert!(matches!(err, DownstreamError::InvalidRequest(_)), "{path}");
    }
    executor.dispatch(&OperationDescriptor::new(Method::Delete, "/admin/carts/c1")).await.unwrap();

    let captured = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(format!("{} {}", captured.method, captured.url), "DELETE /admin/carts/c1");
    assert!(rx.try_recv().is_err());
}

// ============================================================================
// SECTION: Failures
// ============================================================================

#[tokio::test]
async fn non_success_status_carries_method_path_and_body() {
    let canned = Canned {
        status: 422,
        ..Canned::ok(r#"{"message":"title is required"}"#)
    };
    let (url, _rx) = spawn_server(1, canned);
    let executor = downstream(&url, basic_default());
    let op = OperationDescriptor::new(Method::Post, "/admin/products").with_body(json!({}));

    let err = executor.dispatch(&op).await.unwrap_err();

    assert_eq!(
        err,
        DownstreamError::Rejected {
            status: 422,
            message: r#"POST /admin/products: {"message":"title is required"}"#.to_string(),
        }
    );
}

#[tokio::test]
async fn redirects_are_not_followed() {
    let canned = Canned {
        status: 302,
        headers: vec![("Location", "http://127.0.0.1:9/elsewhere")],
        ..Canned::ok("")
    };
    let (url, _rx) = spawn_server(1, canned);
    let executor = downstream(&url, basic_default());

    let op = OperationDescriptor::new(Method::Get, "/admin/products");
    let err = executor.dispatch(&op).await.unwrap_err();

    assert_eq!(err.status(), Some(302));
}

#[tokio::test]
async fn slow_responses_time_out() {
    let canned = Canned {
        delay: Duration::from_millis(1500),
        ..Canned::ok("{}")
    };
    let (url, _rx) = spawn_server(1, canned);
    let executor = HttpDownstream::new(HttpDownstreamConfig {
        base_url: url,
        default_credential: None,
        timeout: Duration::from_millis(200),
        upload_timeout: Duration::from_millis(200),
    })
    .unwrap();

    let op = OperationDescriptor::new(Method::Get, "/admin/products");
    let err = executor.dispatch(&op).await.unwrap_err();

    assert_eq!(err, DownstreamError::Timeout);
}

// ============================================================================
// SECTION: Uploads
// ============================================================================

#[tokio::test]
async fn upload_sends_multipart_with_credential() {
    let (url, rx) = spawn_server(1, Canned::ok(r#"{"files":[{"id":"f1"}]}"#));
    let executor = downstream(&url, basic_default());
    let file = UploadFile {
        filename: "hat.png".to_string(),
        content_type: "image/png".to_string(),
        bytes: b"png-bytes".to_vec(),
    };

    let data = executor
        .upload_binary(
            "/admin/uploads",
            file,
            UploadOptions {
                is_private: Some(true),
            },
        )
        .await
        .unwrap();

    assert_eq!(data["files"][0]["id"], "f1");
    let seen = rx.recv().unwrap();
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.url, "/admin/uploads");
    assert_eq!(seen.header("authorization"), Some("Basic sk_default"));
    assert!(seen.header("content-type").unwrap().starts_with("multipart/form-data"));
    assert!(seen.body.contains(r#"name="files"; filename="hat.png""#));
    assert!(seen.body.contains("Content-Type: image/png"));
    assert!(seen.body.contains("png-bytes"));
    assert!(seen.body.contains(r#"name="is_private""#));
}
