// crates/admin-gate-core/src/core/operation.rs
// ============================================================================
// Module: Operation Descriptors
// Description: The unit of work proposed to or executed against the admin API.
// Purpose: Provide a canonical, serializable request shape for the gate.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! An [`OperationDescriptor`] captures one candidate downstream call: method,
//! path, optional query and body, and caller headers. Descriptors are embedded
//! verbatim in proposal tokens, so their serialized form is part of the token
//! wire format.
//!
//! ## Invariants
//! - A descriptor is only planned or executed after its path passed the
//!   [`crate::PolicyGuard`].
//! - `headers` are layered on top of credential headers and never remove them
//!   unless the names collide.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Method
// ============================================================================

/// HTTP methods accepted by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// Read request.
    Get,
    /// Create or update request.
    Post,
    /// Replace request.
    Put,
    /// Delete request.
    Delete,
}

impl Method {
    /// Returns the canonical upper-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Parses a method label, case-insensitively.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Returns true for methods that mutate downstream state.
    #[must_use]
    pub const fn is_mutating(self) -> bool {
        !matches!(self, Self::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Operation Descriptor
// ============================================================================

/// Query parameters keyed by name. Values are scalars or arrays of scalars.
pub type QueryParams = BTreeMap<String, Value>;

/// One candidate downstream call.
///
/// The path is serialized under `url` to match the plan shape returned to
/// callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    /// HTTP method.
    pub method: Method,
    /// Request path relative to the downstream base URL.
    #[serde(rename = "url")]
    pub path: String,
    /// Caller headers merged over credential headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Optional query parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryParams>,
    /// Optional request payload, opaque to the gate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl OperationDescriptor {
    /// Builds a descriptor with no query, body, or headers.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: BTreeMap::new(),
            query: None,
            body: None,
        }
    }

    /// Returns a copy with the JSON body set.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Returns a copy with the query parameters set.
    #[must_use]
    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = Some(query);
        self
    }

    /// Returns a copy with one header added.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Returns the canonical form stored in proposal tokens.
    ///
    /// Null query entries and a null body carry no information and would not
    /// survive a serialization round trip, so they are dropped here.
    #[must_use]
    pub fn normalized(mut self, path: String) -> Self {
        self.path = path;
        if matches!(self.body, Some(Value::Null)) {
            self.body = None;
        }
        if let Some(query) = self.query.as_mut() {
            query.retain(|_, value| !value.is_null());
        }
        if self.query.as_ref().is_some_and(BTreeMap::is_empty) {
            self.query = None;
        }
        self
    }

    /// Flattens query parameters into ordered key/value pairs.
    ///
    /// Arrays repeat the key once per element; nulls are skipped.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        let Some(query) = &self.query else {
            return pairs;
        };
        for (key, value) in query {
            match value {
                Value::Null => {}
                Value::Array(items) => {
                    for item in items {
                        if let Some(text) = scalar_text(item) {
                            pairs.push((key.clone(), text));
                        }
                    }
                }
                other => {
                    if let Some(text) = scalar_text(other) {
                        pairs.push((key.clone(), text));
                    }
                }
            }
        }
        pairs
    }
}

/// Renders a scalar query value as text.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        other => Some(other.to_string()),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions."
    )]

    use serde_json::json;

    use super::Method;
    use super::OperationDescriptor;

    #[test]
    fn query_pairs_repeat_array_keys_and_skip_nulls() {
        let query = json!({"limit": 10, "expand": ["variants", "images"], "q": null});
        let op = OperationDescriptor::new(Method::Get, "/admin/products")
            .with_query(serde_json::from_value(query).unwrap());
        assert_eq!(
            op.query_pairs(),
            vec![
                ("expand".to_string(), "variants".to_string()),
                ("expand".to_string(), "images".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn path_serializes_as_url() {
        let op = OperationDescriptor::new(Method::Delete, "/admin/products/p1");
        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(value, json!({"method": "DELETE", "url": "/admin/products/p1", "headers": {}}));
    }

    #[test]
    fn normalized_drops_null_body_and_empty_query() {
        let op = OperationDescriptor::new(Method::Post, "admin/x")
            .with_body(serde_json::Value::Null)
            .with_query(serde_json::from_value(json!({"q": null})).unwrap())
            .normalized("/admin/x".to_string());
        assert_eq!(op.path, "/admin/x");
        assert!(op.body.is_none());
        assert!(op.query.is_none());
    }

    #[test]
    fn method_parse_is_case_insensitive() {
        assert_eq!(Method::parse("delete"), Some(Method::Delete));
        assert_eq!(Method::parse("PATCH"), None);
        assert!(!Method::Get.is_mutating());
    }
}
