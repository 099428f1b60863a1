// crates/admin-gate-mcp/src/tools.rs
// ============================================================================
// Module: MCP Tool Router
// Description: Tool routing for the Admin Gate MCP server.
// Purpose: Map tool calls onto guarded reads, gated writes and confirm.
// Dependencies: admin-gate-core, base64, url
// ============================================================================

//! ## Overview
//! The tool router decodes tool arguments, builds operation descriptors and
//! hands them to [`ConfirmationGate`]. Reads pass the path guard and execute;
//! writes become proposals unless the caller opts out; `admin_confirm` replays
//! a verified proposal.
//!
//! ## Invariants
//! - No downstream call is made for a path the guard rejects.
//! - Every call runs in its own task inside the caller's
//!   [`admin_gate_core::CallContext`], so a dropped connection does not cancel
//!   an issued downstream call and overrides never leak across calls.
//! - Handler failures are returned as `{ok:false,error:{message}}` results;
//!   only an unknown tool name surfaces as a protocol error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use admin_gate_core::ConfirmationGate;
use admin_gate_core::CredentialKind;
use admin_gate_core::CredentialSource;
use admin_gate_core::DefaultCredential;
use admin_gate_core::Downstream;
use admin_gate_core::DownstreamError;
use admin_gate_core::GateError;
use admin_gate_core::GateOptions;
use admin_gate_core::GateOutcome;
use admin_gate_core::Method;
use admin_gate_core::OperationDescriptor;
use admin_gate_core::QueryParams;
use admin_gate_core::UploadFile;
use admin_gate_core::UploadOptions;
use admin_gate_core::current_context;
use admin_gate_core::resolve_credential;
use admin_gate_core::run_with_context;
use admin_gate_core::token_fingerprint;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use url::Url;

use crate::audit::AuditSink;
use crate::audit::ToolCallAuditEvent;
use crate::audit::ToolCallAuditEventParams;
use crate::audit::ToolOutcome;
use crate::auth::ADMIN_API_KEY_HEADER;
use crate::auth::ADMIN_AUTH_TYPE_HEADER;
use crate::auth::ADMIN_AUTHORIZATION_HEADER;
use crate::auth::RequestContext;
use crate::config::AdminGateConfig;
use crate::config::ServerAuthMode;
use crate::config::ServerTransport;
use crate::tooling::ToolDefinition;
use crate::tooling::ToolName;
use crate::tooling::tool_definitions;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Service name reported by `server_info`, `initialize` and `/health`.
pub const SERVICE_NAME: &str = "admin-gate";

/// Upload endpoint of the admin API.
pub const UPLOAD_PATH: &str = "/admin/uploads";

/// Upper bound for list `limit`.
const MAX_LIST_LIMIT: u32 = 100;

/// Products collection path.
const PRODUCTS_PATH: &str = "/admin/products";

/// Collections path.
const COLLECTIONS_PATH: &str = "/admin/collections";

/// Product categories path.
const CATEGORIES_PATH: &str = "/admin/product-categories";

/// Regions path.
const REGIONS_PATH: &str = "/admin/regions";

/// Sales channels path.
const SALES_CHANNELS_PATH: &str = "/admin/sales-channels";

/// Reels path.
const REELS_PATH: &str = "/admin/reels";

/// Default reel `type`.
const DEFAULT_REEL_TYPE: &str = "reel";

/// Default reel `duration_type`.
const DEFAULT_REEL_DURATION: &str = "short";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Tool routing errors.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool name not recognized.
    #[error("unknown tool")]
    UnknownTool,
    /// Tool payload failed to decode or validate.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    /// Missing or invalid inbound authentication.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    /// Guard, token or gated downstream failure.
    #[error(transparent)]
    Gate(#[from] GateError),
    /// Downstream failure outside the gate (uploads).
    #[error(transparent)]
    Downstream(#[from] DownstreamError),
    /// Tool payload serialization failed.
    #[error("serialization failure")]
    Serialization,
    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Returns the downstream HTTP status, when the failure carries one.
    #[must_use]
    pub const fn downstream_status(&self) -> Option<u16> {
        match self {
            Self::Gate(err) => err.downstream_status(),
            Self::Downstream(err) => err.status(),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Server Info
// ============================================================================

/// Non-secret configuration summary returned by `server_info`.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Service name.
    pub name: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Active transport.
    pub transport: ServerTransport,
    /// Whether writes default to proposals.
    pub require_confirm: bool,
    /// Proposal lifetime in seconds.
    pub confirm_ttl_seconds: u64,
    /// Whether a signing secret is configured.
    pub confirm_secret_set: bool,
    /// Whether a downstream base URL is configured.
    pub base_url_set: bool,
    /// Whether a default downstream credential is configured.
    pub default_credential_set: bool,
    /// Default credential scheme.
    pub default_auth_kind: CredentialKind,
    /// Whether inbound bearer auth is enforced.
    pub server_auth_enabled: bool,
    /// Headers accepted as per-call downstream credential overrides.
    pub override_headers: [&'static str; 3],
    /// Allowed path prefixes.
    pub allowed_prefixes: Vec<String>,
}

impl ServerInfo {
    /// Summarizes a validated configuration.
    #[must_use]
    pub fn from_config(config: &AdminGateConfig) -> Self {
        Self {
            name: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
            transport: config.server.transport,
            require_confirm: config.confirm.require_confirm,
            confirm_ttl_seconds: config.confirm.ttl_seconds,
            confirm_secret_set: config.confirm.signing_secret().is_some(),
            base_url_set: !config.downstream.base_url.is_empty(),
            default_credential_set: config.downstream.default_credential().is_some(),
            default_auth_kind: config.downstream.auth_kind,
            server_auth_enabled: config.server.auth_mode() == ServerAuthMode::BearerToken,
            override_headers: [
                ADMIN_AUTHORIZATION_HEADER,
                ADMIN_API_KEY_HEADER,
                ADMIN_AUTH_TYPE_HEADER,
            ],
            allowed_prefixes: config.policy.allowed_prefixes.clone(),
        }
    }
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Inputs required to construct a [`ToolRouter`].
pub struct ToolRouterConfig {
    /// Confirmation gate.
    pub gate: ConfirmationGate,
    /// Downstream executor, used directly for uploads.
    pub downstream: Arc<dyn Downstream>,
    /// Audit sink.
    pub audit: Arc<dyn AuditSink>,
    /// Configuration summary for `server_info`.
    pub info: ServerInfo,
    /// Largest decoded upload accepted.
    pub max_upload_bytes: usize,
    /// Default downstream credential, for audit provenance.
    pub default_credential: Option<DefaultCredential>,
}

/// Result of a routed tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResponse {
    /// Result payload rendered to the client as pretty JSON text.
    pub payload: Value,
    /// Whether the payload describes a failure.
    pub is_error: bool,
}

/// Tool router for MCP tool calls.
#[derive(Clone)]
pub struct ToolRouter {
    /// Confirmation gate.
    gate: ConfirmationGate,
    /// Downstream executor.
    downstream: Arc<dyn Downstream>,
    /// Audit sink.
    audit: Arc<dyn AuditSink>,
    /// Configuration summary.
    info: Arc<ServerInfo>,
    /// Largest decoded upload accepted.
    max_upload_bytes: usize,
    /// Default downstream credential.
    default_credential: Option<DefaultCredential>,
}

impl ToolRouter {
    /// Builds a router.
    #[must_use]
    pub fn new(config: ToolRouterConfig) -> Self {
        Self {
            gate: config.gate,
            downstream: config.downstream,
            audit: config.audit,
            info: Arc::new(config.info),
            max_upload_bytes: config.max_upload_bytes,
            default_credential: config.default_credential,
        }
    }

    /// Returns the audit sink.
    #[must_use]
    pub fn audit(&self) -> Arc<dyn AuditSink> {
        Arc::clone(&self.audit)
    }

    /// Lists the tool catalogue.
    #[must_use]
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        tool_definitions()
    }

    /// Handles a tool call by name with JSON arguments.
    ///
    /// The call runs on its own task inside the caller's call context.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] for unrecognized names and
    /// [`ToolError::Internal`] when the call task fails; every other failure
    /// is returned as an error [`ToolResponse`].
    pub async fn handle_tool_call(
        &self,
        context: &RequestContext,
        name: &str,
        arguments: Value,
    ) -> Result<ToolResponse, ToolError> {
        let Some(tool) = ToolName::parse(name) else {
            self.record(context, name, &CallNote::default(), Some(&ToolError::UnknownTool));
            return Err(ToolError::UnknownTool);
        };
        let router = self.clone();
        let call_context = context.clone();
        let task = tokio::spawn(run_with_context(context.call_context(), async move {
            router.execute(&call_context, tool, arguments).await
        }));
        task.await.map_err(|err| ToolError::Internal(format!("tool task failed: {err}")))
    }

    /// Runs a tool and converts the result into a response.
    async fn execute(
        &self,
        context: &RequestContext,
        tool: ToolName,
        arguments: Value,
    ) -> ToolResponse {
        let arguments = if arguments.is_null() { json!({}) } else { arguments };
        let mut note = CallNote::default();
        let result = self.dispatch(tool, arguments, &mut note).await;
        self.record(context, tool.as_str(), &note, result.as_ref().err());
        match result {
            Ok(payload) => ToolResponse {
                payload,
                is_error: false,
            },
            Err(err) => ToolResponse {
                payload: json!({ "ok": false, "error": { "message": err.to_string() } }),
                is_error: true,
            },
        }
    }

    /// Routes a decoded tool call.
    async fn dispatch(
        &self,
        tool: ToolName,
        arguments: Value,
        note: &mut CallNote,
    ) -> Result<Value, ToolError> {
        match tool {
            ToolName::ServerInfo => {
                let mut info = serde_json::to_value(self.info.as_ref())
                    .map_err(|_| ToolError::Serialization)?;
                if let Some(map) = info.as_object_mut() {
                    map.insert("ok".to_string(), Value::Bool(true));
                }
                Ok(info)
            }
            ToolName::AdminListProducts => {
                let data = self.list(PRODUCTS_PATH, decode(arguments)?, true, note).await?;
                Ok(with_product_summary(data))
            }
            ToolName::AdminListCollections => {
                self.list(COLLECTIONS_PATH, decode(arguments)?, false, note).await
            }
            ToolName::AdminListCategories => {
                self.list(CATEGORIES_PATH, decode(arguments)?, false, note).await
            }
            ToolName::AdminListRegions => {
                self.list(REGIONS_PATH, decode(arguments)?, false, note).await
            }
            ToolName::AdminListSalesChannels => {
                self.list(SALES_CHANNELS_PATH, decode(arguments)?, false, note).await
            }
            ToolName::AdminGetProduct => {
                self.get(PRODUCTS_PATH, decode(arguments)?, true, note).await
            }
            ToolName::AdminGetCollection => {
                self.get(COLLECTIONS_PATH, decode(arguments)?, false, note).await
            }
            ToolName::AdminCreateProduct => self.create(Resource::Product, arguments, note).await,
            ToolName::AdminCreateCollection => {
                self.create(Resource::Collection, arguments, note).await
            }
            ToolName::AdminCreateCategory => self.create(Resource::Category, arguments, note).await,
            ToolName::AdminUpdateProduct => {
                self.update(Resource::Product, decode(arguments)?, note).await
            }
            ToolName::AdminUpdateCollection => {
                self.update(Resource::Collection, decode(arguments)?, note).await
            }
            ToolName::AdminUpdateCategory => {
                self.update(Resource::Category, decode(arguments)?, note).await
            }
            ToolName::AdminDeleteProduct => {
                self.delete(Resource::Product, decode(arguments)?, note).await
            }
            ToolName::AdminDeleteCollection => {
                self.delete(Resource::Collection, decode(arguments)?, note).await
            }
            ToolName::AdminDeleteCategory => {
                self.delete(Resource::Category, decode(arguments)?, note).await
            }
            ToolName::AdminSetProductCollection => {
                self.set_product_collection(decode(arguments)?, note).await
            }
            ToolName::AdminAddProductToCategory => {
                self.add_products_to_category(decode(arguments)?, note).await
            }
            ToolName::AdminListReels => {
                self.read(OperationDescriptor::new(Method::Get, REELS_PATH), note).await
            }
            ToolName::AdminCreateReel => self.create_reel(decode(arguments)?, note).await,
            ToolName::AdminDeleteReel => {
                self.delete(Resource::Reel, decode(arguments)?, note).await
            }
            ToolName::AdminUploadFileBase64 => self.upload(decode(arguments)?, note).await,
            ToolName::AdminRequest => self.request(decode(arguments)?, note).await,
            ToolName::AdminConfirm => self.confirm(decode(arguments)?, note).await,
            ToolName::UiNavigate | ToolName::UiNavigateTo => {
                let args: NavigateArgs = decode(arguments)?;
                require_non_empty("path", &args.path)?;
                Ok(json!({ "ok": true, "action": "NAVIGATE", "path": args.path }))
            }
            ToolName::UiToast => {
                let args: ToastArgs = decode(arguments)?;
                require_non_empty("message", &args.message)?;
                Ok(json!({
                    "ok": true,
                    "action": "TOAST",
                    "kind": args.kind,
                    "message": args.message,
                }))
            }
            ToolName::UiPrefillForm => {
                let args: PrefillArgs = decode(arguments)?;
                require_non_empty("form", &args.form)?;
                Ok(json!({
                    "ok": true,
                    "action": "PREFILL_FORM",
                    "form": args.form,
                    "values": args.values,
                }))
            }
        }
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// Lists a resource collection.
    async fn list(
        &self,
        path: &str,
        args: ListArgs,
        with_expand: bool,
        note: &mut CallNote,
    ) -> Result<Value, ToolError> {
        let mut query = QueryParams::new();
        insert_opt(&mut query, "q", args.q.map(Value::String));
        if let Some(limit) = args.limit {
            if limit == 0 || limit > MAX_LIST_LIMIT {
                return Err(ToolError::InvalidParams(format!(
                    "limit must be between 1 and {MAX_LIST_LIMIT}"
                )));
            }
            query.insert("limit".to_string(), json!(limit));
        }
        insert_opt(&mut query, "offset", args.offset.map(|offset| json!(offset)));
        insert_opt(&mut query, "fields", args.fields.map(Value::String));
        if with_expand {
            insert_opt(&mut query, "expand", args.expand.map(Value::String));
        }
        let operation = OperationDescriptor::new(Method::Get, path).with_query(query);
        self.read(operation, note).await
    }

    /// Fetches one resource by id.
    async fn get(
        &self,
        base: &str,
        args: GetArgs,
        with_expand: bool,
        note: &mut CallNote,
    ) -> Result<Value, ToolError> {
        let path = resource_path(base, "id", &args.id)?;
        let mut query = QueryParams::new();
        insert_opt(&mut query, "fields", args.fields.map(Value::String));
        if with_expand {
            insert_opt(&mut query, "expand", args.expand.map(Value::String));
        }
        let operation = OperationDescriptor::new(Method::Get, path).with_query(query);
        self.read(operation, note).await
    }

    /// Executes a guarded read and returns the raw response body.
    async fn read(
        &self,
        operation: OperationDescriptor,
        note: &mut CallNote,
    ) -> Result<Value, ToolError> {
        note.operation(&operation);
        let execution = self.gate.read(operation).await?;
        Ok(execution.data)
    }

    // ------------------------------------------------------------------------
    // Gated writes
    // ------------------------------------------------------------------------

    /// Creates a resource.
    async fn create(
        &self,
        resource: Resource,
        arguments: Value,
        note: &mut CallNote,
    ) -> Result<Value, ToolError> {
        let mut args: CreateArgs = decode(arguments)?;
        let key = resource.payload_key();
        let payload = match args.rest.remove(key) {
            Some(Value::Object(payload)) => payload,
            Some(_) => {
                return Err(ToolError::InvalidParams(format!("{key} must be an object")));
            }
            None => return Err(ToolError::InvalidParams(format!("missing field `{key}`"))),
        };
        let operation = json_operation(Method::Post, resource.base_path(), Value::Object(payload));
        self.gated(operation, args.dry_run, note).await
    }

    /// Updates a resource.
    async fn update(
        &self,
        resource: Resource,
        args: UpdateArgs,
        note: &mut CallNote,
    ) -> Result<Value, ToolError> {
        let path = resource_path(resource.base_path(), "id", &args.id)?;
        let operation = json_operation(Method::Post, path, Value::Object(args.patch));
        self.gated(operation, args.dry_run, note).await
    }

    /// Deletes a resource.
    async fn delete(
        &self,
        resource: Resource,
        args: DeleteArgs,
        note: &mut CallNote,
    ) -> Result<Value, ToolError> {
        let path = resource_path(resource.base_path(), "id", &args.id)?;
        let operation = OperationDescriptor::new(Method::Delete, path);
        self.gated(operation, args.dry_run, note).await
    }

    /// Assigns a product to a collection, or clears the assignment.
    async fn set_product_collection(
        &self,
        args: SetCollectionArgs,
        note: &mut CallNote,
    ) -> Result<Value, ToolError> {
        let collection_id = args
            .collection_id
            .ok_or_else(|| ToolError::InvalidParams("missing field `collection_id`".to_string()))?;
        if let Some(id) = &collection_id {
            require_non_empty("collection_id", id)?;
        }
        let path = resource_path(PRODUCTS_PATH, "product_id", &args.product_id)?;
        let operation =
            json_operation(Method::Post, path, json!({ "collection_id": collection_id }));
        self.gated(operation, args.dry_run, note).await
    }

    /// Adds products to a category in one batch.
    async fn add_products_to_category(
        &self,
        args: CategoryBatchArgs,
        note: &mut CallNote,
    ) -> Result<Value, ToolError> {
        if args.product_ids.is_empty() {
            return Err(ToolError::InvalidParams("product_ids must not be empty".to_string()));
        }
        for id in &args.product_ids {
            require_non_empty("product_ids", id)?;
        }
        let base = resource_path(CATEGORIES_PATH, "category_id", &args.category_id)?;
        let products: Vec<Value> = args.product_ids.iter().map(|id| json!({ "id": id })).collect();
        let operation = json_operation(
            Method::Post,
            format!("{base}/products/batch"),
            json!({ "product_ids": products }),
        );
        self.gated(operation, args.dry_run, note).await
    }

    /// Creates a reel entry.
    async fn create_reel(&self, args: ReelArgs, note: &mut CallNote) -> Result<Value, ToolError> {
        require_non_empty("url", &args.url)?;
        require_non_empty("public_id", &args.public_id)?;
        let body = json!({
            "url": args.url,
            "public_id": args.public_id,
            "type": args.reel_type.unwrap_or_else(|| DEFAULT_REEL_TYPE.to_string()),
            "duration_type": args
                .duration_type
                .unwrap_or_else(|| DEFAULT_REEL_DURATION.to_string()),
        });
        self.gated(json_operation(Method::Post, REELS_PATH, body), args.dry_run, note).await
    }

    /// Routes a mutation through the confirmation gate.
    async fn gated(
        &self,
        operation: OperationDescriptor,
        dry_run: Option<bool>,
        note: &mut CallNote,
    ) -> Result<Value, ToolError> {
        note.operation(&operation);
        let outcome = self.gate.plan_or_execute(operation, GateOptions::dry_run(dry_run)).await?;
        match &outcome {
            GateOutcome::DryRun(proposal) => {
                note.outcome = ToolOutcome::DryRun;
                note.token_fingerprint = Some(token_fingerprint(&proposal.confirm_token));
            }
            GateOutcome::Executed(_) => note.outcome = ToolOutcome::Executed,
        }
        Ok(outcome.to_json())
    }

    // ------------------------------------------------------------------------
    // Generic request, confirm, upload
    // ------------------------------------------------------------------------

    /// Handles `admin_request`.
    async fn request(&self, args: RequestArgs, note: &mut CallNote) -> Result<Value, ToolError> {
        let method = Method::parse(&args.method).ok_or_else(|| {
            ToolError::InvalidParams(format!("unsupported method: {}", args.method))
        })?;
        require_non_empty("path", &args.path)?;
        let mut operation = OperationDescriptor::new(method, args.path);
        if let Some(query) = args.query {
            operation = operation.with_query(query);
        }
        match args.headers {
            Some(headers) => {
                for (name, value) in headers {
                    operation = operation.with_header(name, value);
                }
            }
            None if args.body.is_some() => {
                operation = operation.with_header("Content-Type", "application/json");
            }
            None => {}
        }
        if let Some(body) = args.body {
            operation = operation.with_body(body);
        }
        if !method.is_mutating() {
            note.operation(&operation);
            let execution = self.gate.read(operation).await?;
            return Ok(execution.to_read_json());
        }
        self.gated(operation, args.dry_run, note).await
    }

    /// Handles `admin_confirm`.
    async fn confirm(&self, args: ConfirmArgs, note: &mut CallNote) -> Result<Value, ToolError> {
        require_non_empty("confirm_token", &args.confirm_token)?;
        note.token_fingerprint = Some(token_fingerprint(&args.confirm_token));
        let execution = self.gate.confirm(&args.confirm_token).await?;
        note.operation(&execution.operation);
        note.outcome = ToolOutcome::Executed;
        Ok(execution.to_confirm_json())
    }

    /// Handles `admin_upload_file_base64`.
    async fn upload(&self, args: UploadArgs, note: &mut CallNote) -> Result<Value, ToolError> {
        require_non_empty("filename", &args.filename)?;
        require_non_empty("contentType", &args.content_type)?;
        require_non_empty("base64", &args.base64)?;
        if args.base64.len() / 4 * 3 > self.max_upload_bytes.saturating_add(3) {
            return Err(upload_too_large(self.max_upload_bytes));
        }
        let bytes = STANDARD
            .decode(args.base64.trim())
            .map_err(|err| ToolError::InvalidParams(format!("invalid base64 payload: {err}")))?;
        if bytes.len() > self.max_upload_bytes {
            return Err(upload_too_large(self.max_upload_bytes));
        }
        let path = self.gate.guard().assert_allowed(UPLOAD_PATH).map_err(GateError::from)?;
        note.method = Some(Method::Post);
        note.path = Some(path.clone());
        let file = UploadFile {
            filename: args.filename,
            content_type: args.content_type,
            bytes,
        };
        let options = UploadOptions {
            is_private: args.is_private,
        };
        let data = self.downstream.upload_binary(&path, file, options).await?;
        note.outcome = ToolOutcome::Executed;
        Ok(data)
    }

    // ------------------------------------------------------------------------
    // Audit
    // ------------------------------------------------------------------------

    /// Emits the tool call audit record.
    fn record(
        &self,
        context: &RequestContext,
        tool: &str,
        note: &CallNote,
        error: Option<&ToolError>,
    ) {
        let credential_source = note.method.map(|_| self.credential_source());
        let outcome = if error.is_some() { ToolOutcome::Error } else { note.outcome };
        self.audit.record(&ToolCallAuditEvent::new(ToolCallAuditEventParams {
            request_id: context.request_id.clone(),
            transport: context.transport,
            tool: tool.to_string(),
            outcome,
            method: note.method,
            path: note.path.clone(),
            downstream_status: error.and_then(ToolError::downstream_status),
            credential_source,
            token_fingerprint: note.token_fingerprint.clone(),
            error: error.map(ToString::to_string),
        }));
    }

    /// Provenance of the credential the current call resolves to.
    fn credential_source(&self) -> CredentialSource {
        resolve_credential(current_context().as_ref(), self.default_credential.as_ref()).source
    }
}

// ============================================================================
// SECTION: Call Notes
// ============================================================================

/// Audit facts collected while a tool runs.
#[derive(Debug, Clone)]
struct CallNote {
    /// Outcome when the call succeeds.
    outcome: ToolOutcome,
    /// Downstream method.
    method: Option<Method>,
    /// Downstream path.
    path: Option<String>,
    /// Confirm token fingerprint.
    token_fingerprint: Option<String>,
}

impl Default for CallNote {
    fn default() -> Self {
        Self {
            outcome: ToolOutcome::Ok,
            method: None,
            path: None,
            token_fingerprint: None,
        }
    }
}

impl CallNote {
    /// Records the operation about to be attempted.
    fn operation(&mut self, operation: &OperationDescriptor) {
        self.method = Some(operation.method);
        self.path = Some(operation.path.clone());
    }
}

// ============================================================================
// SECTION: Resources
// ============================================================================

/// Resource families with gated create/update/delete tools.
#[derive(Debug, Clone, Copy)]
enum Resource {
    /// Products.
    Product,
    /// Product collections.
    Collection,
    /// Product categories.
    Category,
    /// Reels; delete only, creation has its own argument shape.
    Reel,
}

impl Resource {
    /// Collection path for the resource.
    const fn base_path(self) -> &'static str {
        match self {
            Self::Product => PRODUCTS_PATH,
            Self::Collection => COLLECTIONS_PATH,
            Self::Category => CATEGORIES_PATH,
            Self::Reel => REELS_PATH,
        }
    }

    /// Argument key carrying the create payload.
    const fn payload_key(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Collection => "collection",
            Self::Category => "category",
            Self::Reel => "reel",
        }
    }
}

// ============================================================================
// SECTION: Arguments
// ============================================================================

/// Arguments for list tools.
#[derive(Debug, Deserialize)]
struct ListArgs {
    /// Free-text search.
    q: Option<String>,
    /// Page size.
    limit: Option<u32>,
    /// Page offset.
    offset: Option<u32>,
    /// Field selection.
    fields: Option<String>,
    /// Relation expansion.
    expand: Option<String>,
}

/// Arguments for get-by-id tools.
#[derive(Debug, Deserialize)]
struct GetArgs {
    /// Resource id.
    id: String,
    /// Field selection.
    fields: Option<String>,
    /// Relation expansion.
    expand: Option<String>,
}

/// Arguments for create tools; the payload key varies by resource.
#[derive(Debug, Deserialize)]
struct CreateArgs {
    /// Explicit dry-run choice.
    dry_run: Option<bool>,
    /// Remaining arguments, including the payload.
    #[serde(flatten)]
    rest: Map<String, Value>,
}

/// Arguments for update tools.
#[derive(Debug, Deserialize)]
struct UpdateArgs {
    /// Resource id.
    id: String,
    /// Fields to update.
    patch: Map<String, Value>,
    /// Explicit dry-run choice.
    dry_run: Option<bool>,
}

/// Arguments for delete tools.
#[derive(Debug, Deserialize)]
struct DeleteArgs {
    /// Resource id.
    id: String,
    /// Explicit dry-run choice.
    dry_run: Option<bool>,
}

/// Arguments for `admin_set_product_collection`.
#[derive(Debug, Deserialize)]
struct SetCollectionArgs {
    /// Product id.
    product_id: String,
    /// Outer `None` when absent, inner `None` when explicitly null.
    #[serde(default, deserialize_with = "present_nullable")]
    collection_id: Option<Option<String>>,
    /// Explicit dry-run choice.
    dry_run: Option<bool>,
}

/// Arguments for `admin_add_product_to_category`.
#[derive(Debug, Deserialize)]
struct CategoryBatchArgs {
    /// Category id.
    category_id: String,
    /// Products to add.
    product_ids: Vec<String>,
    /// Explicit dry-run choice.
    dry_run: Option<bool>,
}

/// Arguments for `admin_create_reel`.
#[derive(Debug, Deserialize)]
struct ReelArgs {
    /// Video URL.
    url: String,
    /// Media host public id.
    public_id: String,
    /// Reel type.
    #[serde(rename = "type")]
    reel_type: Option<String>,
    /// Duration class.
    duration_type: Option<String>,
    /// Explicit dry-run choice.
    dry_run: Option<bool>,
}

/// Arguments for `admin_upload_file_base64`.
#[derive(Debug, Deserialize)]
struct UploadArgs {
    /// File name.
    filename: String,
    /// MIME type.
    #[serde(rename = "contentType")]
    content_type: String,
    /// Base64 payload.
    base64: String,
    /// Privacy flag.
    #[serde(rename = "isPrivate")]
    is_private: Option<bool>,
}

/// Arguments for `admin_request`.
#[derive(Debug, Deserialize)]
struct RequestArgs {
    /// HTTP method label.
    method: String,
    /// Absolute path.
    path: String,
    /// Query parameters.
    query: Option<QueryParams>,
    /// JSON body.
    body: Option<Value>,
    /// Extra headers.
    headers: Option<BTreeMap<String, String>>,
    /// Explicit dry-run choice.
    dry_run: Option<bool>,
}

/// Arguments for `admin_confirm`.
#[derive(Debug, Deserialize)]
struct ConfirmArgs {
    /// Token returned by a gated tool.
    confirm_token: String,
}

/// Arguments for `ui_navigate`.
#[derive(Debug, Deserialize)]
struct NavigateArgs {
    /// Dashboard path.
    path: String,
}

/// Toast severity.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
enum ToastKind {
    /// Success toast.
    Success,
    /// Informational toast.
    #[default]
    Info,
    /// Warning toast.
    Warning,
    /// Error toast.
    Error,
}

/// Arguments for `ui_toast`.
#[derive(Debug, Deserialize)]
struct ToastArgs {
    /// Severity.
    #[serde(default)]
    kind: ToastKind,
    /// Toast text.
    message: String,
}

/// Arguments for `ui_prefill_form`.
#[derive(Debug, Deserialize)]
struct PrefillArgs {
    /// Logical form name.
    form: String,
    /// Values to prefill.
    values: Map<String, Value>,
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Decodes a JSON payload into a typed tool request.
fn decode<T: for<'de> Deserialize<'de>>(payload: Value) -> Result<T, ToolError> {
    serde_json::from_value(payload).map_err(|err| ToolError::InvalidParams(err.to_string()))
}

/// Distinguishes an explicit `null` from an absent field.
fn present_nullable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Rejects empty or whitespace-only string arguments.
fn require_non_empty(field: &str, value: &str) -> Result<(), ToolError> {
    if value.trim().is_empty() {
        return Err(ToolError::InvalidParams(format!("{field} must be non-empty")));
    }
    Ok(())
}

/// Inserts a query value when present.
fn insert_opt(query: &mut QueryParams, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        query.insert(key.to_string(), value);
    }
}

/// Builds `<base>/<id>` with `id` percent-encoded as a single path segment.
fn resource_path(base: &str, field: &str, id: &str) -> Result<String, ToolError> {
    require_non_empty(field, id)?;
    if id == "." || id == ".." {
        return Err(ToolError::InvalidParams(format!("{field} is not a valid identifier")));
    }
    Ok(format!("{base}/{}", encode_segment(id)?))
}

/// Percent-encodes one path segment.
fn encode_segment(segment: &str) -> Result<String, ToolError> {
    let mut url = Url::parse("http://segment.invalid/")
        .map_err(|err| ToolError::Internal(format!("segment encoder: {err}")))?;
    url.path_segments_mut()
        .map_err(|()| ToolError::Internal("segment encoder: cannot-be-a-base url".to_string()))?
        .pop_if_empty()
        .push(segment);
    Ok(url.path().trim_start_matches('/').to_string())
}

/// Builds a JSON-bodied operation.
fn json_operation(method: Method, path: impl Into<String>, body: Value) -> OperationDescriptor {
    OperationDescriptor::new(method, path)
        .with_header("Content-Type", "application/json")
        .with_body(body)
}

/// Adds a paging `summary` to a product list body that carries a `products` array.
fn with_product_summary(mut data: Value) -> Value {
    let Some(map) = data.as_object_mut() else {
        return data;
    };
    let Some(returned) = map.get("products").and_then(Value::as_array).map(Vec::len) else {
        return data;
    };
    let field = |key: &str| map.get(key).cloned().unwrap_or(Value::Null);
    let summary = json!({
        "total_count": field("count"),
        "offset": field("offset"),
        "limit": field("limit"),
        "returned": returned,
    });
    map.insert("summary".to_string(), summary);
    data
}

/// Error for uploads above the configured limit.
fn upload_too_large(max_upload_bytes: usize) -> ToolError {
    ToolError::InvalidParams(format!("upload exceeds {max_upload_bytes} bytes"))
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
        clippy::use_debug,
        reason = "Test-only helper assertions."
    )]

    use serde_json::json;

    use super::encode_segment;
    use super::resource_path;
    use super::with_product_summary;

    #[test]
    fn ids_are_encoded_as_one_segment() {
        assert_eq!(encode_segment("prod_01").unwrap(), "prod_01");
        assert_eq!(encode_segment("a/b").unwrap(), "a%2Fb");
        assert_eq!(encode_segment("a?b#c").unwrap(), "a%3Fb%23c");
        assert_eq!(encode_segment("a b").unwrap(), "a%20b");
        assert_eq!(encode_segment("100%").unwrap(), "100%25");
    }

    #[test]
    fn dot_segments_and_blank_ids_are_rejected() {
        assert!(resource_path("/admin/products", "id", "..").is_err());
        assert!(resource_path("/admin/products", "id", ".").is_err());
        assert!(resource_path("/admin/products", "id", "  ").is_err());
        assert_eq!(
            resource_path("/admin/products", "id", "../store").unwrap(),
            "/admin/products/..%2Fstore"
        );
    }

    #[test]
    fn product_lists_gain_a_paging_summary() {
        let data = with_product_summary(json!({
            "products": [{"id": "p1"}, {"id": "p2"}],
            "count": 40,
            "offset": 20,
            "limit": 2,
        }));
        assert_eq!(
            data["summary"],
            json!({"total_count": 40, "offset": 20, "limit": 2, "returned": 2})
        );
        assert_eq!(data["products"][1]["id"], "p2");

        let other = json!({"message": "no products key"});
        assert_eq!(with_product_summary(other.clone()), other);
    }
}
