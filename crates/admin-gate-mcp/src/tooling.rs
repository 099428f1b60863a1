// crates/admin-gate-mcp/src/tooling.rs
// ============================================================================
// Module: Tool Catalogue
// Description: Canonical MCP tool identifiers and their input schemas.
// Purpose: Single source for tool names, descriptions and JSON schemas.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Tool names are part of the external contract surface. Each tool carries a
//! JSON Schema (draft 2020-12) describing its arguments; `tools/list` returns
//! them verbatim.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Tool Names
// ============================================================================

/// Canonical tool names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    /// Non-secret configuration summary.
    ServerInfo,
    /// List products.
    AdminListProducts,
    /// Fetch one product.
    AdminGetProduct,
    /// List collections.
    AdminListCollections,
    /// Fetch one collection.
    AdminGetCollection,
    /// List product categories.
    AdminListCategories,
    /// List regions.
    AdminListRegions,
    /// List sales channels.
    AdminListSalesChannels,
    /// Create a product (gated).
    AdminCreateProduct,
    /// Update a product (gated).
    AdminUpdateProduct,
    /// Delete a product (gated).
    AdminDeleteProduct,
    /// Create a collection (gated).
    AdminCreateCollection,
    /// Update a collection (gated).
    AdminUpdateCollection,
    /// Delete a collection (gated).
    AdminDeleteCollection,
    /// Create a category (gated).
    AdminCreateCategory,
    /// Update a category (gated).
    AdminUpdateCategory,
    /// Delete a category (gated).
    AdminDeleteCategory,
    /// Assign or clear a product's collection (gated).
    AdminSetProductCollection,
    /// Add products to a category (gated).
    AdminAddProductToCategory,
    /// List reels.
    AdminListReels,
    /// Create a reel (gated).
    AdminCreateReel,
    /// Delete a reel (gated).
    AdminDeleteReel,
    /// Upload a base64 file.
    AdminUploadFileBase64,
    /// Generic admin request (writes gated).
    AdminRequest,
    /// Execute a confirmed proposal.
    AdminConfirm,
    /// UI navigation action.
    UiNavigate,
    /// Alias of [`ToolName::UiNavigate`].
    UiNavigateTo,
    /// UI toast action.
    UiToast,
    /// UI form prefill action.
    UiPrefillForm,
}

impl ToolName {
    /// Returns the canonical MCP tool name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ServerInfo => "server_info",
            Self::AdminListProducts => "admin_list_products",
            Self::AdminGetProduct => "admin_get_product",
            Self::AdminListCollections => "admin_list_collections",
            Self::AdminGetCollection => "admin_get_collection",
            Self::AdminListCategories => "admin_list_categories",
            Self::AdminListRegions => "admin_list_regions",
            Self::AdminListSalesChannels => "admin_list_sales_channels",
            Self::AdminCreateProduct => "admin_create_product",
            Self::AdminUpdateProduct => "admin_update_product",
            Self::AdminDeleteProduct => "admin_delete_product",
            Self::AdminCreateCollection => "admin_create_collection",
            Self::AdminUpdateCollection => "admin_update_collection",
            Self::AdminDeleteCollection => "admin_delete_collection",
            Self::AdminCreateCategory => "admin_create_category",
            Self::AdminUpdateCategory => "admin_update_category",
            Self::AdminDeleteCategory => "admin_delete_category",
            Self::AdminSetProductCollection => "admin_set_product_collection",
            Self::AdminAddProductToCategory => "admin_add_product_to_category",
            Self::AdminListReels => "admin_list_reels",
            Self::AdminCreateReel => "admin_create_reel",
            Self::AdminDeleteReel => "admin_delete_reel",
            Self::AdminUploadFileBase64 => "admin_upload_file_base64",
            Self::AdminRequest => "admin_request",
            Self::AdminConfirm => "admin_confirm",
            Self::UiNavigate => "ui_navigate",
            Self::UiNavigateTo => "ui_navigate_to",
            Self::UiToast => "ui_toast",
            Self::UiPrefillForm => "ui_prefill_form",
        }
    }

    /// Returns all tool names in catalogue order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::ServerInfo,
            Self::AdminListProducts,
            Self::AdminGetProduct,
            Self::AdminListCollections,
            Self::AdminGetCollection,
            Self::AdminListCategories,
            Self::AdminListRegions,
            Self::AdminListSalesChannels,
            Self::AdminCreateProduct,
            Self::AdminUpdateProduct,
            Self::AdminDeleteProduct,
            Self::AdminCreateCollection,
            Self::AdminUpdateCollection,
            Self::AdminDeleteCollection,
            Self::AdminCreateCategory,
            Self::AdminUpdateCategory,
            Self::AdminDeleteCategory,
            Self::AdminSetProductCollection,
            Self::AdminAddProductToCategory,
            Self::AdminListReels,
            Self::AdminCreateReel,
            Self::AdminDeleteReel,
            Self::AdminUploadFileBase64,
            Self::AdminRequest,
            Self::AdminConfirm,
            Self::UiNavigate,
            Self::UiNavigateTo,
            Self::UiToast,
            Self::UiPrefillForm,
        ]
    }

    /// Parses a tool name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|tool| tool.as_str() == name)
    }

    /// Returns true when the tool routes through the confirmation gate.
    #[must_use]
    pub const fn is_gated_write(self) -> bool {
        matches!(
            self,
            Self::AdminCreateProduct
                | Self::AdminUpdateProduct
                | Self::AdminDeleteProduct
                | Self::AdminCreateCollection
                | Self::AdminUpdateCollection
                | Self::AdminDeleteCollection
                | Self::AdminCreateCategory
                | Self::AdminUpdateCategory
                | Self::AdminDeleteCategory
                | Self::AdminSetProductCollection
                | Self::AdminAddProductToCategory
                | Self::AdminCreateReel
                | Self::AdminDeleteReel
        )
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Definitions
// ============================================================================

/// MCP tool definition returned by `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    /// MCP tool name.
    pub name: ToolName,
    /// Tool description for clients.
    pub description: String,
    /// JSON schema for tool input.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Returns every tool definition in catalogue order.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    ToolName::all()
        .iter()
        .map(|tool| ToolDefinition {
            name: *tool,
            description: description(*tool).to_string(),
            input_schema: input_schema(*tool),
        })
        .collect()
}

/// Human-facing description for a tool.
const fn description(tool: ToolName) -> &'static str {
    match tool {
        ToolName::ServerInfo => {
            "Report non-secret server configuration: confirmation policy, token TTL, downstream \
             and auth posture."
        }
        ToolName::AdminListProducts => "List products (GET /admin/products).",
        ToolName::AdminGetProduct => "Get a product by id (GET /admin/products/:id).",
        ToolName::AdminListCollections => "List product collections (GET /admin/collections).",
        ToolName::AdminGetCollection => "Get a collection by id (GET /admin/collections/:id).",
        ToolName::AdminListCategories => {
            "List product categories (GET /admin/product-categories)."
        }
        ToolName::AdminListRegions => "List regions (GET /admin/regions).",
        ToolName::AdminListSalesChannels => "List sales channels (GET /admin/sales-channels).",
        ToolName::AdminCreateProduct => {
            "Create a product (POST /admin/products). Returns a dry-run plan and confirm token \
             unless dry_run is false."
        }
        ToolName::AdminUpdateProduct => {
            "Update a product (POST /admin/products/:id). Returns a dry-run plan and confirm \
             token unless dry_run is false."
        }
        ToolName::AdminDeleteProduct => {
            "Delete a product (DELETE /admin/products/:id). Returns a dry-run plan and confirm \
             token unless dry_run is false."
        }
        ToolName::AdminCreateCollection => {
            "Create a collection (POST /admin/collections). Gated by confirmation."
        }
        ToolName::AdminUpdateCollection => {
            "Update a collection (POST /admin/collections/:id). Gated by confirmation."
        }
        ToolName::AdminDeleteCollection => {
            "Delete a collection (DELETE /admin/collections/:id). Gated by confirmation."
        }
        ToolName::AdminCreateCategory => {
            "Create a product category (POST /admin/product-categories). Gated by confirmation."
        }
        ToolName::AdminUpdateCategory => {
            "Update a product category (POST /admin/product-categories/:id). Gated by \
             confirmation."
        }
        ToolName::AdminDeleteCategory => {
            "Delete a product category (DELETE /admin/product-categories/:id). Gated by \
             confirmation."
        }
        ToolName::AdminSetProductCollection => {
            "Assign a product to a collection, or clear it with collection_id null (POST \
             /admin/products/:id). Gated by confirmation."
        }
        ToolName::AdminAddProductToCategory => {
            "Add products to a category (POST /admin/product-categories/:id/products/batch). \
             Gated by confirmation."
        }
        ToolName::AdminListReels => "List reels (GET /admin/reels).",
        ToolName::AdminCreateReel => {
            "Create a reel entry (POST /admin/reels). Gated by confirmation."
        }
        ToolName::AdminDeleteReel => {
            "Delete a reel (DELETE /admin/reels/:id). Gated by confirmation."
        }
        ToolName::AdminUploadFileBase64 => {
            "Upload a base64-encoded file (POST /admin/uploads). Returns uploaded file URLs."
        }
        ToolName::AdminRequest => {
            "Send an arbitrary request under an allowed admin prefix. GET executes directly; \
             other methods are gated by confirmation."
        }
        ToolName::AdminConfirm => {
            "Execute a previously planned write. Only accepts a confirm_token returned by a \
             gated tool."
        }
        ToolName::UiNavigate | ToolName::UiNavigateTo => {
            "Return a UI action that tells the dashboard to navigate to a path."
        }
        ToolName::UiToast => "Return a UI action that shows a toast message in the dashboard.",
        ToolName::UiPrefillForm => {
            "Return a UI action that prefills a dashboard form with values."
        }
    }
}

/// Input schema for a tool.
fn input_schema(tool: ToolName) -> Value {
    match tool {
        ToolName::ServerInfo | ToolName::AdminListReels => object_schema(&json!({}), &[]),
        ToolName::AdminListProducts => list_schema(true),
        ToolName::AdminGetProduct => object_schema(
            &json!({
                "id": non_empty_string("Product id."),
                "fields": field_selection(),
                "expand": expand_selection(),
            }),
            &["id"],
        ),
        ToolName::AdminGetCollection => object_schema(
            &json!({
                "id": non_empty_string("Collection id."),
                "fields": field_selection(),
            }),
            &["id"],
        ),
        ToolName::AdminListCollections
        | ToolName::AdminListCategories
        | ToolName::AdminListRegions
        | ToolName::AdminListSalesChannels => list_schema(false),
        ToolName::AdminCreateProduct => create_schema("product"),
        ToolName::AdminCreateCollection => create_schema("collection"),
        ToolName::AdminCreateCategory => create_schema("category"),
        ToolName::AdminUpdateProduct
        | ToolName::AdminUpdateCollection
        | ToolName::AdminUpdateCategory => object_schema(
            &json!({
                "id": non_empty_string("Resource id."),
                "patch": { "type": "object", "description": "Fields to update." },
                "dry_run": dry_run_property(),
            }),
            &["id", "patch"],
        ),
        ToolName::AdminDeleteProduct
        | ToolName::AdminDeleteCollection
        | ToolName::AdminDeleteCategory
        | ToolName::AdminDeleteReel => object_schema(
            &json!({
                "id": non_empty_string("Resource id."),
                "dry_run": dry_run_property(),
            }),
            &["id"],
        ),
        ToolName::AdminSetProductCollection => object_schema(
            &json!({
                "product_id": non_empty_string("Product id."),
                "collection_id": {
                    "type": ["string", "null"],
                    "description": "Collection id, or null to clear.",
                },
                "dry_run": dry_run_property(),
            }),
            &["product_id", "collection_id"],
        ),
        ToolName::AdminAddProductToCategory => object_schema(
            &json!({
                "category_id": non_empty_string("Category id."),
                "product_ids": {
                    "type": "array",
                    "items": { "type": "string", "minLength": 1 },
                    "minItems": 1,
                    "description": "Product ids to add.",
                },
                "dry_run": dry_run_property(),
            }),
            &["category_id", "product_ids"],
        ),
        ToolName::AdminCreateReel => object_schema(
            &json!({
                "url": non_empty_string("Video URL."),
                "public_id": non_empty_string("Media host public id."),
                "type": { "type": "string", "default": "reel" },
                "duration_type": { "type": "string", "default": "short" },
                "dry_run": dry_run_property(),
            }),
            &["url", "public_id"],
        ),
        ToolName::AdminUploadFileBase64 => object_schema(
            &json!({
                "filename": non_empty_string("File name reported to the admin API."),
                "contentType": non_empty_string("MIME type, e.g. image/png."),
                "base64": non_empty_string("Standard base64 payload."),
                "isPrivate": { "type": "boolean" },
            }),
            &["filename", "contentType", "base64"],
        ),
        ToolName::AdminRequest => object_schema(
            &json!({
                "method": { "type": "string", "enum": ["GET", "POST", "PUT", "DELETE"] },
                "path": non_empty_string("Absolute path under an allowed prefix."),
                "query": { "type": "object" },
                "body": {},
                "headers": {
                    "type": "object",
                    "additionalProperties": { "type": "string" },
                },
                "dry_run": dry_run_property(),
            }),
            &["method", "path"],
        ),
        ToolName::AdminConfirm => object_schema(
            &json!({ "confirm_token": non_empty_string("Token returned by a gated tool.") }),
            &["confirm_token"],
        ),
        ToolName::UiNavigate | ToolName::UiNavigateTo => object_schema(
            &json!({ "path": non_empty_string("Dashboard path, e.g. /products/create.") }),
            &["path"],
        ),
        ToolName::UiToast => object_schema(
            &json!({
                "kind": {
                    "type": "string",
                    "enum": ["success", "info", "warning", "error"],
                    "default": "info",
                },
                "message": non_empty_string("Toast text."),
            }),
            &["message"],
        ),
        ToolName::UiPrefillForm => object_schema(
            &json!({
                "form": non_empty_string("Logical form name, e.g. product_create."),
                "values": { "type": "object", "description": "Key-value map to prefill." },
            }),
            &["form", "values"],
        ),
    }
}

// ============================================================================
// SECTION: Schema Helpers
// ============================================================================

/// Wraps properties into an object schema.
fn object_schema(properties: &Value, required: &[&str]) -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Schema for list tools.
fn list_schema(with_expand: bool) -> Value {
    let mut properties = json!({
        "q": { "type": "string", "description": "Free-text search." },
        "limit": { "type": "integer", "minimum": 1, "maximum": 100 },
        "offset": { "type": "integer", "minimum": 0 },
        "fields": field_selection(),
    });
    if with_expand && let Some(map) = properties.as_object_mut() {
        map.insert("expand".to_string(), expand_selection());
    }
    object_schema(&properties, &[])
}

/// Schema for gated create tools.
fn create_schema(resource: &str) -> Value {
    let mut properties = serde_json::Map::new();
    properties.insert(
        resource.to_string(),
        json!({ "type": "object", "description": format!("The {resource} to create.") }),
    );
    properties.insert("dry_run".to_string(), dry_run_property());
    object_schema(&Value::Object(properties), &[resource])
}

/// Non-empty string property.
fn non_empty_string(description: &str) -> Value {
    json!({ "type": "string", "minLength": 1, "description": description })
}

/// Field selection property.
fn field_selection() -> Value {
    json!({ "type": "string", "description": "Comma-separated field selection." })
}

/// Relation expansion property.
fn expand_selection() -> Value {
    json!({ "type": "string", "description": "Comma-separated relations to expand." })
}

/// Dry-run flag property.
fn dry_run_property() -> Value {
    json!({
        "type": "boolean",
        "description": "Plan only; defaults to the server confirmation policy.",
    })
}
