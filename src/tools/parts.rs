//! Parts and service items. The API calls them products.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use zuper_client::{path_segment, QueryString};

use super::{created_uid, default_limit, default_page, prepare, Envelope, ToolContext, ToolDefinition};
use crate::Result;

const CATEGORY: &str = "parts";

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
enum PartType {
    Part,
    Service,
}

impl PartType {
    fn as_str(&self) -> &'static str {
        match self {
            PartType::Part => "part",
            PartType::Service => "service",
        }
    }
}

pub(super) fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "createPart",
            CATEGORY,
            "Create a new part/service item in inventory",
            json!({
                "partName": {"type": "string", "description": "Name of the part or service"},
                "partType": {
                    "type": "string",
                    "enum": ["part", "service"],
                    "description": "Type: part for physical items, service for labor"
                },
                "sku": {"type": "string", "description": "Stock Keeping Unit (SKU)"},
                "description": {"type": "string", "description": "Part description"},
                "unitPrice": {"type": "number", "description": "Price per unit"},
                "quantity": {"type": "number", "description": "Available quantity in stock"},
                "unit": {"type": "string", "description": "Unit of measurement (e.g. pcs, hours)"},
                "category": {"type": "string", "description": "Part category"},
                "vendor": {"type": "string", "description": "Vendor/supplier name"}
            }),
            &["partName", "partType"],
        ),
        ToolDefinition::new(
            "getPart",
            CATEGORY,
            "Retrieve details of a specific part or service",
            json!({
                "partUid": {"type": "string", "description": "Unique identifier of the part"}
            }),
            &["partUid"],
        ),
        ToolDefinition::new(
            "listParts",
            CATEGORY,
            "List all parts and services in inventory",
            json!({
                "partType": {"type": "string", "enum": ["part", "service"], "description": "Filter by type"},
                "category": {"type": "string", "description": "Filter by category"},
                "search": {"type": "string", "description": "Search by name, SKU, or description"},
                "page": {"type": "number", "default": 1, "description": "Page number for pagination"},
                "limit": {"type": "number", "default": 50, "description": "Number of results per page"}
            }),
            &[],
        ),
    ]
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
struct NewPart {
    part_name: String,
    part_type: PartType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unit_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vendor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartUidParams {
    part_uid: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPartsParams {
    #[serde(default)]
    part_type: Option<PartType>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    search: Option<String>,
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_limit")]
    limit: u32,
}

pub(super) async fn create_part(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (part, creds): (NewPart, _) = prepare(ctx, &args)?;
    let body = serde_json::to_value(&part)?;
    let result = ctx.client.post("/api/product", &creds, &body).await?;

    let message = format!("Part created successfully with ID: {}", created_uid(&result));
    Ok(Envelope::new(result).with_message(message).into_value())
}

pub(super) async fn get_part(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (params, creds): (PartUidParams, _) = prepare(ctx, &args)?;
    let result = ctx
        .client
        .get(&format!("/api/product/{}", path_segment(&params.part_uid)), &creds)
        .await?;
    Ok(Envelope::new(result).into_value())
}

pub(super) async fn list_parts(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (params, creds): (ListPartsParams, _) = prepare(ctx, &args)?;

    let mut query = QueryString::paged(params.page, params.limit);
    query
        .push_opt("type", params.part_type.map(|t| t.as_str()))
        .push_opt("category", params.category)
        .push_opt("search", params.search);

    let result = ctx.client.get(&query.append_to("/api/product"), &creds).await?;
    Ok(Envelope::listed(result).into_value())
}
