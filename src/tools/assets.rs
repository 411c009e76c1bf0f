use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use zuper_client::{path_segment, QueryString};

use super::{created_uid, default_limit, default_page, prepare, Envelope, ToolContext, ToolDefinition};
use crate::Result;

const CATEGORY: &str = "assets";

pub(super) fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "createAsset",
            CATEGORY,
            "Create a new asset for tracking equipment, tools, or resources",
            json!({
                "assetName": {"type": "string", "description": "Name of the asset"},
                "assetType": {"type": "string", "description": "Type/category of the asset"},
                "customerUid": {"type": "string", "description": "Customer this asset belongs to"},
                "propertyUid": {"type": "string", "description": "Property where the asset is located"},
                "serialNumber": {"type": "string", "description": "Serial number of the asset"},
                "modelNumber": {"type": "string", "description": "Model number"},
                "manufacturer": {"type": "string", "description": "Manufacturer name"},
                "installationDate": {"type": "string", "description": "Installation date in ISO 8601 format"},
                "warrantyExpiry": {"type": "string", "description": "Warranty expiry date in ISO 8601 format"},
                "notes": {"type": "string", "description": "Additional notes"}
            }),
            &["assetName"],
        ),
        ToolDefinition::new(
            "getAsset",
            CATEGORY,
            "Retrieve details of a specific asset",
            json!({
                "assetUid": {"type": "string", "description": "Unique identifier of the asset"}
            }),
            &["assetUid"],
        ),
        ToolDefinition::new(
            "listAssets",
            CATEGORY,
            "List all assets with optional filtering",
            json!({
                "customerUid": {"type": "string", "description": "Filter by customer"},
                "propertyUid": {"type": "string", "description": "Filter by property"},
                "assetType": {"type": "string", "description": "Filter by asset type"},
                "page": {"type": "number", "default": 1, "description": "Page number for pagination"},
                "limit": {"type": "number", "default": 50, "description": "Number of results per page"}
            }),
            &[],
        ),
    ]
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
struct NewAsset {
    asset_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    asset_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    customer_uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    property_uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    installation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    warranty_expiry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetUidParams {
    asset_uid: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListAssetsParams {
    #[serde(default)]
    customer_uid: Option<String>,
    #[serde(default)]
    property_uid: Option<String>,
    #[serde(default)]
    asset_type: Option<String>,
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_limit")]
    limit: u32,
}

pub(super) async fn create_asset(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (asset, creds): (NewAsset, _) = prepare(ctx, &args)?;
    let body = serde_json::to_value(&asset)?;
    let result = ctx.client.post("/api/assets", &creds, &body).await?;

    let message = format!("Asset created successfully with ID: {}", created_uid(&result));
    Ok(Envelope::new(result).with_message(message).into_value())
}

pub(super) async fn get_asset(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (params, creds): (AssetUidParams, _) = prepare(ctx, &args)?;
    let result = ctx
        .client
        .get(&format!("/api/assets/{}", path_segment(&params.asset_uid)), &creds)
        .await?;
    Ok(Envelope::new(result).into_value())
}

pub(super) async fn list_assets(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (params, creds): (ListAssetsParams, _) = prepare(ctx, &args)?;

    // The asset filters are camelCase on the wire.
    let mut query = QueryString::paged(params.page, params.limit);
    query
        .push_opt("customerUid", params.customer_uid)
        .push_opt("propertyUid", params.property_uid)
        .push_opt("assetType", params.asset_type);

    let result = ctx.client.get(&query.append_to("/api/assets"), &creds).await?;
    Ok(Envelope::listed(result).into_value())
}
