use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use zuper_client::path_segment;

use super::{created_uid, prepare, Envelope, ToolContext, ToolDefinition};
use crate::Result;

const CATEGORY: &str = "properties";

pub(super) fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "createProperty",
            CATEGORY,
            "Create a new property/location for a customer",
            json!({
                "customerUid": {"type": "string", "description": "Customer UID this property belongs to"},
                "propertyName": {"type": "string", "description": "Name of the property"},
                "address": {
                    "type": "object",
                    "properties": {
                        "street": {"type": "string"},
                        "city": {"type": "string"},
                        "state": {"type": "string"},
                        "zipCode": {"type": "string"},
                        "country": {"type": "string"}
                    },
                    "required": ["street", "city", "state", "zipCode", "country"]
                },
                "propertyType": {"type": "string", "description": "Type of property (residential, commercial, etc.)"},
                "notes": {"type": "string"}
            }),
            &["customerUid", "propertyName", "address"],
        ),
        ToolDefinition::new(
            "getProperty",
            CATEGORY,
            "Retrieve details of a specific property by UID",
            json!({
                "propertyUid": {"type": "string", "description": "Unique identifier of the property to retrieve"}
            }),
            &["propertyUid"],
        ),
    ]
}

/// Unlike a customer address, every field is required.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
struct PropertyAddress {
    street: String,
    city: String,
    state: String,
    zip_code: String,
    country: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
struct NewProperty {
    customer_uid: String,
    property_name: String,
    address: PropertyAddress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    property_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PropertyUidParams {
    property_uid: String,
}

pub(super) async fn create_property(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (property, creds): (NewProperty, _) = prepare(ctx, &args)?;
    let body = serde_json::to_value(&property)?;
    let result = ctx.client.post("/api/property", &creds, &body).await?;

    let message = format!("Property created successfully with ID: {}", created_uid(&result));
    Ok(Envelope::new(result).with_message(message).into_value())
}

pub(super) async fn get_property(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (params, creds): (PropertyUidParams, _) = prepare(ctx, &args)?;
    let result = ctx
        .client
        .get(&format!("/api/property/{}", path_segment(&params.property_uid)), &creds)
        .await?;
    Ok(Envelope::new(result).into_value())
}

#[cfg(test)]
mod tests {
    use super::super::parse_args;
    use super::*;

    #[test]
    fn test_partial_address_is_rejected() {
        let err = parse_args::<NewProperty>(&json!({
            "customerUid": "c-1",
            "propertyName": "HQ",
            "address": {"street": "1 Main St", "city": "Springfield"}
        }))
        .unwrap_err();
        assert!(matches!(err, crate::Error::InvalidParams(_)));
    }
}
