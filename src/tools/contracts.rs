use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use zuper_client::{path_segment, QueryString};

use super::{created_uid, default_limit, default_page, prepare, Envelope, ToolContext, ToolDefinition};
use crate::Result;

const CATEGORY: &str = "contracts";

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ContractStatus {
    Active,
    Expired,
    Cancelled,
}

impl ContractStatus {
    fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Active => "active",
            ContractStatus::Expired => "expired",
            ContractStatus::Cancelled => "cancelled",
        }
    }
}

pub(super) fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "createServiceContract",
            CATEGORY,
            "Create a new service contract for recurring maintenance or services",
            json!({
                "customerUid": {"type": "string", "description": "Customer identifier"},
                "contractName": {"type": "string", "description": "Name of the service contract"},
                "contractType": {"type": "string", "description": "Type of contract (e.g. maintenance, support)"},
                "startDate": {"type": "string", "description": "Contract start date in ISO 8601 format"},
                "endDate": {"type": "string", "description": "Contract end date in ISO 8601 format"},
                "recurringSchedule": {"type": "string", "description": "Recurrence pattern (e.g. monthly, quarterly)"},
                "value": {"type": "number", "description": "Contract value/amount"},
                "description": {"type": "string", "description": "Contract description"},
                "terms": {"type": "string", "description": "Contract terms and conditions"}
            }),
            &["customerUid", "contractName", "startDate", "endDate"],
        ),
        ToolDefinition::new(
            "getServiceContract",
            CATEGORY,
            "Retrieve details of a specific service contract",
            json!({
                "contractUid": {"type": "string", "description": "Unique identifier of the service contract"}
            }),
            &["contractUid"],
        ),
        ToolDefinition::new(
            "listServiceContracts",
            CATEGORY,
            "List all service contracts with optional filtering",
            json!({
                "customerUid": {"type": "string", "description": "Filter by customer"},
                "status": {
                    "type": "string",
                    "enum": ["active", "expired", "cancelled"],
                    "description": "Filter by contract status"
                },
                "page": {"type": "number", "default": 1, "description": "Page number for pagination"},
                "limit": {"type": "number", "default": 50, "description": "Number of results per page"}
            }),
            &[],
        ),
    ]
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
struct NewContract {
    customer_uid: String,
    contract_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    contract_type: Option<String>,
    start_date: String,
    end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recurring_schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    terms: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContractUidParams {
    contract_uid: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListContractsParams {
    #[serde(default)]
    customer_uid: Option<String>,
    #[serde(default)]
    status: Option<ContractStatus>,
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_limit")]
    limit: u32,
}

pub(super) async fn create_contract(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (contract, creds): (NewContract, _) = prepare(ctx, &args)?;
    let body = serde_json::to_value(&contract)?;
    let result = ctx.client.post("/api/service_contract", &creds, &body).await?;

    let message = format!(
        "Service contract created successfully with ID: {}",
        created_uid(&result)
    );
    Ok(Envelope::new(result).with_message(message).into_value())
}

pub(super) async fn get_contract(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (params, creds): (ContractUidParams, _) = prepare(ctx, &args)?;
    let result = ctx
        .client
        .get(&format!("/api/service_contract/{}", path_segment(&params.contract_uid)), &creds)
        .await?;
    Ok(Envelope::new(result).into_value())
}

pub(super) async fn list_contracts(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (params, creds): (ListContractsParams, _) = prepare(ctx, &args)?;

    let mut query = QueryString::paged(params.page, params.limit);
    query
        .push_opt("customerUid", params.customer_uid)
        .push_opt("status", params.status.map(|s| s.as_str()));

    let result = ctx
        .client
        .get(&query.append_to("/api/service_contract"), &creds)
        .await?;
    Ok(Envelope::listed(result).into_value())
}
