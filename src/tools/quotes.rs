//! Quotes. The API calls them estimates.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use zuper_client::{path_segment, QueryString};

use super::invoices::LineItem;
use super::{created_uid, default_limit, default_page, prepare, Envelope, ToolContext, ToolDefinition};
use crate::Result;

const CATEGORY: &str = "quotes";

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum QuoteStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
    Expired,
}

impl QuoteStatus {
    fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Accepted => "accepted",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Expired => "expired",
        }
    }
}

pub(super) fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "createQuote",
            CATEGORY,
            "Create a new quote/estimate for a customer",
            json!({
                "customerUid": {"type": "string", "description": "Customer identifier"},
                "jobUid": {"type": "string", "description": "Associated job identifier"},
                "quoteDate": {"type": "string", "description": "Quote date in ISO 8601 format"},
                "validUntil": {"type": "string", "description": "Quote valid until date in ISO 8601 format"},
                "lineItems": {
                    "type": "array",
                    "description": "Line items for the quote",
                    "items": {
                        "type": "object",
                        "properties": {
                            "description": {"type": "string"},
                            "quantity": {"type": "number"},
                            "unitPrice": {"type": "number"},
                            "taxRate": {"type": "number"}
                        },
                        "required": ["description", "quantity", "unitPrice"]
                    }
                },
                "notes": {"type": "string", "description": "Additional notes"},
                "terms": {"type": "string", "description": "Terms and conditions"}
            }),
            &["customerUid", "quoteDate", "lineItems"],
        ),
        ToolDefinition::new(
            "getQuote",
            CATEGORY,
            "Retrieve details of a specific quote",
            json!({
                "quoteUid": {"type": "string", "description": "Unique identifier of the quote"}
            }),
            &["quoteUid"],
        ),
        ToolDefinition::new(
            "listQuotes",
            CATEGORY,
            "List all quotes with optional filtering",
            json!({
                "customerUid": {"type": "string", "description": "Filter by customer"},
                "status": {
                    "type": "string",
                    "enum": ["draft", "sent", "accepted", "rejected", "expired"],
                    "description": "Filter by quote status"
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
struct NewQuote {
    customer_uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    job_uid: Option<String>,
    quote_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    valid_until: Option<String>,
    line_items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    terms: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteUidParams {
    quote_uid: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuotesParams {
    #[serde(default)]
    customer_uid: Option<String>,
    #[serde(default)]
    status: Option<QuoteStatus>,
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_limit")]
    limit: u32,
}

pub(super) async fn create_quote(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (quote, creds): (NewQuote, _) = prepare(ctx, &args)?;
    let body = serde_json::to_value(&quote)?;
    let result = ctx.client.post("/api/estimate", &creds, &body).await?;

    let message = format!("Quote created successfully with ID: {}", created_uid(&result));
    Ok(Envelope::new(result).with_message(message).into_value())
}

pub(super) async fn get_quote(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (params, creds): (QuoteUidParams, _) = prepare(ctx, &args)?;
    let result = ctx
        .client
        .get(&format!("/api/estimate/{}", path_segment(&params.quote_uid)), &creds)
        .await?;
    Ok(Envelope::new(result).into_value())
}

pub(super) async fn list_quotes(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (params, creds): (ListQuotesParams, _) = prepare(ctx, &args)?;

    let mut query = QueryString::paged(params.page, params.limit);
    query
        .push_opt("customerUid", params.customer_uid)
        .push_opt("status", params.status.map(|s| s.as_str()));

    let result = ctx.client.get(&query.append_to("/api/estimate"), &creds).await?;
    Ok(Envelope::listed(result).into_value())
}
