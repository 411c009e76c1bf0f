use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use zuper_client::{path_segment, QueryString};

use super::{created_uid, default_limit, default_page, prepare, Envelope, ToolContext, ToolDefinition};
use crate::Result;

const CATEGORY: &str = "invoices";

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }
}

pub(super) fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "createInvoice",
            CATEGORY,
            "Create a new invoice for a job or customer",
            json!({
                "jobUid": {"type": "string", "description": "Job UID this invoice is associated with"},
                "customerUid": {"type": "string", "description": "Customer UID for this invoice"},
                "invoiceDate": {"type": "string", "description": "Invoice date in ISO 8601 format"},
                "dueDate": {"type": "string", "description": "Payment due date in ISO 8601 format"},
                "lineItems": {
                    "type": "array",
                    "description": "Line items for the invoice",
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
                "notes": {"type": "string", "description": "Additional notes for the invoice"}
            }),
            &["customerUid", "invoiceDate", "lineItems"],
        ),
        ToolDefinition::new(
            "getInvoice",
            CATEGORY,
            "Retrieve details of a specific invoice by UID",
            json!({
                "invoiceUid": {"type": "string", "description": "Unique identifier of the invoice to retrieve"}
            }),
            &["invoiceUid"],
        ),
        ToolDefinition::new(
            "listInvoices",
            CATEGORY,
            "List all invoices with optional filtering",
            json!({
                "status": {
                    "type": "string",
                    "enum": ["draft", "sent", "paid", "overdue", "cancelled"],
                    "description": "Filter invoices by status"
                },
                "customerUid": {"type": "string", "description": "Filter by specific customer"},
                "page": {"type": "number", "default": 1, "description": "Page number for pagination"},
                "limit": {"type": "number", "default": 50, "description": "Number of results per page"}
            }),
            &[],
        ),
    ]
}

/// Invoice line; quote lines share the shape.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
pub(super) struct LineItem {
    description: String,
    quantity: f64,
    unit_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tax_rate: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
struct NewInvoice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    job_uid: Option<String>,
    customer_uid: String,
    invoice_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    due_date: Option<String>,
    line_items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvoiceUidParams {
    invoice_uid: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListInvoicesParams {
    #[serde(default)]
    status: Option<InvoiceStatus>,
    #[serde(default)]
    customer_uid: Option<String>,
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_limit")]
    limit: u32,
}

pub(super) async fn create_invoice(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (invoice, creds): (NewInvoice, _) = prepare(ctx, &args)?;
    let body = serde_json::to_value(&invoice)?;
    let result = ctx.client.post("/api/invoice", &creds, &body).await?;

    let message = format!("Invoice created successfully with ID: {}", created_uid(&result));
    Ok(Envelope::new(result).with_message(message).into_value())
}

pub(super) async fn get_invoice(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (params, creds): (InvoiceUidParams, _) = prepare(ctx, &args)?;
    let result = ctx
        .client
        .get(&format!("/api/invoice/{}", path_segment(&params.invoice_uid)), &creds)
        .await?;
    Ok(Envelope::new(result).into_value())
}

pub(super) async fn list_invoices(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (params, creds): (ListInvoicesParams, _) = prepare(ctx, &args)?;

    let mut query = QueryString::paged(params.page, params.limit);
    query
        .push_opt("status", params.status.map(|s| s.as_str()))
        .push_opt("customerUid", params.customer_uid);

    let result = ctx.client.get(&query.append_to("/api/invoice"), &creds).await?;
    Ok(Envelope::listed(result).into_value())
}

#[cfg(test)]
mod tests {
    use super::super::parse_args;
    use super::*;

    #[test]
    fn test_line_items_map_to_snake_case() {
        let invoice: NewInvoice = parse_args(&json!({
            "customerUid": "c-1",
            "invoiceDate": "2025-10-06",
            "lineItems": [{"description": "Labour", "quantity": 2, "unitPrice": 80.5, "taxRate": 0.2}]
        }))
        .unwrap();

        let body = serde_json::to_value(&invoice).unwrap();
        assert_eq!(
            body["line_items"],
            json!([{"description": "Labour", "quantity": 2.0, "unit_price": 80.5, "tax_rate": 0.2}])
        );
        assert!(body.get("job_uid").is_none());
    }

    #[test]
    fn test_line_items_are_required() {
        let err = parse_args::<NewInvoice>(&json!({"customerUid": "c-1", "invoiceDate": "2025-10-06"})).unwrap_err();
        assert!(err.to_string().contains("lineItems"));
    }
}
