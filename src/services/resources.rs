//! Read-only MCP resources: plain-text listings and a dashboard.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::tools::ToolContext;
use crate::{Error, Result};

pub const MIME_TYPE: &str = "text/plain";

const LIST_LIMIT: u32 = 100;
const DASHBOARD_LIMIT: u32 = 10;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDefinition {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
}

pub const RESOURCES: &[ResourceDefinition] = &[
    ResourceDefinition {
        uri: "zuper://jobs",
        name: "Zuper Jobs",
        description: "List of all jobs in Zuper FSM",
        mime_type: MIME_TYPE,
    },
    ResourceDefinition {
        uri: "zuper://customers",
        name: "Zuper Customers",
        description: "List of all customers in Zuper FSM",
        mime_type: MIME_TYPE,
    },
    ResourceDefinition {
        uri: "zuper://invoices",
        name: "Zuper Invoices",
        description: "List of all invoices in Zuper FSM",
        mime_type: MIME_TYPE,
    },
    ResourceDefinition {
        uri: "zuper://properties",
        name: "Zuper Properties",
        description: "List of all properties in Zuper FSM",
        mime_type: MIME_TYPE,
    },
    ResourceDefinition {
        uri: "zuper://dashboard",
        name: "Zuper Dashboard",
        description: "Dashboard overview with stats and recent activity",
        mime_type: MIME_TYPE,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Listing {
    Jobs,
    Customers,
    Invoices,
    Properties,
}

impl Listing {
    fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            "zuper://jobs" => Some(Self::Jobs),
            "zuper://customers" => Some(Self::Customers),
            "zuper://invoices" => Some(Self::Invoices),
            "zuper://properties" => Some(Self::Properties),
            _ => None,
        }
    }

    fn path(&self) -> &'static str {
        match self {
            Self::Jobs => "/api/jobs",
            Self::Customers => "/api/customers",
            Self::Invoices => "/api/invoice",
            Self::Properties => "/api/property",
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Jobs => "jobs",
            Self::Customers => "customers",
            Self::Invoices => "invoices",
            Self::Properties => "properties",
        }
    }

    fn render_record(&self, r: &Value) -> String {
        match self {
            Self::Jobs => format!(
                "Job ID: {}\nTitle: {}\nCustomer: {}\nStatus: {}\nPriority: {}\nScheduled: {}\n---",
                text(r, &["job_uid", "uid"]),
                text(r, &["job_title", "jobTitle"]),
                job_customer(r),
                text(r, &["status"]),
                text(r, &["priority"]),
                field(r, &["scheduled_start_time", "scheduledStartTime"]).unwrap_or_else(|| "Not scheduled".into()),
            ),
            Self::Customers => format!(
                "Customer ID: {}\nName: {}\nCompany: {}\nEmail: {}\nPhone: {}\n---",
                text(r, &["customer_uid", "uid"]),
                full_name(r, &["customer_first_name", "first_name", "firstName"], &["customer_last_name", "last_name", "lastName"]),
                text(r, &["customer_company_name", "company_name", "companyName"]),
                text(r, &["customer_email", "email"]),
                text(r, &["customer_phone", "phone"]),
            ),
            Self::Invoices => format!(
                "Invoice ID: {}\nInvoice Number: {}\nCustomer: {}\nStatus: {}\nAmount: {}\nDate: {}\nDue Date: {}\n---",
                text(r, &["invoice_uid", "uid"]),
                text(r, &["invoice_number", "prefix_number", "invoiceNumber"]),
                text(r, &["customer_name", "customerName"]),
                text(r, &["status"]),
                field(r, &["total", "total_amount", "totalAmount"]).unwrap_or_else(|| "0".into()),
                text(r, &["invoice_date", "invoiceDate"]),
                text(r, &["due_date", "dueDate"]),
            ),
            Self::Properties => format!(
                "Property ID: {}\nName: {}\nType: {}\nCustomer: {}\nAddress: {}\n---",
                text(r, &["property_uid", "uid"]),
                text(r, &["property_name", "propertyName"]),
                text(r, &["property_type", "propertyType"]),
                text(r, &["customer_name", "customerName"]),
                address(r),
            ),
        }
    }

    fn render(&self, body: &Value) -> String {
        let records = body.get("data").and_then(Value::as_array);
        match records {
            Some(records) if !records.is_empty() => records
                .iter()
                .map(|r| self.render_record(r))
                .collect::<Vec<_>>()
                .join("\n"),
            _ => format!("No {} found", self.kind()),
        }
    }
}

/// First present, non-empty value among `keys`, rendered as text.
fn field(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match record.get(*key)? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    })
}

fn text(record: &Value, keys: &[&str]) -> String {
    field(record, keys).unwrap_or_else(|| "N/A".to_string())
}

fn full_name(record: &Value, first: &[&str], last: &[&str]) -> String {
    let first = field(record, first).unwrap_or_default();
    let last = field(record, last).unwrap_or_default();
    format!("{} {}", first, last).trim().to_string()
}

fn job_customer(record: &Value) -> String {
    match record.get("customer") {
        Some(customer) if customer.is_object() => {
            let name = full_name(customer, &["customer_first_name"], &["customer_last_name"]);
            if name.is_empty() {
                text(customer, &["customer_uid"])
            } else {
                name
            }
        }
        _ => text(record, &["customer_name", "customerName"]),
    }
}

fn address(record: &Value) -> String {
    let Some(addr) = record.get("address") else {
        return String::new();
    };
    ["street", "city", "state"]
        .iter()
        .map(|key| field(addr, &[*key]).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(", ")
}

fn total_of(body: &Value) -> u64 {
    body.get("total").and_then(Value::as_u64).unwrap_or(0)
}

fn recent_of(body: &Value) -> usize {
    zuper_models::data_len(body)
}

pub fn render_dashboard(jobs: &Value, customers: &Value, invoices: &Value, now: DateTime<Utc>) -> String {
    format!(
        "Zuper FSM Dashboard
=====================

Jobs:
- Total Jobs: {}
- Recent Jobs: {}

Customers:
- Total Customers: {}
- Recent Customers: {}

Invoices:
- Total Invoices: {}
- Recent Invoices: {}

Last Updated: {}
",
        total_of(jobs),
        recent_of(jobs),
        total_of(customers),
        recent_of(customers),
        total_of(invoices),
        recent_of(invoices),
        now.to_rfc3339_opts(SecondsFormat::Millis, true),
    )
}

/// Fetch and render the resource at `uri`.
pub async fn read(ctx: &ToolContext, uri: &str) -> Result<String> {
    if uri == "zuper://dashboard" {
        return read_dashboard(ctx).await;
    }

    let listing = Listing::from_uri(uri).ok_or_else(|| Error::NotFound(format!("Unknown resource: {}", uri)))?;
    let creds = ctx.ambient_credentials()?;

    debug!(uri, "Reading resource");
    let endpoint = format!("{}?limit={}", listing.path(), LIST_LIMIT);
    let body = ctx.client.get(&endpoint, &creds).await?;
    Ok(listing.render(&body))
}

async fn read_dashboard(ctx: &ToolContext) -> Result<String> {
    let creds = ctx.ambient_credentials()?;
    let jobs = format!("{}?limit={}", Listing::Jobs.path(), DASHBOARD_LIMIT);
    let customers = format!("{}?limit={}", Listing::Customers.path(), DASHBOARD_LIMIT);
    let invoices = format!("{}?limit={}", Listing::Invoices.path(), DASHBOARD_LIMIT);

    let (jobs, customers, invoices) = tokio::try_join!(
        ctx.client.get(&jobs, &creds),
        ctx.client.get(&customers, &creds),
        ctx.client.get(&invoices, &creds),
    )?;

    Ok(render_dashboard(&jobs, &customers, &invoices, Utc::now()))
}
