use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use zuper_client::{path_segment, QueryString};

use super::{created_uid, default_limit, default_page, prepare, Envelope, ToolContext, ToolDefinition};
use crate::{Error, Result};

const CATEGORY: &str = "customers";

pub(super) fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "createCustomer",
            CATEGORY,
            "Create a new customer in Zuper FSM",
            json!({
                "firstName": {"type": "string", "description": "Customer's first name"},
                "lastName": {"type": "string", "description": "Customer's last name"},
                "email": {"type": "string", "format": "email", "description": "Customer's email address"},
                "phone": {"type": "string", "description": "Customer's phone number"},
                "companyName": {"type": "string", "description": "Company name if business customer"},
                "address": {
                    "type": "object",
                    "description": "Customer address details",
                    "properties": {
                        "street": {"type": "string"},
                        "city": {"type": "string"},
                        "state": {"type": "string"},
                        "zipCode": {"type": "string"},
                        "country": {"type": "string"}
                    }
                }
            }),
            &["firstName", "lastName"],
        ),
        ToolDefinition::new(
            "getCustomer",
            CATEGORY,
            "Retrieve details of a specific customer by UID",
            json!({
                "customerUid": {"type": "string", "description": "Unique identifier of the customer to retrieve"}
            }),
            &["customerUid"],
        ),
        ToolDefinition::new(
            "listCustomers",
            CATEGORY,
            "List all customers with pagination",
            json!({
                "page": {"type": "number", "default": 1, "description": "Page number for pagination"},
                "limit": {"type": "number", "default": 50, "description": "Number of results per page"},
                "search": {"type": "string", "description": "Search customers by name, email, or phone"}
            }),
            &[],
        ),
    ]
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
struct CustomerAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    country: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
struct NewCustomer {
    first_name: String,
    last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    address: Option<CustomerAddress>,
}

impl NewCustomer {
    fn validate(&self) -> Result<()> {
        match self.email.as_deref() {
            Some(email) if !looks_like_email(email) => {
                Err(Error::InvalidParams(format!("email: not a valid address: {}", email)))
            }
            _ => Ok(()),
        }
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !email.contains(char::is_whitespace)
                && domain
                    .split_once('.')
                    .map_or(false, |(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerUidParams {
    customer_uid: String,
}

#[derive(Debug, Deserialize)]
struct ListCustomersParams {
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_limit")]
    limit: u32,
    #[serde(default)]
    search: Option<String>,
}

pub(super) async fn create_customer(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (customer, creds): (NewCustomer, _) = prepare(ctx, &args)?;
    customer.validate()?;

    let body = serde_json::to_value(&customer)?;
    let result = ctx.client.post("/api/customers", &creds, &body).await?;

    let message = format!("Customer created successfully with ID: {}", created_uid(&result));
    Ok(Envelope::new(result).with_message(message).into_value())
}

pub(super) async fn get_customer(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (params, creds): (CustomerUidParams, _) = prepare(ctx, &args)?;
    let result = ctx
        .client
        .get(&format!("/api/customers/{}", path_segment(&params.customer_uid)), &creds)
        .await?;
    Ok(Envelope::new(result).into_value())
}

pub(super) async fn list_customers(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (params, creds): (ListCustomersParams, _) = prepare(ctx, &args)?;

    let mut query = QueryString::paged(params.page, params.limit);
    query.push_opt("search", params.search);

    let result = ctx.client.get(&query.append_to("/api/customers"), &creds).await?;
    Ok(Envelope::listed(result).into_value())
}

#[cfg(test)]
mod tests {
    use super::super::parse_args;
    use super::*;

    #[test]
    fn test_email_check() {
        assert!(looks_like_email("ops@acme.io"));
        assert!(!looks_like_email("ops@acme"));
        assert!(!looks_like_email("@acme.io"));
        assert!(!looks_like_email("o ps@acme.io"));
        assert!(!looks_like_email("acme.io"));
    }

    #[test]
    fn test_invalid_email_is_rejected() {
        let customer: NewCustomer = parse_args(&json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "not-an-email"
        }))
        .unwrap();
        assert!(matches!(customer.validate(), Err(Error::InvalidParams(_))));
    }

    #[test]
    fn test_address_maps_to_snake_case() {
        let customer: NewCustomer = parse_args(&json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "companyName": "Engines Ltd",
            "address": {"city": "London", "zipCode": "NW1"}
        }))
        .unwrap();

        let body = serde_json::to_value(&customer).unwrap();
        assert_eq!(
            body,
            json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "company_name": "Engines Ltd",
                "address": {"city": "London", "zip_code": "NW1"}
            })
        );
    }
}
