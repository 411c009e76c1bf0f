//! Time-off requests. The API files them under timesheets.

use serde::Deserialize;
use serde_json::{json, Value};
use zuper_client::QueryString;
use zuper_models::TimeOffRequest;

use super::timesheets::UserWindowParams;
use super::{default_limit, default_page, prepare, Envelope, ToolContext, ToolDefinition};
use crate::Result;

const CATEGORY: &str = "timeoff";

pub(super) fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "listTimeOffRequests",
            CATEGORY,
            "List time-off requests to check which users are unavailable for job assignment",
            json!({
                "userUid": {"type": "string", "description": "Filter by specific user UID"},
                "teamUid": {"type": "string", "description": "Filter by specific team UID"},
                "fromDate": {"type": "string", "description": "Filter time-offs from this date (YYYY-MM-DD)"},
                "toDate": {"type": "string", "description": "Filter time-offs to this date (YYYY-MM-DD)"},
                "page": {"type": "number", "default": 1, "description": "Page number for pagination"},
                "limit": {"type": "number", "default": 50, "description": "Number of results per page"}
            }),
            &[],
        ),
        ToolDefinition::new(
            "checkTimeOffAvailability",
            CATEGORY,
            "Check if a user is available during a specific date range (not on time-off)",
            json!({
                "userUid": {"type": "string", "description": "User identifier to check availability"},
                "startDate": {"type": "string", "description": "Start date in ISO 8601 format"},
                "endDate": {"type": "string", "description": "End date in ISO 8601 format"}
            }),
            &["userUid", "startDate", "endDate"],
        ),
    ]
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListTimeOffParams {
    #[serde(default)]
    user_uid: Option<String>,
    #[serde(default)]
    team_uid: Option<String>,
    #[serde(default)]
    from_date: Option<String>,
    #[serde(default)]
    to_date: Option<String>,
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_limit")]
    limit: u32,
}

impl ListTimeOffParams {
    fn query(self) -> QueryString {
        let mut query = QueryString::paged(self.page, self.limit);
        query
            .push_opt("filter.user_uid", self.user_uid)
            .push_opt("filter.team_uid", self.team_uid)
            .push_opt("filter.from_date", self.from_date)
            .push_opt("filter.to_date", self.to_date);
        query
    }
}

fn approved_count(result: &Value) -> usize {
    result
        .get("data")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| serde_json::from_value::<TimeOffRequest>(entry.clone()).ok())
                .filter(TimeOffRequest::is_approved)
                .count()
        })
        .unwrap_or(0)
}

pub(super) async fn list_requests(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (params, creds): (ListTimeOffParams, _) = prepare(ctx, &args)?;
    let endpoint = params.query().append_to("/api/timesheets/request/timeoff");
    let result = ctx.client.get(&endpoint, &creds).await?;

    let approved = approved_count(&result);
    let envelope = Envelope::listed(result);
    Ok(envelope
        .with_message(format!("{} approved time-off request(s)", approved))
        .into_value())
}

pub(super) async fn check_availability(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (params, creds): (UserWindowParams, _) = prepare(ctx, &args)?;
    let endpoint = params.query().append_to("/api/timesheets/request/timeoff/availability");
    let result = ctx.client.get(&endpoint, &creds).await?;

    let available = availability_flag(&result);
    Ok(Envelope::new(result)
        .with_field("available", json!(available))
        .into_value())
}

/// `available` at the top of the body, else inside `data`; absent means false.
fn availability_flag(result: &Value) -> bool {
    result
        .get("available")
        .or_else(|| result.get("data").and_then(|d| d.get("available")))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::super::parse_args;
    use super::*;

    #[test]
    fn test_filters_use_dotted_keys() {
        let params: ListTimeOffParams = parse_args(&json!({"userUid": "u-1", "fromDate": "2025-10-06"})).unwrap();
        assert_eq!(
            params.query().encode(),
            "page=1&limit=50&filter.user_uid=u-1&filter.from_date=2025-10-06"
        );
    }

    #[test]
    fn test_approved_count() {
        let result = json!({"data": [
            {"user_uid": "u-1", "status": "approved"},
            {"user_uid": "u-2", "status": "pending"},
            {"user_uid": "u-3", "status": "Approved"}
        ]});
        assert_eq!(approved_count(&result), 2);
        assert_eq!(approved_count(&json!({})), 0);
    }

    #[test]
    fn test_availability_flag() {
        assert!(availability_flag(&json!({"available": true})));
        assert!(availability_flag(&json!({"data": {"available": true}})));
        assert!(!availability_flag(&json!({"data": {}})));
    }
}
