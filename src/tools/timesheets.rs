use serde::Deserialize;
use serde_json::{json, Value};
use zuper_client::QueryString;

use super::{default_limit, default_page, prepare, Envelope, ToolContext, ToolDefinition};
use crate::Result;

const CATEGORY: &str = "timesheets";

pub(super) fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "listTimesheets",
            CATEGORY,
            "Get timesheets for users within a date range to check availability",
            json!({
                "userUid": {"type": "string", "description": "Filter by specific user"},
                "startDate": {"type": "string", "description": "Start date in ISO 8601 format"},
                "endDate": {"type": "string", "description": "End date in ISO 8601 format"},
                "page": {"type": "number", "default": 1, "description": "Page number for pagination"},
                "limit": {"type": "number", "default": 50, "description": "Number of results per page"}
            }),
            &[],
        ),
        ToolDefinition::new(
            "getTimesheetSummary",
            CATEGORY,
            "Get timesheet summary for a user to check working hours and availability",
            json!({
                "userUid": {"type": "string", "description": "User identifier"},
                "startDate": {"type": "string", "description": "Start date in ISO 8601 format"},
                "endDate": {"type": "string", "description": "End date in ISO 8601 format"}
            }),
            &["userUid", "startDate", "endDate"],
        ),
    ]
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListTimesheetsParams {
    #[serde(default)]
    user_uid: Option<String>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_limit")]
    limit: u32,
}

/// A user and a date window; shared with the availability check.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UserWindowParams {
    pub user_uid: String,
    pub start_date: String,
    pub end_date: String,
}

impl UserWindowParams {
    pub fn query(&self) -> QueryString {
        let mut query = QueryString::new();
        query
            .push("userUid", &self.user_uid)
            .push("startDate", &self.start_date)
            .push("endDate", &self.end_date);
        query
    }
}

pub(super) async fn list_timesheets(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (params, creds): (ListTimesheetsParams, _) = prepare(ctx, &args)?;

    let mut query = QueryString::paged(params.page, params.limit);
    query
        .push_opt("userUid", params.user_uid)
        .push_opt("startDate", params.start_date)
        .push_opt("endDate", params.end_date);

    let result = ctx.client.get(&query.append_to("/api/timesheets"), &creds).await?;
    Ok(Envelope::listed(result).into_value())
}

pub(super) async fn get_summary(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (params, creds): (UserWindowParams, _) = prepare(ctx, &args)?;
    let endpoint = params.query().append_to("/api/timesheets/summary");
    let result = ctx.client.get(&endpoint, &creds).await?;
    Ok(Envelope::new(result).into_value())
}
