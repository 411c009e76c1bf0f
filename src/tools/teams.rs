use serde::Deserialize;
use serde_json::{json, Value};
use zuper_client::{path_segment, QueryString};

use super::{prepare, Envelope, Paging, ToolContext, ToolDefinition};
use crate::Result;

const CATEGORY: &str = "teams";

pub(super) fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "getTeam",
            CATEGORY,
            "Retrieve details of a specific team by UID",
            json!({
                "teamUid": {"type": "string", "description": "Unique identifier of the team to retrieve"}
            }),
            &["teamUid"],
        ),
        ToolDefinition::new(
            "listTeams",
            CATEGORY,
            "List all teams in the organization",
            json!({
                "page": {"type": "number", "default": 1, "description": "Page number for pagination"},
                "limit": {"type": "number", "default": 50, "description": "Number of results per page"}
            }),
            &[],
        ),
    ]
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TeamUidParams {
    team_uid: String,
}

pub(super) async fn get_team(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (params, creds): (TeamUidParams, _) = prepare(ctx, &args)?;
    let result = ctx.client.get(&format!("/api/team/{}", path_segment(&params.team_uid)), &creds).await?;
    Ok(Envelope::new(result).into_value())
}

// The collection endpoint is singular: /api/team
pub(super) async fn list_teams(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (paging, creds): (Paging, _) = prepare(ctx, &args)?;
    let query = QueryString::paged(paging.page, paging.limit);
    let result = ctx.client.get(&query.append_to("/api/team"), &creds).await?;
    Ok(Envelope::listed(result).into_value())
}
