//! User tools.

use serde::Deserialize;
use serde_json::{json, Value};
use zuper_client::{path_segment, QueryString};
use zuper_models::UserTeam;

use super::{default_limit, default_page, prepare, Envelope, ToolContext, ToolDefinition};
use crate::services::teams::PrimaryTeamRule;
use crate::Result;

const CATEGORY: &str = "users";

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum UserStatus {
    Active,
    Inactive,
}

impl UserStatus {
    fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
        }
    }
}

pub(super) fn definitions() -> Vec<ToolDefinition> {
    let user_uid = |description: &str| json!({"userUid": {"type": "string", "description": description}});

    vec![
        ToolDefinition::new(
            "getUser",
            CATEGORY,
            "Retrieve details of a specific user by UID",
            user_uid("Unique identifier of the user to retrieve"),
            &["userUid"],
        ),
        ToolDefinition::new(
            "listUsers",
            CATEGORY,
            "List all users in the organization with their details, skills, and availability",
            json!({
                "page": {"type": "number", "default": 1, "description": "Page number for pagination"},
                "limit": {"type": "number", "default": 50, "description": "Number of results per page"},
                "status": {"type": "string", "enum": ["active", "inactive"], "description": "Filter by user status"}
            }),
            &[],
        ),
        ToolDefinition::new(
            "getUserSkills",
            CATEGORY,
            "Get the skills assigned to a specific user for job matching",
            user_uid("Unique identifier of the user"),
            &["userUid"],
        ),
        ToolDefinition::new(
            "getUserTeams",
            CATEGORY,
            "Get all teams that a user belongs to. Returns team information including the primary team UID needed for job assignment.",
            user_uid("Unique identifier of the user"),
            &["userUid"],
        ),
    ]
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserUidParams {
    user_uid: String,
}

#[derive(Debug, Deserialize)]
struct ListUsersParams {
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_limit")]
    limit: u32,
    #[serde(default)]
    status: Option<UserStatus>,
}

pub(super) async fn get_user(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (params, creds): (UserUidParams, _) = prepare(ctx, &args)?;
    let result = ctx.client.get(&format!("/api/user/{}", path_segment(&params.user_uid)), &creds).await?;
    Ok(Envelope::new(result).into_value())
}

pub(super) async fn list_users(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (params, creds): (ListUsersParams, _) = prepare(ctx, &args)?;

    let mut query = QueryString::paged(params.page, params.limit);
    query.push_opt("status", params.status.map(|s| s.as_str()));

    let result = ctx.client.get(&query.append_to("/api/user/all"), &creds).await?;
    Ok(Envelope::listed(result).into_value())
}

pub(super) async fn get_user_skills(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (params, creds): (UserUidParams, _) = prepare(ctx, &args)?;
    let result = ctx
        .client
        .get(&format!("/api/users/{}/skill", path_segment(&params.user_uid)), &creds)
        .await?;
    Ok(Envelope::new(result).into_value())
}

/// Reduced team listing with the primary team picked by the context's rule.
pub(super) async fn get_user_teams(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (params, creds): (UserUidParams, _) = prepare(ctx, &args)?;
    let result = ctx
        .client
        .get(&format!("/api/user/{}/teams", path_segment(&params.user_uid)), &creds)
        .await?;

    Ok(user_teams_summary(&params.user_uid, &result, &ctx.primary_team))
}

fn user_teams_summary(user_uid: &str, result: &Value, rule: &PrimaryTeamRule) -> Value {
    let teams: Vec<UserTeam> = result
        .get("data")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                .collect()
        })
        .unwrap_or_default();

    let primary = rule.select(&teams).map(|t| t.team_uid.clone());

    json!({
        "type": "success",
        "user_uid": user_uid,
        "teams": teams,
        "primary_team_uid": primary,
    })
}
