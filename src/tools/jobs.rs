//! Job tools: CRUD, assignment and assisted scheduling.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};
use zuper_client::{ensure_success, path_segment, Credentials, QueryString};
use zuper_models::{Assignment, AssignmentType, AssignmentUser, JobStatus, Priority};

use super::{created_uid, default_limit, default_page, prepare, Envelope, ToolContext, ToolDefinition};
use crate::{Error, Result};

const CATEGORY: &str = "jobs";

const STATUSES: [&str; 5] = ["scheduled", "in_progress", "completed", "cancelled", "on_hold"];
const PRIORITIES: [&str; 4] = ["low", "medium", "high", "urgent"];

pub(super) fn definitions() -> Vec<ToolDefinition> {
    let assignee_props = |verb: &str| {
        json!({
            "jobUid": {"type": "string", "description": format!("Job UID to {} technicians/teams", verb)},
            "users": {
                "type": "array",
                "description": "Users, each with the team the assignment is made through",
                "items": {
                    "type": "object",
                    "properties": {
                        "userUid": {"type": "string", "description": "User UID"},
                        "teamUid": {"type": "string", "description": "Team UID the user belongs to"}
                    },
                    "required": ["userUid", "teamUid"]
                }
            },
            "teams": {"type": "array", "items": {"type": "string"}, "description": "Team UIDs"},
            "updateAllJobs": {"type": "boolean", "description": "Whether to update all jobs (default: false)"},
            "notifyUsers": {"type": "boolean", "description": "Whether to notify users (default: false)"}
        })
    };

    vec![
        ToolDefinition::new(
            "createJob",
            CATEGORY,
            "Create a new job/work order in Zuper FSM with customer, property, and service details",
            json!({
                "customerUid": {"type": "string", "description": "Unique identifier of the customer for this job"},
                "jobTitle": {"type": "string", "description": "Title or name of the job"},
                "jobDescription": {"type": "string", "description": "Description of the job"},
                "propertyUid": {"type": "string", "description": "Property/location identifier for the job"},
                "scheduledStartTime": {"type": "string", "description": "Scheduled start time in ISO 8601 format"},
                "scheduledEndTime": {"type": "string", "description": "Scheduled end time in ISO 8601 format"},
                "priority": {"type": "string", "enum": PRIORITIES, "description": "Priority level of the job"},
                "assignedTo": {"type": "array", "items": {"type": "string"}, "description": "User UIDs to assign to this job"}
            }),
            &["customerUid", "jobTitle"],
        ),
        ToolDefinition::new(
            "getJob",
            CATEGORY,
            "Retrieve details of a specific job by its UID",
            json!({
                "jobUid": {"type": "string", "description": "Unique identifier of the job to retrieve"}
            }),
            &["jobUid"],
        ),
        ToolDefinition::new(
            "listJobs",
            CATEGORY,
            "List all jobs with optional filtering by status",
            json!({
                "status": {"type": "string", "enum": STATUSES, "description": "Filter jobs by status"},
                "page": {"type": "number", "default": 1, "description": "Page number for pagination"},
                "limit": {"type": "number", "default": 50, "description": "Number of results per page"}
            }),
            &[],
        ),
        ToolDefinition::new(
            "updateJob",
            CATEGORY,
            "Update an existing job with new information",
            json!({
                "jobUid": {"type": "string", "description": "Unique identifier of the job to update"},
                "updates": {
                    "type": "object",
                    "description": "Fields to update",
                    "properties": {
                        "jobTitle": {"type": "string"},
                        "jobDescription": {"type": "string"},
                        "status": {"type": "string", "enum": STATUSES},
                        "priority": {"type": "string", "enum": PRIORITIES},
                        "scheduledStartTime": {"type": "string"},
                        "scheduledEndTime": {"type": "string"}
                    }
                }
            }),
            &["jobUid", "updates"],
        ),
        ToolDefinition::new(
            "assignJob",
            CATEGORY,
            "Assign technicians or teams to a job",
            assignee_props("assign"),
            &["jobUid"],
        ),
        ToolDefinition::new(
            "unassignJob",
            CATEGORY,
            "Unassign technicians or teams from a job",
            assignee_props("unassign"),
            &["jobUid"],
        ),
        ToolDefinition::new(
            "assistedScheduling",
            CATEGORY,
            "Get scheduling recommendations based on availability, skills, location, and other factors. Returns time slots and user suggestions for a job.",
            json!({
                "fromDate": {"type": "string", "description": "Start of the scheduling window (YYYY-MM-DD HH:mm:ss, e.g. '2025-10-06 00:00:00')"},
                "toDate": {"type": "string", "description": "End of the scheduling window (YYYY-MM-DD HH:mm:ss, e.g. '2025-10-13 23:59:59')"},
                "jobUid": {"type": "string", "description": "Job UID to schedule"},
                "jobCategory": {"type": "string", "description": "Job category"},
                "jobDuration": {"type": "number", "description": "Job duration in minutes"},
                "serviceTerritory": {"type": "string", "description": "Service territory"},
                "zipcode": {"type": "string", "description": "Customer zipcode for location-based scheduling"},
                "timezone": {"type": "string", "description": "Timezone (e.g. 'America/New_York')"},
                "skillsetUid": {"type": "string", "description": "Required skillset UID"},
                "teamUid": {"type": "string", "description": "Filter by team UID"},
                "userUid": {"type": "string", "description": "Filter by specific user UID"},
                "customerUid": {"type": "string", "description": "Customer UID"},
                "favoriteUser": {"type": "boolean", "description": "Prioritize the customer's favorite users"},
                "userType": {"type": "string", "description": "User type filter"},
                "considerHolidays": {"type": "boolean", "description": "Consider company holidays in scheduling"},
                "considerOnlyUserShifts": {"type": "boolean", "description": "Only schedule during the user's defined shifts"}
            }),
            &["fromDate", "toDate"],
        ),
    ]
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
struct NewJob {
    customer_uid: String,
    job_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    job_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    property_uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scheduled_start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scheduled_end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    assigned_to: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
struct JobUpdates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    job_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scheduled_start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scheduled_end_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobUidParams {
    job_uid: String,
}

#[derive(Debug, Deserialize)]
struct ListJobsParams {
    #[serde(default)]
    status: Option<JobStatus>,
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_limit")]
    limit: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateJobParams {
    job_uid: String,
    updates: JobUpdates,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssigneeParams {
    user_uid: String,
    team_uid: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignParams {
    job_uid: String,
    #[serde(default)]
    users: Vec<AssigneeParams>,
    #[serde(default)]
    teams: Vec<String>,
    #[serde(default)]
    update_all_jobs: bool,
    #[serde(default)]
    notify_users: bool,
}

impl AssignParams {
    fn into_assignment(self, kind: AssignmentType) -> Assignment {
        let users = self
            .users
            .into_iter()
            .map(|u| AssignmentUser {
                user_uid: u.user_uid,
                team_uid: u.team_uid,
            })
            .collect();

        Assignment::new(self.job_uid, kind)
            .with_users(users)
            .with_teams(self.teams)
            .update_all_jobs(self.update_all_jobs)
            .notify_users(self.notify_users)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchedulingParams {
    from_date: String,
    to_date: String,
    #[serde(default)]
    job_uid: Option<String>,
    #[serde(default)]
    job_category: Option<String>,
    #[serde(default)]
    job_duration: Option<f64>,
    #[serde(default)]
    service_territory: Option<String>,
    #[serde(default)]
    zipcode: Option<String>,
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    skillset_uid: Option<String>,
    #[serde(default)]
    team_uid: Option<String>,
    #[serde(default)]
    user_uid: Option<String>,
    #[serde(default)]
    customer_uid: Option<String>,
    #[serde(default)]
    favorite_user: Option<bool>,
    #[serde(default)]
    user_type: Option<String>,
    #[serde(default)]
    consider_holidays: Option<bool>,
    #[serde(default)]
    consider_only_user_shifts: Option<bool>,
}

impl SchedulingParams {
    fn query(&self) -> QueryString {
        let mut query = QueryString::new();
        query
            .push("from_date", &self.from_date)
            .push("to_date", &self.to_date)
            .push_opt("job_uid", self.job_uid.as_deref())
            .push_opt("job_category", self.job_category.as_deref())
            .push_opt("job_duration", self.job_duration.filter(|d| *d != 0.0))
            .push_opt("service_territory", self.service_territory.as_deref())
            .push_opt("zipcode", self.zipcode.as_deref())
            .push_opt("timezone", self.timezone.as_deref())
            .push_opt("skillset_uid", self.skillset_uid.as_deref())
            .push_opt("team_uid", self.team_uid.as_deref())
            .push_opt("user_uid", self.user_uid.as_deref())
            .push_opt("customer_uid", self.customer_uid.as_deref())
            .push_opt("favorite_user", self.favorite_user)
            .push_opt("user_type", self.user_type.as_deref())
            .push_opt("consider_holidays", self.consider_holidays)
            .push_opt("consider_only_user_shifts", self.consider_only_user_shifts);
        query
    }
}

pub(super) async fn create_job(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (job, creds): (NewJob, _) = prepare(ctx, &args)?;
    let body = serde_json::to_value(&job)?;
    let result = ctx.client.post("/api/jobs", &creds, &body).await?;

    let message = format!("Job created successfully with ID: {}", created_uid(&result));
    Ok(Envelope::new(result).with_message(message).into_value())
}

pub(super) async fn get_job(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (params, creds): (JobUidParams, _) = prepare(ctx, &args)?;
    let result = ctx.client.get(&format!("/api/jobs/{}", path_segment(&params.job_uid)), &creds).await?;
    Ok(Envelope::new(result).into_value())
}

pub(super) async fn list_jobs(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (params, creds): (ListJobsParams, _) = prepare(ctx, &args)?;

    let mut query = QueryString::paged(params.page, params.limit);
    query.push_opt("status", params.status.map(|s| s.as_str()));

    let result = ctx.client.get(&query.append_to("/api/jobs"), &creds).await?;
    Ok(Envelope::listed(result).into_value())
}

pub(super) async fn update_job(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (params, creds): (UpdateJobParams, _) = prepare(ctx, &args)?;
    let body = serde_json::to_value(&params.updates)?;
    let result = ctx
        .client
        .put(&format!("/api/jobs/{}", path_segment(&params.job_uid)), &creds, &body)
        .await?;

    Ok(Envelope::new(result)
        .with_message(format!("Job {} updated successfully", params.job_uid))
        .into_value())
}

async fn send_assignment(ctx: &ToolContext, args: Value, kind: AssignmentType) -> Result<Value> {
    let (params, creds): (AssignParams, _) = prepare(ctx, &args)?;
    let assignment = params.into_assignment(kind);
    let body = serde_json::to_value(&assignment)?;

    let result = ctx.client.post("/api/jobs/assign", &creds, &body).await?;
    ensure_success(&result)?;

    match kind {
        AssignmentType::Assign => {
            let assigned_to = verify_assignment(ctx, &creds, &assignment.job_uid).await?;
            let message = format!(
                "Successfully assigned {} user(s)/team(s) to job {}",
                assignment.target_count(),
                assignment.job_uid
            );
            Ok(Envelope::new(result)
                .with_message(message)
                .with_field("assigned_to", Value::Array(assigned_to))
                .into_value())
        }
        AssignmentType::Unassign => {
            let message = format!(
                "Successfully unassigned {} user(s)/team(s) from job {}",
                assignment.target_count(),
                assignment.job_uid
            );
            Ok(Envelope::new(result).with_message(message).into_value())
        }
    }
}

/// Re-read the job after an accepted assignment; it must list at least one assignee.
async fn verify_assignment(ctx: &ToolContext, creds: &Credentials, job_uid: &str) -> Result<Vec<Value>> {
    let job = ctx
        .client
        .get(&format!("/api/jobs/{}", path_segment(job_uid)), creds)
        .await?;

    let assigned_to = job
        .get("data")
        .and_then(|d| d.get("assigned_to"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    if assigned_to.is_empty() {
        warn!(job_uid, "Job has no assignees after assignment");
        return Err(Error::Unverified("No users assigned to the job".to_string()));
    }

    debug!(job_uid, assignees = assigned_to.len(), "Assignment verified");
    Ok(assigned_to)
}

pub(super) async fn assign_job(ctx: &ToolContext, args: Value) -> Result<Value> {
    send_assignment(ctx, args, AssignmentType::Assign).await
}

pub(super) async fn unassign_job(ctx: &ToolContext, args: Value) -> Result<Value> {
    send_assignment(ctx, args, AssignmentType::Unassign).await
}

pub(super) async fn assisted_scheduling(ctx: &ToolContext, args: Value) -> Result<Value> {
    let (params, creds): (SchedulingParams, _) = prepare(ctx, &args)?;
    let endpoint = params.query().append_to("/api/assisted_scheduling");
    let result = ctx.client.get(&endpoint, &creds).await?;

    Ok(Envelope::new(result)
        .with_message("Retrieved scheduling recommendations")
        .into_value())
}

#[cfg(test)]
mod tests {
    use super::super::parse_args;
    use super::*;

    #[test]
    fn test_new_job_maps_to_snake_case() {
        let job: NewJob = parse_args(&json!({
            "customerUid": "c-1",
            "jobTitle": "Boiler service",
            "priority": "high",
            "apiKey": "ignored"
        }))
        .unwrap();

        let body = serde_json::to_value(&job).unwrap();
        assert_eq!(
            body,
            json!({"customer_uid": "c-1", "job_title": "Boiler service", "priority": "high"})
        );
    }

    #[test]
    fn test_bad_enum_is_rejected() {
        let err = parse_args::<ListJobsParams>(&json!({"status": "archived"})).unwrap_err();
        assert!(matches!(err, crate::Error::InvalidParams(_)));
    }

    #[test]
    fn test_list_defaults() {
        let params: ListJobsParams = parse_args(&Value::Null).unwrap();
        assert_eq!((params.page, params.limit), (1, 50));
        assert!(params.status.is_none());
    }

    #[test]
    fn test_assign_body_omits_empty_lists() {
        let params: AssignParams = parse_args(&json!({
            "jobUid": "job-1",
            "users": [{"userUid": "u-1", "teamUid": "t-1"}]
        }))
        .unwrap();

        let body = serde_json::to_value(params.into_assignment(AssignmentType::Assign)).unwrap();
        assert_eq!(
            body,
            json!({
                "job_uid": "job-1",
                "type": "ASSIGN",
                "update_all_jobs": false,
                "notify_users": false,
                "users": [{"user_uid": "u-1", "team_uid": "t-1"}]
            })
        );
    }

    #[test]
    fn test_assignee_needs_team() {
        let err = parse_args::<AssignParams>(&json!({
            "jobUid": "job-1",
            "users": [{"userUid": "u-1"}]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("teamUid"));
    }

    #[test]
    fn test_scheduling_query_uses_api_names() {
        let params: SchedulingParams = parse_args(&json!({
            "fromDate": "2025-10-06 00:00:00",
            "toDate": "2025-10-13 23:59:59",
            "jobUid": "job-1",
            "jobDuration": 480,
            "considerHolidays": false
        }))
        .unwrap();

        assert_eq!(
            params.query().encode(),
            "from_date=2025-10-06%2000%3A00%3A00&to_date=2025-10-13%2023%3A59%3A59\
             &job_uid=job-1&job_duration=480&consider_holidays=false"
        );
    }

    #[test]
    fn test_scheduling_requires_window() {
        assert!(parse_args::<SchedulingParams>(&json!({"fromDate": "2025-10-06 00:00:00"})).is_err());
    }
}
