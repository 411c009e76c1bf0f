//! MCP prompt templates.
//!
//! Each prompt declares its arguments; rendering fills a single user
//! message. Templates only steer the client's model toward the right tools.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{Error, Result};

#[derive(Debug, Clone, Serialize)]
pub struct PromptArgument {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: &'static [PromptArgument],
}

const fn arg(name: &'static str, description: &'static str, required: bool) -> PromptArgument {
    PromptArgument {
        name,
        description,
        required,
    }
}

pub const PROMPTS: &[PromptDefinition] = &[
    PromptDefinition {
        name: "create-job",
        description: "Generate a prompt to create a new job/work order in Zuper FSM",
        arguments: &[
            arg("customerName", "Name of the customer", true),
            arg("jobType", "Type of job (e.g. repair, installation, maintenance)", true),
            arg("priority", "Priority level (low, medium, high, urgent)", false),
        ],
    },
    PromptDefinition {
        name: "generate-invoice",
        description: "Generate an invoice for a completed job",
        arguments: &[arg("jobId", "UID of the job to generate an invoice for", true)],
    },
    PromptDefinition {
        name: "daily-summary",
        description: "Generate a summary of jobs for today",
        arguments: &[],
    },
    PromptDefinition {
        name: "customer-overview",
        description: "Generate a comprehensive overview of a specific customer",
        arguments: &[arg("customerId", "UID of the customer or customer name", true)],
    },
    PromptDefinition {
        name: "optimize-schedule",
        description: "Optimize technician schedules and job assignments",
        arguments: &[arg("date", "Date to optimize (YYYY-MM-DD)", false)],
    },
    PromptDefinition {
        name: "invoice-followup",
        description: "Generate follow-up actions for overdue invoices",
        arguments: &[],
    },
    PromptDefinition {
        name: "contract-review",
        description: "Review and analyze service contracts",
        arguments: &[arg("customerId", "Filter by specific customer", false)],
    },
    PromptDefinition {
        name: "performance-metrics",
        description: "Generate performance metrics and KPIs for field service operations",
        arguments: &[arg("period", "Time period (today, week, month, quarter)", false)],
    },
    PromptDefinition {
        name: "smart-dispatch",
        description: "Assign a job to the best available technician",
        arguments: &[
            arg("jobId", "UID of the job to assign", true),
            arg("priorityLevel", "Priority level (urgent assignments may override normal rules)", false),
        ],
    },
    PromptDefinition {
        name: "check-availability",
        description: "Check technician availability for a specific date range",
        arguments: &[
            arg("userIds", "Comma-separated list of user UIDs to check", false),
            arg("startDate", "Start date (ISO 8601)", true),
            arg("endDate", "End date (ISO 8601)", true),
        ],
    },
    PromptDefinition {
        name: "balance-workload",
        description: "Analyze and balance workload across technicians",
        arguments: &[
            arg("teamId", "Specific team to analyze", false),
            arg("dateRange", "Date range for analysis (e.g. 'this week', 'next month')", false),
        ],
    },
    PromptDefinition {
        name: "skill-gap-analysis",
        description: "Analyze skill coverage and identify gaps in the team",
        arguments: &[arg("teamId", "Specific team to analyze", false)],
    },
];

pub fn find(name: &str) -> Option<&'static PromptDefinition> {
    PROMPTS.iter().find(|p| p.name == name)
}

/// Prompt arguments with required-ness checked against the definition.
struct Args<'a> {
    values: &'a Map<String, Value>,
}

impl<'a> Args<'a> {
    fn get(&self, name: &str) -> Option<&'a str> {
        self.values
            .get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    fn required(&self, name: &str) -> Result<&'a str> {
        self.get(name)
            .ok_or_else(|| Error::InvalidParams(format!("Missing required argument: {}", name)))
    }
}

/// Render the user message for prompt `name`.
pub fn render(name: &str, arguments: &Map<String, Value>) -> Result<String> {
    let definition = find(name).ok_or_else(|| Error::NotFound(format!("Unknown prompt: {}", name)))?;
    let args = Args { values: arguments };
    for argument in definition.arguments.iter().filter(|a| a.required) {
        args.required(argument.name)?;
    }

    let text = match definition.name {
        "create-job" => {
            let customer = args.required("customerName")?;
            let job_type = args.required("jobType")?;
            let priority = args.get("priority");
            format!(
                "Create a new {job_type} job for customer {customer}{with_priority}.

Search for the customer by name to get their UID. If no such customer exists, create the customer first.

Then create a job with:
- a title and description suited to {job_type}
- the customer UID
- priority: {priority}
- the next available time slot

Summarize the created job: job ID, scheduled time and assigned technician if any.",
                job_type = job_type,
                customer = customer,
                with_priority = priority.map(|p| format!(" with {} priority", p)).unwrap_or_default(),
                priority = priority.unwrap_or("medium"),
            )
        }
        "generate-invoice" => {
            let job = args.required("jobId")?;
            format!(
                "Generate an invoice for job {job}.

Steps:
1. Retrieve the job to get the customer UID, services performed and costs.
2. Work out the total including taxes.
3. Create an invoice with the customer UID, the job UID, line items for all services and parts, today as the invoice date, a due date 30 days out, and any notes or terms.

Summarize the created invoice with its number and total amount.",
                job = job,
            )
        }
        "daily-summary" => "Generate a daily summary of today's jobs in Zuper FSM.

Include:
1. Number of jobs scheduled today
2. Jobs by status (scheduled, in progress, completed)
3. High priority or urgent jobs needing attention
4. Overdue jobs from previous days
5. Completed jobs
6. Technician utilization and assignments

Keep it clear and actionable for field service management."
            .to_string(),
        "customer-overview" => {
            let customer = args.required("customerId")?;
            format!(
                "Generate a comprehensive overview of customer {customer}.

Include:
1. Customer details (name, contact info, properties)
2. Service history (all jobs, completed vs pending)
3. Financial summary (invoices, payments, outstanding balance)
4. Properties and assets
5. Recent activity
6. Service contracts or recurring jobs

Close with insights and recommendations based on the history.",
                customer = customer,
            )
        }
        "optimize-schedule" => {
            let date = args.get("date").unwrap_or("today");
            format!(
                "Analyze and optimize the job schedule for {date}.

1. List all jobs scheduled for {date}.
2. Identify conflicts and gaps.
3. Group jobs by location to shorten routes.
4. Match job requirements with technician skills and availability.
5. Suggest reassignments that balance workload.
6. Highlight high-priority jobs that need immediate attention.

Give specific recommendations with reasoning.",
                date = date,
            )
        }
        "invoice-followup" => "Report overdue invoices and the follow-up needed.

Include:
1. Every overdue invoice with customer name and amount
2. Days past due for each
3. Customer contact details
4. Payment history per customer
5. Suggested follow-up action and priority
6. Total outstanding amount

Format it as a follow-up plan for the accounts team."
            .to_string(),
        "contract-review" => {
            let scope = args
                .get("customerId")
                .map(|c| format!("for customer {}", c))
                .unwrap_or_else(|| "for all customers".to_string());
            format!(
                "Review service contracts {scope}.

1. Active contracts and their terms
2. Contracts expiring within 30 days
3. Utilization (services used vs allowance)
4. Contract revenue
5. Renewal opportunities
6. Contracts needing attention or renegotiation

Recommend how to manage and renew them.",
                scope = scope,
            )
        }
        "performance-metrics" => {
            let period = args.get("period").unwrap_or("this month");
            format!(
                "Generate performance metrics and KPIs for {period}.

1. Job completion rate and average completion time
2. First-time fix rate
3. Customer satisfaction indicators
4. Technician productivity and utilization
5. Revenue (invoiced vs collected)
6. Response time to service requests
7. Schedule adherence
8. Job backlog and aging

Point out trends and what to improve.",
                period = period,
            )
        }
        "smart-dispatch" => {
            let job = args.required("jobId")?;
            let urgent = args
                .get("priorityLevel")
                .filter(|p| p.eq_ignore_ascii_case("urgent"))
                .map(|_| "\nURGENT: this is a high-priority assignment. Emergency protocols may apply.\n")
                .unwrap_or_default();
            format!(
                "Assign job {job} to the best available technician.
{urgent}
1. Get the job details (required skills, location, scheduled time).
2. Call assistedScheduling for the job's window and review the recommended users.
3. For the top candidates check skills (getUserSkills), time-off (checkTimeOffAvailability) and current workload (listJobs).
4. Call getUserTeams for the chosen user and take primary_team_uid.
5. Assign with assignJob using users: [{{userUid, teamUid}}]. It only counts when the result is type success.
6. Explain the decision.

Report the assigned technician's UID and why they were chosen.",
                job = job,
                urgent = urgent,
            )
        }
        "check-availability" => {
            let start = args.required("startDate")?;
            let end = args.required("endDate")?;
            let users = args.get("userIds");
            format!(
                "Check technician availability {filter} from {start} to {end}.

1. {first_step}
2. For each user check time-off (listTimeOffRequests with date filters), scheduled jobs (listJobs) and working hours (listTimesheets).
3. Work out an availability percentage per user.
4. Separate fully available from partially available technicians.
5. Flag users on leave or with heavy workloads.

Report availability per user, open hours, recommended users for new jobs and any conflicts.",
                filter = users
                    .map(|u| format!("for users: {}", u))
                    .unwrap_or_else(|| "for all active users".to_string()),
                start = start,
                end = end,
                first_step = if users.is_some() {
                    "Get details for the specified users."
                } else {
                    "List all active users."
                },
            )
        }
        "balance-workload" => {
            let team = args.get("teamId");
            let scope = team
                .map(|t| format!("for team {}", t))
                .unwrap_or_else(|| "across all teams".to_string());
            let period = args.get("dateRange").unwrap_or("for the upcoming week");
            format!(
                "Analyze and balance workload {scope} {period}.

1. Get all active users{in_team}.
2. Count each user's scheduled jobs, in-progress jobs and estimated hours.
3. Flag overloaded users (over 40 hours a week) and underutilized ones (under 20).
4. List unassigned jobs.
5. Recommend reassignments.

Report the distribution, who to relieve, who to load, specific reassignments and the expected result. Apply changes with assignJob and unassignJob.",
                scope = scope,
                period = period,
                in_team = team.map(|t| format!(" in team {}", t)).unwrap_or_default(),
            )
        }
        "skill-gap-analysis" => {
            let team = args.get("teamId");
            format!(
                "Perform a skill gap analysis {scope}.

1. List all users{in_team}.
2. Get each user's skills (getUserSkills).
3. Derive required skills from recent jobs (listJobs).
4. Compare supply and demand. Identify single points of failure, scarce skills in high demand, overstaffed skills and missing skills.

Report a users-by-skills matrix, critical gaps, training and hiring recommendations, and the risk from single points of failure.",
                scope = team
                    .map(|t| format!("for team {}", t))
                    .unwrap_or_else(|| "organization-wide".to_string()),
                in_team = team.map(|t| format!(" in team {}", t)).unwrap_or_default(),
            )
        }
        other => return Err(Error::NotFound(format!("Unknown prompt: {}", other))),
    };

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_every_prompt_renders_with_required_args() {
        for prompt in PROMPTS {
            let mut values = Map::new();
            for argument in prompt.arguments.iter().filter(|a| a.required) {
                values.insert(argument.name.to_string(), json!("x-1"));
            }
            let text = render(prompt.name, &values).unwrap();
            assert!(!text.is_empty(), "{}", prompt.name);
        }
        assert_eq!(PROMPTS.len(), 12);
    }

    #[test]
    fn test_missing_required_argument() {
        let err = render("check-availability", &args(json!({"startDate": "2025-10-06"}))).unwrap_err();
        assert!(matches!(err, Error::InvalidParams(ref m) if m.contains("endDate")));

        let blank = render("generate-invoice", &args(json!({"jobId": "  "}))).unwrap_err();
        assert!(matches!(blank, Error::InvalidParams(_)));
    }

    #[test]
    fn test_unknown_prompt() {
        assert!(matches!(render("nope", &Map::new()), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_optional_arguments() {
        let text = render(
            "create-job",
            &args(json!({"customerName": "Acme", "jobType": "repair", "priority": "high"})),
        )
        .unwrap();
        assert!(text.starts_with("Create a new repair job for customer Acme with high priority."));

        let default = render("create-job", &args(json!({"customerName": "Acme", "jobType": "repair"}))).unwrap();
        assert!(default.contains("priority: medium"));

        let scoped = render("balance-workload", &args(json!({"teamId": "t-1"}))).unwrap();
        assert!(scoped.starts_with("Analyze and balance workload for team t-1 for the upcoming week."));
    }

    #[test]
    fn test_smart_dispatch_assigns_through_team() {
        let urgent = render("smart-dispatch", &args(json!({"jobId": "job-1", "priorityLevel": "urgent"}))).unwrap();
        assert!(urgent.contains("URGENT"));
        assert!(urgent.contains("users: [{userUid, teamUid}]"));

        let normal = render("smart-dispatch", &args(json!({"jobId": "job-1"}))).unwrap();
        assert!(!normal.contains("URGENT"));
    }
}
