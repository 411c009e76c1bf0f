//! Job dispatcher.
//!
//! Builds natural-language instructions for the agent and hands it the
//! agent tool subset. Which technician gets which job is decided by the
//! model from the tool results; the only local decision logic is the
//! deterministic [`recommend`] fallback.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use zuper_client::{path_segment, FsmClient};
use zuper_llm::{AgentOutcome, AgentRunner};
use zuper_models::{Job, ListResponse, User};

use super::ranking::{rank_candidates, workload_from_jobs, Recommendation};
use crate::tools::{AgentToolExecutor, ToolContext};
use crate::{Error, Result};

/// Standing instructions for every dispatch run.
pub const DISPATCHER_INSTRUCTIONS: &str = "\
You are the dispatcher agent for Zuper FSM. You assign jobs to the most suitable field \
technicians based on skills, availability, teams, time-off, workload and schedule duration.

You MUST execute the provided tools and base every decision on their responses. Do not \
only describe a plan.

Decision process

1. Assisted scheduling first. Call assistedScheduling with the job details (jobUid, fromDate, \
toDate, skillsetUid, zipcode and so on). It returns recommendations that account for \
availability, skills, holidays, workload and shifts. Prefer it over any other source.

2. Long jobs. If the scheduled duration is over 8 hours, split it into daily slots of at \
most 8 hours aligned to working hours (09:00 to 17:00 unless the job says otherwise), one \
slot per day in the range, and run assistedScheduling for each slot. For example a job \
from 2025-10-09 10:00 to 2025-10-11 17:00 becomes 10:00-17:00 on the 9th, then 09:00-17:00 \
on the 10th and on the 11th.

3. Candidates. Prefer the same technician across all slots of one job; if that is not \
possible, pick per slot and write handover notes. For every candidate:
   - verify skills with getUserSkills
   - check time-off with listTimeOffRequests for the slot range
   - fetch teams with getUserTeams and use its primary_team_uid
   Rank by skill match first, then availability (mandatory), workload balance, proximity \
when known, and continuity across slots.

4. Assign with assignJob, passing jobUid and users as a list of {userUid, teamUid}. Always \
include the teamUid. Treat the assignment as successful only when the tool result reports \
type success.

5. Without assisted scheduling, fall back to listUsers and match active users by skills, \
availability and workload using the same ranking.

6. When different users take different slots, record the slots on the job with updateJob \
and add notes summarising the reasoning.

Report which users were assigned and why, the recommended time slots, and any alternative \
users or slots if the first choice failed.

Constraints
- Never assign a user who is on approved time-off.
- Always verify required skills before assigning.
- Always take the teamUid from getUserTeams.
- Consider time zones and user-specific shifts.

Credentials are supplied to the tools automatically. Never ask for them and never pass \
apiKey or baseUrl arguments.";

/// Limits on a single assignment decision.
#[derive(Debug, Clone, Default)]
pub struct DispatchPreferences {
    pub preferred_technician: Option<String>,
    pub preferred_date: Option<String>,
    pub required_skills: Vec<String>,
    pub max_workload: Option<u32>,
}

/// What the agent reported for one dispatch run.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub text: String,
    pub steps: usize,
    pub tool_calls: Vec<String>,
    /// Whether an `assignJob` call succeeded, verification included, during the run.
    pub assigned: bool,
}

impl From<AgentOutcome> for DispatchReport {
    fn from(outcome: AgentOutcome) -> Self {
        Self {
            assigned: outcome.called("assignJob"),
            tool_calls: outcome.invocations.iter().map(|i| i.name.clone()).collect(),
            steps: outcome.steps,
            text: outcome.text,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AutoDispatch {
    NoUnassigned { total: usize },
    Single { job_uid: String, report: DispatchReport },
    Batch { job_uids: Vec<String>, report: DispatchReport },
}

pub fn single_job_prompt(job_uid: &str, preferred_date: Option<&str>, today: NaiveDate) -> String {
    let date_line = match preferred_date {
        Some(date) => format!("Preferred scheduling date: {}", date),
        None => "Use the job's current scheduled time or suggest a suitable time.".to_string(),
    };

    format!(
        "Analyze and assign job {job_uid} to the most suitable technician.

{date_line}
Today is {today}.

Steps:
1. Get the job details to learn its requirements (category, duration, location/zipcode, scheduled dates).
2. Call assistedScheduling with:
   - fromDate and toDate covering the scheduling window (typically the next 7 days)
   - jobUid
   - jobCategory, jobDuration and zipcode from the job details
   - considerHolidays: true
   - considerOnlyUserShifts: true
3. Review the recommended users and time slots.
4. Select the top recommended user.
5. Call getUserTeams for that user to get primary_team_uid.
6. Assign the job with both userUid and teamUid.
7. Check the assignment result. If it is not type success, explain the error and try the next recommended user.
8. Explain why the user was selected, the recommended time slots, and any considerations (holidays, shifts, workload).",
        date_line = date_line,
        job_uid = job_uid,
        today = today.format("%Y-%m-%d"),
    )
}

pub fn batch_prompt(job_uids: &[String], optimize: bool, today: NaiveDate) -> String {
    let optimize_block = if optimize {
        "\nOptimization mode. When making assignments:
- minimize travel time by grouping jobs in similar locations
- balance workload across all available technicians
- give each job to the best qualified technician
- avoid conflicts with existing schedules
"
    } else {
        ""
    };

    format!(
        "Assign the following jobs to suitable technicians: {jobs}
Today is {today}.
{optimize_block}
For each job:
1. Analyze requirements and priority.
2. Find available technicians with matching skills.
3. Check time-off and workload.
4. Make the assignment.
5. Document your reasoning.

Finish with a summary table of all assignments made.",
        jobs = job_uids.join(", "),
        today = today.format("%Y-%m-%d"),
        optimize_block = optimize_block,
    )
}

pub fn preferences_prompt(job_uid: &str, prefs: &DispatchPreferences) -> String {
    let mut constraints = String::new();
    if let Some(tech) = &prefs.preferred_technician {
        constraints.push_str(&format!("\n- PREFER technician: {}", tech));
    }
    if !prefs.required_skills.is_empty() {
        constraints.push_str(&format!("\n- REQUIRED skills: {}", prefs.required_skills.join(", ")));
    }
    if let Some(max) = prefs.max_workload {
        constraints.push_str(&format!(
            "\n- ONLY assign to technicians with less than {} current jobs",
            max
        ));
    }

    let date_line = prefs
        .preferred_date
        .as_deref()
        .map(|d| format!("\nPreferred date: {}\n", d))
        .unwrap_or_default();

    format!(
        "Analyze and assign job {job_uid} considering these preferences:{constraints}
{date_line}
Steps:
1. Get job details.
2. List available users.
3. Check skills, time-off and workload.
4. Apply the preferences above.
5. Make the best assignment.
6. Explain your reasoning.",
        job_uid = job_uid,
        constraints = constraints,
        date_line = date_line,
    )
}

/// Runs dispatch prompts through the agent.
#[derive(Clone)]
pub struct Dispatcher {
    runner: AgentRunner,
}

impl Dispatcher {
    pub fn new(runner: AgentRunner) -> Self {
        Self { runner }
    }

    async fn run(&self, ctx: &ToolContext, prompt: &str) -> Result<DispatchReport> {
        let executor = AgentToolExecutor::new(ctx.clone());
        let specs = AgentToolExecutor::specs();
        let outcome = self
            .runner
            .run(DISPATCHER_INSTRUCTIONS, prompt, &specs, &executor)
            .await?;

        let report = DispatchReport::from(outcome);
        info!(
            steps = report.steps,
            tool_calls = report.tool_calls.len(),
            assigned = report.assigned,
            "Dispatch run finished"
        );
        Ok(report)
    }

    pub async fn dispatch_job(
        &self,
        ctx: &ToolContext,
        job_uid: &str,
        preferred_date: Option<&str>,
    ) -> Result<DispatchReport> {
        info!(job_uid, "Dispatching job");
        let prompt = single_job_prompt(job_uid, preferred_date, today());
        self.run(ctx, &prompt).await
    }

    pub async fn batch_dispatch(
        &self,
        ctx: &ToolContext,
        job_uids: &[String],
        optimize: bool,
    ) -> Result<DispatchReport> {
        if job_uids.is_empty() {
            return Err(Error::InvalidInput("at least one job uid is required".to_string()));
        }
        info!(jobs = job_uids.len(), optimize, "Dispatching batch");
        let prompt = batch_prompt(job_uids, optimize, today());
        self.run(ctx, &prompt).await
    }

    pub async fn dispatch_with_preferences(
        &self,
        ctx: &ToolContext,
        job_uid: &str,
        prefs: &DispatchPreferences,
    ) -> Result<DispatchReport> {
        info!(job_uid, ?prefs, "Dispatching job with preferences");
        let prompt = preferences_prompt(job_uid, prefs);
        self.run(ctx, &prompt).await
    }

    /// Dispatch every currently unassigned job.
    pub async fn auto_dispatch(&self, ctx: &ToolContext) -> Result<AutoDispatch> {
        let creds = ctx.ambient_credentials()?;
        let body = ctx.client.get("/api/jobs?page=1&limit=50", &creds).await?;
        let jobs: ListResponse<Job> = ListResponse::from_value(&body);

        let unassigned: Vec<String> = jobs
            .data
            .iter()
            .filter(|job| job.is_unassigned())
            .map(|job| job.job_uid.clone())
            .filter(|uid| !uid.is_empty())
            .collect();

        info!(
            total = jobs.data.len(),
            unassigned = unassigned.len(),
            "Fetched jobs for auto dispatch"
        );

        match unassigned.as_slice() {
            [] => Ok(AutoDispatch::NoUnassigned {
                total: jobs.data.len(),
            }),
            [job_uid] => {
                let report = self.dispatch_job(ctx, job_uid, None).await?;
                Ok(AutoDispatch::Single {
                    job_uid: job_uid.clone(),
                    report,
                })
            }
            _ => {
                let report = self.batch_dispatch(ctx, &unassigned, true).await?;
                Ok(AutoDispatch::Batch {
                    job_uids: unassigned,
                    report,
                })
            }
        }
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Deterministic recommendation without the model. Never assigns.
pub async fn recommend(ctx: &ToolContext, job_uid: Option<&str>) -> Result<Recommendation> {
    let creds = ctx.ambient_credentials()?;
    let client: &FsmClient = &ctx.client;

    let job = match job_uid {
        Some(uid) => {
            let body = client.get(&format!("/api/jobs/{}", path_segment(uid)), &creds).await?;
            body.get("data")
                .cloned()
                .and_then(|data| serde_json::from_value::<Job>(data).ok())
                .ok_or_else(|| Error::NotFound(format!("Job {} not found", uid)))?
        }
        None => {
            let body = client.get("/api/jobs?limit=10", &creds).await?;
            pick_job(ListResponse::from_value(&body).data)
                .ok_or_else(|| Error::NotFound("No jobs available".to_string()))?
        }
    };

    let (users_body, jobs_body): (Value, Value) = tokio::try_join!(
        client.get("/api/user/all", &creds),
        client.get("/api/jobs", &creds),
    )?;

    let users: Vec<User> = ListResponse::from_value(&users_body).data;
    let all_jobs: Vec<Job> = ListResponse::from_value(&jobs_body).data;
    let workload = workload_from_jobs(&all_jobs);

    let ranked = rank_candidates(users, &workload);
    let recommendation = Recommendation::from_ranked(job, ranked)
        .ok_or_else(|| Error::NotFound("No candidates available".to_string()))?;

    info!(
        job_uid = %recommendation.job.job_uid,
        top = %recommendation.top.user.user_uid,
        score = recommendation.top.score,
        "Recommendation ready"
    );
    Ok(recommendation)
}

/// First unassigned job, else the first job.
fn pick_job(jobs: Vec<Job>) -> Option<Job> {
    if let Some(idx) = jobs.iter().position(Job::is_unassigned) {
        return jobs.into_iter().nth(idx);
    }
    if !jobs.is_empty() {
        warn!("Every fetched job is assigned, recommending for the first one");
    }
    jobs.into_iter().next()
}
