//! Job (work order) model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
    OnHold,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Scheduled => "scheduled",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
            JobStatus::OnHold => "on_hold",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "scheduled" => Some(JobStatus::Scheduled),
            "in_progress" => Some(JobStatus::InProgress),
            "completed" => Some(JobStatus::Completed),
            "cancelled" => Some(JobStatus::Cancelled),
            "on_hold" => Some(JobStatus::OnHold),
            _ => None,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Job priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "urgent" => Some(Priority::Urgent),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reference to a user assigned to a job.
///
/// Listing endpoints return either bare uids or small objects,
/// depending on the account configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssignedUserRef {
    Uid(String),
    Record {
        #[serde(default)]
        user_uid: Option<String>,
        #[serde(default)]
        user: Option<UserUidRef>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserUidRef {
    pub user_uid: String,
}

impl AssignedUserRef {
    pub fn user_uid(&self) -> Option<&str> {
        match self {
            AssignedUserRef::Uid(uid) => Some(uid.as_str()),
            AssignedUserRef::Record { user_uid, user } => user_uid
                .as_deref()
                .or_else(|| user.as_ref().map(|u| u.user_uid.as_str())),
        }
    }
}

/// Customer summary embedded in a job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobCustomer {
    #[serde(default)]
    pub customer_uid: Option<String>,
    #[serde(default)]
    pub customer_first_name: Option<String>,
    #[serde(default)]
    pub customer_last_name: Option<String>,
}

impl JobCustomer {
    pub fn display_name(&self) -> String {
        let first = self.customer_first_name.as_deref().unwrap_or("");
        let last = self.customer_last_name.as_deref().unwrap_or("");
        format!("{} {}", first, last).trim().to_string()
    }
}

/// A job as returned by the FSM API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Job {
    #[serde(default, alias = "uid")]
    pub job_uid: String,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
    /// Raw priority string; see [`Job::priority_level`].
    #[serde(default)]
    pub priority: Option<String>,
    /// Raw status string; see [`Job::job_status`].
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub scheduled_start_time: Option<String>,
    #[serde(default)]
    pub scheduled_end_time: Option<String>,
    #[serde(default)]
    pub assigned_users: Vec<AssignedUserRef>,
    #[serde(default)]
    pub customer: Option<JobCustomer>,
    #[serde(default)]
    pub property: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Job {
    pub fn job_status(&self) -> Option<JobStatus> {
        self.status.as_deref().and_then(JobStatus::from_str)
    }

    pub fn priority_level(&self) -> Option<Priority> {
        self.priority.as_deref().and_then(Priority::from_str)
    }

    /// Uids of every user currently on the job.
    pub fn assigned_user_uids(&self) -> impl Iterator<Item = &str> {
        self.assigned_users.iter().filter_map(AssignedUserRef::user_uid)
    }

    pub fn is_unassigned(&self) -> bool {
        self.assigned_users.is_empty()
    }

    /// Title for display, falling back to the uid.
    pub fn label(&self) -> &str {
        self.job_title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.job_uid)
    }
}
