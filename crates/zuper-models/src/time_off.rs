//! Time-off requests.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOffStatus {
    Pending,
    Approved,
    Rejected,
}

impl TimeOffStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(TimeOffStatus::Pending),
            "approved" => Some(TimeOffStatus::Approved),
            "rejected" | "declined" => Some(TimeOffStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeOffRequest {
    #[serde(default)]
    pub user_uid: Option<String>,
    #[serde(default)]
    pub from_date: Option<String>,
    #[serde(default)]
    pub to_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TimeOffRequest {
    pub fn approval(&self) -> Option<TimeOffStatus> {
        self.status.as_deref().and_then(TimeOffStatus::from_str)
    }

    pub fn is_approved(&self) -> bool {
        self.approval() == Some(TimeOffStatus::Approved)
    }
}
