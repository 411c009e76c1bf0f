//! Users (technicians) and teams.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A technician or office user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default, alias = "uid")]
    pub user_uid: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub mobile_phone_number: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    /// 'active' or 'inactive' when present
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Active only on an exact `status: "active"`; the account flag is not consulted.
    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some("active")
    }

    pub fn full_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or("");
        let last = self.last_name.as_deref().unwrap_or("");
        let name = format!("{} {}", first, last).trim().to_string();
        if name.is_empty() {
            self.user_uid.clone()
        } else {
            name
        }
    }
}

/// A team the user belongs to, as listed by `/api/user/{uid}/teams`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTeam {
    pub team_uid: String,
    #[serde(default)]
    pub team_name: Option<String>,
}

/// A team record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Team {
    #[serde(default, alias = "uid")]
    pub team_uid: String,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
