//! Assignment command sent to `/api/jobs/assign`.
//!
//! Not a persisted entity: the command is built, posted once and dropped.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssignmentType {
    Assign,
    Unassign,
}

impl AssignmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentType::Assign => "ASSIGN",
            AssignmentType::Unassign => "UNASSIGN",
        }
    }
}

/// A user slot in the assignment, always paired with the team it is made through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentUser {
    pub user_uid: String,
    pub team_uid: String,
}

/// Wire body of an assign/unassign request.
///
/// `users` and `teams` are left out of the body entirely when empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub job_uid: String,
    #[serde(rename = "type")]
    pub kind: AssignmentType,
    pub update_all_jobs: bool,
    pub notify_users: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<AssignmentUser>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub teams: Vec<String>,
}

impl Assignment {
    pub fn new(job_uid: impl Into<String>, kind: AssignmentType) -> Self {
        Self {
            job_uid: job_uid.into(),
            kind,
            update_all_jobs: false,
            notify_users: false,
            users: Vec::new(),
            teams: Vec::new(),
        }
    }

    pub fn with_users(mut self, users: Vec<AssignmentUser>) -> Self {
        self.users = users;
        self
    }

    pub fn with_teams(mut self, teams: Vec<String>) -> Self {
        self.teams = teams;
        self
    }

    pub fn update_all_jobs(mut self, value: bool) -> Self {
        self.update_all_jobs = value;
        self
    }

    pub fn notify_users(mut self, value: bool) -> Self {
        self.notify_users = value;
        self
    }

    /// Number of users plus teams in the command.
    pub fn target_count(&self) -> usize {
        self.users.len() + self.teams.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_omits_empty_teams() {
        let body = Assignment::new("job-1", AssignmentType::Assign).with_users(vec![AssignmentUser {
            user_uid: "u1".into(),
            team_uid: "t1".into(),
        }]);

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "job_uid": "job-1",
                "type": "ASSIGN",
                "update_all_jobs": false,
                "notify_users": false,
                "users": [{"user_uid": "u1", "team_uid": "t1"}]
            })
        );
    }

    #[test]
    fn test_unassign_teams_only() {
        let body = Assignment::new("job-2", AssignmentType::Unassign)
            .with_teams(vec!["t9".into()])
            .notify_users(true);
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["type"], "UNASSIGN");
        assert_eq!(value["teams"], json!(["t9"]));
        assert!(value.get("users").is_none());
        assert_eq!(body.target_count(), 1);
    }
}
