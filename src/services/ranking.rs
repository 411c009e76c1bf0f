//! Deterministic candidate ranking.
//!
//! Used when the LLM path is bypassed: a workload-only score with a bonus for
//! active users. It recommends and never assigns.

use std::collections::HashMap;

use serde::Serialize;
use zuper_models::{Job, User};

/// Score of a user with no assigned jobs.
pub const MAX_WORKLOAD_SCORE: u32 = 100;
/// Points lost per assigned job.
pub const PER_JOB_PENALTY: u32 = 10;
pub const ACTIVE_BONUS: u32 = 20;
/// Alternatives shown after the top candidate.
pub const MAX_ALTERNATIVES: usize = 2;

#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    pub user: User,
    /// Jobs currently assigned to the user.
    pub workload: usize,
    pub score: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub job: Job,
    pub top: RankedCandidate,
    pub alternatives: Vec<RankedCandidate>,
}

impl Recommendation {
    /// Build from a ranked list; `None` when there are no candidates.
    pub fn from_ranked(job: Job, ranked: Vec<RankedCandidate>) -> Option<Self> {
        let mut ranked = ranked.into_iter();
        let top = ranked.next()?;
        Some(Self {
            job,
            top,
            alternatives: ranked.take(MAX_ALTERNATIVES).collect(),
        })
    }
}

/// `max(0, 100 - 10 * jobs)`
pub fn workload_score(jobs: usize) -> u32 {
    let jobs = u32::try_from(jobs).unwrap_or(u32::MAX);
    MAX_WORKLOAD_SCORE.saturating_sub(PER_JOB_PENALTY.saturating_mul(jobs))
}

pub fn candidate_score(jobs: usize, active: bool) -> u32 {
    workload_score(jobs) + if active { ACTIVE_BONUS } else { 0 }
}

/// Count how many of `jobs` each user uid is assigned to.
pub fn workload_from_jobs(jobs: &[Job]) -> HashMap<String, usize> {
    let mut workload = HashMap::new();
    for uid in jobs.iter().flat_map(Job::assigned_user_uids) {
        *workload.entry(uid.to_string()).or_insert(0) += 1;
    }
    workload
}

/// Score every user and sort best first.
///
/// The sort is stable: equal scores keep their input order.
pub fn rank_candidates(users: Vec<User>, workload: &HashMap<String, usize>) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = users
        .into_iter()
        .map(|user| {
            let jobs = workload.get(&user.user_uid).copied().unwrap_or(0);
            RankedCandidate {
                score: candidate_score(jobs, user.is_active()),
                workload: jobs,
                user,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn user(uid: &str, active: bool) -> User {
        User {
            user_uid: uid.to_string(),
            status: Some(if active { "active" } else { "inactive" }.to_string()),
            ..Default::default()
        }
    }

    #[rstest]
    #[case(0, 100)]
    #[case(3, 70)]
    #[case(9, 10)]
    #[case(10, 0)]
    #[case(25, 0)]
    fn test_workload_score_floors_at_zero(#[case] jobs: usize, #[case] expected: u32) {
        assert_eq!(workload_score(jobs), expected);
    }

    #[test]
    fn test_ranking_order() {
        let users = vec![user("A", true), user("B", false), user("C", false)];
        let workload = HashMap::from([("B".to_string(), 5)]);

        let ranked = rank_candidates(users, &workload);
        let order: Vec<_> = ranked.iter().map(|c| (c.user.user_uid.as_str(), c.score)).collect();

        assert_eq!(order, vec![("A", 120), ("C", 100), ("B", 50)]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let users = vec![user("x", false), user("y", true), user("z", false), user("w", false)];
        let ranked = rank_candidates(users, &HashMap::new());
        let order: Vec<_> = ranked.iter().map(|c| c.user.user_uid.as_str()).collect();

        assert_eq!(order, vec!["y", "x", "z", "w"]);
    }

    #[test]
    fn test_workload_counts_every_assignee() {
        let jobs: Vec<Job> = serde_json::from_value(json!([
            {"job_uid": "1", "assigned_users": ["a", "b"]},
            {"job_uid": "2", "assigned_users": [{"user_uid": "a"}]},
            {"job_uid": "3"}
        ]))
        .unwrap();

        let workload = workload_from_jobs(&jobs);
        assert_eq!(workload.get("a"), Some(&2));
        assert_eq!(workload.get("b"), Some(&1));
        assert_eq!(workload.len(), 2);
    }

    #[test]
    fn test_recommendation_takes_two_alternatives() {
        let users = vec![user("a", true), user("b", true), user("c", true), user("d", true)];
        let ranked = rank_candidates(users, &HashMap::new());

        let rec = Recommendation::from_ranked(Job::default(), ranked).unwrap();
        assert_eq!(rec.top.user.user_uid, "a");
        assert_eq!(rec.alternatives.len(), 2);

        assert!(Recommendation::from_ranked(Job::default(), Vec::new()).is_none());
    }
}
