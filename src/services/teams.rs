//! Primary team selection.
//!
//! An assignment needs a `team_uid` next to every `user_uid`, and a user may
//! belong to several teams. The API returns them in no documented order, so
//! the choice is an explicit rule.

use std::str::FromStr;

use zuper_models::UserTeam;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PrimaryTeamRule {
    /// First team in the order the API returned them.
    #[default]
    First,
    /// Lowest team name, then lowest uid. Unnamed teams sort last.
    Alphabetical,
    /// First listed uid the user belongs to, else [`PrimaryTeamRule::First`].
    Preferred(Vec<String>),
}

impl PrimaryTeamRule {
    pub fn select<'a>(&self, teams: &'a [UserTeam]) -> Option<&'a UserTeam> {
        match self {
            PrimaryTeamRule::First => teams.first(),
            PrimaryTeamRule::Alphabetical => teams
                .iter()
                .min_by_key(|t| (t.team_name.is_none(), t.team_name.clone(), t.team_uid.clone())),
            PrimaryTeamRule::Preferred(order) => order
                .iter()
                .find_map(|uid| teams.iter().find(|t| &t.team_uid == uid))
                .or_else(|| teams.first()),
        }
    }
}

impl FromStr for PrimaryTeamRule {
    type Err = String;

    /// `first`, `alphabetical`, or `preferred:<uid>,<uid>,...`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(list) = s.strip_prefix("preferred:") {
            let uids: Vec<String> = list
                .split(',')
                .map(|uid| uid.trim().to_string())
                .filter(|uid| !uid.is_empty())
                .collect();
            if uids.is_empty() {
                return Err("preferred team rule needs at least one team uid".to_string());
            }
            return Ok(Self::Preferred(uids));
        }

        match s.to_lowercase().as_str() {
            "" | "first" => Ok(Self::First),
            "alphabetical" => Ok(Self::Alphabetical),
            _ => Err(format!("Unknown primary team rule: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(uid: &str, name: Option<&str>) -> UserTeam {
        UserTeam {
            team_uid: uid.to_string(),
            team_name: name.map(String::from),
        }
    }

    fn teams() -> Vec<UserTeam> {
        vec![
            team("t-3", Some("Plumbing")),
            team("t-1", None),
            team("t-2", Some("Electrical")),
        ]
    }

    #[test]
    fn test_first_keeps_api_order() {
        let teams = teams();
        assert_eq!(PrimaryTeamRule::First.select(&teams).unwrap().team_uid, "t-3");
        assert!(PrimaryTeamRule::First.select(&[]).is_none());
    }

    #[test]
    fn test_alphabetical_by_name() {
        let teams = teams();
        assert_eq!(PrimaryTeamRule::Alphabetical.select(&teams).unwrap().team_uid, "t-2");
    }

    #[test]
    fn test_preferred_falls_back_to_first() {
        let teams = teams();
        let rule = PrimaryTeamRule::Preferred(vec!["t-9".into(), "t-1".into()]);
        assert_eq!(rule.select(&teams).unwrap().team_uid, "t-1");

        let rule = PrimaryTeamRule::Preferred(vec!["t-9".into()]);
        assert_eq!(rule.select(&teams).unwrap().team_uid, "t-3");
    }

    #[test]
    fn test_parse() {
        assert_eq!("first".parse::<PrimaryTeamRule>().unwrap(), PrimaryTeamRule::First);
        assert_eq!("Alphabetical".parse::<PrimaryTeamRule>().unwrap(), PrimaryTeamRule::Alphabetical);
        assert_eq!(
            "preferred: a, b".parse::<PrimaryTeamRule>().unwrap(),
            PrimaryTeamRule::Preferred(vec!["a".into(), "b".into()])
        );
        assert!("preferred:".parse::<PrimaryTeamRule>().is_err());
        assert!("random".parse::<PrimaryTeamRule>().is_err());
    }
}
