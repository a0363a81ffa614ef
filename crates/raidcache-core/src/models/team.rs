use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::licence::LicenceStatus;
use super::member::Member;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub members: Vec<Member>,
    /// Members holding a valid licence, as reported upstream. Price display only.
    #[serde(default)]
    pub licensed_members_count: Option<u32>,
}

impl Team {
    pub fn new(id: i64, name: impl Into<String>, members: Vec<Member>) -> Self {
        Self {
            id,
            name: name.into(),
            members,
            licensed_members_count: None,
        }
    }

    pub fn members_count(&self) -> usize {
        self.members.len()
    }

    /// Count of members with a current licence on the given day.
    /// PPS codes do not count as licences.
    pub fn licensed_count_on(&self, date: NaiveDate) -> u32 {
        self.members
            .iter()
            .filter(|m| m.licence_status_on(date) == LicenceStatus::Licensed)
            .count() as u32
    }

    /// Reported licensed count, falling back to the members' own licences.
    pub fn licensed_count(&self, date: NaiveDate) -> u32 {
        self.licensed_members_count
            .unwrap_or_else(|| self.licensed_count_on(date))
    }

    /// Copy of the team with every member's age computed as of `date`.
    pub fn with_ages_on(&self, date: NaiveDate) -> Self {
        Self {
            members: self.members.iter().map(|m| m.with_age_on(date)).collect(),
            ..self.clone()
        }
    }

    pub fn display_member_count(&self) -> String {
        match self.members.len() {
            1 => "1 member".to_string(),
            count => format!("{} members", count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Licence;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn licensed(first: &str, expires: NaiveDate) -> Member {
        let mut member = Member::new(first, "Dupont", Some(30));
        member.licence = Some(Licence {
            number: Some(format!("LIC-{}", first)),
            pps_code: None,
            expires_on: Some(expires),
        });
        member
    }

    #[test]
    fn test_licensed_count_on_ignores_expired_and_pps() {
        let mut pps = Member::new("Pia", "Dupont", Some(30));
        pps.licence = Some(Licence {
            number: None,
            pps_code: Some("PPS-1".to_string()),
            expires_on: None,
        });
        let team = Team::new(
            1,
            "Les Boussoles",
            vec![
                licensed("Ana", day(2026, 12, 31)),
                licensed("Ben", day(2025, 12, 31)),
                pps,
                Member::new("Cy", "Dupont", Some(30)),
            ],
        );

        assert_eq!(team.licensed_count_on(day(2026, 4, 1)), 1);
    }

    #[test]
    fn test_licensed_count_prefers_reported_value() {
        let mut team = Team::new(1, "Azimut", vec![licensed("Ana", day(2026, 12, 31))]);
        assert_eq!(team.licensed_count(day(2026, 4, 1)), 1);

        team.licensed_members_count = Some(0);
        assert_eq!(team.licensed_count(day(2026, 4, 1)), 0);
    }

    #[test]
    fn test_members_count_tracks_members() {
        let team = Team::new(7, "Solo", vec![Member::new("Ana", "Roux", Some(20))]);
        assert_eq!(team.members_count(), 1);
        assert_eq!(team.display_member_count(), "1 member");
        assert_eq!(Team::new(8, "Empty", vec![]).display_member_count(), "0 members");
    }
}
