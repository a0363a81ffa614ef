//! Per-team verdicts combining size, age rule and capacity.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::capacity::{check_capacity, check_size};
use super::competitive::validate_competitive;
use super::leisure::validate_leisure;
use super::result::ValidationResult;
use crate::models::{Race, Team};

/// Full eligibility check of one team for one race.
///
/// Errors come in a fixed order: size, then age rule, then capacity.
/// Teams are independent; nothing here depends on other teams.
pub fn validate_team(team: &Team, race: &Race) -> ValidationResult {
    let members_count = team.members_count();
    let constraints = &race.constraints;
    let mut result = ValidationResult::new();

    for error in check_size(constraints, members_count) {
        result.add_error(error);
    }

    if race.is_competitive() {
        let age = validate_competitive(&team.members, &race.accepted_categories);
        result.category = age.category.clone();
        result.merge(age);
    } else {
        result.merge(validate_leisure(&team.members, &race.leisure));
    }

    for error in check_capacity(constraints, members_count) {
        result.add_error(error);
    }

    // Categories are only reported on eligible teams
    if !result.is_valid {
        result.category = None;
    }

    debug!(
        team_id = team.id,
        race_id = race.id,
        valid = result.is_valid,
        errors = result.errors.len(),
        "Validated team"
    );
    result
}

/// A team's verdict, as listed for selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct TeamVerdict {
    #[serde(rename = "teamId")]
    pub team_id: i64,
    #[serde(rename = "teamName")]
    pub team_name: String,
    #[serde(rename = "membersCount")]
    pub members_count: usize,
    pub result: ValidationResult,
}

impl TeamVerdict {
    pub fn is_selectable(&self) -> bool {
        self.result.is_valid
    }

    /// "OK", "OK (Senior)" or "2 problems"
    pub fn status_label(&self) -> String {
        match (&self.result.category, self.result.errors.len()) {
            (Some(category), 0) => format!("OK ({})", category),
            (None, 0) => "OK".to_string(),
            (_, 1) => "1 problem".to_string(),
            (_, n) => format!("{} problems", n),
        }
    }
}

pub fn validate_teams(teams: &[Team], race: &Race) -> Vec<TeamVerdict> {
    teams
        .iter()
        .map(|team| TeamVerdict {
            team_id: team.id,
            team_name: team.name.clone(),
            members_count: team.members_count(),
            result: validate_team(team, race),
        })
        .collect()
}

/// Pick a team for submission. Returns `None` for unknown or ineligible
/// teams so that selecting an invalid team has no effect.
pub fn select_team(verdicts: &[TeamVerdict], team_id: i64) -> Option<&TeamVerdict> {
    verdicts
        .iter()
        .find(|v| v.team_id == team_id)
        .filter(|v| v.is_selectable())
}
