//! Race rules: team size bounds, capacity, age rule and pricing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::category::AgeCategory;
use super::team::Team;

/// Size and capacity limits of a race, with the live counters as last read.
///
/// The counters are a snapshot. Only the registration ledger treats them as
/// authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct RaceConstraints {
    #[serde(rename = "minRunnersPerTeam")]
    pub min_runners_per_team: u32,
    #[serde(rename = "maxRunnersPerTeam")]
    pub max_runners_per_team: u32,
    #[serde(rename = "maxTeams")]
    pub max_teams: u32,
    #[serde(rename = "maxParticipants")]
    pub max_participants: u32,
    #[serde(rename = "currentTeamsCount", default)]
    pub current_teams_count: u32,
    #[serde(rename = "currentParticipantsCount", default)]
    pub current_participants_count: u32,
    #[serde(rename = "isCompetitive", default)]
    pub is_competitive: bool,
}

/// The leisure age thresholds as configured, each possibly missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeisureThresholds {
    #[serde(rename = "ageMin", default)]
    pub age_min: Option<i32>,
    #[serde(rename = "ageIntermediate", default)]
    pub age_intermediate: Option<i32>,
    #[serde(rename = "ageSupervisor", default)]
    pub age_supervisor: Option<i32>,
}

/// A complete leisure age rule. Exists only when all three thresholds are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeisureAgeRule {
    /// Minimum age of every participant (A)
    pub min: i32,
    /// Participants below this age need a supervisor (B)
    pub intermediate: i32,
    /// Minimum age of a supervisor (C)
    pub supervisor: i32,
}

/// Configuration problem with a leisure threshold triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThresholdLint {
    /// No threshold set: the race has no age restriction
    Absent,
    /// Some thresholds set, others missing: the rule is disabled
    Partial { missing: Vec<&'static str> },
    MinAboveIntermediate { min: i32, intermediate: i32 },
    IntermediateAboveSupervisor { intermediate: i32, supervisor: i32 },
}

impl std::fmt::Display for ThresholdLint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThresholdLint::Absent => {
                write!(f, "no leisure age thresholds set, age rule disabled")
            }
            ThresholdLint::Partial { missing } => write!(
                f,
                "leisure age thresholds incomplete (missing {}), age rule disabled",
                missing.join(", ")
            ),
            ThresholdLint::MinAboveIntermediate { min, intermediate } => write!(
                f,
                "ageMin ({}) is above ageIntermediate ({})",
                min, intermediate
            ),
            ThresholdLint::IntermediateAboveSupervisor { intermediate, supervisor } => write!(
                f,
                "ageIntermediate ({}) is above ageSupervisor ({}), supervision checks are unreliable",
                intermediate, supervisor
            ),
        }
    }
}

impl LeisureThresholds {
    pub fn new(age_min: Option<i32>, age_intermediate: Option<i32>, age_supervisor: Option<i32>) -> Self {
        Self {
            age_min,
            age_intermediate,
            age_supervisor,
        }
    }

    /// The rule to enforce, or `None` when any threshold is missing.
    pub fn rule(&self) -> Option<LeisureAgeRule> {
        match (self.age_min, self.age_intermediate, self.age_supervisor) {
            (Some(min), Some(intermediate), Some(supervisor)) => Some(LeisureAgeRule {
                min,
                intermediate,
                supervisor,
            }),
            _ => None,
        }
    }

    /// Configuration-time checks. Validation itself ignores these.
    pub fn lint(&self) -> Vec<ThresholdLint> {
        let named = [
            ("ageMin", self.age_min),
            ("ageIntermediate", self.age_intermediate),
            ("ageSupervisor", self.age_supervisor),
        ];
        let missing: Vec<&'static str> = named
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| *name)
            .collect();

        if missing.len() == named.len() {
            return vec![ThresholdLint::Absent];
        }
        if !missing.is_empty() {
            return vec![ThresholdLint::Partial { missing }];
        }

        let mut lints = Vec::new();
        if let Some(rule) = self.rule() {
            if rule.min > rule.intermediate {
                lints.push(ThresholdLint::MinAboveIntermediate {
                    min: rule.min,
                    intermediate: rule.intermediate,
                });
            }
            if rule.intermediate > rule.supervisor {
                lints.push(ThresholdLint::IntermediateAboveSupervisor {
                    intermediate: rule.intermediate,
                    supervisor: rule.supervisor,
                });
            }
        }
        lints
    }
}

/// Per-runner registration fees, in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RacePricing {
    #[serde(rename = "licensedPrice")]
    pub licensed_cents: u32,
    #[serde(rename = "unlicensedPrice")]
    pub unlicensed_cents: u32,
}

impl RacePricing {
    /// Price of a team: licensed members at the licensed rate, the rest at
    /// the unlicensed rate. Saturates at `u64::MAX`.
    pub fn team_price_cents(&self, team: &Team, on: NaiveDate) -> u64 {
        let total = team.members_count() as u64;
        let licensed = u64::from(team.licensed_count(on)).min(total);
        let licensed_fees = licensed.saturating_mul(u64::from(self.licensed_cents));
        let unlicensed_fees = (total - licensed).saturating_mul(u64::from(self.unlicensed_cents));
        licensed_fees.saturating_add(unlicensed_fees)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Race {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(flatten)]
    pub constraints: RaceConstraints,
    #[serde(rename = "acceptedCategories", default)]
    pub accepted_categories: Vec<AgeCategory>,
    #[serde(flatten)]
    pub leisure: LeisureThresholds,
    #[serde(default)]
    pub pricing: Option<RacePricing>,
}

impl Race {
    pub fn is_competitive(&self) -> bool {
        self.constraints.is_competitive
    }

    /// Copy of the race carrying the given live counters.
    pub fn with_counts(&self, teams: u32, participants: u32) -> Self {
        let mut race = self.clone();
        race.constraints.current_teams_count = teams;
        race.constraints.current_participants_count = participants;
        race
    }

    /// Leisure threshold lints; competitive races do not use the thresholds.
    pub fn lint(&self) -> Vec<ThresholdLint> {
        if self.is_competitive() {
            Vec::new()
        } else {
            self.leisure.lint()
        }
    }

    pub fn type_label(&self) -> &'static str {
        if self.is_competitive() {
            "Competitive"
        } else {
            "Leisure"
        }
    }
}
