//! Team size and race capacity checks.
//!
//! `check_capacity` is also run by the registration ledger under its lock,
//! against the ledger's own counters.

use super::messages;
use crate::models::RaceConstraints;

pub fn check_size(constraints: &RaceConstraints, members_count: usize) -> Vec<String> {
    let mut errors = Vec::new();
    let min = constraints.min_runners_per_team;
    let max = constraints.max_runners_per_team;

    if members_count < min as usize {
        if min == max {
            errors.push(messages::exact_size(max, members_count));
        } else {
            errors.push(messages::too_few(min, members_count));
        }
    }
    if members_count > max as usize {
        errors.push(messages::too_many(max, members_count));
    }
    errors
}

pub fn check_capacity(constraints: &RaceConstraints, members_count: usize) -> Vec<String> {
    let mut errors = Vec::new();

    if constraints.current_teams_count >= constraints.max_teams {
        errors.push(messages::team_limit_reached(
            constraints.current_teams_count,
            constraints.max_teams,
        ));
    }

    let total = u64::from(constraints.current_participants_count) + members_count as u64;
    if total > u64::from(constraints.max_participants) {
        errors.push(messages::participant_limit_exceeded(total, constraints.max_participants));
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraints(min: u32, max: u32) -> RaceConstraints {
        RaceConstraints {
            min_runners_per_team: min,
            max_runners_per_team: max,
            max_teams: 10,
            max_participants: 30,
            current_teams_count: 0,
            current_participants_count: 0,
            is_competitive: false,
        }
    }

    #[test]
    fn test_size_exact_phrasing() {
        assert_eq!(
            check_size(&constraints(4, 4), 3),
            vec!["Team must have exactly 4 members (has 3)"]
        );
    }

    #[test]
    fn test_size_bounds() {
        assert_eq!(
            check_size(&constraints(2, 4), 1),
            vec!["Team must have at least 2 members (has 1)"]
        );
        assert_eq!(
            check_size(&constraints(2, 4), 5),
            vec!["Team cannot have more than 4 members (has 5)"]
        );
        assert!(check_size(&constraints(2, 4), 2).is_empty());
        assert!(check_size(&constraints(2, 4), 4).is_empty());
    }

    #[test]
    fn test_capacity_limits() {
        let mut race = constraints(1, 4);
        race.current_teams_count = 10;
        race.current_participants_count = 28;

        assert_eq!(
            check_capacity(&race, 3),
            vec![
                "Team limit reached (10/10)",
                "Participant limit would be exceeded (31 > 30)"
            ]
        );

        race.current_teams_count = 9;
        // Filling the race exactly is allowed
        assert!(check_capacity(&race, 2).is_empty());
    }
}
