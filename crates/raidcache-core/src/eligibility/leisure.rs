//! Age rule for leisure races.
//!
//! With thresholds A <= B <= C: everyone must be at least A, and anyone under
//! B needs a teammate aged C or older. Any missing threshold disables the rule.

use super::messages;
use super::result::ValidationResult;
use crate::models::{LeisureAgeRule, LeisureThresholds, Member};

/// Members split by the supervision thresholds. `below_intermediate` and
/// `supervisors` are disjoint whenever B <= C.
#[derive(Debug)]
pub struct SupervisionPartition<'a> {
    pub below_intermediate: Vec<&'a Member>,
    pub supervisors: Vec<&'a Member>,
}

/// Split members with a known age. Members without an age land in neither set.
pub fn partition<'a>(members: &'a [Member], rule: &LeisureAgeRule) -> SupervisionPartition<'a> {
    let below_intermediate = members
        .iter()
        .filter(|m| m.age.is_some_and(|age| age < rule.intermediate))
        .collect();
    let supervisors = members
        .iter()
        .filter(|m| m.age.is_some_and(|age| age >= rule.supervisor))
        .collect();

    SupervisionPartition {
        below_intermediate,
        supervisors,
    }
}

pub fn validate_leisure(members: &[Member], thresholds: &LeisureThresholds) -> ValidationResult {
    if members.is_empty() {
        return ValidationResult::invalid(messages::no_members());
    }

    let Some(rule) = thresholds.rule() else {
        return ValidationResult::new();
    };

    let mut result = ValidationResult::new();

    for member in members.iter().filter(|m| m.age.is_none()) {
        result.add_error(messages::missing_birth_date(&member.full_name()));
    }
    if !result.is_valid {
        return result;
    }

    for member in members {
        if let Some(age) = member.age.filter(|age| *age < rule.min) {
            result.add_error(messages::below_minimum_age(&member.full_name(), age, rule.min));
        }
    }
    if !result.is_valid {
        return result;
    }

    let split = partition(members, &rule);
    if split.below_intermediate.is_empty() {
        return result;
    }

    if split.supervisors.is_empty() {
        result.add_error(messages::supervisor_required(rule.intermediate, rule.supervisor));
        for member in &split.below_intermediate {
            result.add_error(messages::needs_supervision(
                &member.full_name(),
                member.age.unwrap_or_default(),
            ));
        }
    } else {
        let names: Vec<String> = split.supervisors.iter().map(|m| m.full_name()).collect();
        result.add_warning(messages::supervised_by(&names));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds(a: i32, b: i32, c: i32) -> LeisureThresholds {
        LeisureThresholds::new(Some(a), Some(b), Some(c))
    }

    fn member(first: &str, age: Option<i32>) -> Member {
        Member::new(first, "Girard", age)
    }

    #[test]
    fn test_empty_team_invalid_even_without_rule() {
        let result = validate_leisure(&[], &LeisureThresholds::default());
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec!["Team has no members"]);
    }

    #[test]
    fn test_rule_disabled_when_thresholds_missing() {
        let members = vec![member("Ana", Some(5)), member("Ben", Some(8))];
        let result = validate_leisure(&members, &LeisureThresholds::default());
        assert!(result.is_valid);
        assert!(result.warnings.is_empty());

        // Partial triple also disables the rule, missing ages included
        let partial = LeisureThresholds::new(Some(16), None, Some(18));
        let result = validate_leisure(&[member("Ana", None)], &partial);
        assert!(result.is_valid);
    }

    #[test]
    fn test_missing_age_reported_per_member() {
        let members = vec![member("Ana", None), member("Ben", Some(3)), member("Cy", None)];
        let result = validate_leisure(&members, &thresholds(10, 16, 18));

        // Minimum age is not evaluated while data is incomplete
        assert_eq!(
            result.errors,
            vec!["Ana Girard: birth date not provided", "Cy Girard: birth date not provided"]
        );
    }

    #[test]
    fn test_minimum_age_violation() {
        let members = vec![member("Ana", Some(12)), member("Ben", Some(40))];
        let result = validate_leisure(&members, &thresholds(16, 16, 18));

        assert!(!result.is_valid);
        assert_eq!(result.errors, vec!["Ana Girard: age 12, minimum required: 16"]);
    }

    #[test]
    fn test_supervision_satisfied_warns() {
        let members = vec![member("Ana", Some(12)), member("Ben", Some(19))];
        let result = validate_leisure(&members, &thresholds(10, 16, 18));

        assert!(result.is_valid);
        assert_eq!(result.warnings, vec!["Supervision provided by: Ben Girard"]);
    }

    #[test]
    fn test_supervision_missing() {
        let members = vec![member("Ana", Some(12)), member("Ben", Some(17))];
        let result = validate_leisure(&members, &thresholds(10, 16, 18));

        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(
            result.errors[0],
            "Members under 16 must be accompanied by a supervisor aged 18 or older"
        );
        assert_eq!(result.errors[1], "Ana Girard (12 years) requires supervision");
    }

    #[test]
    fn test_no_supervision_needed() {
        let members = vec![member("Ana", Some(16)), member("Ben", Some(17))];
        let result = validate_leisure(&members, &thresholds(10, 16, 18));

        assert!(result.is_valid);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_partition_disjoint_when_ordered() {
        let members: Vec<Member> = (0..60).map(|age| member("M", Some(age))).collect();
        for b in 0..30 {
            for c in b..40 {
                let rule = LeisureAgeRule {
                    min: 0,
                    intermediate: b,
                    supervisor: c,
                };
                let split = partition(&members, &rule);
                assert!(split
                    .supervisors
                    .iter()
                    .all(|s| !split.below_intermediate.iter().any(|m| std::ptr::eq(*m, *s))));
                let not_below = members.len() - split.below_intermediate.len();
                assert_eq!(not_below as i32, 60 - b);
            }
        }
    }
}
