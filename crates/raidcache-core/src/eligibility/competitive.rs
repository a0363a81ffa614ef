//! Age rule for competitive races: every member must fall into one and the
//! same accepted age category.

use tracing::debug;

use super::messages;
use super::result::ValidationResult;
use crate::models::{AgeCategory, Member};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    MissingBirthDate,
    AgeNotAccepted { age: i32 },
}

/// Outcome of matching one member against the accepted categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberCategoryResolution {
    Resolved { category: String, category_id: i64 },
    Unresolved { reason: UnresolvedReason },
}

impl MemberCategoryResolution {
    pub fn category(&self) -> Option<&str> {
        match self {
            MemberCategoryResolution::Resolved { category, .. } => Some(category),
            MemberCategoryResolution::Unresolved { .. } => None,
        }
    }
}

/// First accepted category containing the member's age.
///
/// Categories are tried in the given order; overlapping categories are not
/// detected here.
pub fn resolve_category(member: &Member, categories: &[AgeCategory]) -> MemberCategoryResolution {
    let Some(age) = member.age else {
        return MemberCategoryResolution::Unresolved {
            reason: UnresolvedReason::MissingBirthDate,
        };
    };

    match categories.iter().find(|c| c.contains(age)) {
        Some(category) => MemberCategoryResolution::Resolved {
            category: category.name.clone(),
            category_id: category.id,
        },
        None => MemberCategoryResolution::Unresolved {
            reason: UnresolvedReason::AgeNotAccepted { age },
        },
    }
}

pub fn validate_competitive(members: &[Member], categories: &[AgeCategory]) -> ValidationResult {
    if members.is_empty() {
        return ValidationResult::invalid(messages::no_members());
    }
    if categories.is_empty() {
        return ValidationResult::invalid(messages::no_categories());
    }

    let resolutions: Vec<(&Member, MemberCategoryResolution)> = members
        .iter()
        .map(|m| (m, resolve_category(m, categories)))
        .collect();

    let mut result = ValidationResult::new();

    for (member, resolution) in &resolutions {
        if let MemberCategoryResolution::Unresolved { reason } = resolution {
            let name = member.full_name();
            match reason {
                UnresolvedReason::MissingBirthDate => {
                    result.add_error(messages::missing_birth_date(&name))
                }
                UnresolvedReason::AgeNotAccepted { age } => {
                    result.add_error(messages::age_not_accepted(&name, *age))
                }
            }
        }
    }
    if !result.is_valid {
        return result;
    }

    // Distinct categories in order of first appearance
    let mut distinct: Vec<&str> = Vec::new();
    for (_, resolution) in &resolutions {
        if let Some(category) = resolution.category() {
            if !distinct.contains(&category) {
                distinct.push(category);
            }
        }
    }

    if distinct.len() > 1 {
        debug!(categories = ?distinct, "Team spans several age categories");
        result.add_error(messages::mixed_categories(&distinct));
        for (member, resolution) in &resolutions {
            if let (Some(category), Some(age)) = (resolution.category(), member.age) {
                result.add_error(messages::member_category(&member.full_name(), category, age));
            }
        }
        return result;
    }

    result.category = distinct.first().map(|c| c.to_string());
    result
}
