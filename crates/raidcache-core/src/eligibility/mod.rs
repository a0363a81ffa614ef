//! Team eligibility validation for race registration.
//!
//! Everything here is pure: verdicts are computed from the team and race
//! snapshots passed in and are recomputed whenever those change.
//!
//! - `competitive`: all members in one accepted age category
//! - `leisure`: minimum age and supervision thresholds
//! - `capacity`: team size and race capacity
//! - `aggregate`: per-team verdicts and selection

pub mod aggregate;
pub mod capacity;
pub mod competitive;
pub mod leisure;
pub mod messages;
pub mod result;

pub use aggregate::{select_team, validate_team, validate_teams, TeamVerdict};
pub use capacity::{check_capacity, check_size};
pub use competitive::{resolve_category, validate_competitive, MemberCategoryResolution, UnresolvedReason};
pub use leisure::{partition, validate_leisure, SupervisionPartition};
pub use result::ValidationResult;
