//! Data models for raid entities.
//!
//! - `Member`, `Team`: people and the teams they register with
//! - `Licence`, `LicenceStatus`: licence and PPS credentials
//! - `AgeCategory`: accepted age bands for competitive races
//! - `Race`, `RaceConstraints`, `LeisureThresholds`, `RacePricing`: race rules

pub mod category;
pub mod licence;
pub mod member;
pub mod race;
pub mod team;

pub use category::AgeCategory;
pub use licence::{Licence, LicenceStatus};
pub use member::Member;
pub use race::{LeisureAgeRule, LeisureThresholds, Race, RaceConstraints, RacePricing, ThresholdLint};
pub use team::Team;
