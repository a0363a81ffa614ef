//! Core library for raidcache.
//!
//! Raidcache checks whether orienteering teams may register for a race and
//! commits registrations without overbooking the race.
//!
//! - `models`: members, teams, age categories, races and licences
//! - `eligibility`: the team eligibility validator (size, age rule, capacity)
//! - `registration`: the transactional registration ledger
//! - `cache`: local JSON snapshots of races and their candidate teams
//! - `config`: persisted user configuration

pub mod cache;
pub mod config;
pub mod eligibility;
pub mod models;
pub mod registration;
pub mod utils;

pub use eligibility::{select_team, validate_team, validate_teams, TeamVerdict, ValidationResult};
pub use models::{AgeCategory, LeisureThresholds, Member, Race, RaceConstraints, Team};
pub use registration::{Registration, RegistrationError, RegistrationLedger};
