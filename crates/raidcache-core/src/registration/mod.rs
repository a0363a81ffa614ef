//! Registration commits.
//!
//! Eligibility verdicts shown while picking a team are advisory: the race
//! counters they use may already be stale. `RegistrationLedger` is the
//! authoritative path that re-checks and records a registration atomically.

pub mod error;
pub mod ledger;

pub use error::RegistrationError;
pub use ledger::{Registration, RegistrationLedger};
