use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::error::RegistrationError;
use crate::eligibility::{check_capacity, validate_team};
use crate::models::{Race, Team};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub race_id: i64,
    pub team_id: i64,
    pub team_name: String,
    pub participants: u32,
    /// Amount due in cents, when the race has pricing
    pub amount_due_cents: Option<u64>,
    pub payment_confirmed: bool,
    pub registered_at: DateTime<Utc>,
}

/// One race's rules and the registrations committed against it.
#[derive(Debug)]
struct RaceBook {
    race: Race,
    /// Teams and runners registered before the race was opened here
    baseline_teams: u32,
    baseline_participants: u32,
    registrations: Vec<Registration>,
}

impl RaceBook {
    fn teams_count(&self) -> u32 {
        let registered = u32::try_from(self.registrations.len()).unwrap_or(u32::MAX);
        self.baseline_teams.saturating_add(registered)
    }

    fn participants_count(&self) -> u32 {
        self.registrations
            .iter()
            .fold(self.baseline_participants, |total, r| total.saturating_add(r.participants))
    }

    fn find_mut(&mut self, team_id: i64) -> Option<&mut Registration> {
        self.registrations.iter_mut().find(|r| r.team_id == team_id)
    }
}

/// Authoritative registration store.
///
/// Every commit re-reads the counters and re-runs the eligibility checks
/// while holding the ledger lock, so concurrent submissions cannot overbook
/// a race even when each was checked against the same stale snapshot.
#[derive(Debug, Default)]
pub struct RegistrationLedger {
    books: Mutex<HashMap<i64, RaceBook>>,
}

impl RegistrationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a race for registration, or update the rules of an open race.
    ///
    /// The race's current counters become the baseline on first open. On
    /// update the baseline and existing registrations are kept.
    pub async fn open_race(&self, race: Race) {
        let mut books = self.books.lock().await;
        match books.get_mut(&race.id) {
            Some(book) => {
                debug!(race_id = race.id, "Updating race rules");
                book.race = race;
            }
            None => {
                info!(
                    race_id = race.id,
                    teams = race.constraints.current_teams_count,
                    participants = race.constraints.current_participants_count,
                    "Opening race for registration"
                );
                books.insert(
                    race.id,
                    RaceBook {
                        baseline_teams: race.constraints.current_teams_count,
                        baseline_participants: race.constraints.current_participants_count,
                        race,
                        registrations: Vec::new(),
                    },
                );
            }
        }
    }

    /// Open a race with registrations committed here earlier.
    ///
    /// The race's counters are the upstream baseline and never include
    /// `registrations`; the live counters are the baseline plus them.
    pub async fn restore(&self, race: Race, registrations: Vec<Registration>) {
        debug!(
            race_id = race.id,
            baseline_teams = race.constraints.current_teams_count,
            restored = registrations.len(),
            "Restoring race registrations"
        );
        let mut books = self.books.lock().await;
        books.insert(
            race.id,
            RaceBook {
                baseline_teams: race.constraints.current_teams_count,
                baseline_participants: race.constraints.current_participants_count,
                race,
                registrations,
            },
        );
    }

    /// Register a team, checked against the live counters.
    pub async fn register(&self, race_id: i64, team: &Team) -> Result<Registration, RegistrationError> {
        let mut books = self.books.lock().await;
        let book = books
            .get_mut(&race_id)
            .ok_or(RegistrationError::UnknownRace(race_id))?;

        if book.registrations.iter().any(|r| r.team_id == team.id) {
            return Err(RegistrationError::AlreadyRegistered {
                race_id,
                team_id: team.id,
            });
        }

        let live = book
            .race
            .with_counts(book.teams_count(), book.participants_count());
        let result = validate_team(team, &live);

        if !result.is_valid {
            let capacity = check_capacity(&live.constraints, team.members_count());
            let ineligible: Vec<String> = result
                .errors
                .into_iter()
                .filter(|e| !capacity.contains(e))
                .collect();

            if !ineligible.is_empty() {
                debug!(race_id, team_id = team.id, "Rejected ineligible team");
                return Err(RegistrationError::Ineligible(ineligible));
            }
            warn!(race_id, team_id = team.id, "Registration lost to concurrent capacity use");
            return Err(RegistrationError::CapacityExhausted(capacity));
        }

        let price_date = live.date.unwrap_or_else(|| Utc::now().date_naive());
        let registration = Registration {
            race_id,
            team_id: team.id,
            team_name: team.name.clone(),
            participants: team.members_count() as u32,
            amount_due_cents: live.pricing.map(|p| p.team_price_cents(team, price_date)),
            payment_confirmed: false,
            registered_at: Utc::now(),
        };
        book.registrations.push(registration.clone());

        info!(
            race_id,
            team_id = team.id,
            teams = book.teams_count(),
            participants = book.participants_count(),
            "Team registered"
        );
        Ok(registration)
    }

    /// Remove a registration and release its capacity.
    pub async fn withdraw(&self, race_id: i64, team_id: i64) -> Result<Registration, RegistrationError> {
        let mut books = self.books.lock().await;
        let book = books
            .get_mut(&race_id)
            .ok_or(RegistrationError::UnknownRace(race_id))?;

        let index = book
            .registrations
            .iter()
            .position(|r| r.team_id == team_id)
            .ok_or(RegistrationError::NotRegistered { race_id, team_id })?;

        info!(race_id, team_id, "Team withdrawn");
        Ok(book.registrations.remove(index))
    }

    pub async fn confirm_payment(&self, race_id: i64, team_id: i64) -> Result<Registration, RegistrationError> {
        let mut books = self.books.lock().await;
        let registration = books
            .get_mut(&race_id)
            .ok_or(RegistrationError::UnknownRace(race_id))?
            .find_mut(team_id)
            .ok_or(RegistrationError::NotRegistered { race_id, team_id })?;

        registration.payment_confirmed = true;
        info!(race_id, team_id, "Payment confirmed");
        Ok(registration.clone())
    }

    pub async fn registrations(&self, race_id: i64) -> Vec<Registration> {
        let books = self.books.lock().await;
        books
            .get(&race_id)
            .map(|b| b.registrations.clone())
            .unwrap_or_default()
    }

    /// Live (teams, participants) counters of an open race.
    pub async fn counts(&self, race_id: i64) -> Option<(u32, u32)> {
        let books = self.books.lock().await;
        books
            .get(&race_id)
            .map(|b| (b.teams_count(), b.participants_count()))
    }

    /// The race as it stands now, live counters included.
    pub async fn race(&self, race_id: i64) -> Option<Race> {
        let books = self.books.lock().await;
        books
            .get(&race_id)
            .map(|b| b.race.with_counts(b.teams_count(), b.participants_count()))
    }
}
