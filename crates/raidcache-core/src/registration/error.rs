use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("Race {0} is not open for registration")]
    UnknownRace(i64),

    #[error("Team {team_id} is already registered for race {race_id}")]
    AlreadyRegistered { race_id: i64, team_id: i64 },

    #[error("Team {team_id} is not registered for race {race_id}")]
    NotRegistered { race_id: i64, team_id: i64 },

    #[error("Team is not eligible: {}", .0.join("; "))]
    Ineligible(Vec<String>),

    /// Capacity was taken by other registrations since the team was checked
    #[error("Race is full: {}", .0.join("; "))]
    CapacityExhausted(Vec<String>),
}

impl RegistrationError {
    /// Conflicts are worth retrying after refreshing the race snapshot.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            RegistrationError::CapacityExhausted(_) | RegistrationError::AlreadyRegistered { .. }
        )
    }
}
