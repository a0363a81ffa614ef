use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::licence::{Licence, LicenceStatus};

/// A person who could join a team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// Age in whole years; `None` when no birth date is on file
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub licence: Option<Licence>,
}

impl Member {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, age: Option<i32>) -> Self {
        Self {
            id: 0,
            first_name: first_name.into(),
            last_name: last_name.into(),
            age,
            birth_date: None,
            licence: None,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }

    /// Age on the given day, computed from the birth date.
    pub fn age_on(&self, date: NaiveDate) -> Option<i32> {
        self.birth_date
            .and_then(|dob| date.years_since(dob))
            .and_then(|years| i32::try_from(years).ok())
    }

    /// Copy of this member whose `age` is recomputed as of `date` when a
    /// birth date is known. A supplied age is kept when there is no birth date.
    pub fn with_age_on(&self, date: NaiveDate) -> Self {
        let mut member = self.clone();
        if let Some(age) = self.age_on(date) {
            member.age = Some(age);
        }
        member
    }

    pub fn licence_status_on(&self, date: NaiveDate) -> LicenceStatus {
        self.licence
            .as_ref()
            .map(|l| l.status_on(date))
            .unwrap_or(LicenceStatus::Missing)
    }

    pub fn age_str(&self) -> String {
        self.age.map(|a| a.to_string()).unwrap_or_else(|| "-".to_string())
    }
}
