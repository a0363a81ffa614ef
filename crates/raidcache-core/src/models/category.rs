use serde::{Deserialize, Serialize};

/// Age band accepted by a competitive race.
///
/// Both bounds are inclusive; a missing `age_max` means no upper bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct AgeCategory {
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "nom")]
    pub name: String,
    pub age_min: i32,
    #[serde(default)]
    pub age_max: Option<i32>,
}

impl AgeCategory {
    pub fn new(id: i64, name: impl Into<String>, age_min: i32, age_max: Option<i32>) -> Self {
        Self {
            id,
            name: name.into(),
            age_min,
            age_max,
        }
    }

    pub fn contains(&self, age: i32) -> bool {
        age >= self.age_min && self.age_max.map_or(true, |max| age <= max)
    }

    /// Range for display: "18-20" or "40+"
    pub fn range_display(&self) -> String {
        match self.age_max {
            Some(max) => format!("{}-{}", self.age_min, max),
            None => format!("{}+", self.age_min),
        }
    }
}
