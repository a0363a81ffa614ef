use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenceStatus {
    /// Federation licence, not expired
    Licensed,
    /// Short-term PPS code standing in for a licence
    Pps,
    Expired,
    Missing,
}

impl std::fmt::Display for LicenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenceStatus::Licensed => write!(f, "Licensed"),
            LicenceStatus::Pps => write!(f, "PPS"),
            LicenceStatus::Expired => write!(f, "Expired"),
            LicenceStatus::Missing => write!(f, "Missing"),
        }
    }
}

/// Licence or medical-document credential held by a member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Licence {
    #[serde(rename = "licenceNumber", default)]
    pub number: Option<String>,
    #[serde(rename = "ppsCode", default)]
    pub pps_code: Option<String>,
    #[serde(rename = "expiresOn", default)]
    pub expires_on: Option<NaiveDate>,
}

impl Licence {
    /// Status of the credential on the given day.
    ///
    /// The expiry date is inclusive. A credential without an expiry date
    /// never expires. When both a licence number and a PPS code are present
    /// the licence wins.
    pub fn status_on(&self, date: NaiveDate) -> LicenceStatus {
        let number = self.number.as_deref().map(str::trim).filter(|n| !n.is_empty());
        let pps = self.pps_code.as_deref().map(str::trim).filter(|c| !c.is_empty());

        if number.is_none() && pps.is_none() {
            return LicenceStatus::Missing;
        }
        if self.expires_on.is_some_and(|expiry| date > expiry) {
            return LicenceStatus::Expired;
        }
        if number.is_some() {
            LicenceStatus::Licensed
        } else {
            LicenceStatus::Pps
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_licence_status_valid_number() {
        let licence = Licence {
            number: Some("A12345".to_string()),
            pps_code: None,
            expires_on: Some(day(2026, 12, 31)),
        };
        assert_eq!(licence.status_on(day(2026, 6, 1)), LicenceStatus::Licensed);
        // Expiry day itself is still valid
        assert_eq!(licence.status_on(day(2026, 12, 31)), LicenceStatus::Licensed);
        assert_eq!(licence.status_on(day(2027, 1, 1)), LicenceStatus::Expired);
    }

    #[test]
    fn test_licence_status_pps_and_missing() {
        let pps = Licence {
            number: Some("  ".to_string()),
            pps_code: Some("PPS-778".to_string()),
            expires_on: None,
        };
        assert_eq!(pps.status_on(day(2026, 6, 1)), LicenceStatus::Pps);
        assert_eq!(Licence::default().status_on(day(2026, 6, 1)), LicenceStatus::Missing);
    }
}
