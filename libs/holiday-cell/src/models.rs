use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::clinic::Specialty;

/// A calendar day on which bookings are disallowed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holiday {
    pub id: Uuid,
    pub date: NaiveDate,
    pub reason: String,
    pub scope: HolidayScope,
    pub source: HolidaySource,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Holiday {
    /// Doctor-specific holidays are either scoped to one specialty (each
    /// specialty has a single doctor) or explicitly entered as a doctor leave.
    pub fn block_kind(&self) -> BlockKind {
        if self.scope != HolidayScope::All || self.source == HolidaySource::Doctor {
            BlockKind::DoctorSpecific
        } else {
            BlockKind::ClinicWide
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum HolidayScope {
    All,
    Eyecare,
    Gynecology,
}

impl HolidayScope {
    pub fn for_specialty(specialty: Specialty) -> Self {
        match specialty {
            Specialty::Eyecare => HolidayScope::Eyecare,
            Specialty::Gynecology => HolidayScope::Gynecology,
        }
    }

    pub fn covers(&self, specialty: Specialty) -> bool {
        *self == HolidayScope::All || *self == Self::for_specialty(specialty)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HolidayScope::All => "all",
            HolidayScope::Eyecare => "eyecare",
            HolidayScope::Gynecology => "gynecology",
        }
    }
}

impl fmt::Display for HolidayScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HolidaySource {
    #[default]
    Manual,
    National,
    Doctor,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    DoctorSpecific,
    ClinicWide,
}

/// Why a given day cannot be booked for a specialty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DateBlock {
    pub date: NaiveDate,
    pub holiday_id: Uuid,
    pub reason: String,
    pub kind: BlockKind,
    pub source: HolidaySource,
}

impl DateBlock {
    pub fn from_holiday(holiday: &Holiday) -> Self {
        Self {
            date: holiday.date,
            holiday_id: holiday.id,
            reason: holiday.reason.clone(),
            kind: holiday.block_kind(),
            source: holiday.source,
        }
    }

    /// Patient-facing wording; doctor leave and clinic closure read differently.
    pub fn user_message(&self) -> String {
        let day = self.date.format("%B %-d, %Y");
        match self.kind {
            BlockKind::DoctorSpecific => {
                format!("The doctor is not available on {}: {}", day, self.reason)
            }
            BlockKind::ClinicWide => {
                format!("The clinic is closed on {}: {}", day, self.reason)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateHolidayRequest {
    pub date: NaiveDate,
    pub reason: String,
    pub scope: HolidayScope,
    #[serde(default)]
    pub source: HolidaySource,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HolidayQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub specialty: Option<Specialty>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HolidayCalendarResponse {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub specialty: Option<Specialty>,
    pub holidays: Vec<Holiday>,
    pub disabled_dates: Vec<NaiveDate>,
    /// First bookable day in the range, only when a specialty was given.
    pub next_open_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holiday(scope: HolidayScope, source: HolidaySource) -> Holiday {
        Holiday {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2025, 12, 25).unwrap(),
            reason: "Christmas Day".to_string(),
            scope,
            source,
            created_at: None,
        }
    }

    #[test]
    fn test_scope_coverage() {
        assert!(HolidayScope::All.covers(Specialty::Eyecare));
        assert!(HolidayScope::All.covers(Specialty::Gynecology));
        assert!(HolidayScope::Gynecology.covers(Specialty::Gynecology));
        assert!(!HolidayScope::Gynecology.covers(Specialty::Eyecare));
    }

    #[test]
    fn test_block_kind() {
        assert_eq!(holiday(HolidayScope::All, HolidaySource::National).block_kind(), BlockKind::ClinicWide);
        assert_eq!(holiday(HolidayScope::Eyecare, HolidaySource::Manual).block_kind(), BlockKind::DoctorSpecific);
        assert_eq!(holiday(HolidayScope::All, HolidaySource::Doctor).block_kind(), BlockKind::DoctorSpecific);
    }

    #[test]
    fn test_user_message_wording() {
        let clinic = DateBlock::from_holiday(&holiday(HolidayScope::All, HolidaySource::National));
        assert_eq!(clinic.user_message(), "The clinic is closed on December 25, 2025: Christmas Day");

        let doctor = DateBlock::from_holiday(&holiday(HolidayScope::Eyecare, HolidaySource::Doctor));
        assert!(doctor.user_message().starts_with("The doctor is not available"));
    }

    #[test]
    fn test_scope_wire_format() {
        let parsed: Holiday = serde_json::from_value(serde_json::json!({
            "id": Uuid::nil(),
            "date": "2025-12-25",
            "reason": "Christmas Day",
            "scope": "all",
            "source": "national"
        }))
        .unwrap();
        assert_eq!(parsed.scope, HolidayScope::All);
        assert_eq!(parsed.source, HolidaySource::National);
        assert!(parsed.created_at.is_none());
    }
}
