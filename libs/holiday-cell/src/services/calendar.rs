use chrono::{Duration, NaiveDate};
use tracing::debug;

use shared_models::clinic::Specialty;

use crate::models::{BlockKind, DateBlock, Holiday};

/// In-memory view of the holiday table used to resolve bookability.
///
/// Matching is by calendar day only, so every holiday is a whole-day block.
/// When several holidays fall on the same day, a doctor-specific one wins over
/// a clinic-wide one; within the same kind the earliest entry in the list wins.
#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    holidays: Vec<Holiday>,
}

impl HolidayCalendar {
    pub fn new(holidays: Vec<Holiday>) -> Self {
        Self { holidays }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn holidays(&self) -> &[Holiday] {
        &self.holidays
    }

    pub fn into_holidays(self) -> Vec<Holiday> {
        self.holidays
    }

    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty()
    }

    fn matching<'a>(&'a self, date: NaiveDate, specialty: Specialty) -> impl Iterator<Item = &'a Holiday> + 'a {
        self.holidays
            .iter()
            .filter(move |h| h.date == date && h.scope.covers(specialty))
    }

    /// The holiday that decides the block for this day, if any.
    pub fn winning_holiday(&self, date: NaiveDate, specialty: Specialty) -> Option<&Holiday> {
        let mut clinic_wide = None;
        for holiday in self.matching(date, specialty) {
            match holiday.block_kind() {
                BlockKind::DoctorSpecific => return Some(holiday),
                BlockKind::ClinicWide => {
                    clinic_wide.get_or_insert(holiday);
                }
            }
        }
        clinic_wide
    }

    pub fn is_blocked(&self, date: NaiveDate, specialty: Specialty) -> bool {
        self.matching(date, specialty).next().is_some()
    }

    pub fn reason_for(&self, date: NaiveDate, specialty: Specialty) -> Option<&str> {
        self.winning_holiday(date, specialty).map(|h| h.reason.as_str())
    }

    pub fn block_for(&self, date: NaiveDate, specialty: Specialty) -> Option<DateBlock> {
        let block = self.winning_holiday(date, specialty).map(DateBlock::from_holiday);
        if let Some(block) = &block {
            debug!("{} blocked for {} by holiday {} ({:?})", date, specialty, block.holiday_id, block.kind);
        }
        block
    }

    /// Every blocked day in `from..=to`, ascending, for the booking calendar widget.
    /// With no specialty, only clinic-wide closures are returned.
    pub fn blocked_dates(&self, specialty: Option<Specialty>, from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.holidays
            .iter()
            .filter(|h| h.date >= from && h.date <= to)
            .filter(|h| match specialty {
                Some(s) => h.scope.covers(s),
                None => h.scope == crate::models::HolidayScope::All,
            })
            .map(|h| h.date)
            .collect();
        dates.sort_unstable();
        dates.dedup();
        dates
    }

    /// Next bookable day on or after `from`, scanning at most `max_days` days.
    pub fn next_open_day(&self, specialty: Specialty, from: NaiveDate, max_days: i64) -> Option<NaiveDate> {
        (0..=max_days)
            .map(|offset| from + Duration::days(offset))
            .find(|day| !self.is_blocked(*day, specialty))
    }
}

impl From<Vec<Holiday>> for HolidayCalendar {
    fn from(holidays: Vec<Holiday>) -> Self {
        Self::new(holidays)
    }
}
