// libs/appointment-cell/src/services/validation.rs
use std::sync::LazyLock;

use chrono::{Months, NaiveDate};
use regex::Regex;
use tracing::debug;

use holiday_cell::HolidayCalendar;

use crate::models::{AppointmentRequest, ValidationFailure, ValidationResult};

pub const DEFAULT_BOOKING_HORIZON_MONTHS: u32 = 3;
pub const MAX_PATIENT_AGE: u8 = 120;

static EMAIL_REGEX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok());

/// Pure booking-rule check. The first failing rule wins:
/// date, time slot, reason, holiday block, booking window, patient contact.
#[derive(Debug, Clone, Copy)]
pub struct BookingValidator {
    horizon_months: u32,
}

impl Default for BookingValidator {
    fn default() -> Self {
        Self::new(DEFAULT_BOOKING_HORIZON_MONTHS)
    }
}

impl BookingValidator {
    pub fn new(horizon_months: u32) -> Self {
        Self { horizon_months }
    }

    /// Inclusive `(earliest, latest)` bookable days relative to `today`.
    pub fn booking_window(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let latest = today
            .checked_add_months(Months::new(self.horizon_months))
            .unwrap_or(NaiveDate::MAX);
        (today, latest)
    }

    pub fn validate(
        &self,
        request: &AppointmentRequest,
        calendar: &HolidayCalendar,
        today: NaiveDate,
    ) -> ValidationResult {
        match self.check(request, calendar, today) {
            Ok(()) => ValidationResult::Accepted,
            Err(failure) => {
                debug!("Booking request rejected: {} ({})", failure, failure.code());
                ValidationResult::Rejected(failure)
            }
        }
    }

    fn check(
        &self,
        request: &AppointmentRequest,
        calendar: &HolidayCalendar,
        today: NaiveDate,
    ) -> Result<(), ValidationFailure> {
        let date = request.date.ok_or(ValidationFailure::DateRequired)?;

        if request.time_slot().is_none() {
            return Err(ValidationFailure::TimeRequired);
        }

        if request.trimmed_reason().is_none() {
            return Err(ValidationFailure::ReasonRequired);
        }

        if let Some(block) = calendar.block_for(date, request.specialty) {
            return Err(ValidationFailure::DateBlocked(block));
        }

        let (earliest, latest) = self.booking_window(today);
        if date < earliest || date > latest {
            return Err(ValidationFailure::OutsideBookingWindow { date, earliest, latest });
        }

        self.check_patient_contact(request)
    }

    fn check_patient_contact(&self, request: &AppointmentRequest) -> Result<(), ValidationFailure> {
        if request.first_name.trim().is_empty() {
            return Err(ValidationFailure::MissingPatientField("first name"));
        }
        if request.last_name.trim().is_empty() {
            return Err(ValidationFailure::MissingPatientField("last name"));
        }

        let email = request.email.trim();
        if email.is_empty() {
            return Err(ValidationFailure::MissingPatientField("email"));
        }
        if !is_valid_email(email) {
            return Err(ValidationFailure::InvalidEmail);
        }

        if request.phone.trim().is_empty() {
            return Err(ValidationFailure::MissingPatientField("phone"));
        }

        if let Some(age) = request.age {
            if !(0..=i64::from(MAX_PATIENT_AGE)).contains(&age) {
                return Err(ValidationFailure::InvalidAge { max: MAX_PATIENT_AGE });
            }
        }

        Ok(())
    }
}

fn is_valid_email(email: &str) -> bool {
    email.len() <= 254
        && EMAIL_REGEX
            .as_ref()
            .map(|regex| regex.is_match(email))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, Specialty};
    use assert_matches::assert_matches;
    use holiday_cell::models::{BlockKind, Holiday, HolidayScope, HolidaySource};
    use uuid::Uuid;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn holiday(date: NaiveDate, reason: &str, scope: HolidayScope, source: HolidaySource) -> Holiday {
        Holiday {
            id: Uuid::new_v4(),
            date,
            reason: reason.to_string(),
            scope,
            source,
            created_at: None,
        }
    }

    fn request(specialty: Specialty, date: Option<NaiveDate>) -> AppointmentRequest {
        AppointmentRequest {
            first_name: "Amina".to_string(),
            last_name: "Rahman".to_string(),
            email: "amina@example.com".to_string(),
            phone: "+8801700000000".to_string(),
            age: Some(34),
            gender: Some(Gender::Female),
            specialty,
            date,
            time: Some("Morning (9 AM–12 PM)".to_string()),
            reason: Some("Routine check-up".to_string()),
            additional_info: None,
        }
    }

    #[test]
    fn test_clinic_wide_holiday_blocks_both_specialties() {
        let christmas = day(2025, 12, 25);
        let calendar = HolidayCalendar::new(vec![holiday(
            christmas,
            "Christmas",
            HolidayScope::All,
            HolidaySource::National,
        )]);
        let validator = BookingValidator::default();
        let today = day(2025, 12, 1);

        for specialty in Specialty::ALL {
            let result = validator.validate(&request(specialty, Some(christmas)), &calendar, today);
            assert_matches!(
                result,
                ValidationResult::Rejected(ValidationFailure::DateBlocked(ref block))
                    if block.reason == "Christmas" && block.kind == BlockKind::ClinicWide
            );
        }
    }

    #[test]
    fn test_specialty_holiday_only_blocks_that_specialty() {
        let leave = day(2026, 1, 10);
        let calendar = HolidayCalendar::new(vec![holiday(
            leave,
            "Doctor on leave",
            HolidayScope::Gynecology,
            HolidaySource::Doctor,
        )]);
        let validator = BookingValidator::default();
        let today = day(2026, 1, 1);

        let eyecare = validator.validate(&request(Specialty::Eyecare, Some(leave)), &calendar, today);
        assert_eq!(eyecare, ValidationResult::Accepted);

        let gynecology = validator.validate(&request(Specialty::Gynecology, Some(leave)), &calendar, today);
        let failure = gynecology.into_result().unwrap_err();
        let block = failure.date_block().unwrap();
        assert_eq!(block.kind, BlockKind::DoctorSpecific);
        assert!(failure.to_string().starts_with("The doctor is not available on January 10, 2026"));
    }

    #[test]
    fn test_missing_date_wins_over_other_failures() {
        let mut req = request(Specialty::Eyecare, None);
        req.time = None;
        req.reason = None;
        let result = BookingValidator::default().validate(&req, &HolidayCalendar::empty(), day(2026, 1, 1));
        assert_eq!(result, ValidationResult::Rejected(ValidationFailure::DateRequired));
        assert_eq!(
            result.into_result().unwrap_err().to_string(),
            "date required"
        );
    }

    #[test]
    fn test_unknown_time_label_is_time_required() {
        let mut req = request(Specialty::Eyecare, Some(day(2026, 1, 5)));
        req.time = Some("Midnight".to_string());
        req.reason = None;
        let result = BookingValidator::default().validate(&req, &HolidayCalendar::empty(), day(2026, 1, 1));
        assert_eq!(result, ValidationResult::Rejected(ValidationFailure::TimeRequired));
    }

    #[test]
    fn test_blank_reason_rejected() {
        let mut req = request(Specialty::Eyecare, Some(day(2026, 1, 5)));
        req.reason = Some("   ".to_string());
        let result = BookingValidator::default().validate(&req, &HolidayCalendar::empty(), day(2026, 1, 1));
        assert_eq!(result, ValidationResult::Rejected(ValidationFailure::ReasonRequired));
    }

    #[test]
    fn test_holiday_checked_before_booking_window() {
        let past = day(2025, 12, 25);
        let calendar = HolidayCalendar::new(vec![holiday(
            past,
            "Christmas",
            HolidayScope::All,
            HolidaySource::National,
        )]);
        let result = BookingValidator::default().validate(
            &request(Specialty::Eyecare, Some(past)),
            &calendar,
            day(2026, 10, 18),
        );
        assert_matches!(result, ValidationResult::Rejected(ValidationFailure::DateBlocked(_)));
    }

    #[test]
    fn test_booking_window_bounds() {
        let validator = BookingValidator::new(3);
        let today = day(2026, 10, 18);
        let (earliest, latest) = validator.booking_window(today);
        assert_eq!(earliest, today);
        assert_eq!(latest, day(2027, 1, 18));

        let calendar = HolidayCalendar::empty();
        assert!(validator.validate(&request(Specialty::Eyecare, Some(today)), &calendar, today).is_accepted());
        assert!(validator.validate(&request(Specialty::Eyecare, Some(latest)), &calendar, today).is_accepted());
        assert_matches!(
            validator.validate(&request(Specialty::Eyecare, Some(day(2026, 10, 17))), &calendar, today),
            ValidationResult::Rejected(ValidationFailure::OutsideBookingWindow { .. })
        );
        assert_matches!(
            validator.validate(&request(Specialty::Eyecare, Some(day(2027, 1, 19))), &calendar, today),
            ValidationResult::Rejected(ValidationFailure::OutsideBookingWindow { .. })
        );
    }

    #[test]
    fn test_patient_contact_rules() {
        let validator = BookingValidator::default();
        let calendar = HolidayCalendar::empty();
        let today = day(2026, 1, 1);
        let date = Some(day(2026, 1, 5));

        let mut req = request(Specialty::Eyecare, date);
        req.first_name = " ".to_string();
        assert_eq!(
            validator.validate(&req, &calendar, today),
            ValidationResult::Rejected(ValidationFailure::MissingPatientField("first name"))
        );

        let mut req = request(Specialty::Eyecare, date);
        req.email = "not-an-email".to_string();
        assert_eq!(
            validator.validate(&req, &calendar, today),
            ValidationResult::Rejected(ValidationFailure::InvalidEmail)
        );

        let mut req = request(Specialty::Eyecare, date);
        req.phone = String::new();
        assert_eq!(
            validator.validate(&req, &calendar, today),
            ValidationResult::Rejected(ValidationFailure::MissingPatientField("phone"))
        );

        let mut req = request(Specialty::Eyecare, date);
        req.age = Some(130);
        assert_matches!(
            validator.validate(&req, &calendar, today),
            ValidationResult::Rejected(ValidationFailure::InvalidAge { max: 120 })
        );

        let mut req = request(Specialty::Eyecare, date);
        req.age = Some(-1);
        assert_matches!(
            validator.validate(&req, &calendar, today),
            ValidationResult::Rejected(ValidationFailure::InvalidAge { max: 120 })
        );

        let mut req = request(Specialty::Eyecare, date);
        req.age = Some(120);
        assert!(validator.validate(&req, &calendar, today).is_accepted());

        let mut req = request(Specialty::Eyecare, date);
        req.age = None;
        req.gender = None;
        assert!(validator.validate(&req, &calendar, today).is_accepted());
    }

    #[test]
    fn test_validation_is_idempotent() {
        let validator = BookingValidator::default();
        let calendar = HolidayCalendar::new(vec![holiday(
            day(2026, 1, 10),
            "Clinic maintenance",
            HolidayScope::All,
            HolidaySource::Manual,
        )]);
        let req = request(Specialty::Gynecology, Some(day(2026, 1, 10)));
        let today = day(2026, 1, 1);

        let first = validator.validate(&req, &calendar, today);
        let second = validator.validate(&req, &calendar, today);
        assert_eq!(first, second);
    }
}
