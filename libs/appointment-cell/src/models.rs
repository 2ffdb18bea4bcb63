// libs/appointment-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use holiday_cell::models::DateBlock;
use notification_cell::{DispatchMode, DispatchResult, NotificationPayload};
use shared_config::ClinicDirectory;

pub use shared_models::clinic::Specialty;

// ==============================================================================
// ENUMERATED FIELDS
// ==============================================================================

/// Coarse time-of-day slot offered by the booking form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeSlot {
    #[serde(rename = "Morning (9 AM–12 PM)")]
    Morning,
    #[serde(rename = "Afternoon (12 PM–4 PM)")]
    Afternoon,
    #[serde(rename = "Evening (4 PM–7 PM)")]
    Evening,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 3] = [TimeSlot::Morning, TimeSlot::Afternoon, TimeSlot::Evening];

    pub fn label(&self) -> &'static str {
        match self {
            TimeSlot::Morning => "Morning (9 AM–12 PM)",
            TimeSlot::Afternoon => "Afternoon (12 PM–4 PM)",
            TimeSlot::Evening => "Evening (4 PM–7 PM)",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|slot| slot.label() == label)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
    Other,
    PreferNotToSay,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Gender::Female => "female",
            Gender::Male => "male",
            Gender::Other => "other",
            Gender::PreferNotToSay => "prefer_not_to_say",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    Rejected,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled | AppointmentStatus::Rejected
        )
    }

    /// Notice sent when an appointment moves into this status.
    pub fn dispatch_mode(&self) -> Option<DispatchMode> {
        match self {
            AppointmentStatus::Pending => Some(DispatchMode::Requested),
            AppointmentStatus::Confirmed => Some(DispatchMode::Confirmed),
            AppointmentStatus::Cancelled => Some(DispatchMode::Cancelled),
            AppointmentStatus::Rejected => Some(DispatchMode::Rejected),
            AppointmentStatus::Completed => None,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Doctor and clinic names for a specialty.
pub fn clinic_assignment(specialty: Specialty, clinics: &ClinicDirectory) -> (String, String) {
    match specialty {
        Specialty::Eyecare => (clinics.eyecare_doctor.clone(), clinics.eyecare_clinic.clone()),
        Specialty::Gynecology => (clinics.gynecology_doctor.clone(), clinics.gynecology_clinic.clone()),
    }
}

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// Payload submitted by the booking form. Required fields are optional here so
/// that missing values reach the validator and produce a specific message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppointmentRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// Wide on purpose: out-of-range ages reach the validator.
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub gender: Option<Gender>,
    pub specialty: Specialty,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub additional_info: Option<String>,
}

impl AppointmentRequest {
    pub fn patient_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }

    pub fn time_slot(&self) -> Option<TimeSlot> {
        self.time.as_deref().and_then(TimeSlot::from_label)
    }

    pub fn trimmed_reason(&self) -> Option<&str> {
        self.reason.as_deref().map(str::trim).filter(|r| !r.is_empty())
    }
}

/// Typed insert row for the `appointments` table.
#[derive(Debug, Clone, Serialize)]
pub struct NewAppointment {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub age: Option<u8>,
    pub gender: Option<Gender>,
    pub specialty: Specialty,
    pub doctor: String,
    pub clinic: String,
    pub date: NaiveDate,
    pub time: TimeSlot,
    pub reason: String,
    pub additional_info: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewAppointment {
    /// Builds the pending snapshot for an accepted request.
    pub fn from_request(
        request: AppointmentRequest,
        clinics: &ClinicDirectory,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationFailure> {
        let date = request.date.ok_or(ValidationFailure::DateRequired)?;
        let time = request.time_slot().ok_or(ValidationFailure::TimeRequired)?;
        let reason = request
            .trimmed_reason()
            .ok_or(ValidationFailure::ReasonRequired)?
            .to_string();
        let (doctor, clinic) = clinic_assignment(request.specialty, clinics);
        let additional_info = request
            .additional_info
            .map(|info| info.trim().to_string())
            .filter(|info| !info.is_empty());

        Ok(Self {
            id: Uuid::new_v4(),
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            phone: request.phone.trim().to_string(),
            age: request.age.and_then(|age| u8::try_from(age).ok()),
            gender: request.gender,
            specialty: request.specialty,
            doctor,
            clinic,
            date,
            time,
            reason,
            additional_info,
            status: AppointmentStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub gender: Option<Gender>,
    pub specialty: Specialty,
    pub doctor: String,
    pub clinic: String,
    pub date: NaiveDate,
    pub time: TimeSlot,
    pub reason: String,
    #[serde(default)]
    pub additional_info: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn patient_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn notification_payload(&self) -> NotificationPayload {
        NotificationPayload {
            appointment_id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            age: self.age,
            gender: self.gender.map(|g| g.to_string()),
            specialty: self.specialty,
            doctor: self.doctor.clone(),
            clinic: self.clinic.clone(),
            date: self.date,
            time: self.time.label().to_string(),
            reason: self.reason.clone(),
            additional_info: self.additional_info.clone(),
            status: self.status.to_string(),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentSearchQuery {
    pub specialty: Option<Specialty>,
    pub status: Option<AppointmentStatus>,
    pub email: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub appointment: Appointment,
    pub notification: DispatchResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransitionOutcome {
    pub appointment: Appointment,
    pub previous_status: AppointmentStatus,
    /// `None` when the transition sends no notice (completion).
    pub notification: Option<DispatchResult>,
}

impl TransitionOutcome {
    pub fn notification_delivered(&self) -> bool {
        self.notification.as_ref().map(|n| n.is_success()).unwrap_or(true)
    }
}

// ==============================================================================
// VALIDATION MODELS
// ==============================================================================

/// First failing booking rule, with the message shown to the patient.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationFailure {
    #[error("date required")]
    DateRequired,

    #[error("time required")]
    TimeRequired,

    #[error("reason required")]
    ReasonRequired,

    #[error("{}", .0.user_message())]
    DateBlocked(DateBlock),

    #[error("date outside booking window: {date} is not between {earliest} and {latest}")]
    OutsideBookingWindow {
        date: NaiveDate,
        earliest: NaiveDate,
        latest: NaiveDate,
    },

    #[error("{0} required")]
    MissingPatientField(&'static str),

    #[error("valid email required")]
    InvalidEmail,

    #[error("age must be between 0 and {max}")]
    InvalidAge { max: u8 },
}

impl ValidationFailure {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationFailure::DateRequired => "date_required",
            ValidationFailure::TimeRequired => "time_required",
            ValidationFailure::ReasonRequired => "reason_required",
            ValidationFailure::DateBlocked(_) => "date_blocked",
            ValidationFailure::OutsideBookingWindow { .. } => "outside_booking_window",
            ValidationFailure::MissingPatientField(_) => "patient_field_required",
            ValidationFailure::InvalidEmail => "invalid_email",
            ValidationFailure::InvalidAge { .. } => "invalid_age",
        }
    }

    pub fn date_block(&self) -> Option<&DateBlock> {
        match self {
            ValidationFailure::DateBlocked(block) => Some(block),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Accepted,
    Rejected(ValidationFailure),
}

impl ValidationResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationResult::Accepted)
    }

    pub fn into_result(self) -> Result<(), ValidationFailure> {
        match self {
            ValidationResult::Accepted => Ok(()),
            ValidationResult::Rejected(failure) => Err(failure),
        }
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("{0}")]
    Validation(ValidationFailure),

    #[error("Appointment {id} was already processed (no longer {expected})")]
    Conflict { id: Uuid, expected: AppointmentStatus },

    #[error("Cannot move appointment from {from} to {to}")]
    InvalidStatusTransition { from: AppointmentStatus, to: AppointmentStatus },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Holiday calendar unavailable: {0}")]
    HolidayCalendarUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<ValidationFailure> for AppointmentError {
    fn from(failure: ValidationFailure) -> Self {
        AppointmentError::Validation(failure)
    }
}
