// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use holiday_cell::{HolidayCalendar, HolidayError, HolidayService};
use notification_cell::{DispatchMode, EmailDispatcher, NotificationDispatcher};
use shared_config::{AppConfig, ClinicDirectory};
use shared_database::supabase::SupabaseClient;

use crate::models::{
    Appointment, AppointmentError, AppointmentRequest, AppointmentSearchQuery, NewAppointment,
    SubmissionOutcome, TimeSlot,
};
use crate::services::repository::AppointmentRepository;
use crate::services::validation::BookingValidator;

/// Public booking flow: validate, persist as pending, notify.
pub struct AppointmentBookingService {
    repository: AppointmentRepository,
    holiday_service: HolidayService,
    validator: BookingValidator,
    clinics: ClinicDirectory,
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_dispatcher(config, Arc::new(EmailDispatcher::new(config)))
    }

    pub fn with_dispatcher(config: &AppConfig, dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));

        Self {
            repository: AppointmentRepository::new(Arc::clone(&supabase)),
            holiday_service: HolidayService::with_client(supabase, config.holiday_fetch_policy),
            validator: BookingValidator::new(config.booking_horizon_months),
            clinics: config.clinics.clone(),
            dispatcher,
        }
    }

    /// The fixed slot labels offered by the booking form.
    pub fn available_slots(&self) -> Vec<TimeSlot> {
        TimeSlot::ALL.to_vec()
    }

    /// Runs the booking rules against the holidays stored for the request's day.
    pub async fn validate_request(
        &self,
        request: &AppointmentRequest,
        today: NaiveDate,
    ) -> Result<(), AppointmentError> {
        let calendar = match request.date {
            Some(date) => self
                .holiday_service
                .load_calendar(date, date, Some(request.specialty), None)
                .await
                .map_err(holiday_unavailable)?,
            // Rule 1 fails before the calendar is consulted.
            None => HolidayCalendar::empty(),
        };

        self.validator
            .validate(request, &calendar, today)
            .into_result()
            .map_err(AppointmentError::from)
    }

    pub async fn submit(&self, request: AppointmentRequest) -> Result<SubmissionOutcome, AppointmentError> {
        self.submit_on(request, Utc::now().date_naive()).await
    }

    /// Submits a booking as seen on `today`.
    #[instrument(skip(self, request), fields(specialty = %request.specialty))]
    pub async fn submit_on(
        &self,
        request: AppointmentRequest,
        today: NaiveDate,
    ) -> Result<SubmissionOutcome, AppointmentError> {
        debug!("Booking request for {} on {:?}", request.patient_name(), request.date);

        self.validate_request(&request, today).await?;

        let new_appointment = NewAppointment::from_request(request, &self.clinics, Utc::now())?;
        let appointment = self.repository.insert(&new_appointment, None).await?;

        let notification = self
            .dispatcher
            .send(&appointment.notification_payload(), DispatchMode::Requested)
            .await;

        if notification.is_success() {
            info!("Booking {} received; acknowledgement sent", appointment.id);
        } else {
            for failure in notification.failures() {
                warn!(
                    "Booking {} stored but {:?} notice to {} failed: {}",
                    appointment.id,
                    failure.role,
                    failure.recipient,
                    failure.error.as_deref().unwrap_or("unknown error")
                );
            }
        }

        Ok(SubmissionOutcome { appointment, notification })
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        self.repository.get(appointment_id, auth_token).await
    }

    pub async fn search_appointments(
        &self,
        query: AppointmentSearchQuery,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        if let (Some(from), Some(to)) = (query.from_date, query.to_date) {
            if from > to {
                return Err(AppointmentError::InvalidQuery(
                    "from_date must not be after to_date".to_string(),
                ));
            }
        }
        self.repository.search(&query, auth_token).await
    }
}

pub(crate) fn holiday_unavailable(error: HolidayError) -> AppointmentError {
    match error {
        HolidayError::Unavailable(reason) => AppointmentError::HolidayCalendarUnavailable(reason),
        other => AppointmentError::HolidayCalendarUnavailable(other.to_string()),
    }
}
