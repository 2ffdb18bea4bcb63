// libs/appointment-cell/src/services/status.rs
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use holiday_cell::HolidayService;
use notification_cell::{EmailDispatcher, NotificationDispatcher};
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{AppointmentError, AppointmentStatus, TransitionOutcome, ValidationFailure};
use crate::services::booking::holiday_unavailable;
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::repository::AppointmentRepository;

/// Staff-driven status changes. The store is updated first with a
/// compare-and-set on the current status, then the patient is notified.
pub struct StatusTransitionService {
    repository: AppointmentRepository,
    holiday_service: HolidayService,
    lifecycle_service: AppointmentLifecycleService,
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl StatusTransitionService {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_dispatcher(config, Arc::new(EmailDispatcher::new(config)))
    }

    pub fn with_dispatcher(config: &AppConfig, dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));

        Self {
            repository: AppointmentRepository::new(Arc::clone(&supabase)),
            holiday_service: HolidayService::with_client(supabase, config.holiday_fetch_policy),
            lifecycle_service: AppointmentLifecycleService::new(),
            dispatcher,
        }
    }

    pub async fn confirm(&self, appointment_id: Uuid, auth_token: &str) -> Result<TransitionOutcome, AppointmentError> {
        self.transition(appointment_id, AppointmentStatus::Confirmed, auth_token).await
    }

    pub async fn cancel(&self, appointment_id: Uuid, auth_token: &str) -> Result<TransitionOutcome, AppointmentError> {
        self.transition(appointment_id, AppointmentStatus::Cancelled, auth_token).await
    }

    pub async fn reject(&self, appointment_id: Uuid, auth_token: &str) -> Result<TransitionOutcome, AppointmentError> {
        self.transition(appointment_id, AppointmentStatus::Rejected, auth_token).await
    }

    pub async fn complete(&self, appointment_id: Uuid, auth_token: &str) -> Result<TransitionOutcome, AppointmentError> {
        self.transition(appointment_id, AppointmentStatus::Completed, auth_token).await
    }

    #[instrument(skip(self, auth_token))]
    pub async fn transition(
        &self,
        appointment_id: Uuid,
        target: AppointmentStatus,
        auth_token: &str,
    ) -> Result<TransitionOutcome, AppointmentError> {
        let current = self.repository.get(appointment_id, auth_token).await?;
        let previous_status = current.status;

        if previous_status == target {
            debug!("Appointment {} is already {}", appointment_id, target);
            return Err(AppointmentError::Conflict { id: appointment_id, expected: previous_status });
        }

        self.lifecycle_service
            .validate_status_transition(&previous_status, &target)?;

        // Holidays may have been declared since the request was submitted.
        if target == AppointmentStatus::Confirmed {
            let calendar = self
                .holiday_service
                .load_calendar(current.date, current.date, Some(current.specialty), Some(auth_token))
                .await
                .map_err(holiday_unavailable)?;

            if let Some(block) = calendar.block_for(current.date, current.specialty) {
                warn!(
                    "Refusing to confirm appointment {}: {} is blocked ({})",
                    appointment_id, current.date, block.reason
                );
                return Err(ValidationFailure::DateBlocked(block).into());
            }
        }

        let appointment = self
            .repository
            .update_status_if(appointment_id, previous_status, target, auth_token)
            .await?
            .ok_or(AppointmentError::Conflict { id: appointment_id, expected: previous_status })?;

        info!("Appointment {} moved {} -> {}", appointment_id, previous_status, target);

        let notification = match target.dispatch_mode() {
            Some(mode) => {
                let result = self.dispatcher.send(&appointment.notification_payload(), mode).await;
                for failure in result.failures() {
                    warn!(
                        "Appointment {} is {} but {} notice to {} failed: {}",
                        appointment_id,
                        target,
                        mode,
                        failure.recipient,
                        failure.error.as_deref().unwrap_or("unknown error")
                    );
                }
                Some(result)
            }
            None => None,
        };

        Ok(TransitionOutcome { appointment, previous_status, notification })
    }
}
