// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_staff;

use crate::models::{
    AppointmentError, AppointmentRequest, AppointmentSearchQuery, AppointmentStatus, TransitionOutcome,
};
use crate::services::booking::AppointmentBookingService;
use crate::services::status::StatusTransitionService;

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
            AppointmentError::Validation(failure) => AppError::ValidationError(failure.to_string()),
            AppointmentError::InvalidQuery(msg) => AppError::BadRequest(msg),
            err @ AppointmentError::Conflict { .. } => AppError::Conflict(err.to_string()),
            err @ AppointmentError::InvalidStatusTransition { .. } => AppError::Unprocessable(err.to_string()),
            AppointmentError::HolidayCalendarUnavailable(msg) => AppError::ServiceUnavailable(msg),
            AppointmentError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

// ==============================================================================
// PUBLIC BOOKING HANDLERS
// ==============================================================================

pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<AppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let booking_service = AppointmentBookingService::new(&state);
    let outcome = booking_service.submit(request).await?;

    let message = if outcome.notification.is_success() {
        "Appointment request received. A confirmation email is on its way."
    } else {
        "Appointment request received. We could not send the confirmation email; the clinic will contact you."
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "appointment": outcome.appointment,
            "notification": outcome.notification,
            "message": message
        })),
    ))
}

pub async fn get_time_slots(State(state): State<Arc<AppConfig>>) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);
    let slots: Vec<&'static str> = booking_service
        .available_slots()
        .iter()
        .map(|slot| slot.label())
        .collect();

    Ok(Json(json!({
        "slots": slots,
        "booking_horizon_months": state.booking_horizon_months
    })))
}

// ==============================================================================
// STAFF HANDLERS
// ==============================================================================

pub async fn list_appointments(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<AppointmentSearchQuery>,
) -> Result<Json<Value>, AppError> {
    require_staff(&user)?;

    let booking_service = AppointmentBookingService::new(&state);
    let appointments = booking_service.search_appointments(query, auth.token()).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    require_staff(&user)?;

    let booking_service = AppointmentBookingService::new(&state);
    let appointment = booking_service.get_appointment(appointment_id, auth.token()).await?;

    Ok(Json(json!(appointment)))
}

pub async fn confirm_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    apply_transition(&state, auth.token(), &user, appointment_id, AppointmentStatus::Confirmed).await
}

pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    apply_transition(&state, auth.token(), &user, appointment_id, AppointmentStatus::Cancelled).await
}

pub async fn reject_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    apply_transition(&state, auth.token(), &user, appointment_id, AppointmentStatus::Rejected).await
}

pub async fn complete_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    apply_transition(&state, auth.token(), &user, appointment_id, AppointmentStatus::Completed).await
}

async fn apply_transition(
    state: &AppConfig,
    token: &str,
    user: &User,
    appointment_id: Uuid,
    target: AppointmentStatus,
) -> Result<Json<Value>, AppError> {
    require_staff(user)?;

    let status_service = StatusTransitionService::new(state);
    let outcome = status_service.transition(appointment_id, target, token).await?;

    info!(
        "Appointment {} set to {} by {}",
        appointment_id,
        target,
        user.actor_label()
    );

    Ok(Json(transition_body(&outcome)))
}

fn transition_body(outcome: &TransitionOutcome) -> Value {
    let message = if outcome.notification_delivered() {
        format!("Appointment {}", outcome.appointment.status)
    } else {
        format!(
            "Appointment {}, but the patient email could not be sent. Please follow up manually.",
            outcome.appointment.status
        )
    };

    json!({
        "success": true,
        "appointment": outcome.appointment,
        "previous_status": outcome.previous_status,
        "notification": outcome.notification,
        "message": message
    })
}
