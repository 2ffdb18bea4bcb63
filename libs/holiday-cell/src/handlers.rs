use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::{Months, Utc};
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_staff;

use crate::error::HolidayError;
use crate::models::{CreateHolidayRequest, HolidayCalendarResponse, HolidayQuery};
use crate::services::holiday::HolidayService;

impl From<HolidayError> for AppError {
    fn from(err: HolidayError) -> Self {
        match err {
            HolidayError::NotFound => AppError::NotFound("Holiday not found".to_string()),
            HolidayError::ValidationError(msg) => AppError::ValidationError(msg),
            HolidayError::Unavailable(msg) => AppError::ServiceUnavailable(msg),
            HolidayError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

/// Public calendar feed: holidays plus the disabled dates for the date picker.
pub async fn list_holidays(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<HolidayQuery>,
) -> Result<Json<HolidayCalendarResponse>, AppError> {
    let today = Utc::now().date_naive();
    let from = query.from.unwrap_or(today);
    let to = match query.to {
        Some(to) => to,
        None => from
            .checked_add_months(Months::new(state.booking_horizon_months))
            .ok_or_else(|| AppError::BadRequest("Date range out of bounds".to_string()))?,
    };

    let holiday_service = HolidayService::new(&state);
    let calendar = holiday_service
        .load_calendar(from, to, query.specialty, None)
        .await?;

    let disabled_dates = calendar.blocked_dates(query.specialty, from, to);
    let next_open_date = query
        .specialty
        .and_then(|specialty| calendar.next_open_day(specialty, from, (to - from).num_days()));

    Ok(Json(HolidayCalendarResponse {
        from,
        to,
        specialty: query.specialty,
        holidays: calendar.into_holidays(),
        disabled_dates,
        next_open_date,
    }))
}

pub async fn create_holiday(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateHolidayRequest>,
) -> Result<Json<Value>, AppError> {
    require_staff(&user)?;

    let holiday_service = HolidayService::new(&state);
    let holiday = holiday_service.create_holiday(request, auth.token()).await?;

    info!("Holiday {} created by {}", holiday.id, user.actor_label());

    Ok(Json(json!({
        "success": true,
        "holiday": holiday,
        "message": "Holiday created"
    })))
}

pub async fn delete_holiday(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(holiday_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    require_staff(&user)?;

    let holiday_service = HolidayService::new(&state);
    holiday_service.delete_holiday(holiday_id, auth.token()).await?;

    info!("Holiday {} deleted by {}", holiday_id, user.actor_label());

    Ok(Json(json!({
        "success": true,
        "message": "Holiday deleted"
    })))
}
