use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use shared_config::{AppConfig, HolidayFetchPolicy};
use shared_database::supabase::SupabaseClient;
use shared_models::clinic::Specialty;

use crate::error::HolidayError;
use crate::models::{CreateHolidayRequest, Holiday, HolidayScope};
use crate::services::calendar::HolidayCalendar;

/// Store-backed access to the `holidays` table.
pub struct HolidayService {
    supabase: Arc<SupabaseClient>,
    fetch_policy: HolidayFetchPolicy,
}

impl HolidayService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
            fetch_policy: config.holiday_fetch_policy,
        }
    }

    pub fn with_client(supabase: Arc<SupabaseClient>, fetch_policy: HolidayFetchPolicy) -> Self {
        Self { supabase, fetch_policy }
    }

    /// Holidays in `from..=to`. With a specialty, only holidays whose scope
    /// covers it are returned.
    pub async fn list_holidays(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        specialty: Option<Specialty>,
        auth_token: Option<&str>,
    ) -> Result<Vec<Holiday>, HolidayError> {
        if from > to {
            return Err(HolidayError::ValidationError(
                "Range start must not be after range end".to_string(),
            ));
        }

        let mut query_parts = vec![
            format!("date=gte.{}", from.format("%Y-%m-%d")),
            format!("date=lte.{}", to.format("%Y-%m-%d")),
        ];
        if let Some(specialty) = specialty {
            query_parts.push(format!(
                "scope=in.({},{})",
                HolidayScope::All,
                HolidayScope::for_specialty(specialty)
            ));
        }
        query_parts.push("order=date.asc,created_at.asc".to_string());

        let path = format!("/rest/v1/holidays?{}", query_parts.join("&"));
        debug!("Fetching holidays: {}", path);

        let rows: Vec<Value> = self.supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| HolidayError::Unavailable(e.to_string()))?;

        // A malformed row must not hide the rows that did parse.
        let holidays = rows
            .into_iter()
            .filter_map(|row| {
                let row_id = row
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or("<missing id>")
                    .to_string();
                match serde_json::from_value::<Holiday>(row) {
                    Ok(holiday) => Some(holiday),
                    Err(e) => {
                        warn!("Skipping unparseable holiday row {}: {}", row_id, e);
                        None
                    }
                }
            })
            .collect();

        Ok(holidays)
    }

    /// Loads the calendar and applies the configured fetch-failure policy.
    ///
    /// Fail-open returns an empty calendar so a transient outage never blocks
    /// every booking; fail-closed surfaces [`HolidayError::Unavailable`].
    #[instrument(skip(self, auth_token))]
    pub async fn load_calendar(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        specialty: Option<Specialty>,
        auth_token: Option<&str>,
    ) -> Result<HolidayCalendar, HolidayError> {
        match self.list_holidays(from, to, specialty, auth_token).await {
            Ok(holidays) => Ok(HolidayCalendar::new(holidays)),
            Err(HolidayError::Unavailable(reason)) => match self.fetch_policy {
                HolidayFetchPolicy::FailOpen => {
                    warn!(
                        "Holiday calendar unavailable ({}); failing open, no dates blocked for {}..={}",
                        reason, from, to
                    );
                    Ok(HolidayCalendar::empty())
                }
                HolidayFetchPolicy::FailClosed => {
                    warn!("Holiday calendar unavailable ({}); failing closed", reason);
                    Err(HolidayError::Unavailable(reason))
                }
            },
            Err(other) => Err(other),
        }
    }

    pub async fn create_holiday(
        &self,
        request: CreateHolidayRequest,
        auth_token: &str,
    ) -> Result<Holiday, HolidayError> {
        let reason = request.reason.trim();
        if reason.is_empty() {
            return Err(HolidayError::ValidationError("Holiday reason is required".to_string()));
        }

        let holiday_data = json!({
            "date": request.date.format("%Y-%m-%d").to_string(),
            "reason": reason,
            "scope": request.scope,
            "source": request.source,
            "created_at": Utc::now().to_rfc3339()
        });

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/holidays",
            Some(auth_token),
            Some(holiday_data),
            Some(SupabaseClient::representation_headers()),
        ).await.map_err(|e| HolidayError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next()
            .ok_or_else(|| HolidayError::DatabaseError("Failed to create holiday".to_string()))?;

        let holiday: Holiday = serde_json::from_value(row)
            .map_err(|e| HolidayError::DatabaseError(format!("Failed to parse created holiday: {}", e)))?;

        info!("Holiday {} created for {} (scope {}, source {:?})",
              holiday.id, holiday.date, holiday.scope, holiday.source);
        Ok(holiday)
    }

    pub async fn delete_holiday(&self, holiday_id: Uuid, auth_token: &str) -> Result<(), HolidayError> {
        let path = format!("/rest/v1/holidays?id=eq.{}", holiday_id);

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::DELETE,
            &path,
            Some(auth_token),
            None,
            Some(SupabaseClient::representation_headers()),
        ).await.map_err(|e| HolidayError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(HolidayError::NotFound);
        }

        info!("Holiday {} deleted", holiday_id);
        Ok(())
    }
}
