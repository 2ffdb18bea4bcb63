use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    pub notification: NotificationConfig,
    pub clinics: ClinicDirectory,
    pub holiday_fetch_policy: HolidayFetchPolicy,
    pub booking_horizon_months: u32,
    pub port: u16,
}

/// Credentials and addresses used by the email dispatcher.
#[derive(Debug, Clone, Default)]
pub struct NotificationConfig {
    pub admin_email: String,
    pub api_key: String,
    pub from_address: String,
    pub api_url: String,
}

/// Doctor and clinic names denormalized onto every appointment.
#[derive(Debug, Clone)]
pub struct ClinicDirectory {
    pub eyecare_doctor: String,
    pub eyecare_clinic: String,
    pub gynecology_doctor: String,
    pub gynecology_clinic: String,
}

impl Default for ClinicDirectory {
    fn default() -> Self {
        Self {
            eyecare_doctor: "Eye Care Specialist".to_string(),
            eyecare_clinic: "Eye Care Clinic".to_string(),
            gynecology_doctor: "Gynecology Specialist".to_string(),
            gynecology_clinic: "Gynecology Clinic".to_string(),
        }
    }
}

/// What the booking core does when the holiday calendar cannot be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayFetchPolicy {
    /// Treat the calendar as empty: nothing is blocked.
    #[default]
    FailOpen,
    /// Refuse the operation until the calendar is reachable again.
    FailClosed,
}

impl FromStr for HolidayFetchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail_open" | "open" => Ok(Self::FailOpen),
            "fail_closed" | "closed" => Ok(Self::FailClosed),
            other => Err(format!("unknown holiday fetch policy: {}", other)),
        }
    }
}

pub const DEFAULT_NOTIFICATION_API_URL: &str = "https://api.resend.com";
pub const DEFAULT_BOOKING_HORIZON_MONTHS: u32 = 3;

fn var_or_warn(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        warn!("{} not set, using empty value", key);
        String::new()
    })
}

fn var_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        warn!("{} not set, using default", key);
        default.to_string()
    })
}

fn parse_or_default<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Invalid {} value '{}', using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = ClinicDirectory::default();

        let config = Self {
            supabase_url: var_or_warn("SUPABASE_URL"),
            supabase_anon_key: var_or_warn("SUPABASE_ANON_PUBLIC_KEY"),
            supabase_jwt_secret: var_or_warn("SUPABASE_JWT_SECRET"),
            notification: NotificationConfig {
                admin_email: var_or_warn("NOTIFICATION_ADMIN_EMAIL"),
                api_key: var_or_warn("NOTIFICATION_API_KEY"),
                from_address: var_or_warn("NOTIFICATION_FROM_ADDRESS"),
                api_url: var_or_default("NOTIFICATION_API_URL", DEFAULT_NOTIFICATION_API_URL),
            },
            clinics: ClinicDirectory {
                eyecare_doctor: var_or_default("CLINIC_EYECARE_DOCTOR", &defaults.eyecare_doctor),
                eyecare_clinic: var_or_default("CLINIC_EYECARE_NAME", &defaults.eyecare_clinic),
                gynecology_doctor: var_or_default("CLINIC_GYNECOLOGY_DOCTOR", &defaults.gynecology_doctor),
                gynecology_clinic: var_or_default("CLINIC_GYNECOLOGY_NAME", &defaults.gynecology_clinic),
            },
            holiday_fetch_policy: parse_or_default("HOLIDAY_FETCH_POLICY", HolidayFetchPolicy::FailOpen),
            booking_horizon_months: parse_or_default("BOOKING_HORIZON_MONTHS", DEFAULT_BOOKING_HORIZON_MONTHS),
            port: parse_or_default("PORT", 3000),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }
        if !config.is_notification_configured() {
            warn!("Notification dispatch not configured - emails will fail and be logged");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }

    pub fn is_notification_configured(&self) -> bool {
        !self.notification.admin_email.is_empty()
            && !self.notification.api_key.is_empty()
            && !self.notification.from_address.is_empty()
            && !self.notification.api_url.is_empty()
    }
}
