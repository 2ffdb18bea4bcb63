use std::sync::Arc;
use chrono::{Duration, NaiveDate, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::{AppConfig, ClinicDirectory, HolidayFetchPolicy, NotificationConfig};
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub notification_api_url: String,
    pub holiday_fetch_policy: HolidayFetchPolicy,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            notification_api_url: "http://localhost:54322".to_string(),
            holiday_fetch_policy: HolidayFetchPolicy::FailOpen,
        }
    }
}

impl TestConfig {
    /// Points both the data store and the email API at the same mock server.
    pub fn with_mock_server(uri: &str) -> Self {
        Self {
            supabase_url: uri.to_string(),
            notification_api_url: uri.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            notification: NotificationConfig {
                admin_email: "admin@clinic.test".to_string(),
                api_key: "test-email-api-key".to_string(),
                from_address: "bookings@clinic.test".to_string(),
                api_url: self.notification_api_url.clone(),
            },
            clinics: ClinicDirectory::default(),
            holiday_fetch_policy: self.holiday_fetch_policy,
            booking_horizon_months: 3,
            port: 3000,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::public("test@example.com")
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn staff(email: &str) -> Self {
        Self::new(email, "staff")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    /// A signed-in account without clinic privileges.
    pub fn public(email: &str) -> Self {
        Self::new(email, "authenticated")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": "authenticated",
            "app_metadata": { "role": user.role },
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Row shapes returned by the mocked data store.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn holiday_response(date: NaiveDate, reason: &str, scope: &str, source: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "date": date.format("%Y-%m-%d").to_string(),
            "reason": reason,
            "scope": scope,
            "source": source,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn appointment_response(id: Uuid, specialty: &str, date: NaiveDate, status: &str) -> Value {
        let (doctor, clinic) = match specialty {
            "gynecology" => ("Gynecology Specialist", "Gynecology Clinic"),
            _ => ("Eye Care Specialist", "Eye Care Clinic"),
        };
        json!({
            "id": id,
            "first_name": "Amina",
            "last_name": "Rahman",
            "email": "amina@example.com",
            "phone": "+8801700000000",
            "age": 34,
            "gender": "female",
            "specialty": specialty,
            "doctor": doctor,
            "clinic": clinic,
            "date": date.format("%Y-%m-%d").to_string(),
            "time": "Morning (9 AM–12 PM)",
            "reason": "Routine eye examination",
            "additional_info": null,
            "status": status,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn email_accepted_response() -> Value {
        json!({ "id": Uuid::new_v4().to_string() })
    }

    pub fn error_response(message: &str, code: &str) -> Value {
        json!({
            "message": message,
            "code": code
        })
    }
}
