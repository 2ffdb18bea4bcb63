#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::Extension;
use axum_extra::TypedHeader;
use chrono::NaiveDate;
use headers::{Authorization, authorization::Bearer};
use wiremock::MockServer;

use appointment_cell::models::{AppointmentRequest, Gender, Specialty};
use notification_cell::{DispatchMode, DispatchResult, NotificationDispatcher, NotificationPayload, RecipientDelivery, RecipientRole};
use shared_config::AppConfig;
use shared_models::auth::User;
use shared_utils::test_utils::{TestConfig, TestUser};

/// Records every dispatch instead of sending email.
#[derive(Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<(DispatchMode, NotificationPayload)>>,
    fail: bool,
}

impl RecordingDispatcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { sent: Mutex::new(Vec::new()), fail: true })
    }

    pub fn sent(&self) -> Vec<(DispatchMode, NotificationPayload)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn modes(&self) -> Vec<DispatchMode> {
        self.sent().into_iter().map(|(mode, _)| mode).collect()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn send(&self, payload: &NotificationPayload, mode: DispatchMode) -> DispatchResult {
        self.sent.lock().unwrap().push((mode, payload.clone()));

        let delivery = |role: RecipientRole, recipient: &str| RecipientDelivery {
            role,
            recipient: recipient.to_string(),
            success: !self.fail,
            attachments: Vec::new(),
            message_id: if self.fail { None } else { Some("msg-1".to_string()) },
            error: if self.fail { Some("Email API unreachable: connection refused".to_string()) } else { None },
        };

        DispatchResult {
            mode,
            appointment_id: payload.appointment_id,
            deliveries: vec![
                delivery(RecipientRole::Patient, &payload.email),
                delivery(RecipientRole::Clinic, "admin@clinic.test"),
            ],
        }
    }
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn config_for(server: &MockServer) -> AppConfig {
    TestConfig::with_mock_server(&server.uri()).to_app_config()
}

pub fn booking_request(specialty: Specialty, date: NaiveDate) -> AppointmentRequest {
    AppointmentRequest {
        first_name: "Amina".to_string(),
        last_name: "Rahman".to_string(),
        email: "amina@example.com".to_string(),
        phone: "+8801700000000".to_string(),
        age: Some(34),
        gender: Some(Gender::Female),
        specialty,
        date: Some(date),
        time: Some("Morning (9 AM–12 PM)".to_string()),
        reason: Some("Routine eye examination".to_string()),
        additional_info: None,
    }
}

pub fn bearer(token: &str) -> TypedHeader<Authorization<Bearer>> {
    TypedHeader(Authorization::bearer(token).unwrap())
}

pub fn staff_extension() -> Extension<User> {
    Extension(TestUser::staff("reception@clinic.test").to_user())
}

pub fn public_extension() -> Extension<User> {
    Extension(TestUser::public("visitor@example.com").to_user())
}
