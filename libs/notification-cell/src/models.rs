use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::clinic::Specialty;

/// Which notice the dispatcher sends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    Requested,
    Confirmed,
    Cancelled,
    Rejected,
}

impl DispatchMode {
    pub fn attaches_receipt(&self) -> bool {
        matches!(self, DispatchMode::Confirmed)
    }
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DispatchMode::Requested => "requested",
            DispatchMode::Confirmed => "confirmed",
            DispatchMode::Cancelled => "cancelled",
            DispatchMode::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Flat appointment snapshot handed to the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationPayload {
    pub appointment_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub age: Option<u8>,
    pub gender: Option<String>,
    pub specialty: Specialty,
    pub doctor: String,
    pub clinic: String,
    pub date: NaiveDate,
    pub time: String,
    pub reason: String,
    pub additional_info: Option<String>,
    pub status: String,
}

impl NotificationPayload {
    pub fn patient_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn formatted_date(&self) -> String {
        self.date.format("%A, %B %-d, %Y").to_string()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecipientRole {
    Patient,
    /// The doctor's copy, delivered to the clinic's administrative address.
    Clinic,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipientDelivery {
    pub role: RecipientRole,
    pub recipient: String,
    pub success: bool,
    pub attachments: Vec<String>,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

/// Outcome of one dispatch, reported per recipient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DispatchResult {
    pub mode: DispatchMode,
    pub appointment_id: Uuid,
    pub deliveries: Vec<RecipientDelivery>,
}

impl DispatchResult {
    pub fn is_success(&self) -> bool {
        !self.deliveries.is_empty() && self.deliveries.iter().all(|d| d.success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &RecipientDelivery> {
        self.deliveries.iter().filter(|d| !d.success)
    }

    pub fn delivery_for(&self, role: RecipientRole) -> Option<&RecipientDelivery> {
        self.deliveries.iter().find(|d| d.role == role)
    }

    pub fn has_attachments(&self) -> bool {
        self.deliveries.iter().any(|d| !d.attachments.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailAttachment {
    pub filename: String,
    /// Base64-encoded file body.
    pub content: String,
}

/// Request body accepted by the email API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub attachments: Vec<EmailAttachment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailApiResponse {
    pub id: Option<String>,
}
