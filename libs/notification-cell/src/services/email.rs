use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use reqwest::{Client, header::{AUTHORIZATION, CONTENT_TYPE}};
use tracing::{debug, info, warn};

use shared_config::{AppConfig, NotificationConfig};

use crate::error::NotificationError;
use crate::models::{
    DispatchMode, DispatchResult, EmailApiResponse, EmailMessage,
    NotificationPayload, RecipientDelivery, RecipientRole,
};
use crate::receipt::ReceiptDocument;
use crate::services::dispatcher::NotificationDispatcher;
use crate::services::templates::{clinic_email, patient_email};

/// Dispatcher backed by an HTTP email API (`POST {api_url}/emails`).
pub struct EmailDispatcher {
    client: Client,
    config: NotificationConfig,
}

impl EmailDispatcher {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_config(config.notification.clone())
    }

    pub fn with_config(config: NotificationConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn check_configured(&self) -> Result<(), NotificationError> {
        if self.config.api_url.is_empty() {
            return Err(NotificationError::NotConfigured("api_url"));
        }
        if self.config.api_key.is_empty() {
            return Err(NotificationError::NotConfigured("api_key"));
        }
        if self.config.from_address.is_empty() {
            return Err(NotificationError::NotConfigured("from_address"));
        }
        Ok(())
    }

    /// Patient notice plus the clinic copy. Receipts are generated only for
    /// confirmations: the patient gets their copy, the clinic gets the doctor
    /// copy together with the patient copy.
    pub fn build_messages(
        &self,
        payload: &NotificationPayload,
        mode: DispatchMode,
    ) -> Vec<(RecipientRole, EmailMessage)> {
        let (patient_attachments, clinic_attachments) = if mode.attaches_receipt() {
            let issued_at = Utc::now();
            let patient_copy = ReceiptDocument::patient(payload, issued_at).to_attachment();
            let doctor_copy = ReceiptDocument::doctor(payload, issued_at).to_attachment();
            (vec![patient_copy.clone()], vec![doctor_copy, patient_copy])
        } else {
            (Vec::new(), Vec::new())
        };

        let patient = patient_email(payload, mode);
        let clinic = clinic_email(payload, mode);

        vec![
            (
                RecipientRole::Patient,
                EmailMessage {
                    from: self.config.from_address.clone(),
                    to: vec![payload.email.clone()],
                    subject: patient.subject,
                    html: patient.html,
                    attachments: patient_attachments,
                },
            ),
            (
                RecipientRole::Clinic,
                EmailMessage {
                    from: self.config.from_address.clone(),
                    to: vec![self.config.admin_email.clone()],
                    subject: clinic.subject,
                    html: clinic.html,
                    attachments: clinic_attachments,
                },
            ),
        ]
    }

    async fn post_email(&self, message: &EmailMessage) -> Result<Option<String>, NotificationError> {
        self.check_configured()?;

        let recipient = message.to.first().map(String::as_str).unwrap_or_default();
        if recipient.trim().is_empty() {
            return Err(NotificationError::Rejected {
                status: 0,
                body: "recipient address is empty".to_string(),
            });
        }

        let url = format!("{}/emails", self.config.api_url.trim_end_matches('/'));
        debug!("Posting email '{}' to {}", message.subject, url);

        let response = self.client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.config.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected { status: status.as_u16(), body });
        }

        let accepted = response.json::<EmailApiResponse>().await.ok();
        Ok(accepted.and_then(|r| r.id))
    }

    async fn deliver(&self, role: RecipientRole, message: EmailMessage) -> RecipientDelivery {
        let recipient = message.to.join(", ");
        let attachments = message.attachments.iter().map(|a| a.filename.clone()).collect();

        match self.post_email(&message).await {
            Ok(message_id) => RecipientDelivery {
                role,
                recipient,
                success: true,
                attachments,
                message_id,
                error: None,
            },
            Err(e) => RecipientDelivery {
                role,
                recipient,
                success: false,
                attachments,
                message_id: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[async_trait]
impl NotificationDispatcher for EmailDispatcher {
    async fn send(&self, payload: &NotificationPayload, mode: DispatchMode) -> DispatchResult {
        let messages = self.build_messages(payload, mode);
        let deliveries = join_all(
            messages.into_iter().map(|(role, message)| self.deliver(role, message)),
        ).await;

        let result = DispatchResult {
            mode,
            appointment_id: payload.appointment_id,
            deliveries,
        };

        if result.is_success() {
            info!("Sent '{}' notifications for appointment {}", mode, payload.appointment_id);
        } else {
            for failure in result.failures() {
                warn!(
                    "Failed to send '{}' notification for appointment {} to {:?} <{}>: {}",
                    mode,
                    payload.appointment_id,
                    failure.role,
                    failure.recipient,
                    failure.error.as_deref().unwrap_or("unknown error")
                );
            }
        }

        result
    }
}
