use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};

use crate::html::escape_html;
use crate::models::{EmailAttachment, NotificationPayload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptVariant {
    Patient,
    /// Adds a blank consultation notes area for the doctor.
    Doctor,
}

/// One-page appointment summary attached to confirmation emails.
#[derive(Debug, Clone)]
pub struct ReceiptDocument {
    pub variant: ReceiptVariant,
    pub filename: String,
    pub html: String,
}

fn row(label: &str, value: &str) -> String {
    format!(
        "<tr><th align=\"left\">{}</th><td>{}</td></tr>",
        escape_html(label),
        escape_html(value)
    )
}

impl ReceiptDocument {
    pub fn patient(payload: &NotificationPayload, issued_at: DateTime<Utc>) -> Self {
        Self::render(payload, ReceiptVariant::Patient, issued_at)
    }

    pub fn doctor(payload: &NotificationPayload, issued_at: DateTime<Utc>) -> Self {
        Self::render(payload, ReceiptVariant::Doctor, issued_at)
    }

    fn render(payload: &NotificationPayload, variant: ReceiptVariant, issued_at: DateTime<Utc>) -> Self {
        let reference = payload.appointment_id.simple().to_string();
        let short_ref = reference[..8].to_uppercase();

        let mut patient_rows = vec![
            row("Name", &payload.patient_name()),
            row("Email", &payload.email),
            row("Phone", &payload.phone),
        ];
        if let Some(age) = payload.age {
            patient_rows.push(row("Age", &age.to_string()));
        }
        if let Some(gender) = &payload.gender {
            patient_rows.push(row("Gender", gender));
        }

        let mut appointment_rows = vec![
            row("Reference", &short_ref),
            row("Specialty", payload.specialty.display_name()),
            row("Doctor", &payload.doctor),
            row("Clinic", &payload.clinic),
            row("Date", &payload.formatted_date()),
            row("Time", &payload.time),
            row("Reason", &payload.reason),
        ];
        if let Some(info) = payload.additional_info.as_deref().filter(|s| !s.trim().is_empty()) {
            appointment_rows.push(row("Additional information", info));
        }

        let (title, suffix, notes) = match variant {
            ReceiptVariant::Patient => ("Appointment Receipt", "", String::new()),
            ReceiptVariant::Doctor => (
                "Appointment Receipt (Doctor Copy)",
                "-doctor",
                "<h2>Consultation notes</h2>\
                 <div class=\"notes\" style=\"border:1px solid #999;height:240px\"></div>"
                    .to_string(),
            ),
        };

        let html = format!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title}</title></head><body>\
             <h1>{clinic}</h1><p>{title}</p>\
             <h2>Patient information</h2><table>{patient}</table>\
             <h2>Appointment information</h2><table>{appointment}</table>\
             {notes}\
             <p><small>Issued {issued}</small></p></body></html>",
            title = title,
            clinic = escape_html(&payload.clinic),
            patient = patient_rows.concat(),
            appointment = appointment_rows.concat(),
            notes = notes,
            issued = issued_at.format("%Y-%m-%d %H:%M UTC"),
        );

        Self {
            variant,
            filename: format!("appointment-receipt-{}{}.html", short_ref.to_lowercase(), suffix),
            html,
        }
    }

    pub fn to_attachment(&self) -> EmailAttachment {
        EmailAttachment {
            filename: self.filename.clone(),
            content: STANDARD.encode(self.html.as_bytes()),
        }
    }
}
