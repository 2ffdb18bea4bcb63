use crate::html::escape_html;
use crate::models::{DispatchMode, NotificationPayload};

pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

fn summary(payload: &NotificationPayload) -> String {
    let mut lines = vec![
        format!("<li><b>Patient:</b> {}</li>", escape_html(&payload.patient_name())),
        format!("<li><b>Specialty:</b> {}</li>", payload.specialty.display_name()),
        format!("<li><b>Doctor:</b> {}</li>", escape_html(&payload.doctor)),
        format!("<li><b>Date:</b> {}</li>", payload.formatted_date()),
        format!("<li><b>Time:</b> {}</li>", escape_html(&payload.time)),
        format!("<li><b>Reason:</b> {}</li>", escape_html(&payload.reason)),
    ];
    if let Some(info) = payload.additional_info.as_deref().filter(|s| !s.trim().is_empty()) {
        lines.push(format!("<li><b>Additional information:</b> {}</li>", escape_html(info)));
    }
    format!("<ul>{}</ul>", lines.concat())
}

pub fn patient_email(payload: &NotificationPayload, mode: DispatchMode) -> RenderedEmail {
    let greeting = format!("<p>Dear {},</p>", escape_html(&payload.first_name));
    let (subject, body) = match mode {
        DispatchMode::Requested => (
            format!("We received your {} appointment request", payload.specialty.display_name()),
            "<p>Thank you for booking with us. Your request is pending review; \
             we will email you again once it has been confirmed.</p>",
        ),
        DispatchMode::Confirmed => (
            format!("Your appointment on {} is confirmed", payload.date.format("%b %-d, %Y")),
            "<p>Your appointment has been confirmed. Your receipt is attached; \
             please bring it with you.</p>",
        ),
        DispatchMode::Cancelled => (
            format!("Your appointment on {} has been cancelled", payload.date.format("%b %-d, %Y")),
            "<p>Your appointment has been cancelled. You are welcome to book a new slot at any time.</p>",
        ),
        DispatchMode::Rejected => (
            format!("We could not accommodate your appointment on {}", payload.date.format("%b %-d, %Y")),
            "<p>Unfortunately the clinic could not accommodate the requested slot. \
             Please choose another date or time and submit a new request.</p>",
        ),
    };

    RenderedEmail {
        subject,
        html: format!("{}{}{}<p>{}</p>", greeting, body, summary(payload), escape_html(&payload.clinic)),
    }
}

pub fn clinic_email(payload: &NotificationPayload, mode: DispatchMode) -> RenderedEmail {
    let name = payload.patient_name();
    let (subject, intro) = match mode {
        DispatchMode::Requested => (
            format!("New appointment request: {} ({})", name, payload.specialty.display_name()),
            "A new appointment request is waiting for review.",
        ),
        DispatchMode::Confirmed => (
            format!("Appointment confirmed: {} on {}", name, payload.date),
            "The appointment below is confirmed. Doctor and patient copies of the receipt are attached.",
        ),
        DispatchMode::Cancelled => (
            format!("Appointment cancelled: {} on {}", name, payload.date),
            "The appointment below has been cancelled.",
        ),
        DispatchMode::Rejected => (
            format!("Appointment rejected: {} on {}", name, payload.date),
            "The appointment request below was rejected and the patient has been notified.",
        ),
    };

    let contact = format!(
        "<p><b>Contact:</b> {} / {}</p>",
        escape_html(&payload.email),
        escape_html(&payload.phone)
    );

    RenderedEmail {
        subject,
        html: format!("<p>{}</p>{}{}", intro, summary(payload), contact),
    }
}
