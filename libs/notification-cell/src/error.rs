use thiserror::Error;

/// Why a single email could not be delivered. Never escapes the dispatcher;
/// it is folded into a failed [`crate::models::RecipientDelivery`].
#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Notification dispatch not configured: missing {0}")]
    NotConfigured(&'static str),

    #[error("Email API rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Email API unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}
