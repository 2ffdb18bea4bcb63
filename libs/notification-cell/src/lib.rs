pub mod error;
mod html;
pub mod models;
pub mod receipt;
pub mod services;

pub use error::NotificationError;
pub use models::*;
pub use receipt::{ReceiptDocument, ReceiptVariant};
pub use services::{EmailDispatcher, NotificationDispatcher};
