pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::HolidayError;
pub use models::*;
pub use services::{HolidayCalendar, HolidayService};
