use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HolidayError {
    #[error("Holiday not found")]
    NotFound,

    #[error("Holiday calendar unavailable: {0}")]
    Unavailable(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
