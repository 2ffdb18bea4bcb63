pub mod booking;
pub mod lifecycle;
pub mod repository;
pub mod status;
pub mod validation;

pub use booking::AppointmentBookingService;
pub use lifecycle::AppointmentLifecycleService;
pub use repository::AppointmentRepository;
pub use status::StatusTransitionService;
pub use validation::BookingValidator;
