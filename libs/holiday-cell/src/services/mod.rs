pub mod calendar;
pub mod holiday;

pub use calendar::HolidayCalendar;
pub use holiday::HolidayService;
