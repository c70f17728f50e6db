//! Special-rate calendar

pub mod model;
pub mod rate_calendar;
pub mod time_of_day;

pub use model::{RushHour, Vacation};
pub use rate_calendar::{RateCalendar, RateMode, RateSpan};
pub use time_of_day::TimeOfDay;
