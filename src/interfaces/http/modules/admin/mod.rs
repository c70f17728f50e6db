//! Admin module: rates, zone availability, calendar, reports and staff

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
