//! Tickets module: check-in at gates, checkout at checkpoints

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
