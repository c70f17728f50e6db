//! Category aggregate

pub mod model;

pub use model::{check_rate, Category, Rates, MAX_HOURLY_RATE};
