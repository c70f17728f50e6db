//! Subscription lookup for gate attendants

pub mod handlers;

pub use handlers::*;
