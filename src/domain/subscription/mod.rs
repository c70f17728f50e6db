//! Subscription aggregate

pub mod model;
pub mod repository;

pub use model::{Car, CurrentCheckin, Subscription};
pub use repository::SubscriptionRepository;
