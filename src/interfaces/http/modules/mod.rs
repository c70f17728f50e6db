pub mod admin;
pub mod auth;
pub mod health;
pub mod master;
pub mod metrics;
pub mod subscriptions;
pub mod tickets;
