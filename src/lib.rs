//! # Parking Service
//!
//! Zone occupancy, admission and billing engine for parking lot operations.
//!
//! ## Architecture
//!
//! - **domain**: zones, categories, gates, subscriptions, tickets, the rate
//!   calendar and repository contracts
//! - **application**: the zone ledger, admission controller, billing engine,
//!   configuration store and event broadcaster
//! - **infrastructure**: in-memory storage, JWT and password hashing
//! - **interfaces**: REST API (axum + Swagger UI) and the realtime WebSocket
//! - **shared**: error taxonomy, clock and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use application::{EngineSettings, ParkingEngine};
pub use config::{default_config_path, AppConfig};
pub use interfaces::http::create_api_router;
pub use server::{init_tracing, ServerHandle, ServerOptions};
