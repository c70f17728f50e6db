//! Application layer: use cases over the domain model.

pub mod admission;
pub mod billing;
pub mod configuration;
pub mod engine;
pub mod events;
pub mod ledger;
pub mod reports;
pub mod seed;

pub use admission::{AdmissionController, CheckInOutcome, CheckInRequest};
pub use billing::{BillingEngine, BillingSegment, CheckoutResult, Invoice};
pub use configuration::ConfigurationStore;
pub use engine::{EngineSettings, ParkingEngine};
pub use events::{ClientMessage, EventBroadcaster, ServerEvent, TicketUpdate, Topic};
pub use ledger::ZoneLedger;
pub use reports::ZoneReport;
pub use seed::{ensure_admin, SeedData, SeedError, SeedSummary};
