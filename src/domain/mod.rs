//! Domain layer: aggregates, value types and repository contracts.

pub mod audit;
pub mod calendar;
pub mod category;
pub mod gate;
pub mod repositories;
pub mod subscription;
pub mod ticket;
pub mod user;
pub mod zone;

pub use audit::AuditLogEntry;
pub use calendar::{RateCalendar, RateMode, RateSpan, RushHour, TimeOfDay, Vacation};
pub use category::{Category, Rates, MAX_HOURLY_RATE};
pub use gate::{Gate, GateRepository};
pub use repositories::{DomainResult, RepositoryProvider};
pub use subscription::{Car, CurrentCheckin, Subscription, SubscriptionRepository};
pub use ticket::{Ticket, TicketRepository, TicketType};
pub use user::{User, UserRepository, UserRole};
pub use zone::{SlotKind, Zone, ZoneState};

pub use crate::shared::errors::DomainError;
