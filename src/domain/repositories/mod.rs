//! Repository access for the domain layer
//!
//! Zones, categories and the calendar are owned by the application-level
//! ledger and configuration store; everything else goes through here.

use super::gate::GateRepository;
use super::subscription::SubscriptionRepository;
use super::ticket::TicketRepository;
use super::user::UserRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

// ── RepositoryProvider ──────────────────────────────────────────

/// Provides access to all domain repositories.
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let ticket = repos.tickets().find_by_id("t_1").await?;
///     let gate = repos.gates().find_by_id("gate_1").await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn gates(&self) -> &dyn GateRepository;
    fn subscriptions(&self) -> &dyn SubscriptionRepository;
    fn tickets(&self) -> &dyn TicketRepository;
    fn users(&self) -> &dyn UserRepository;
}
