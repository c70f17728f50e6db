use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::Ticket;
use crate::domain::DomainResult;

#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Ticket>>;
    async fn find_open(&self) -> DomainResult<Vec<Ticket>>;
    async fn save(&self, ticket: Ticket) -> DomainResult<()>;
    /// Atomically stamps the checkout time and returns the updated ticket.
    ///
    /// Fails with `NotFound` or `AlreadyCheckedOut`; concurrent callers for the
    /// same ticket see exactly one success.
    async fn mark_checked_out(&self, id: &str, at: DateTime<Utc>) -> DomainResult<Ticket>;
    /// Clears the checkout stamp; used to roll back a failed checkout.
    async fn reopen(&self, id: &str) -> DomainResult<()>;
    async fn delete(&self, id: &str) -> DomainResult<()>;
}
