use async_trait::async_trait;

use super::model::{CurrentCheckin, Subscription};
use crate::domain::DomainResult;

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Subscription>>;
    async fn find_all(&self) -> DomainResult<Vec<Subscription>>;
    async fn save(&self, subscription: Subscription) -> DomainResult<()>;
    /// Appends an open check-in; fails with `NotFound` for an unknown subscription.
    async fn add_checkin(&self, subscription_id: &str, checkin: CurrentCheckin)
        -> DomainResult<()>;
    /// Removes the open check-in for `ticket_id`; returns whether one existed.
    async fn remove_checkin(&self, subscription_id: &str, ticket_id: &str) -> DomainResult<bool>;
}
