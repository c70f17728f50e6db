use async_trait::async_trait;

use super::User;
use crate::domain::DomainResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>>;
    async fn find_all(&self) -> DomainResult<Vec<User>>;
    /// Fails with `Conflict` when the username is taken.
    async fn create(&self, user: User) -> DomainResult<()>;
}
