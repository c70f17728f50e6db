use async_trait::async_trait;

use super::model::Gate;
use crate::domain::DomainResult;

#[async_trait]
pub trait GateRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Gate>>;
    async fn find_all(&self) -> DomainResult<Vec<Gate>>;
    async fn save(&self, gate: Gate) -> DomainResult<()>;
}
