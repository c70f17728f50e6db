use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Record of one admin mutation, also carried by `admin-update` events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: String,
    /// e.g. `category-rates-updated`, `zone-opened`
    pub action: String,
    pub target_type: String,
    pub target_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

impl AuditLogEntry {
    pub fn new(
        action: impl Into<String>,
        target_type: impl Into<String>,
        target_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        actor: Option<String>,
    ) -> Self {
        Self {
            id: format!("log_{}", Uuid::new_v4().simple()),
            action: action.into(),
            target_type: target_type.into(),
            target_id: target_id.into(),
            timestamp,
            actor,
        }
    }
}
