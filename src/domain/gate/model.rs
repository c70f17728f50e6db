//! Gate entity

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Physical entry point; attendants check vehicles in at a gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Gate {
    pub id: String,
    pub name: String,
    pub zone_ids: Vec<String>,
    #[serde(default)]
    pub location: String,
}

impl Gate {
    pub fn serves(&self, zone_id: &str) -> bool {
        self.zone_ids.iter().any(|z| z == zone_id)
    }
}
