//! Subscription entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Car {
    pub plate: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub color: String,
}

/// Vehicle of this subscription currently parked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentCheckin {
    pub ticket_id: String,
    pub zone_id: String,
    pub checkin_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub user_name: String,
    pub active: bool,
    /// Category the subscriber may park in
    #[serde(rename = "category", alias = "categoryId")]
    pub category_id: String,
    #[serde(default)]
    pub cars: Vec<Car>,
    pub starts_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub current_checkins: Vec<CurrentCheckin>,
}

impl Subscription {
    /// Active and inside its validity window at `at`.
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.active && self.starts_at <= at && at < self.expires_at
    }

    /// Admission rule for a subscriber entering a zone of `zone_category`.
    pub fn check_eligibility(
        &self,
        zone_category: &str,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let reason = if !self.active {
            Some("subscription is inactive".to_string())
        } else if at < self.starts_at {
            Some(format!("subscription starts at {}", self.starts_at))
        } else if at >= self.expires_at {
            Some(format!("subscription expired at {}", self.expires_at))
        } else if self.category_id != zone_category {
            Some(format!(
                "subscription category {} does not match zone category {}",
                self.category_id, zone_category
            ))
        } else {
            None
        };

        match reason {
            Some(reason) => Err(DomainError::SubscriptionIneligible {
                subscription_id: self.id.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }

    pub fn add_checkin(&mut self, checkin: CurrentCheckin) -> Result<(), DomainError> {
        if self
            .current_checkins
            .iter()
            .any(|c| c.ticket_id == checkin.ticket_id)
        {
            return Err(DomainError::Conflict(format!(
                "ticket {} already open on subscription {}",
                checkin.ticket_id, self.id
            )));
        }
        self.current_checkins.push(checkin);
        Ok(())
    }

    /// Returns whether a check-in for `ticket_id` was open.
    pub fn remove_checkin(&mut self, ticket_id: &str) -> bool {
        let before = self.current_checkins.len();
        self.current_checkins.retain(|c| c.ticket_id != ticket_id);
        before != self.current_checkins.len()
    }
}

// ── Tests ──────────────────────────────────────────────────────
