//! Parking ticket entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::zone::SlotKind;
use crate::shared::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TicketType {
    Visitor,
    Subscriber,
}

impl TicketType {
    /// Subscribers park in the reserved pool, visitors in general free slots.
    pub fn slot_kind(&self) -> SlotKind {
        match self {
            Self::Visitor => SlotKind::Visitor,
            Self::Subscriber => SlotKind::Subscriber,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visitor => "visitor",
            Self::Subscriber => "subscriber",
        }
    }
}

impl std::fmt::Display for TicketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    pub zone_id: String,
    pub gate_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    pub checkin_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_at: Option<DateTime<Utc>>,
}

impl Ticket {
    pub fn new(
        ticket_type: TicketType,
        zone_id: impl Into<String>,
        gate_id: impl Into<String>,
        subscription_id: Option<String>,
        checkin_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: format!("t_{}", uuid::Uuid::new_v4().simple()),
            ticket_type,
            zone_id: zone_id.into(),
            gate_id: gate_id.into(),
            subscription_id,
            checkin_at,
            checkout_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.checkout_at.is_none()
    }

    /// Stamps `checkout_at`; a ticket can be checked out only once.
    pub fn check_out(&mut self, at: DateTime<Utc>) -> Result<(), DomainError> {
        if self.checkout_at.is_some() {
            return Err(DomainError::AlreadyCheckedOut(self.id.clone()));
        }
        // Clock skew must not produce a negative stay.
        self.checkout_at = Some(at.max(self.checkin_at));
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, h, 0, 0).unwrap()
    }

    #[test]
    fn check_out_only_once() {
        let mut t = Ticket::new(TicketType::Visitor, "zone_a", "gate_1", None, at(8));
        t.check_out(at(10)).unwrap();
        assert_eq!(t.checkout_at, Some(at(10)));
        assert_eq!(
            t.check_out(at(11)),
            Err(DomainError::AlreadyCheckedOut(t.id.clone()))
        );
        assert_eq!(t.checkout_at, Some(at(10)));
    }

    #[test]
    fn checkout_before_checkin_is_clamped() {
        let mut t = Ticket::new(TicketType::Visitor, "zone_a", "gate_1", None, at(8));
        t.check_out(at(8) - Duration::minutes(5)).unwrap();
        assert_eq!(t.checkout_at, Some(at(8)));
    }

    #[test]
    fn serializes_type_field() {
        let t = Ticket::new(
            TicketType::Subscriber,
            "zone_a",
            "gate_1",
            Some("sub_1".into()),
            at(8),
        );
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["type"], "subscriber");
        assert_eq!(json["zoneId"], "zone_a");
        assert!(json.get("checkoutAt").is_none());
        assert!(t.id.starts_with("t_"));
    }

    #[test]
    fn ticket_type_maps_to_slot_pool() {
        assert_eq!(TicketType::Visitor.slot_kind(), SlotKind::Visitor);
        assert_eq!(TicketType::Subscriber.slot_kind(), SlotKind::Subscriber);
    }
}
