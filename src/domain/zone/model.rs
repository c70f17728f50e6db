//! Zone entity and slot accounting rules
//!
//! `free` is derived from `total_slots - occupied`, so `occupied + free ==
//! total_slots` holds structurally. `reserved` counts reserved-pool slots that
//! are currently unoccupied and never exceeds `free`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::category::{check_rate, Category, Rates};
use crate::shared::{DomainError, FieldErrorsBuilder};

/// Which pool a slot is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    /// General free slots (`free - reserved`)
    Visitor,
    /// Reserved pool held back for subscribers
    Subscriber,
}

impl SlotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visitor => "visitor",
            Self::Subscriber => "subscriber",
        }
    }
}

impl std::fmt::Display for SlotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub category_id: String,
    pub gate_ids: Vec<String>,
    pub total_slots: u32,
    pub occupied: u32,
    /// Unoccupied slots in the reserved pool
    pub reserved: u32,
    /// Size of the reserved pool when the zone is empty
    pub reserved_capacity: u32,
    pub open: bool,
    /// Zone-level overrides; `None` falls back to the category rate
    pub rate_normal: Option<Decimal>,
    pub rate_special: Option<Decimal>,
}

impl Zone {
    pub fn free(&self) -> u32 {
        self.total_slots.saturating_sub(self.occupied)
    }

    pub fn available_for_visitors(&self) -> u32 {
        self.free().saturating_sub(self.reserved)
    }

    pub fn available_for_subscribers(&self) -> u32 {
        self.reserved.min(self.free())
    }

    pub fn available(&self, kind: SlotKind) -> u32 {
        match kind {
            SlotKind::Visitor => self.available_for_visitors(),
            SlotKind::Subscriber => self.available_for_subscribers(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = FieldErrorsBuilder::new();
        if self.id.trim().is_empty() {
            errors.add("id", "is required");
        }
        if self.category_id.trim().is_empty() {
            errors.add("categoryId", "is required");
        }
        if self.occupied > self.total_slots {
            errors.add("occupied", "must not exceed totalSlots");
        }
        if self.reserved > self.free() {
            errors.add("reserved", "must not exceed free slots");
        }
        if self.reserved > self.reserved_capacity {
            errors.add("reserved", "must not exceed reservedCapacity");
        }
        if self.reserved_capacity > self.total_slots {
            errors.add("reservedCapacity", "must not exceed totalSlots");
        }
        for (field, rate) in [("rateNormal", self.rate_normal), ("rateSpecial", self.rate_special)] {
            if let Some(rate) = rate {
                check_rate(&mut errors, field, rate);
            }
        }
        errors.finish()
    }

    /// Takes one slot from the pool matching `kind`.
    pub fn reserve(&mut self, kind: SlotKind) -> Result<(), DomainError> {
        if !self.open {
            return Err(DomainError::ZoneClosed(self.id.clone()));
        }
        if self.available(kind) == 0 {
            return Err(DomainError::ZoneFull(self.id.clone()));
        }
        self.occupied += 1;
        if kind == SlotKind::Subscriber {
            self.reserved -= 1;
        }
        Ok(())
    }

    /// Returns one slot to the pool it was drawn from.
    pub fn release(&mut self, kind: SlotKind) -> Result<(), DomainError> {
        if self.occupied == 0 {
            return Err(DomainError::Internal(format!(
                "release on zone {} with no occupied slots",
                self.id
            )));
        }
        self.occupied -= 1;
        if kind == SlotKind::Subscriber && self.reserved < self.reserved_capacity {
            self.reserved += 1;
        }
        Ok(())
    }

    pub fn effective_rates(&self, category: &Category) -> Rates {
        Rates::new(
            self.rate_normal.unwrap_or(category.rate_normal),
            self.rate_special.unwrap_or(category.rate_special),
        )
    }

    pub fn has_rate_override(&self) -> bool {
        self.rate_normal.is_some() || self.rate_special.is_some()
    }

    pub fn state(&self, category: &Category) -> ZoneState {
        let rates = self.effective_rates(category);
        ZoneState {
            id: self.id.clone(),
            name: self.name.clone(),
            category_id: self.category_id.clone(),
            gate_ids: self.gate_ids.clone(),
            total_slots: self.total_slots,
            occupied: self.occupied,
            free: self.free(),
            reserved: self.reserved,
            available_for_visitors: self.available_for_visitors(),
            available_for_subscribers: self.available_for_subscribers(),
            rate_normal: rates.normal,
            rate_special: rates.special,
            open: self.open,
        }
    }
}

/// Read model published to gates and admin screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZoneState {
    pub id: String,
    pub name: String,
    pub category_id: String,
    pub gate_ids: Vec<String>,
    pub total_slots: u32,
    pub occupied: u32,
    pub free: u32,
    pub reserved: u32,
    pub available_for_visitors: u32,
    pub available_for_subscribers: u32,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub rate_normal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub rate_special: Decimal,
    pub open: bool,
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(total: u32, occupied: u32, reserved: u32) -> Zone {
        Zone {
            id: "zone_a".into(),
            name: "Zone A".into(),
            category_id: "cat_regular".into(),
            gate_ids: vec!["gate_1".into()],
            total_slots: total,
            occupied,
            reserved,
            reserved_capacity: reserved,
            open: true,
            rate_normal: None,
            rate_special: None,
        }
    }

    fn category() -> Category {
        Category {
            id: "cat_regular".into(),
            name: "Regular".into(),
            rate_normal: Decimal::from(5),
            rate_special: Decimal::from(10),
        }
    }

    fn assert_invariants(z: &Zone) {
        assert_eq!(z.occupied + z.free(), z.total_slots);
        assert!(z.reserved <= z.free());
    }

    #[test]
    fn derived_availability() {
        let z = zone(10, 4, 2);
        assert_eq!(z.free(), 6);
        assert_eq!(z.available_for_visitors(), 4);
        assert_eq!(z.available_for_subscribers(), 2);
    }

    #[test]
    fn last_free_slot_reserved_for_subscribers() {
        let mut z = zone(10, 9, 1);
        assert_eq!(
            z.reserve(SlotKind::Visitor),
            Err(DomainError::ZoneFull("zone_a".into()))
        );
        assert_eq!(z.occupied, 9);

        z.reserve(SlotKind::Subscriber).unwrap();
        assert_eq!(z.occupied, 10);
        assert_eq!(z.reserved, 0);
        assert_invariants(&z);
    }

    #[test]
    fn subscriber_rejected_when_reserved_pool_empty() {
        let mut z = zone(10, 2, 0);
        assert!(z.available_for_visitors() > 0);
        assert_eq!(
            z.reserve(SlotKind::Subscriber),
            Err(DomainError::ZoneFull("zone_a".into()))
        );
        z.reserve(SlotKind::Visitor).unwrap();
        assert_invariants(&z);
    }

    #[test]
    fn closed_zone_rejects_before_capacity_check() {
        let mut z = zone(10, 10, 0);
        z.open = false;
        assert_eq!(
            z.reserve(SlotKind::Visitor),
            Err(DomainError::ZoneClosed("zone_a".into()))
        );
    }

    #[test]
    fn release_restores_the_drawn_pool() {
        let mut z = zone(5, 0, 2);
        z.reserve(SlotKind::Subscriber).unwrap();
        z.reserve(SlotKind::Visitor).unwrap();
        assert_eq!((z.occupied, z.reserved), (2, 1));

        z.release(SlotKind::Subscriber).unwrap();
        assert_eq!((z.occupied, z.reserved), (1, 2));
        z.release(SlotKind::Visitor).unwrap();
        assert_eq!((z.occupied, z.reserved), (0, 2));
        assert_invariants(&z);
    }

    #[test]
    fn release_never_grows_reserved_past_capacity() {
        let mut z = zone(5, 1, 2);
        z.release(SlotKind::Subscriber).unwrap();
        assert_eq!(z.reserved, 2);
        assert_invariants(&z);
    }

    #[test]
    fn release_on_empty_zone_is_internal_error() {
        let mut z = zone(5, 0, 0);
        assert_eq!(z.release(SlotKind::Visitor).unwrap_err().kind(), "internal");
    }

    #[test]
    fn validate_rejects_reserved_above_free() {
        let mut z = zone(10, 9, 1);
        z.reserved = 2;
        z.reserved_capacity = 2;
        assert_eq!(z.validate().unwrap_err().kind(), "validation");
    }

    #[test]
    fn zone_override_wins_over_category() {
        let mut z = zone(10, 0, 0);
        z.rate_special = Some(Decimal::from(12));
        let rates = z.effective_rates(&category());
        assert_eq!(rates.normal, Decimal::from(5));
        assert_eq!(rates.special, Decimal::from(12));

        let state = z.state(&category());
        assert_eq!(state.rate_special, Decimal::from(12));
        assert_eq!(state.free, 10);
    }
}
