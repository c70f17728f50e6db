//! Zone Ledger
//!
//! Sole owner of slot counters. Each zone sits behind its own mutex, so
//! read-modify-write sequences on one zone are serialized while different
//! zones proceed in parallel. No lock is held across an `.await`.

use std::sync::{Arc, Mutex};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, info};

use crate::domain::{DomainError, DomainResult, SlotKind, Zone};

#[derive(Default)]
pub struct ZoneLedger {
    zones: DashMap<String, Arc<Mutex<Zone>>>,
}

impl ZoneLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a validated zone; fails with `Conflict` on a duplicate id.
    pub fn insert(&self, zone: Zone) -> DomainResult<()> {
        zone.validate()?;
        match self.zones.entry(zone.id.clone()) {
            Entry::Occupied(_) => Err(DomainError::Conflict(format!("zone {}", zone.id))),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(zone)));
                Ok(())
            }
        }
    }

    pub fn snapshot(&self, zone_id: &str) -> DomainResult<Zone> {
        self.with_zone(zone_id, |zone| Ok(zone.clone()))
    }

    /// Snapshot of every zone, ordered by id.
    pub fn list(&self) -> Vec<Zone> {
        let handles: Vec<Arc<Mutex<Zone>>> =
            self.zones.iter().map(|e| e.value().clone()).collect();
        let mut zones: Vec<Zone> = handles
            .iter()
            .map(|h| h.lock().unwrap_or_else(|p| p.into_inner()).clone())
            .collect();
        zones.sort_by(|a, b| a.id.cmp(&b.id));
        zones
    }

    pub fn in_category(&self, category_id: &str) -> Vec<Zone> {
        self.list()
            .into_iter()
            .filter(|z| z.category_id == category_id)
            .collect()
    }

    /// Takes one slot of `kind`; returns the zone after the change.
    pub fn reserve_slot(&self, zone_id: &str, kind: SlotKind) -> DomainResult<Zone> {
        let zone = self.with_zone(zone_id, |zone| {
            zone.reserve(kind)?;
            Ok(zone.clone())
        })?;
        debug!(
            zone_id,
            %kind,
            occupied = zone.occupied,
            reserved = zone.reserved,
            "Slot reserved"
        );
        Ok(zone)
    }

    pub fn release_slot(&self, zone_id: &str, kind: SlotKind) -> DomainResult<Zone> {
        let zone = self.with_zone(zone_id, |zone| {
            zone.release(kind)?;
            Ok(zone.clone())
        })?;
        debug!(
            zone_id,
            %kind,
            occupied = zone.occupied,
            reserved = zone.reserved,
            "Slot released"
        );
        Ok(zone)
    }

    /// Closing a zone blocks new admissions but leaves parked cars in place.
    pub fn toggle_open(&self, zone_id: &str, open: bool) -> DomainResult<Zone> {
        let zone = self.with_zone(zone_id, |zone| {
            zone.open = open;
            Ok(zone.clone())
        })?;
        info!(zone_id, open, occupied = zone.occupied, "Zone availability changed");
        Ok(zone)
    }

    fn with_zone<T>(
        &self,
        zone_id: &str,
        f: impl FnOnce(&mut Zone) -> DomainResult<T>,
    ) -> DomainResult<T> {
        let handle = self
            .zones
            .get(zone_id)
            .map(|e| e.value().clone())
            .ok_or_else(|| DomainError::not_found("Zone", zone_id))?;
        let mut zone = handle.lock().unwrap_or_else(|p| p.into_inner());
        f(&mut zone)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn zone(id: &str, total: u32, occupied: u32, reserved: u32) -> Zone {
        Zone {
            id: id.into(),
            name: id.to_uppercase(),
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

    #[test]
    fn insert_validates_and_rejects_duplicates() {
        let ledger = ZoneLedger::new();
        ledger.insert(zone("zone_a", 10, 0, 2)).unwrap();
        assert!(ledger.insert(zone("zone_a", 10, 0, 2)).unwrap_err().is_conflict());
        assert_eq!(
            ledger.insert(zone("zone_b", 10, 11, 0)).unwrap_err().kind(),
            "validation"
        );
    }

    #[test]
    fn unknown_zone_is_not_found() {
        let ledger = ZoneLedger::new();
        assert_eq!(
            ledger.reserve_slot("nope", SlotKind::Visitor).unwrap_err(),
            DomainError::not_found("Zone", "nope")
        );
    }

    #[test]
    fn closing_keeps_parked_cars() {
        let ledger = ZoneLedger::new();
        ledger.insert(zone("zone_a", 10, 4, 0)).unwrap();
        let closed = ledger.toggle_open("zone_a", false).unwrap();
        assert_eq!(closed.occupied, 4);
        assert_eq!(
            ledger.reserve_slot("zone_a", SlotKind::Visitor).unwrap_err().kind(),
            "zone_closed"
        );
        ledger.release_slot("zone_a", SlotKind::Visitor).unwrap();
        assert_eq!(ledger.snapshot("zone_a").unwrap().occupied, 3);
    }

    #[test]
    fn concurrent_checkins_never_overbook() {
        let ledger = Arc::new(ZoneLedger::new());
        ledger.insert(zone("zone_a", 50, 0, 10)).unwrap();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let ledger = ledger.clone();
                let kind = if i % 4 == 0 {
                    SlotKind::Subscriber
                } else {
                    SlotKind::Visitor
                };
                thread::spawn(move || {
                    (0..20)
                        .filter(|_| ledger.reserve_slot("zone_a", kind).is_ok())
                        .count()
                })
            })
            .collect();
        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        let z = ledger.snapshot("zone_a").unwrap();
        assert_eq!(admitted, 50);
        assert_eq!(z.occupied, 50);
        assert_eq!(z.occupied + z.free(), z.total_slots);
        assert!(z.reserved <= z.free());
    }

    #[test]
    fn zones_are_independent() {
        let ledger = ZoneLedger::new();
        ledger.insert(zone("zone_a", 1, 0, 0)).unwrap();
        ledger.insert(zone("zone_b", 1, 0, 0)).unwrap();
        ledger.reserve_slot("zone_a", SlotKind::Visitor).unwrap();
        ledger.reserve_slot("zone_b", SlotKind::Visitor).unwrap();
        let ids: Vec<_> = ledger.list().into_iter().map(|z| z.id).collect();
        assert_eq!(ids, vec!["zone_a", "zone_b"]);
    }
}
