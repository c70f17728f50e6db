//! Category/Zone Configuration Store
//!
//! Owns categories, the rate calendar and the audit trail. Zone open/closed
//! flags are applied through the ledger. Every successful mutation appends
//! an audit entry and is announced on the admin topic after it is applied.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, RwLock};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::info;

use super::events::EventBroadcaster;
use super::ledger::ZoneLedger;
use crate::domain::{
    AuditLogEntry, Category, DomainError, DomainResult, RateCalendar, Rates, RushHour, Vacation,
    Zone, ZoneState,
};
use crate::shared::Clock;

const DEFAULT_AUDIT_HISTORY: usize = 500;

pub struct ConfigurationStore {
    categories: DashMap<String, Category>,
    /// Replaced wholesale on change; billing works on a stable snapshot.
    calendar: RwLock<Arc<RateCalendar>>,
    audit: Mutex<VecDeque<AuditLogEntry>>,
    audit_history: usize,
    ledger: Arc<ZoneLedger>,
    events: Arc<EventBroadcaster>,
    clock: Arc<dyn Clock>,
}

impl ConfigurationStore {
    pub fn new(
        calendar: RateCalendar,
        ledger: Arc<ZoneLedger>,
        events: Arc<EventBroadcaster>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            categories: DashMap::new(),
            calendar: RwLock::new(Arc::new(calendar)),
            audit: Mutex::new(VecDeque::new()),
            audit_history: DEFAULT_AUDIT_HISTORY,
            ledger,
            events,
            clock,
        }
    }

    pub fn with_audit_history(mut self, audit_history: usize) -> Self {
        self.audit_history = audit_history.max(1);
        self
    }

    // ── Categories ──────────────────────────────────────────────

    /// Loads a category without auditing; used at startup.
    pub fn insert_category(&self, category: Category) -> DomainResult<()> {
        if category.id.trim().is_empty() {
            return Err(DomainError::field("id", "is required"));
        }
        category.rates().validate()?;
        match self.categories.entry(category.id.clone()) {
            Entry::Occupied(_) => Err(DomainError::Conflict(format!("category {}", category.id))),
            Entry::Vacant(slot) => {
                slot.insert(category);
                Ok(())
            }
        }
    }

    pub fn category(&self, id: &str) -> DomainResult<Category> {
        self.categories
            .get(id)
            .map(|c| c.clone())
            .ok_or_else(|| DomainError::not_found("Category", id))
    }

    pub fn categories(&self) -> Vec<Category> {
        let mut all: Vec<Category> = self.categories.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Re-prices the category and every zone that inherits its rates.
    pub fn update_rates(
        &self,
        category_id: &str,
        rates: Rates,
        actor: Option<&str>,
    ) -> DomainResult<Category> {
        rates.validate()?;
        let updated = {
            let mut category = self
                .categories
                .get_mut(category_id)
                .ok_or_else(|| DomainError::not_found("Category", category_id))?;
            category.set_rates(rates)?;
            category.clone()
        };
        info!(
            category_id,
            rate_normal = %rates.normal,
            rate_special = %rates.special,
            "Category rates updated"
        );

        self.record("category-rates-updated", "category", category_id, actor);
        for zone in self.ledger.in_category(category_id) {
            if zone.rate_normal.is_none() || zone.rate_special.is_none() {
                self.events.zone_updated(&zone.state(&updated));
            }
        }
        Ok(updated)
    }

    // ── Zones ───────────────────────────────────────────────────

    pub fn zone_state(&self, zone: &Zone) -> DomainResult<ZoneState> {
        let category = self.category(&zone.category_id).map_err(|_| {
            DomainError::Internal(format!(
                "zone {} references unknown category {}",
                zone.id, zone.category_id
            ))
        })?;
        Ok(zone.state(&category))
    }

    pub fn zone_states(&self) -> DomainResult<Vec<ZoneState>> {
        self.ledger
            .list()
            .iter()
            .map(|z| self.zone_state(z))
            .collect()
    }

    pub fn set_zone_open(
        &self,
        zone_id: &str,
        open: bool,
        actor: Option<&str>,
    ) -> DomainResult<ZoneState> {
        let zone = self.ledger.toggle_open(zone_id, open)?;
        let state = self.zone_state(&zone)?;
        let action = if open { "zone-opened" } else { "zone-closed" };
        self.record(action, "zone", zone_id, actor);
        self.events.zone_updated(&state);
        Ok(state)
    }

    // ── Calendar ────────────────────────────────────────────────

    pub fn calendar(&self) -> Arc<RateCalendar> {
        self.calendar
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// Loads startup calendar entries without auditing.
    pub fn load_calendar(&self, rush_hours: Vec<RushHour>, vacations: Vec<Vacation>) {
        self.update_calendar(|cal| {
            rush_hours.into_iter().for_each(|r| cal.add_rush_hour(r));
            vacations.into_iter().for_each(|v| cal.add_vacation(v));
        });
    }

    pub fn add_rush_hour(&self, rush_hour: RushHour, actor: Option<&str>) -> RushHour {
        self.update_calendar(|cal| cal.add_rush_hour(rush_hour.clone()));
        info!(
            rush_hour_id = %rush_hour.id,
            week_day = rush_hour.week_day,
            from = %rush_hour.from,
            to = %rush_hour.to,
            "Rush hour added"
        );
        self.record("rush-hour-added", "rush-hour", &rush_hour.id, actor);
        rush_hour
    }

    pub fn add_vacation(&self, vacation: Vacation, actor: Option<&str>) -> Vacation {
        self.update_calendar(|cal| cal.add_vacation(vacation.clone()));
        info!(
            vacation_id = %vacation.id,
            from = %vacation.from,
            to = %vacation.to,
            "Vacation added"
        );
        self.record("vacation-added", "vacation", &vacation.id, actor);
        vacation
    }

    fn update_calendar(&self, f: impl FnOnce(&mut RateCalendar)) {
        let mut guard = self.calendar.write().unwrap_or_else(|p| p.into_inner());
        let mut next = RateCalendar::clone(&guard);
        f(&mut next);
        *guard = Arc::new(next);
    }

    // ── Audit ───────────────────────────────────────────────────

    /// Most recent entries first.
    pub fn audit_log(&self) -> Vec<AuditLogEntry> {
        let log = self.audit.lock().unwrap_or_else(|p| p.into_inner());
        log.iter().rev().cloned().collect()
    }

    /// Appends to the audit trail and publishes `admin-update`.
    pub fn record(
        &self,
        action: &str,
        target_type: &str,
        target_id: &str,
        actor: Option<&str>,
    ) -> AuditLogEntry {
        let entry = AuditLogEntry::new(
            action,
            target_type,
            target_id,
            self.clock.now(),
            actor.map(str::to_string),
        );
        {
            let mut log = self.audit.lock().unwrap_or_else(|p| p.into_inner());
            log.push_back(entry.clone());
            while log.len() > self.audit_history {
                log.pop_front();
            }
        }
        self.events.admin_updated(&entry);
        entry
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::Topic;
    use crate::shared::SystemClock;
    use rust_decimal::Decimal;

    fn zone(id: &str, rate_special: Option<Decimal>) -> Zone {
        Zone {
            id: id.into(),
            name: id.into(),
            category_id: "cat_regular".into(),
            gate_ids: vec!["gate_1".into()],
            total_slots: 10,
            occupied: 0,
            reserved: 0,
            reserved_capacity: 0,
            open: true,
            rate_normal: None,
            rate_special,
        }
    }

    fn store() -> (ConfigurationStore, Arc<EventBroadcaster>) {
        let ledger = Arc::new(ZoneLedger::new());
        ledger.insert(zone("zone_a", None)).unwrap();
        let events = Arc::new(EventBroadcaster::new());
        let store = ConfigurationStore::new(
            RateCalendar::utc(),
            ledger,
            events.clone(),
            Arc::new(SystemClock),
        )
        .with_audit_history(3);
        store
            .insert_category(Category {
                id: "cat_regular".into(),
                name: "Regular".into(),
                rate_normal: Decimal::from(5),
                rate_special: Decimal::from(10),
            })
            .unwrap();
        (store, events)
    }

    #[tokio::test]
    async fn rate_update_audits_and_reprices_zones() {
        let (store, events) = store();
        let (client, mut rx) = events.register();
        events.subscribe(client, Topic::Admin);

        let updated = store
            .update_rates("cat_regular", Rates::new(Decimal::from(6), Decimal::from(12)), Some("admin"))
            .unwrap();
        assert_eq!(updated.rate_special, Decimal::from(12));

        let first = rx.recv().await.unwrap();
        assert!(first.contains("admin-update"));
        assert!(first.contains("category-rates-updated"));
        let second = rx.recv().await.unwrap();
        assert!(second.contains("zone-update"));
        assert!(second.contains("\"rateSpecial\":12.0"));

        let log = store.audit_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].actor.as_deref(), Some("admin"));
    }

    #[test]
    fn negative_rates_leave_category_untouched() {
        let (store, _) = store();
        let err = store
            .update_rates("cat_regular", Rates::new(Decimal::from(-1), Decimal::from(10)), None)
            .unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert_eq!(store.category("cat_regular").unwrap().rate_normal, Decimal::from(5));
        assert!(store.audit_log().is_empty());
    }

    #[test]
    fn unknown_category_is_not_found() {
        let (store, _) = store();
        let err = store
            .update_rates("cat_x", Rates::new(Decimal::ONE, Decimal::ONE), None)
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn closing_zone_is_audited() {
        let (store, _) = store();
        let state = store.set_zone_open("zone_a", false, None).unwrap();
        assert!(!state.open);
        assert_eq!(store.audit_log()[0].action, "zone-closed");
    }

    #[test]
    fn calendar_changes_are_copy_on_write() {
        let (store, _) = store();
        let before = store.calendar();
        store.add_rush_hour(RushHour::parse(1, "07:00", "09:00").unwrap(), None);
        store.add_vacation(Vacation::parse("Holiday", "2025-01-01", "2025-01-01").unwrap(), None);
        assert!(before.rush_hours().is_empty());
        let after = store.calendar();
        assert_eq!(after.rush_hours().len(), 1);
        assert_eq!(after.vacations().len(), 1);
    }

    #[test]
    fn audit_history_is_bounded_newest_first() {
        let (store, _) = store();
        for open in [false, true, false, true] {
            store.set_zone_open("zone_a", open, None).unwrap();
        }
        let log = store.audit_log();
        assert_eq!(log.len(), 3);
        assert_eq!(log[0].action, "zone-opened");
        assert_eq!(log[2].action, "zone-opened");
    }
}
