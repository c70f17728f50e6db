//! Composition root for the parking engine
//!
//! Wires the ledger, configuration store, broadcaster and the two use-case
//! services over one repository provider and clock.

use std::sync::Arc;

use chrono::FixedOffset;

use super::admission::AdmissionController;
use super::billing::BillingEngine;
use super::configuration::ConfigurationStore;
use super::events::EventBroadcaster;
use super::ledger::ZoneLedger;
use super::reports::{self, ZoneReport};
use crate::domain::{DomainResult, RateCalendar, RepositoryProvider};
use crate::infrastructure::InMemoryRepositories;
use crate::shared::Clock;

#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Offset in which rush hours and vacation dates are interpreted
    pub utc_offset: FixedOffset,
    /// Per-client outbound queue size
    pub channel_capacity: usize,
    pub audit_history: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            utc_offset: RateCalendar::utc().offset(),
            channel_capacity: 256,
            audit_history: 500,
        }
    }
}

#[derive(Clone)]
pub struct ParkingEngine {
    pub repos: Arc<dyn RepositoryProvider>,
    pub ledger: Arc<ZoneLedger>,
    pub config: Arc<ConfigurationStore>,
    pub events: Arc<EventBroadcaster>,
    pub admission: Arc<AdmissionController>,
    pub billing: Arc<BillingEngine>,
    pub clock: Arc<dyn Clock>,
}

impl ParkingEngine {
    /// Empty engine backed by in-memory repositories.
    pub fn new(settings: EngineSettings, clock: Arc<dyn Clock>) -> Self {
        Self::with_repositories(Arc::new(InMemoryRepositories::new()), settings, clock)
    }

    pub fn with_repositories(
        repos: Arc<dyn RepositoryProvider>,
        settings: EngineSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let ledger = Arc::new(ZoneLedger::new());
        let events = Arc::new(EventBroadcaster::with_capacity(settings.channel_capacity));
        let config = Arc::new(
            ConfigurationStore::new(
                RateCalendar::new(settings.utc_offset),
                ledger.clone(),
                events.clone(),
                clock.clone(),
            )
            .with_audit_history(settings.audit_history),
        );
        let admission = Arc::new(AdmissionController::new(
            repos.clone(),
            ledger.clone(),
            config.clone(),
            events.clone(),
            clock.clone(),
        ));
        let billing = Arc::new(BillingEngine::new(
            repos.clone(),
            ledger.clone(),
            config.clone(),
            events.clone(),
            clock.clone(),
        ));

        Self {
            repos,
            ledger,
            config,
            events,
            admission,
            billing,
            clock,
        }
    }

    pub async fn parking_state(&self) -> DomainResult<Vec<ZoneReport>> {
        let subscriptions = self.repos.subscriptions().find_all().await?;
        Ok(reports::parking_state(
            &self.ledger.list(),
            &subscriptions,
            self.clock.now(),
        ))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::admission::CheckInRequest;
    use crate::application::events::Topic;
    use crate::application::seed::SeedData;
    use crate::domain::{
        CurrentCheckin, DomainError, Gate, GateRepository, Rates, Subscription,
        SubscriptionRepository, Ticket, TicketRepository, TicketType, UserRepository, Zone,
    };
    use crate::shared::ManualClock;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicBool, Ordering};

    const SEED: &str = r#"{
        "categories": [
            {"id": "cat_regular", "name": "Regular", "rateNormal": 5, "rateSpecial": 10},
            {"id": "cat_premium", "name": "Premium", "rateNormal": 8, "rateSpecial": 16}
        ],
        "gates": [
            {"id": "gate_1", "name": "Main", "zoneIds": ["zone_a", "zone_b"]},
            {"id": "gate_2", "name": "East", "zoneIds": ["zone_p"]}
        ],
        "zones": [
            {"id": "zone_a", "name": "A", "categoryId": "cat_regular", "gateIds": ["gate_1"],
             "totalSlots": 10, "occupied": 9, "reservedCapacity": 1},
            {"id": "zone_b", "name": "B", "categoryId": "cat_regular", "gateIds": ["gate_1"],
             "totalSlots": 10, "reservedCapacity": 2},
            {"id": "zone_p", "name": "P", "categoryId": "cat_premium", "gateIds": ["gate_2"],
             "totalSlots": 5}
        ],
        "subscriptions": [
            {"id": "sub_ok", "userName": "ali", "active": true, "category": "cat_regular",
             "startsAt": "2025-01-01T00:00:00Z", "expiresAt": "2026-01-01T00:00:00Z"},
            {"id": "sub_off", "userName": "omar", "active": false, "category": "cat_regular",
             "startsAt": "2025-01-01T00:00:00Z", "expiresAt": "2026-01-01T00:00:00Z"},
            {"id": "sub_old", "userName": "sara", "active": true, "category": "cat_regular",
             "startsAt": "2024-01-01T00:00:00Z", "expiresAt": "2025-01-01T00:00:00Z"}
        ],
        "rushHours": [{"weekDay": 1, "from": "07:00", "to": "09:00"}]
    }"#;

    /// Monday 2025-03-10 08:00 UTC
    fn monday_8am() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap()
    }

    async fn engine() -> (ParkingEngine, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(monday_8am()));
        let engine = ParkingEngine::new(EngineSettings::default(), clock.clone());
        let seed: SeedData = serde_json::from_str(SEED).unwrap();
        seed.apply(&engine, 4).await.unwrap();
        (engine, clock)
    }

    /// In-memory storage whose writes can be switched to fail.
    #[derive(Default)]
    struct FlakyRepositories {
        inner: InMemoryRepositories,
        fail_ticket_save: AtomicBool,
        fail_add_checkin: AtomicBool,
        fail_remove_checkin: AtomicBool,
    }

    fn storage_result(flag: &AtomicBool) -> DomainResult<()> {
        if flag.load(Ordering::SeqCst) {
            Err(DomainError::Internal("storage unavailable".into()))
        } else {
            Ok(())
        }
    }

    impl RepositoryProvider for FlakyRepositories {
        fn gates(&self) -> &dyn GateRepository {
            self.inner.gates()
        }

        fn subscriptions(&self) -> &dyn SubscriptionRepository {
            self
        }

        fn tickets(&self) -> &dyn TicketRepository {
            self
        }

        fn users(&self) -> &dyn UserRepository {
            self.inner.users()
        }
    }

    #[async_trait]
    impl SubscriptionRepository for FlakyRepositories {
        async fn find_by_id(&self, id: &str) -> DomainResult<Option<Subscription>> {
            self.inner.subscriptions().find_by_id(id).await
        }

        async fn find_all(&self) -> DomainResult<Vec<Subscription>> {
            self.inner.subscriptions().find_all().await
        }

        async fn save(&self, subscription: Subscription) -> DomainResult<()> {
            self.inner.subscriptions().save(subscription).await
        }

        async fn add_checkin(
            &self,
            subscription_id: &str,
            checkin: CurrentCheckin,
        ) -> DomainResult<()> {
            storage_result(&self.fail_add_checkin)?;
            self.inner
                .subscriptions()
                .add_checkin(subscription_id, checkin)
                .await
        }

        async fn remove_checkin(
            &self,
            subscription_id: &str,
            ticket_id: &str,
        ) -> DomainResult<bool> {
            storage_result(&self.fail_remove_checkin)?;
            self.inner
                .subscriptions()
                .remove_checkin(subscription_id, ticket_id)
                .await
        }
    }

    #[async_trait]
    impl TicketRepository for FlakyRepositories {
        async fn find_by_id(&self, id: &str) -> DomainResult<Option<Ticket>> {
            self.inner.tickets().find_by_id(id).await
        }

        async fn find_open(&self) -> DomainResult<Vec<Ticket>> {
            self.inner.tickets().find_open().await
        }

        async fn save(&self, ticket: Ticket) -> DomainResult<()> {
            storage_result(&self.fail_ticket_save)?;
            self.inner.tickets().save(ticket).await
        }

        async fn mark_checked_out(&self, id: &str, at: DateTime<Utc>) -> DomainResult<Ticket> {
            self.inner.tickets().mark_checked_out(id, at).await
        }

        async fn reopen(&self, id: &str) -> DomainResult<()> {
            self.inner.tickets().reopen(id).await
        }

        async fn delete(&self, id: &str) -> DomainResult<()> {
            self.inner.tickets().delete(id).await
        }
    }

    async fn flaky_engine() -> (ParkingEngine, Arc<FlakyRepositories>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(monday_8am()));
        let repos = Arc::new(FlakyRepositories::default());
        let engine = ParkingEngine::with_repositories(
            repos.clone(),
            EngineSettings::default(),
            clock.clone(),
        );
        let seed: SeedData = serde_json::from_str(SEED).unwrap();
        seed.apply(&engine, 4).await.unwrap();
        (engine, repos, clock)
    }

    fn request(zone: &str, ticket_type: TicketType, sub: Option<&str>) -> CheckInRequest {
        CheckInRequest {
            gate_id: "gate_1".into(),
            zone_id: zone.into(),
            ticket_type,
            subscription_id: sub.map(String::from),
        }
    }

    fn assert_invariants(z: &Zone) {
        assert_eq!(z.occupied + z.free(), z.total_slots);
        assert!(z.reserved <= z.free());
    }

    #[tokio::test]
    async fn last_reserved_slot_goes_to_subscriber_only() {
        let (engine, _) = engine().await;

        let err = engine
            .admission
            .check_in(request("zone_a", TicketType::Visitor, None))
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::ZoneFull("zone_a".into()));

        let outcome = engine
            .admission
            .check_in(request("zone_a", TicketType::Subscriber, Some("sub_ok")))
            .await
            .unwrap();
        assert_eq!(outcome.zone_state.occupied, 10);
        assert_eq!(outcome.zone_state.reserved, 0);
        assert_eq!(outcome.ticket.subscription_id.as_deref(), Some("sub_ok"));

        let sub = engine.repos.subscriptions().find_by_id("sub_ok").await.unwrap().unwrap();
        assert_eq!(sub.current_checkins.len(), 1);
        assert_eq!(sub.current_checkins[0].ticket_id, outcome.ticket.id);
    }

    #[tokio::test]
    async fn subscriber_full_while_visitors_still_admitted() {
        let (engine, _) = engine().await;
        for _ in 0..2 {
            engine
                .admission
                .check_in(request("zone_b", TicketType::Subscriber, Some("sub_ok")))
                .await
                .unwrap();
        }
        let zone = engine.ledger.snapshot("zone_b").unwrap();
        assert_eq!(zone.available_for_subscribers(), 0);
        assert!(zone.available_for_visitors() > 0);

        let err = engine
            .admission
            .check_in(request("zone_b", TicketType::Subscriber, Some("sub_ok")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "zone_full");
        engine
            .admission
            .check_in(request("zone_b", TicketType::Visitor, None))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejections_leave_state_untouched() {
        let (engine, _) = engine().await;
        let before = engine.ledger.snapshot("zone_b").unwrap();

        let cases = [
            (request("zone_p", TicketType::Visitor, None), "gate_zone_mismatch"),
            (request("zone_x", TicketType::Visitor, None), "not_found"),
            (request("zone_b", TicketType::Subscriber, None), "validation"),
            (request("zone_b", TicketType::Subscriber, Some("sub_nope")), "not_found"),
            (request("zone_b", TicketType::Subscriber, Some("sub_off")), "subscription_ineligible"),
            (request("zone_b", TicketType::Subscriber, Some("sub_old")), "subscription_ineligible"),
        ];
        for (req, kind) in cases {
            let err = engine.admission.check_in(req).await.unwrap_err();
            assert_eq!(err.kind(), kind, "{err}");
        }

        let mut unknown_gate = request("zone_b", TicketType::Visitor, None);
        unknown_gate.gate_id = "gate_9".into();
        assert_eq!(
            engine.admission.check_in(unknown_gate).await.unwrap_err().kind(),
            "not_found"
        );

        engine.config.set_zone_open("zone_b", false, None).unwrap();
        let err = engine
            .admission
            .check_in(request("zone_b", TicketType::Visitor, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "zone_closed");

        let after = engine.ledger.snapshot("zone_b").unwrap();
        assert_eq!((after.occupied, after.reserved), (before.occupied, before.reserved));
        assert!(engine.repos.tickets().find_open().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn category_mismatch_is_ineligible() {
        let (engine, _) = engine().await;
        let mut req = request("zone_p", TicketType::Subscriber, Some("sub_ok"));
        req.gate_id = "gate_2".into();
        let err = engine.admission.check_in(req).await.unwrap_err();
        assert!(matches!(err, DomainError::SubscriptionIneligible { .. }));
    }

    #[tokio::test]
    async fn checkout_across_rush_hour_end() {
        let (engine, clock) = engine().await;
        let ticket = engine
            .admission
            .check_in(request("zone_b", TicketType::Visitor, None))
            .await
            .unwrap()
            .ticket;

        clock.advance(Duration::hours(2));
        let result = engine.billing.check_out(&ticket.id, false).await.unwrap();

        assert_eq!(result.breakdown.len(), 2);
        assert_eq!(result.breakdown[0].amount, Decimal::from(10));
        assert_eq!(result.breakdown[0].to, monday_8am() + Duration::hours(1));
        assert_eq!(result.breakdown[1].amount, Decimal::from(5));
        assert_eq!(result.amount, Decimal::from(15));
        assert_eq!(result.duration_hours, Decimal::from(2));
        assert_eq!(result.zone_state.occupied, 0);
        assert_eq!(result.billed_as, TicketType::Visitor);

        let stored = engine.repos.tickets().find_by_id(&ticket.id).await.unwrap().unwrap();
        assert_eq!(stored.checkout_at, Some(result.checkout_at));
    }

    #[tokio::test]
    async fn second_checkout_is_rejected_without_ledger_change() {
        let (engine, clock) = engine().await;
        let ticket = engine
            .admission
            .check_in(request("zone_b", TicketType::Visitor, None))
            .await
            .unwrap()
            .ticket;
        engine
            .admission
            .check_in(request("zone_b", TicketType::Visitor, None))
            .await
            .unwrap();
        clock.advance(Duration::minutes(30));

        engine.billing.check_out(&ticket.id, false).await.unwrap();
        let between = engine.ledger.snapshot("zone_b").unwrap();
        let err = engine.billing.check_out(&ticket.id, false).await.unwrap_err();
        assert_eq!(err, DomainError::AlreadyCheckedOut(ticket.id.clone()));
        assert_eq!(engine.ledger.snapshot("zone_b").unwrap(), between);

        assert_eq!(
            engine.billing.check_out("t_missing", false).await.unwrap_err().kind(),
            "not_found"
        );
    }

    #[tokio::test]
    async fn forced_conversion_bills_visitor_rates_and_returns_reserved_slot() {
        let (engine, clock) = engine().await;
        let ticket = engine
            .admission
            .check_in(request("zone_a", TicketType::Subscriber, Some("sub_ok")))
            .await
            .unwrap()
            .ticket;
        clock.advance(Duration::hours(2));

        let result = engine.billing.check_out(&ticket.id, true).await.unwrap();
        assert_eq!(result.billed_as, TicketType::Visitor);
        assert_eq!(result.amount, Decimal::from(15));

        let zone = engine.ledger.snapshot("zone_a").unwrap();
        assert_eq!((zone.occupied, zone.reserved), (9, 1));
        assert_invariants(&zone);

        let sub = engine.repos.subscriptions().find_by_id("sub_ok").await.unwrap().unwrap();
        assert!(sub.current_checkins.is_empty());
    }

    #[tokio::test]
    async fn gate_clients_see_zone_and_ticket_updates() {
        let (engine, clock) = engine().await;
        let (client, mut rx) = engine.events.register();
        engine.events.subscribe(client, Topic::Gate("gate_1".into()));

        let ticket = engine
            .admission
            .check_in(request("zone_b", TicketType::Visitor, None))
            .await
            .unwrap()
            .ticket;
        let msg = rx.recv().await.unwrap();
        assert!(msg.contains("\"zone-update\""));
        assert!(msg.contains("\"occupied\":1"));

        clock.advance(Duration::minutes(10));
        engine.billing.check_out(&ticket.id, false).await.unwrap();
        assert!(rx.recv().await.unwrap().contains("\"ticket-update\""));
        let zone_msg = rx.recv().await.unwrap();
        assert!(zone_msg.contains("\"occupied\":0"));
    }

    #[tokio::test]
    async fn concurrent_checkins_respect_capacity() {
        let (engine, _) = engine().await;
        let mut handles = Vec::new();
        for _ in 0..25 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                engine
                    .admission
                    .check_in(request("zone_b", TicketType::Visitor, None))
                    .await
            }));
        }
        let mut admitted = 0;
        for h in handles {
            if h.await.unwrap().is_ok() {
                admitted += 1;
            }
        }
        // 10 slots, 2 held for subscribers
        assert_eq!(admitted, 8);
        let zone = engine.ledger.snapshot("zone_b").unwrap();
        assert_invariants(&zone);
        assert_eq!(engine.repos.tickets().find_open().await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn parking_state_counts_subscribers() {
        let (engine, _) = engine().await;
        let report = engine.parking_state().await.unwrap();
        let zone_b = report.iter().find(|r| r.zone_id == "zone_b").unwrap();
        assert_eq!(zone_b.subscriber_count, 1);
        let zone_p = report.iter().find(|r| r.zone_id == "zone_p").unwrap();
        assert_eq!(zone_p.subscriber_count, 0);
    }

    #[tokio::test]
    async fn failed_ticket_save_returns_the_slot() {
        let (engine, repos, _) = flaky_engine().await;
        let before = engine.ledger.snapshot("zone_b").unwrap();
        repos.fail_ticket_save.store(true, Ordering::SeqCst);

        let err = engine
            .admission
            .check_in(request("zone_b", TicketType::Visitor, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "internal");

        let after = engine.ledger.snapshot("zone_b").unwrap();
        assert_eq!((after.occupied, after.reserved), (before.occupied, before.reserved));
        assert_invariants(&after);
        assert!(engine.repos.tickets().find_open().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_checkin_record_discards_ticket_and_slot() {
        let (engine, repos, _) = flaky_engine().await;
        repos.fail_add_checkin.store(true, Ordering::SeqCst);

        let err = engine
            .admission
            .check_in(request("zone_a", TicketType::Subscriber, Some("sub_ok")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "internal");

        let zone = engine.ledger.snapshot("zone_a").unwrap();
        assert_eq!((zone.occupied, zone.reserved), (9, 1));
        assert_invariants(&zone);
        assert!(engine.repos.tickets().find_open().await.unwrap().is_empty());
        let sub = engine.repos.subscriptions().find_by_id("sub_ok").await.unwrap().unwrap();
        assert!(sub.current_checkins.is_empty());
    }

    #[tokio::test]
    async fn failed_checkin_clear_rolls_back_checkout() {
        let (engine, repos, clock) = flaky_engine().await;
        let ticket = engine
            .admission
            .check_in(request("zone_b", TicketType::Subscriber, Some("sub_ok")))
            .await
            .unwrap()
            .ticket;
        let parked = engine.ledger.snapshot("zone_b").unwrap();
        clock.advance(Duration::hours(1));
        repos.fail_remove_checkin.store(true, Ordering::SeqCst);

        let err = engine.billing.check_out(&ticket.id, false).await.unwrap_err();
        assert_eq!(err.kind(), "internal");

        let stored = engine.repos.tickets().find_by_id(&ticket.id).await.unwrap().unwrap();
        assert!(stored.is_open());
        assert_eq!(engine.ledger.snapshot("zone_b").unwrap(), parked);
        let sub = engine.repos.subscriptions().find_by_id("sub_ok").await.unwrap().unwrap();
        assert_eq!(sub.current_checkins.len(), 1);

        repos.fail_remove_checkin.store(false, Ordering::SeqCst);
        let result = engine.billing.check_out(&ticket.id, false).await.unwrap();
        assert_eq!(result.zone_state.occupied, 0);
        let sub = engine.repos.subscriptions().find_by_id("sub_ok").await.unwrap().unwrap();
        assert!(sub.current_checkins.is_empty());
    }

    #[tokio::test]
    async fn failed_slot_release_reopens_ticket_and_restores_checkin() {
        let (engine, _) = engine().await;
        // Ticket present in storage without a matching ledger reservation.
        let ticket = Ticket::new(
            TicketType::Subscriber,
            "zone_b",
            "gate_1",
            Some("sub_ok".into()),
            monday_8am(),
        );
        engine.repos.tickets().save(ticket.clone()).await.unwrap();
        engine
            .repos
            .subscriptions()
            .add_checkin(
                "sub_ok",
                CurrentCheckin {
                    ticket_id: ticket.id.clone(),
                    zone_id: "zone_b".into(),
                    checkin_at: ticket.checkin_at,
                },
            )
            .await
            .unwrap();
        let before = engine.ledger.snapshot("zone_b").unwrap();

        let err = engine.billing.check_out(&ticket.id, false).await.unwrap_err();
        assert_eq!(err.kind(), "internal");

        let stored = engine.repos.tickets().find_by_id(&ticket.id).await.unwrap().unwrap();
        assert!(stored.is_open());
        assert_eq!(engine.ledger.snapshot("zone_b").unwrap(), before);
        let sub = engine.repos.subscriptions().find_by_id("sub_ok").await.unwrap().unwrap();
        assert_eq!(sub.current_checkins.len(), 1);
        assert_eq!(sub.current_checkins[0].ticket_id, ticket.id);
    }

    #[tokio::test]
    async fn entry_gate_receives_zone_update_even_if_zone_omits_it() {
        let (engine, clock) = engine().await;
        engine
            .repos
            .gates()
            .save(Gate {
                id: "gate_3".into(),
                name: "Side".into(),
                zone_ids: vec!["zone_b".into()],
                location: String::new(),
            })
            .await
            .unwrap();
        let (client, mut rx) = engine.events.register();
        engine.events.subscribe(client, Topic::Gate("gate_3".into()));

        let mut req = request("zone_b", TicketType::Visitor, None);
        req.gate_id = "gate_3".into();
        let ticket = engine.admission.check_in(req).await.unwrap().ticket;
        let msg = rx.recv().await.unwrap();
        assert!(msg.contains("\"zone-update\""), "{msg}");
        assert!(msg.contains("\"occupied\":1"), "{msg}");

        clock.advance(Duration::minutes(5));
        engine.billing.check_out(&ticket.id, false).await.unwrap();
        assert!(rx.recv().await.unwrap().contains("\"ticket-update\""));
        let zone_msg = rx.recv().await.unwrap();
        assert!(zone_msg.contains("\"zone-update\""), "{zone_msg}");
        assert!(zone_msg.contains("\"occupied\":0"), "{zone_msg}");
    }

    #[tokio::test]
    async fn oversized_rate_is_rejected_and_checkout_still_works() {
        let (engine, clock) = engine().await;
        let ticket = engine
            .admission
            .check_in(request("zone_b", TicketType::Visitor, None))
            .await
            .unwrap()
            .ticket;

        let huge: Decimal = "70000000000000000000000000000".parse().unwrap();
        let err = engine
            .config
            .update_rates("cat_regular", Rates::new(huge, huge), None)
            .unwrap_err();
        match err {
            DomainError::Validation { fields, .. } => {
                assert!(fields.contains_key("rateNormal"));
                assert!(fields.contains_key("rateSpecial"));
            }
            other => panic!("unexpected: {other:?}"),
        }

        clock.advance(Duration::hours(2));
        let result = engine.billing.check_out(&ticket.id, false).await.unwrap();
        assert_eq!(result.amount, Decimal::from(15));
        assert_eq!(result.zone_state.occupied, 0);
    }
}
