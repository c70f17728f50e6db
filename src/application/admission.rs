//! Admission Controller
//!
//! Check-in is all-or-nothing: every precondition is checked before the
//! ledger is touched, and later failures undo the steps already taken.

use std::sync::Arc;

use tracing::{info, warn};

use super::configuration::ConfigurationStore;
use super::events::EventBroadcaster;
use super::ledger::ZoneLedger;
use crate::domain::{
    CurrentCheckin, DomainError, DomainResult, RepositoryProvider, SlotKind, Ticket, TicketType,
    ZoneState,
};
use crate::shared::Clock;

#[derive(Debug, Clone)]
pub struct CheckInRequest {
    pub gate_id: String,
    pub zone_id: String,
    pub ticket_type: TicketType,
    pub subscription_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CheckInOutcome {
    pub ticket: Ticket,
    pub zone_state: ZoneState,
}

pub struct AdmissionController {
    repos: Arc<dyn RepositoryProvider>,
    ledger: Arc<ZoneLedger>,
    config: Arc<ConfigurationStore>,
    events: Arc<EventBroadcaster>,
    clock: Arc<dyn Clock>,
}

impl AdmissionController {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        ledger: Arc<ZoneLedger>,
        config: Arc<ConfigurationStore>,
        events: Arc<EventBroadcaster>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repos,
            ledger,
            config,
            events,
            clock,
        }
    }

    pub async fn check_in(&self, request: CheckInRequest) -> DomainResult<CheckInOutcome> {
        let result = self.admit(&request).await;
        match &result {
            Ok(outcome) => {
                metrics::counter!(
                    "parking_checkins_total",
                    "type" => request.ticket_type.as_str()
                )
                .increment(1);
                info!(
                    ticket_id = %outcome.ticket.id,
                    gate_id = %request.gate_id,
                    zone_id = %request.zone_id,
                    ticket_type = %request.ticket_type,
                    occupied = outcome.zone_state.occupied,
                    "Vehicle checked in"
                );
            }
            Err(e) => {
                metrics::counter!(
                    "parking_admission_rejections_total",
                    "reason" => e.kind()
                )
                .increment(1);
                warn!(
                    gate_id = %request.gate_id,
                    zone_id = %request.zone_id,
                    ticket_type = %request.ticket_type,
                    reason = e.kind(),
                    error = %e,
                    "Check-in rejected"
                );
            }
        }
        result
    }

    async fn admit(&self, request: &CheckInRequest) -> DomainResult<CheckInOutcome> {
        let now = self.clock.now();

        let gate = self
            .repos
            .gates()
            .find_by_id(&request.gate_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Gate", &request.gate_id))?;
        let zone = self.ledger.snapshot(&request.zone_id)?;
        if !gate.serves(&zone.id) {
            return Err(DomainError::GateZoneMismatch {
                gate_id: gate.id,
                zone_id: zone.id,
            });
        }
        let category = self.config.category(&zone.category_id).map_err(|_| {
            DomainError::Internal(format!(
                "zone {} references unknown category {}",
                zone.id, zone.category_id
            ))
        })?;

        let subscription_id = match request.ticket_type {
            TicketType::Visitor => None,
            TicketType::Subscriber => {
                let id = request
                    .subscription_id
                    .as_deref()
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| {
                        DomainError::field("subscriptionId", "is required for subscriber check-in")
                    })?;
                let subscription = self
                    .repos
                    .subscriptions()
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| DomainError::not_found("Subscription", id))?;
                subscription.check_eligibility(&zone.category_id, now)?;
                Some(subscription.id)
            }
        };

        let kind = request.ticket_type.slot_kind();
        let zone = self.ledger.reserve_slot(&zone.id, kind)?;

        let ticket = Ticket::new(
            request.ticket_type,
            &zone.id,
            &gate.id,
            subscription_id.clone(),
            now,
        );
        if let Err(e) = self.repos.tickets().save(ticket.clone()).await {
            self.undo_reserve(&zone.id, kind);
            return Err(e);
        }

        if let Some(subscription_id) = &subscription_id {
            let checkin = CurrentCheckin {
                ticket_id: ticket.id.clone(),
                zone_id: zone.id.clone(),
                checkin_at: ticket.checkin_at,
            };
            if let Err(e) = self
                .repos
                .subscriptions()
                .add_checkin(subscription_id, checkin)
                .await
            {
                if let Err(del) = self.repos.tickets().delete(&ticket.id).await {
                    warn!(ticket_id = %ticket.id, error = %del, "Failed to discard ticket");
                }
                self.undo_reserve(&zone.id, kind);
                return Err(e);
            }
        }

        let zone_state = zone.state(&category);
        self.events.zone_updated_via(&zone_state, &gate.id);

        Ok(CheckInOutcome { ticket, zone_state })
    }

    fn undo_reserve(&self, zone_id: &str, kind: SlotKind) {
        if let Err(e) = self.ledger.release_slot(zone_id, kind) {
            warn!(zone_id, %kind, error = %e, "Failed to roll back slot reservation");
        }
    }
}
