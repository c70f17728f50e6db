//! Billing Engine
//!
//! Pricing is computed from a calendar snapshot before anything is written.
//! The checkout stamp is a compare-and-set on the ticket, so of two racing
//! checkouts only one reaches the ledger. Steps after the stamp (clearing the
//! subscription check-in, releasing the slot) are undone in reverse order when
//! a later one fails.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use super::configuration::ConfigurationStore;
use super::events::{EventBroadcaster, TicketUpdate};
use super::ledger::ZoneLedger;
use crate::domain::{
    CurrentCheckin, DomainError, DomainResult, RateMode, RateSpan, Rates, RepositoryProvider,
    Ticket, TicketType, ZoneState,
};
use crate::shared::Clock;

const MILLIS_PER_HOUR: i64 = 3_600_000;

/// One priced constant-rate part of a stay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillingSegment {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub hours: Decimal,
    pub rate_mode: RateMode,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub amount: Decimal,
}

impl BillingSegment {
    fn price(span: &RateSpan, rates: Rates) -> DomainResult<Self> {
        let millis = span.duration().num_milliseconds().max(0);
        let hours = Decimal::from(millis) / Decimal::from(MILLIS_PER_HOUR);
        let rate = match span.mode {
            RateMode::Normal => rates.normal,
            RateMode::Special => rates.special,
        };
        let amount = hours
            .checked_mul(rate)
            .ok_or_else(|| overflow("segment amount"))?
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        Ok(Self {
            from: span.from,
            to: span.to,
            hours,
            rate_mode: span.mode,
            rate,
            amount,
        })
    }
}

/// Priced breakdown of a stay; totals are exact sums of the segments.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub segments: Vec<BillingSegment>,
    pub duration_hours: Decimal,
    pub amount: Decimal,
}

impl Invoice {
    pub fn from_spans(spans: &[RateSpan], rates: Rates) -> DomainResult<Self> {
        let segments = spans
            .iter()
            .map(|s| BillingSegment::price(s, rates))
            .collect::<DomainResult<Vec<_>>>()?;
        let mut duration_hours = Decimal::ZERO;
        let mut amount = Decimal::ZERO;
        for segment in &segments {
            duration_hours = duration_hours
                .checked_add(segment.hours)
                .ok_or_else(|| overflow("duration"))?;
            amount = amount
                .checked_add(segment.amount)
                .ok_or_else(|| overflow("total amount"))?;
        }
        Ok(Self {
            segments,
            duration_hours,
            amount,
        })
    }
}

fn overflow(what: &str) -> DomainError {
    DomainError::Internal(format!("{} overflowed during checkout", what))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResult {
    pub ticket_id: String,
    pub checkin_at: DateTime<Utc>,
    pub checkout_at: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub duration_hours: Decimal,
    pub breakdown: Vec<BillingSegment>,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub amount: Decimal,
    pub zone_state: ZoneState,
    /// Rate class actually charged; `visitor` for converted subscriber tickets
    pub billed_as: TicketType,
}

pub struct BillingEngine {
    repos: Arc<dyn RepositoryProvider>,
    ledger: Arc<ZoneLedger>,
    config: Arc<ConfigurationStore>,
    events: Arc<EventBroadcaster>,
    clock: Arc<dyn Clock>,
}

impl BillingEngine {
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

    pub async fn check_out(
        &self,
        ticket_id: &str,
        force_convert_to_visitor: bool,
    ) -> DomainResult<CheckoutResult> {
        let ticket = self
            .repos
            .tickets()
            .find_by_id(ticket_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Ticket", ticket_id))?;
        if !ticket.is_open() {
            return Err(DomainError::AlreadyCheckedOut(ticket.id));
        }

        let zone = self.ledger.snapshot(&ticket.zone_id)?;
        let category = self.config.category(&zone.category_id)?;
        let billed_as = match ticket.ticket_type {
            TicketType::Subscriber if force_convert_to_visitor => TicketType::Visitor,
            other => other,
        };
        let rates = match billed_as {
            TicketType::Visitor => zone.effective_rates(&category),
            TicketType::Subscriber => self.subscriber_rates(&ticket).await?,
        };

        let checkout_at = self.clock.now().max(ticket.checkin_at);
        let spans = self.config.calendar().segments(ticket.checkin_at, checkout_at);
        let invoice = Invoice::from_spans(&spans, rates)?;

        let closed = self
            .repos
            .tickets()
            .mark_checked_out(&ticket.id, checkout_at)
            .await?;

        let mut removed_checkin = false;
        if let Some(subscription_id) = &closed.subscription_id {
            match self
                .repos
                .subscriptions()
                .remove_checkin(subscription_id, &closed.id)
                .await
            {
                Ok(true) => removed_checkin = true,
                Ok(false) => warn!(
                    ticket_id = %closed.id,
                    subscription_id = %subscription_id,
                    "No open check-in recorded for ticket"
                ),
                Err(e) => {
                    self.reopen(&closed).await;
                    return Err(e);
                }
            }
        }

        let zone = match self
            .ledger
            .release_slot(&closed.zone_id, closed.ticket_type.slot_kind())
        {
            Ok(zone) => zone,
            Err(e) => {
                if removed_checkin {
                    self.restore_checkin(&closed).await;
                }
                self.reopen(&closed).await;
                return Err(e);
            }
        };

        let zone_state = zone.state(&category);
        self.events.ticket_updated(TicketUpdate {
            ticket: closed.clone(),
            amount: Some(invoice.amount),
            billed_as: Some(billed_as),
        });
        self.events.zone_updated_via(&zone_state, &closed.gate_id);

        metrics::counter!("parking_checkouts_total", "type" => billed_as.as_str()).increment(1);
        metrics::gauge!("parking_revenue_total").increment(invoice.amount.to_f64().unwrap_or(0.0));
        info!(
            ticket_id = %closed.id,
            zone_id = %closed.zone_id,
            billed_as = %billed_as,
            duration_hours = %invoice.duration_hours.round_dp(4),
            segments = invoice.segments.len(),
            amount = %invoice.amount,
            "Vehicle checked out"
        );

        Ok(CheckoutResult {
            ticket_id: closed.id,
            checkin_at: closed.checkin_at,
            checkout_at,
            duration_hours: invoice.duration_hours,
            breakdown: invoice.segments,
            amount: invoice.amount,
            zone_state,
            billed_as,
        })
    }

    async fn reopen(&self, ticket: &Ticket) {
        if let Err(e) = self.repos.tickets().reopen(&ticket.id).await {
            warn!(ticket_id = %ticket.id, error = %e, "Failed to reopen ticket");
        }
    }

    async fn restore_checkin(&self, ticket: &Ticket) {
        let Some(subscription_id) = &ticket.subscription_id else {
            return;
        };
        let checkin = CurrentCheckin {
            ticket_id: ticket.id.clone(),
            zone_id: ticket.zone_id.clone(),
            checkin_at: ticket.checkin_at,
        };
        if let Err(e) = self
            .repos
            .subscriptions()
            .add_checkin(subscription_id, checkin)
            .await
        {
            warn!(
                ticket_id = %ticket.id,
                subscription_id = %subscription_id,
                error = %e,
                "Failed to restore subscription check-in"
            );
        }
    }

    /// Subscribers pay their subscription category's rates.
    async fn subscriber_rates(&self, ticket: &Ticket) -> DomainResult<Rates> {
        let subscription_id = ticket.subscription_id.as_deref().ok_or_else(|| {
            DomainError::Internal(format!("subscriber ticket {} has no subscription", ticket.id))
        })?;
        let subscription = self
            .repos
            .subscriptions()
            .find_by_id(subscription_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Subscription", subscription_id))?;
        Ok(self.config.category(&subscription.category_id)?.rates())
    }
}

// ── Tests ──────────────────────────────────────────────────────
