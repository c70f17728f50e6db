//! In-memory repositories
//!
//! Each aggregate lives in its own `DashMap`; single-entry updates run under
//! the shard lock, which is what makes `mark_checked_out` a compare-and-set.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::{
    CurrentCheckin, DomainError, DomainResult, Gate, GateRepository, RepositoryProvider,
    Subscription, SubscriptionRepository, Ticket, TicketRepository, User, UserRepository,
};

#[derive(Default)]
pub struct InMemoryRepositories {
    gates: DashMap<String, Gate>,
    subscriptions: DashMap<String, Subscription>,
    tickets: DashMap<String, Ticket>,
    users: DashMap<String, User>,
    /// username -> user id
    usernames: DashMap<String, String>,
}

impl InMemoryRepositories {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryProvider for InMemoryRepositories {
    fn gates(&self) -> &dyn GateRepository {
        self
    }

    fn subscriptions(&self) -> &dyn SubscriptionRepository {
        self
    }

    fn tickets(&self) -> &dyn TicketRepository {
        self
    }

    fn users(&self) -> &dyn UserRepository {
        self
    }
}

// ── Gates ───────────────────────────────────────────────────────

#[async_trait]
impl GateRepository for InMemoryRepositories {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Gate>> {
        Ok(self.gates.get(id).map(|g| g.clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<Gate>> {
        let mut gates: Vec<Gate> = self.gates.iter().map(|e| e.value().clone()).collect();
        gates.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(gates)
    }

    async fn save(&self, gate: Gate) -> DomainResult<()> {
        self.gates.insert(gate.id.clone(), gate);
        Ok(())
    }
}

// ── Subscriptions ───────────────────────────────────────────────

#[async_trait]
impl SubscriptionRepository for InMemoryRepositories {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Subscription>> {
        Ok(self.subscriptions.get(id).map(|s| s.clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<Subscription>> {
        let mut subs: Vec<Subscription> = self
            .subscriptions
            .iter()
            .map(|e| e.value().clone())
            .collect();
        subs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(subs)
    }

    async fn save(&self, subscription: Subscription) -> DomainResult<()> {
        self.subscriptions
            .insert(subscription.id.clone(), subscription);
        Ok(())
    }

    async fn add_checkin(&self, subscription_id: &str, checkin: CurrentCheckin) -> DomainResult<()> {
        let mut sub = self
            .subscriptions
            .get_mut(subscription_id)
            .ok_or_else(|| DomainError::not_found("Subscription", subscription_id))?;
        sub.add_checkin(checkin)
    }

    async fn remove_checkin(&self, subscription_id: &str, ticket_id: &str) -> DomainResult<bool> {
        let mut sub = self
            .subscriptions
            .get_mut(subscription_id)
            .ok_or_else(|| DomainError::not_found("Subscription", subscription_id))?;
        Ok(sub.remove_checkin(ticket_id))
    }
}

// ── Tickets ─────────────────────────────────────────────────────

#[async_trait]
impl TicketRepository for InMemoryRepositories {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Ticket>> {
        Ok(self.tickets.get(id).map(|t| t.clone()))
    }

    async fn find_open(&self) -> DomainResult<Vec<Ticket>> {
        let mut open: Vec<Ticket> = self
            .tickets
            .iter()
            .filter(|e| e.value().is_open())
            .map(|e| e.value().clone())
            .collect();
        open.sort_by_key(|t| t.checkin_at);
        Ok(open)
    }

    async fn save(&self, ticket: Ticket) -> DomainResult<()> {
        match self.tickets.entry(ticket.id.clone()) {
            Entry::Occupied(_) => Err(DomainError::Conflict(format!("ticket {}", ticket.id))),
            Entry::Vacant(slot) => {
                slot.insert(ticket);
                Ok(())
            }
        }
    }

    async fn mark_checked_out(&self, id: &str, at: DateTime<Utc>) -> DomainResult<Ticket> {
        let mut ticket = self
            .tickets
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("Ticket", id))?;
        ticket.check_out(at)?;
        Ok(ticket.clone())
    }

    async fn reopen(&self, id: &str) -> DomainResult<()> {
        let mut ticket = self
            .tickets
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("Ticket", id))?;
        ticket.checkout_at = None;
        Ok(())
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.tickets
            .remove(id)
            .ok_or_else(|| DomainError::not_found("Ticket", id))?;
        Ok(())
    }
}

// ── Users ───────────────────────────────────────────────────────

#[async_trait]
impl UserRepository for InMemoryRepositories {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self.users.get(id).map(|u| u.clone()))
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let Some(id) = self.usernames.get(username).map(|id| id.clone()) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<User>> {
        let mut users: Vec<User> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn create(&self, user: User) -> DomainResult<()> {
        match self.usernames.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(DomainError::Conflict(format!(
                "username {} is taken",
                user.username
            ))),
            Entry::Vacant(slot) => {
                slot.insert(user.id.clone());
                self.users.insert(user.id.clone(), user);
                Ok(())
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
