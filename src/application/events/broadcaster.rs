//! Topic-based fan-out to WebSocket clients
//!
//! Every connected client owns a bounded queue. Publishing serializes the
//! event once and `try_send`s it to each subscriber; a full queue drops the
//! message for that client only, so publishers never wait on slow sockets.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::types::{ServerEvent, TicketUpdate, Topic};
use crate::domain::{AuditLogEntry, ZoneState};

const DEFAULT_CLIENT_CAPACITY: usize = 256;

pub type ClientId = u64;

/// Serialized server message shared between all recipients.
pub type Outbound = Arc<str>;

struct ClientEntry {
    sender: mpsc::Sender<Outbound>,
    topics: HashSet<Topic>,
}

pub struct EventBroadcaster {
    clients: DashMap<ClientId, ClientEntry>,
    topics: DashMap<Topic, HashSet<ClientId>>,
    next_id: AtomicU64,
    client_capacity: usize,
}

pub type SharedBroadcaster = Arc<EventBroadcaster>;

impl EventBroadcaster {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CLIENT_CAPACITY)
    }

    pub fn with_capacity(client_capacity: usize) -> Self {
        Self {
            clients: DashMap::new(),
            topics: DashMap::new(),
            next_id: AtomicU64::new(1),
            client_capacity: client_capacity.max(1),
        }
    }

    /// Registers a connection and returns its outbound queue.
    pub fn register(&self) -> (ClientId, mpsc::Receiver<Outbound>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::channel(self.client_capacity);
        self.clients.insert(
            id,
            ClientEntry {
                sender,
                topics: HashSet::new(),
            },
        );
        metrics::gauge!("parking_ws_clients").set(self.clients.len() as f64);
        info!(client_id = id, total = self.clients.len(), "Realtime client connected");
        (id, receiver)
    }

    /// Returns `false` for an unknown (already disconnected) client.
    pub fn subscribe(&self, client: ClientId, topic: Topic) -> bool {
        match self.clients.get_mut(&client) {
            Some(mut entry) => {
                entry.topics.insert(topic.clone());
            }
            None => return false,
        }
        debug!(client_id = client, %topic, "Subscribed");
        self.topics.entry(topic).or_default().insert(client);
        true
    }

    pub fn unsubscribe(&self, client: ClientId, topic: &Topic) {
        if let Some(mut entry) = self.clients.get_mut(&client) {
            entry.topics.remove(topic);
        }
        self.remove_from_topic(client, topic);
        debug!(client_id = client, %topic, "Unsubscribed");
    }

    /// Drops the client from every topic it joined.
    pub fn disconnect(&self, client: ClientId) {
        let Some((_, entry)) = self.clients.remove(&client) else {
            return;
        };
        for topic in &entry.topics {
            self.remove_from_topic(client, topic);
        }
        metrics::gauge!("parking_ws_clients").set(self.clients.len() as f64);
        info!(
            client_id = client,
            topics = entry.topics.len(),
            remaining = self.clients.len(),
            "Realtime client disconnected"
        );
    }

    fn remove_from_topic(&self, client: ClientId, topic: &Topic) {
        let now_empty = match self.topics.get_mut(topic) {
            Some(mut members) => {
                members.remove(&client);
                members.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.topics.remove_if(topic, |_, members| members.is_empty());
        }
    }

    pub fn publish(&self, topic: Topic, event: &ServerEvent) -> usize {
        self.publish_many(&[topic], event)
    }

    /// Delivers `event` once to every client subscribed to any of `topics`.
    pub fn publish_many(&self, topics: &[Topic], event: &ServerEvent) -> usize {
        let mut recipients: HashSet<ClientId> = HashSet::new();
        for topic in topics {
            if let Some(members) = self.topics.get(topic) {
                recipients.extend(members.iter().copied());
            }
        }
        if recipients.is_empty() {
            debug!(event_type = event.event_type(), "Event published (no subscribers)");
            return 0;
        }
        let Some(message) = self.encode(event) else {
            return 0;
        };

        let delivered = recipients
            .into_iter()
            .filter(|client| self.deliver(*client, message.clone(), event.event_type()))
            .count();
        debug!(
            event_type = event.event_type(),
            subscribers = delivered,
            "Event published"
        );
        delivered
    }

    /// Sends a message to one client regardless of its topics.
    pub fn send_to(&self, client: ClientId, event: &ServerEvent) -> bool {
        match self.encode(event) {
            Some(message) => self.deliver(client, message, event.event_type()),
            None => false,
        }
    }

    pub fn zone_updated(&self, zone: &ZoneState) -> usize {
        self.publish_zone(zone, None)
    }

    /// Like [`zone_updated`](Self::zone_updated), and also reaches the gate
    /// the vehicle passed through even if the zone does not list it.
    pub fn zone_updated_via(&self, zone: &ZoneState, gate_id: &str) -> usize {
        self.publish_zone(zone, Some(gate_id))
    }

    fn publish_zone(&self, zone: &ZoneState, via_gate: Option<&str>) -> usize {
        let mut topics: Vec<Topic> = zone.gate_ids.iter().cloned().map(Topic::Gate).collect();
        if let Some(gate_id) = via_gate {
            if !zone.gate_ids.iter().any(|g| g == gate_id) {
                topics.push(Topic::Gate(gate_id.to_string()));
            }
        }
        topics.push(Topic::Admin);
        self.publish_many(&topics, &ServerEvent::ZoneUpdate(zone.clone()))
    }

    pub fn ticket_updated(&self, update: TicketUpdate) -> usize {
        let topics = [Topic::Gate(update.ticket.gate_id.clone()), Topic::Admin];
        self.publish_many(&topics, &ServerEvent::TicketUpdate(update))
    }

    pub fn admin_updated(&self, entry: &AuditLogEntry) -> usize {
        self.publish(Topic::Admin, &ServerEvent::AdminUpdate(entry.clone()))
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn subscriber_count(&self, topic: &Topic) -> usize {
        self.topics.get(topic).map(|m| m.len()).unwrap_or(0)
    }

    fn encode(&self, event: &ServerEvent) -> Option<Outbound> {
        match serde_json::to_string(event) {
            Ok(json) => Some(Arc::from(json)),
            Err(e) => {
                error!(event_type = event.event_type(), error = %e, "Failed to serialize event");
                None
            }
        }
    }

    fn deliver(&self, client: ClientId, message: Outbound, event_type: &str) -> bool {
        let Some(sender) = self.clients.get(&client).map(|c| c.sender.clone()) else {
            return false;
        };
        match sender.try_send(message) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(client_id = client, event_type, "Client queue full, dropping message");
                metrics::counter!("ws_messages_dropped_total").increment(1);
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(client_id = client, "Client queue closed");
                false
            }
        }
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ──────────────────────────────────────────────────────
