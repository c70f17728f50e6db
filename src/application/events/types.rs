//! Real-time message shapes
//!
//! Server messages are `{type, payload}` objects; the `type` strings are the
//! ones the gate and admin screens listen for.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{AuditLogEntry, Ticket, TicketType, ZoneState};

/// Fan-out channel a client can subscribe to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    Gate(String),
    Admin,
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Gate(id) => write!(f, "gate:{}", id),
            Topic::Admin => f.write_str("admin"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketUpdate {
    pub ticket: Ticket,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billed_as: Option<TicketType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicAck {
    pub topic: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ServerEvent {
    ZoneUpdate(ZoneState),
    TicketUpdate(TicketUpdate),
    AdminUpdate(AuditLogEntry),
    Subscribed(TopicAck),
    Unsubscribed(TopicAck),
    Pong,
    Error(ErrorPayload),
}

impl ServerEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            ServerEvent::ZoneUpdate(_) => "zone-update",
            ServerEvent::TicketUpdate(_) => "ticket-update",
            ServerEvent::AdminUpdate(_) => "admin-update",
            ServerEvent::Subscribed(_) => "subscribed",
            ServerEvent::Unsubscribed(_) => "unsubscribed",
            ServerEvent::Pong => "pong",
            ServerEvent::Error(_) => "error",
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error(ErrorPayload {
            message: message.into(),
        })
    }
}

/// Message sent by a WebSocket client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    Subscribe { gate_id: String },
    Unsubscribe { gate_id: String },
    SubscribeAdmin,
    UnsubscribeAdmin,
    Ping,
}

#[derive(Deserialize)]
struct RawClientMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Option<RawPayload>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPayload {
    #[serde(default)]
    gate_id: Option<String>,
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Self, String> {
        let raw: RawClientMessage =
            serde_json::from_str(text).map_err(|e| format!("malformed message: {}", e))?;
        let gate_id = || {
            raw.payload
                .as_ref()
                .and_then(|p| p.gate_id.clone())
                .filter(|id| !id.trim().is_empty())
                .ok_or_else(|| format!("{} requires payload.gateId", raw.kind))
        };
        match raw.kind.as_str() {
            "subscribe" => Ok(ClientMessage::Subscribe { gate_id: gate_id()? }),
            "unsubscribe" => Ok(ClientMessage::Unsubscribe { gate_id: gate_id()? }),
            "subscribe-admin" => Ok(ClientMessage::SubscribeAdmin),
            "unsubscribe-admin" => Ok(ClientMessage::UnsubscribeAdmin),
            "ping" => Ok(ClientMessage::Ping),
            other => Err(format!("unknown message type: {}", other)),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
