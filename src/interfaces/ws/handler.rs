//! WebSocket endpoint for gate screens and the admin console
//!
//! A connection starts with no subscriptions. Clients join `gate:{id}` or
//! `admin` topics with `subscribe` / `subscribe-admin` messages and receive
//! `zone-update`, `ticket-update` and `admin-update` events from then on.
//! Replies (acks, `pong`, `error`) go through the same per-client queue as
//! events, so a client sees them in order.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::select;
use tracing::{debug, info, warn};

use crate::application::events::{ClientId, ClientMessage, EventBroadcaster, ServerEvent, Topic, TopicAck};
use crate::shared::ShutdownSignal;

/// State for the realtime WebSocket handler
#[derive(Clone)]
pub struct RealtimeState {
    pub events: Arc<EventBroadcaster>,
    pub shutdown: ShutdownSignal,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<RealtimeState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: RealtimeState) {
    let (mut sender, mut receiver) = socket.split();
    let (client_id, mut outbound) = state.events.register();

    loop {
        select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_client_message(&state.events, client_id, text.as_str());
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = sender.send(Message::Pong(data)).await {
                            warn!(client_id, "Failed to send pong: {}", e);
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        debug!(client_id, "Client sent close");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(client_id, "WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }

            message = outbound.recv() => {
                let Some(message) = message else {
                    break;
                };
                if let Err(e) = sender.send(Message::Text(message.as_ref().into())).await {
                    warn!(client_id, "Failed to send event: {}", e);
                    break;
                }
            }

            _ = state.shutdown.wait() => {
                info!(client_id, "Closing WebSocket for shutdown");
                let _ = sender.send(Message::Close(None)).await;
                break;
            }
        }
    }

    state.events.disconnect(client_id);
}

fn handle_client_message(events: &EventBroadcaster, client_id: ClientId, text: &str) {
    let reply = match ClientMessage::parse(text) {
        Ok(ClientMessage::Subscribe { gate_id }) => {
            let topic = Topic::Gate(gate_id);
            events.subscribe(client_id, topic.clone());
            ServerEvent::Subscribed(ack(&topic))
        }
        Ok(ClientMessage::Unsubscribe { gate_id }) => {
            let topic = Topic::Gate(gate_id);
            events.unsubscribe(client_id, &topic);
            ServerEvent::Unsubscribed(ack(&topic))
        }
        Ok(ClientMessage::SubscribeAdmin) => {
            events.subscribe(client_id, Topic::Admin);
            ServerEvent::Subscribed(ack(&Topic::Admin))
        }
        Ok(ClientMessage::UnsubscribeAdmin) => {
            events.unsubscribe(client_id, &Topic::Admin);
            ServerEvent::Unsubscribed(ack(&Topic::Admin))
        }
        Ok(ClientMessage::Ping) => ServerEvent::Pong,
        Err(reason) => {
            debug!(client_id, %reason, "Rejected client message");
            ServerEvent::error(reason)
        }
    };
    events.send_to(client_id, &reply);
}

fn ack(topic: &Topic) -> TopicAck {
    TopicAck {
        topic: topic.to_string(),
    }
}

// ── Tests ──────────────────────────────────────────────────────
