//! Real-time event fan-out

pub mod broadcaster;
pub mod types;

pub use broadcaster::{ClientId, EventBroadcaster, Outbound, SharedBroadcaster};
pub use types::{ClientMessage, ServerEvent, TicketUpdate, Topic, TopicAck};
