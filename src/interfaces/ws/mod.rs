//! Realtime WebSocket interface

pub mod handler;

pub use handler::{ws_handler, RealtimeState};
