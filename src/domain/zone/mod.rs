//! Zone aggregate
//!
//! Slot counters are owned by the application-level zone ledger; this module
//! only holds the accounting rules applied under the ledger's per-zone lock.

pub mod model;

pub use model::{SlotKind, Zone, ZoneState};
