//! Append-only admin audit trail

pub mod model;

pub use model::AuditLogEntry;
