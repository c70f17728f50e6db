use std::collections::BTreeMap;

use thiserror::Error;

/// Field name → validation messages, in a stable order for responses.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DomainError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation: {message}")]
    Validation { message: String, fields: FieldErrors },

    #[error("Zone {0} is closed")]
    ZoneClosed(String),

    #[error("Zone {0} has no available slots")]
    ZoneFull(String),

    #[error("Subscription {subscription_id} is not eligible: {reason}")]
    SubscriptionIneligible {
        subscription_id: String,
        reason: String,
    },

    #[error("Zone {zone_id} is not served by gate {gate_id}")]
    GateZoneMismatch { gate_id: String, zone_id: String },

    #[error("Ticket {0} is already checked out")]
    AlreadyCheckedOut(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Validation failure attributed to a single request field.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), vec![message.clone()]);
        Self::Validation {
            message: format!("{}: {}", field, message),
            fields,
        }
    }

    pub fn fields(fields: FieldErrors) -> Self {
        let message = fields
            .iter()
            .flat_map(|(field, msgs)| msgs.iter().map(move |m| format!("{}: {}", field, m)))
            .collect::<Vec<_>>()
            .join("; ");
        Self::Validation {
            message: if message.is_empty() {
                "Validation failed".to_string()
            } else {
                message
            },
            fields,
        }
    }

    /// Stable machine-readable error kind exposed to API clients.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Validation { .. } => "validation",
            Self::ZoneClosed(_) => "zone_closed",
            Self::ZoneFull(_) => "zone_full",
            Self::SubscriptionIneligible { .. } => "subscription_ineligible",
            Self::GateZoneMismatch { .. } => "gate_zone_mismatch",
            Self::AlreadyCheckedOut(_) => "already_checked_out",
            Self::Conflict(_) => "conflict",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::Internal(_) => "internal",
        }
    }

    /// Conflicts are detected after validation and leave state untouched.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::ZoneClosed(_)
                | Self::ZoneFull(_)
                | Self::SubscriptionIneligible { .. }
                | Self::GateZoneMismatch { .. }
                | Self::AlreadyCheckedOut(_)
                | Self::Conflict(_)
        )
    }
}

/// Collects per-field messages before turning them into a single error.
#[derive(Debug, Default)]
pub struct FieldErrorsBuilder {
    fields: FieldErrors,
}

impl FieldErrorsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn finish(self) -> Result<(), DomainError> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(DomainError::fields(self.fields))
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_error_carries_field_map() {
        let err = DomainError::field("rateNormal", "must not be negative");
        match err {
            DomainError::Validation { message, fields } => {
                assert_eq!(message, "rateNormal: must not be negative");
                assert_eq!(fields["rateNormal"], vec!["must not be negative"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn builder_without_messages_is_ok() {
        assert!(FieldErrorsBuilder::new().finish().is_ok());
    }

    #[test]
    fn builder_groups_messages_per_field() {
        let mut b = FieldErrorsBuilder::new();
        b.add("from", "invalid time");
        b.add("from", "required");
        b.add("weekDay", "out of range");
        let err = b.finish().unwrap_err();
        assert_eq!(err.kind(), "validation");
        if let DomainError::Validation { fields, .. } = err {
            assert_eq!(fields["from"].len(), 2);
            assert_eq!(fields["weekDay"].len(), 1);
        }
    }

    #[test]
    fn conflict_kinds() {
        assert!(DomainError::ZoneFull("z".into()).is_conflict());
        assert!(DomainError::AlreadyCheckedOut("t".into()).is_conflict());
        assert!(!DomainError::not_found("Ticket", "t").is_conflict());
        assert_eq!(DomainError::ZoneClosed("z".into()).kind(), "zone_closed");
    }
}
