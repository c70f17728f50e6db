//! Pricing / eligibility category

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::{DomainError, FieldErrorsBuilder};

/// Pricing class shared by zones and subscriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Hourly rate outside rush hours and vacations
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub rate_normal: Decimal,
    /// Hourly rate during rush hours and vacations
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub rate_special: Decimal,
}

/// Upper bound for any hourly rate; keeps checkout arithmetic in range.
pub const MAX_HOURLY_RATE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Adds a field error when `rate` is negative or above [`MAX_HOURLY_RATE`].
pub fn check_rate(errors: &mut FieldErrorsBuilder, field: &str, rate: Decimal) {
    if rate < Decimal::ZERO {
        errors.add(field, "must not be negative");
    } else if rate > MAX_HOURLY_RATE {
        errors.add(field, format!("must not exceed {}", MAX_HOURLY_RATE));
    }
}

/// Normal/special hourly rate pair applied to one parking stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rates {
    pub normal: Decimal,
    pub special: Decimal,
}

impl Rates {
    pub fn new(normal: Decimal, special: Decimal) -> Self {
        Self { normal, special }
    }

    /// Both rates must lie within `0..=MAX_HOURLY_RATE`.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = FieldErrorsBuilder::new();
        check_rate(&mut errors, "rateNormal", self.normal);
        check_rate(&mut errors, "rateSpecial", self.special);
        errors.finish()
    }
}

impl Category {
    pub fn rates(&self) -> Rates {
        Rates::new(self.rate_normal, self.rate_special)
    }

    pub fn set_rates(&mut self, rates: Rates) -> Result<(), DomainError> {
        rates.validate()?;
        self.rate_normal = rates.normal;
        self.rate_special = rates.special;
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────
