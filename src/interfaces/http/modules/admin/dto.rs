//! Admin configuration DTOs

use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{Rates, UserRole};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRatesRequest {
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 5.0)]
    pub rate_normal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 10.0)]
    pub rate_special: Decimal,
}

impl UpdateRatesRequest {
    pub fn rates(&self) -> Rates {
        Rates::new(self.rate_normal, self.rate_special)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ZoneOpenRequest {
    pub open: bool,
}

/// Raw rush-hour input; parsed by the calendar so every bad field is reported.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRushHourRequest {
    /// 0 = Sunday … 6 = Saturday
    pub week_day: i64,
    #[schema(example = "07:00")]
    pub from: String,
    #[schema(example = "09:00")]
    pub to: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateVacationRequest {
    pub name: String,
    #[schema(example = "2025-12-24")]
    pub from: String,
    #[schema(example = "2025-12-26")]
    pub to: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50, message = "username must be 3 to 50 characters"))]
    pub username: String,
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 6, max = 128, message = "password must be 6 to 128 characters"))]
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
}
