//! Rush-hour windows and vacation ranges

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::time_of_day::TimeOfDay;
use crate::shared::{DomainError, FieldErrorsBuilder};

/// Weekly recurring special-rate window in local wall-clock time.
///
/// `week_day` counts from Sunday (0) to Saturday (6). The window covers
/// `[from, to)`; `to` may be `24:00` to run until midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RushHour {
    pub id: String,
    pub week_day: u8,
    #[schema(value_type = String, example = "07:00")]
    pub from: TimeOfDay,
    #[schema(value_type = String, example = "09:00")]
    pub to: TimeOfDay,
}

impl RushHour {
    /// Parses and validates raw admin input, reporting every bad field at once.
    pub fn parse(week_day: i64, from: &str, to: &str) -> Result<Self, DomainError> {
        let mut errors = FieldErrorsBuilder::new();
        if !(0..=6).contains(&week_day) {
            errors.add("weekDay", "must be between 0 (Sunday) and 6 (Saturday)");
        }
        let from_t = from.parse::<TimeOfDay>();
        if from_t.is_err() {
            errors.add("from", "must be a time of day in HH:MM format");
        }
        let to_t = to.parse::<TimeOfDay>();
        if to_t.is_err() {
            errors.add("to", "must be a time of day in HH:MM format");
        }
        if let (Ok(f), Ok(t)) = (&from_t, &to_t) {
            if t < f {
                errors.add("to", "must not be earlier than from");
            }
            if *f == TimeOfDay::END_OF_DAY {
                errors.add("from", "must be earlier than 24:00");
            }
        }
        errors.finish()?;

        Ok(Self {
            id: format!("rh_{}", Uuid::new_v4().simple()),
            week_day: week_day as u8,
            from: from_t.map_err(|e| DomainError::field("from", e.to_string()))?,
            to: to_t.map_err(|e| DomainError::field("to", e.to_string()))?,
        })
    }

    /// Whether `seconds` past local midnight on `week_day` lies in the window.
    pub fn covers(&self, week_day: u8, seconds: u32) -> bool {
        self.week_day == week_day && self.from.seconds() <= seconds && seconds < self.to.seconds()
    }
}

/// Date range billed at the special rate, inclusive of both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Vacation {
    pub id: String,
    pub name: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl Vacation {
    pub fn parse(name: &str, from: &str, to: &str) -> Result<Self, DomainError> {
        let mut errors = FieldErrorsBuilder::new();
        if name.trim().is_empty() {
            errors.add("name", "is required");
        }
        let from_d = NaiveDate::parse_from_str(from.trim(), "%Y-%m-%d");
        if from_d.is_err() {
            errors.add("from", "must be a date in YYYY-MM-DD format");
        }
        let to_d = NaiveDate::parse_from_str(to.trim(), "%Y-%m-%d");
        if to_d.is_err() {
            errors.add("to", "must be a date in YYYY-MM-DD format");
        }
        if let (Ok(f), Ok(t)) = (&from_d, &to_d) {
            if t < f {
                errors.add("to", "must not be earlier than from");
            }
        }
        errors.finish()?;

        Ok(Self {
            id: format!("vac_{}", Uuid::new_v4().simple()),
            name: name.trim().to_string(),
            from: from_d.map_err(|e| DomainError::field("from", e.to_string()))?,
            to: to_d.map_err(|e| DomainError::field("to", e.to_string()))?,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

// ── Tests ──────────────────────────────────────────────────────
