//! Special/normal rate resolution and stay segmentation
//!
//! The calendar value can only change at a local midnight (vacation edges)
//! or at a rush-hour `from`/`to` on its weekday. Segmentation evaluates the
//! mode at each such candidate inside the stay and splits where it flips.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Timelike, Utc,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::model::{RushHour, Vacation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RateMode {
    Normal,
    Special,
}

/// Maximal interval `[from, to)` with a constant rate mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateSpan {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub mode: RateMode,
}

impl RateSpan {
    pub fn duration(&self) -> Duration {
        self.to - self.from
    }
}

#[derive(Debug, Clone)]
pub struct RateCalendar {
    rush_hours: Vec<RushHour>,
    vacations: Vec<Vacation>,
    offset: FixedOffset,
}

impl RateCalendar {
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            rush_hours: Vec::new(),
            vacations: Vec::new(),
            offset,
        }
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    pub fn with_entries(offset: FixedOffset, rush_hours: Vec<RushHour>, vacations: Vec<Vacation>) -> Self {
        Self {
            rush_hours,
            vacations,
            offset,
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn rush_hours(&self) -> &[RushHour] {
        &self.rush_hours
    }

    pub fn vacations(&self) -> &[Vacation] {
        &self.vacations
    }

    pub fn add_rush_hour(&mut self, rush_hour: RushHour) {
        self.rush_hours.push(rush_hour);
    }

    pub fn add_vacation(&mut self, vacation: Vacation) {
        self.vacations.push(vacation);
    }

    /// Vacation days and rush-hour windows each independently make an
    /// instant special.
    pub fn is_special_rate(&self, at: DateTime<Utc>) -> bool {
        let local = at.with_timezone(&self.offset);
        let date = local.date_naive();
        if self.vacations.iter().any(|v| v.contains(date)) {
            return true;
        }
        let week_day = local.weekday().num_days_from_sunday() as u8;
        let seconds = local.num_seconds_from_midnight();
        self.rush_hours.iter().any(|r| r.covers(week_day, seconds))
    }

    pub fn mode_at(&self, at: DateTime<Utc>) -> RateMode {
        if self.is_special_rate(at) {
            RateMode::Special
        } else {
            RateMode::Normal
        }
    }

    /// Splits `[start, end)` into maximal constant-mode spans.
    ///
    /// A zero-length stay yields one empty span in the mode at `start`.
    /// `end` earlier than `start` is treated as `start`.
    pub fn segments(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<RateSpan> {
        let end = end.max(start);
        let mut spans = Vec::new();
        let mut span_start = start;
        let mut mode = self.mode_at(start);

        for boundary in self.change_candidates(start, end) {
            let next = self.mode_at(boundary);
            if next != mode {
                spans.push(RateSpan {
                    from: span_start,
                    to: boundary,
                    mode,
                });
                span_start = boundary;
                mode = next;
            }
        }
        spans.push(RateSpan {
            from: span_start,
            to: end,
            mode,
        });
        spans
    }

    /// Sorted instants strictly inside `(start, end)` where the mode may flip.
    fn change_candidates(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        if start >= end || (self.rush_hours.is_empty() && self.vacations.is_empty()) {
            return Vec::new();
        }
        let first = start.with_timezone(&self.offset).date_naive();
        let last = end.with_timezone(&self.offset).date_naive();

        let mut out = Vec::new();
        for date in first.iter_days().take_while(|d| *d <= last) {
            if !self.vacations.is_empty() {
                out.push(self.local_instant(date, 0));
            }
            let week_day = date.weekday().num_days_from_sunday() as u8;
            for rush in self.rush_hours.iter().filter(|r| r.week_day == week_day) {
                out.push(self.local_instant(date, rush.from.seconds()));
                out.push(self.local_instant(date, rush.to.seconds()));
            }
        }
        out.retain(|t| start < *t && *t < end);
        out.sort();
        out.dedup();
        out
    }

    fn local_instant(&self, date: NaiveDate, seconds: u32) -> DateTime<Utc> {
        let local = date.and_time(NaiveTime::MIN) + Duration::seconds(i64::from(seconds));
        let utc = local - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        Utc.from_utc_datetime(&utc)
    }
}

// ── Tests ──────────────────────────────────────────────────────
