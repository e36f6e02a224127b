//! Installment calendar generation
//!
//! This module turns a start date, a payment cadence, and an installment
//! count into an ordered sequence of due dates. Generation is pure: the same
//! inputs always produce the same dates.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors related to calendar operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Unknown cadence: {0}")]
    UnknownCadence(String),
}

/// Payment cadence for an installment plan
///
/// `OneTime` and `Custom` do not auto-generate a schedule: a one-time plan
/// has exactly its start date, and a custom plan carries caller-supplied
/// dates instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    Weekly,
    Monthly,
    Quarterly,
    Biannual,
    Annual,
    OneTime,
    Custom,
}

impl Cadence {
    /// Calendar months between consecutive installments, if month-based
    pub fn months_per_step(&self) -> Option<u32> {
        match self {
            Cadence::Monthly => Some(1),
            Cadence::Quarterly => Some(3),
            Cadence::Biannual => Some(6),
            Cadence::Annual => Some(12),
            _ => None,
        }
    }

    /// Returns true if this cadence produces a recurring schedule
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Cadence::OneTime | Cadence::Custom)
    }

    pub fn code(&self) -> &'static str {
        match self {
            Cadence::Weekly => "weekly",
            Cadence::Monthly => "monthly",
            Cadence::Quarterly => "quarterly",
            Cadence::Biannual => "biannual",
            Cadence::Annual => "annual",
            Cadence::OneTime => "one_time",
            Cadence::Custom => "custom",
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Cadence {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Cadence::Weekly),
            "monthly" => Ok(Cadence::Monthly),
            "quarterly" => Ok(Cadence::Quarterly),
            "biannual" => Ok(Cadence::Biannual),
            "annual" => Ok(Cadence::Annual),
            "one_time" => Ok(Cadence::OneTime),
            "custom" => Ok(Cadence::Custom),
            other => Err(CalendarError::UnknownCadence(other.to_string())),
        }
    }
}

/// Generates `count` due dates starting at `start`, ordered earliest-first
///
/// Weekly steps add whole weeks; month-based cadences add calendar months,
/// preserving the day-of-month where possible and clamping to the last valid
/// day of shorter months (2024-01-31 + 1 month = 2024-02-29). A zero count
/// produces an empty sequence, as does the `Custom` cadence. `OneTime`
/// yields just the start date.
pub fn schedule_dates(start: NaiveDate, cadence: Cadence, count: u32) -> Vec<NaiveDate> {
    if count == 0 {
        return Vec::new();
    }

    match cadence {
        Cadence::Custom => Vec::new(),
        Cadence::OneTime => vec![start],
        Cadence::Weekly => (0..count)
            .map(|i| start + Days::new(7 * i as u64))
            .collect(),
        Cadence::Monthly | Cadence::Quarterly | Cadence::Biannual | Cadence::Annual => {
            // months_per_step is Some for every month-based cadence
            let step = cadence.months_per_step().unwrap_or(1);
            (0..count)
                .map(|i| start + Months::new(step * i))
                .collect()
        }
    }
}

/// Returns the final due date of a generated schedule, if any
pub fn schedule_end_date(start: NaiveDate, cadence: Cadence, count: u32) -> Option<NaiveDate> {
    schedule_dates(start, cadence, count).last().copied()
}
