//! Availability queries and their computed results.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::TimeSlot;

/// Date a caller wants to book on; `None` when unset or unparseable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AvailabilityQuery {
    pub date: Option<Date>,
}

impl AvailabilityQuery {
    /// Creates a query for a known date.
    pub const fn new(date: Date) -> Self {
        Self { date: Some(date) }
    }

    /// Parses a `YYYY-MM-DD` date, leaving the query unset on bad input.
    pub fn parse(input: &str) -> Self {
        let date = input.trim().parse::<Date>().ok();
        if date.is_none() {
            tracing::debug!(
                target: super::TRACING_TARGET,
                input,
                "Unparseable availability date, treating as unset"
            );
        }
        Self { date }
    }
}

/// A candidate appointment; computed, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookableSlot {
    pub provider_id: String,
    pub date: Date,
    pub time: TimeSlot,
}
