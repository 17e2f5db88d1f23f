//! Half-hour appointment grid.

use std::fmt;
use std::str::FromStr;

use jiff::civil::Time;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// First bookable hour (inclusive).
pub const FIRST_HOUR: u8 = 9;
/// Last bookable hour (exclusive).
pub const END_HOUR: u8 = 17;
/// Grid step in minutes.
pub const SLOT_MINUTES: u8 = 30;

/// A time of day on the 12-hour clock, e.g. `9:30 AM` or `12:00 PM`.
///
/// Ordering follows the time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TimeSlot {
    hour: u8,
    minute: u8,
}

impl TimeSlot {
    /// Creates a slot from a 24-hour time, or `None` if out of range.
    #[must_use]
    pub const fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    /// Hour on the 24-hour clock.
    #[inline]
    pub const fn hour(&self) -> u8 {
        self.hour
    }

    #[inline]
    pub const fn minute(&self) -> u8 {
        self.minute
    }

    /// Returns `true` if this slot is one of the offered grid slots.
    #[must_use]
    pub const fn is_offered(&self) -> bool {
        self.hour >= FIRST_HOUR
            && self.hour < END_HOUR
            && self.minute % SLOT_MINUTES == 0
    }

    /// Converts to a civil time of day.
    #[must_use]
    pub fn to_civil_time(&self) -> Time {
        jiff::civil::time(self.hour as i8, self.minute as i8, 0, 0)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Noon stays "12", only hours past noon are shifted.
        let hour = if self.hour > 12 { self.hour - 12 } else { self.hour };
        let suffix = if self.hour >= 12 { "PM" } else { "AM" };
        write!(f, "{hour}:{:02} {suffix}", self.minute)
    }
}

impl FromStr for TimeSlot {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let invalid = || {
            Error::validation()
                .with_message(format!("Invalid time slot '{input}'"))
                .with_context("expected a label such as '9:30 AM'")
        };

        let (clock, suffix) = input.trim().split_once(' ').ok_or_else(invalid)?;
        let (hour, minute) = clock.split_once(':').ok_or_else(invalid)?;
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        if minute >= 60 {
            return Err(invalid());
        }

        let hour = match suffix.trim() {
            "AM" if hour < 12 => hour,
            "PM" if hour == 12 => 12,
            "PM" if (1..12).contains(&hour) => hour + 12,
            _ => return Err(invalid()),
        };

        Self::new(hour, minute).ok_or_else(invalid)
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.to_string()
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Returns the offered slots: every half hour from 09:00 up to, not
/// including, 17:00.
#[must_use]
pub fn time_slots() -> Vec<TimeSlot> {
    (FIRST_HOUR..END_HOUR)
        .flat_map(|hour| {
            (0..60)
                .step_by(SLOT_MINUTES as usize)
                .map(move |minute| TimeSlot { hour, minute })
        })
        .collect()
}
