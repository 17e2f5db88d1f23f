//! Availability resolution over a provider roster.
//!
//! Everything here is synchronous and stateless: callers fetch the roster,
//! pick a date and a slot, and hand the resulting [`BookingRecord`] to a
//! backend for persistence.
//!
//! [`BookingRecord`]: crate::types::BookingRecord

mod query;
mod resolver;
mod slot;

pub use query::{AvailabilityQuery, BookableSlot};
pub use resolver::{available_providers, bookable_slots, build_booking_record, weekday_of};
pub use slot::{END_HOUR, FIRST_HOUR, SLOT_MINUTES, TimeSlot, time_slots};

/// Tracing target for availability resolution.
pub const TRACING_TARGET: &str = "careconnect_core::availability";
