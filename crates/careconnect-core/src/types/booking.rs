//! Booking payloads.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::availability::TimeSlot;

/// Payload handed to the booking persistence endpoint.
///
/// Built by [`build_booking_record`](crate::availability::build_booking_record);
/// field names follow the backend's appointment schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    /// Patient identifier.
    pub patid: String,
    /// Doctor identifier.
    pub docid: String,
    pub patname: String,
    pub docname: String,
    #[serde(default)]
    pub speciality: Option<String>,
    /// Date of appointment.
    pub doa: Date,
    pub date: Date,
    pub time: TimeSlot,
    pub fee: u32,
}
