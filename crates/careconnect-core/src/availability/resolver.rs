use jiff::civil::Date;

use super::{BookableSlot, TRACING_TARGET, TimeSlot, time_slots};
use crate::types::{BookingRecord, Provider, UserProfile, WorkDay};
use crate::{Error, Result};

/// Maps a calendar date to its weekday label.
#[inline]
#[must_use]
pub fn weekday_of(date: Date) -> WorkDay {
    WorkDay::from(date.weekday())
}

/// Returns the providers from `roster` working on `date`, in roster order.
///
/// An unset date yields nothing, as does a provider without work days.
#[must_use]
pub fn available_providers(roster: &[Provider], date: Option<Date>) -> Vec<&Provider> {
    let Some(date) = date else {
        return Vec::new();
    };

    let day = weekday_of(date);
    let available: Vec<&Provider> = roster
        .iter()
        .filter(|provider| provider.works_on(day))
        .collect();

    tracing::debug!(
        target: TRACING_TARGET,
        %date,
        %day,
        roster = roster.len(),
        available = available.len(),
        "Resolved available providers"
    );

    available
}

/// Returns every offered slot for `provider` on `date`, or nothing if the
/// provider does not work that day.
#[must_use]
pub fn bookable_slots(provider: &Provider, date: Date) -> Vec<BookableSlot> {
    if !provider.works_on(weekday_of(date)) {
        return Vec::new();
    }

    time_slots()
        .into_iter()
        .map(|time| BookableSlot {
            provider_id: provider.id.clone(),
            date,
            time,
        })
        .collect()
}

/// Assembles the payload for the booking endpoint.
///
/// # Errors
///
/// Returns a validation error naming the first missing field.
pub fn build_booking_record(
    patient: Option<&UserProfile>,
    provider: Option<&Provider>,
    date: Option<Date>,
    time: Option<TimeSlot>,
) -> Result<BookingRecord> {
    let missing = |field: &str| {
        Error::validation()
            .with_message(format!("Missing required booking field: {field}"))
            .with_context("Please make sure all fields are filled")
    };

    let patient = patient.ok_or_else(|| missing("patient"))?;
    let provider = provider.ok_or_else(|| missing("provider"))?;
    let date = date.ok_or_else(|| missing("date"))?;
    let time = time.ok_or_else(|| missing("time"))?;

    let record = BookingRecord {
        patid: patient.uid.clone(),
        docid: provider.id.clone(),
        patname: patient.display_name(),
        docname: provider.display_name(),
        speciality: provider.speciality.clone(),
        doa: date,
        date,
        time,
        fee: provider.fee_or_default(),
    };

    tracing::debug!(
        target: TRACING_TARGET,
        patient_id = %record.patid,
        provider_id = %record.docid,
        date = %record.date,
        time = %record.time,
        fee = record.fee,
        "Built booking record"
    );

    Ok(record)
}
