//! Provider (doctor) roster entries.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::wire::{deserialize_fee, deserialize_id};
use super::{DEFAULT_CONSULTATION_FEE, WorkDay};

/// A bookable doctor as returned by the roster endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    /// Backend user identifier.
    #[serde(rename = "uid", deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(rename = "fname", default)]
    pub first_name: String,
    #[serde(rename = "lname", default)]
    pub last_name: String,
    #[serde(default)]
    pub speciality: Option<String>,
    /// Consultation fee; `None` or `0` falls back to the platform default.
    #[serde(default, deserialize_with = "deserialize_fee")]
    pub fee: Option<u32>,
    /// Days of the week the provider accepts appointments.
    #[serde(
        rename = "workDays",
        default,
        deserialize_with = "deserialize_work_days"
    )]
    pub work_days: BTreeSet<WorkDay>,
}

impl Provider {
    /// Creates a provider with no name, speciality, fee or work days.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            first_name: String::new(),
            last_name: String::new(),
            speciality: None,
            fee: None,
            work_days: BTreeSet::new(),
        }
    }

    /// Sets the provider's name.
    #[must_use]
    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    /// Sets the provider's speciality.
    #[must_use]
    pub fn with_speciality(mut self, speciality: impl Into<String>) -> Self {
        self.speciality = Some(speciality.into());
        self
    }

    /// Sets the consultation fee.
    #[must_use]
    pub fn with_fee(mut self, fee: u32) -> Self {
        self.fee = Some(fee);
        self
    }

    /// Sets the weekly availability.
    #[must_use]
    pub fn with_work_days(mut self, days: impl IntoIterator<Item = WorkDay>) -> Self {
        self.work_days = days.into_iter().collect();
        self
    }

    /// Returns `true` if the provider works on the given day.
    #[inline]
    #[must_use]
    pub fn works_on(&self, day: WorkDay) -> bool {
        self.work_days.contains(&day)
    }

    /// Returns the effective consultation fee.
    #[must_use]
    pub fn fee_or_default(&self) -> u32 {
        self.fee
            .filter(|fee| *fee > 0)
            .unwrap_or(DEFAULT_CONSULTATION_FEE)
    }

    /// Returns the name shown to patients, e.g. `Dr. Jane Doe`.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("Dr. {} {}", self.first_name, self.last_name)
            .trim_end()
            .to_owned()
    }
}

/// Unknown labels are dropped; a missing or null list is empty.
fn deserialize_work_days<'de, D>(deserializer: D) -> Result<BTreeSet<WorkDay>, D::Error>
where
    D: Deserializer<'de>,
{
    let labels = Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(labels
        .iter()
        .filter_map(|label| WorkDay::from_str(label).ok())
        .collect())
}
