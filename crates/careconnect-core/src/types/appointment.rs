//! Appointments as listed by the backend.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use super::wire::{deserialize_fee, deserialize_id, deserialize_optional_id};

/// Lifecycle state derived from the backend's `cancel`/`completed` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display)]
#[strum(serialize_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

/// An appointment record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(deserialize_with = "deserialize_id")]
    pub aptid: String,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub patid: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub docid: Option<String>,
    #[serde(default)]
    pub patname: Option<String>,
    #[serde(default)]
    pub docname: Option<String>,
    #[serde(default)]
    pub speciality: Option<String>,
    /// Calendar date as stored by the backend.
    #[serde(default)]
    pub date: Option<String>,
    /// Time slot label as stored by the backend.
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "deserialize_fee")]
    pub fee: Option<u32>,
    #[serde(default)]
    pub cancel: bool,
    #[serde(default)]
    pub completed: bool,
    /// Set once the patient has left a review.
    #[serde(default)]
    pub feedback: bool,
    #[serde(default)]
    pub review: Option<String>,
    /// Star rating, 1 to 5.
    #[serde(default)]
    pub rating: Option<u8>,
}

impl Appointment {
    /// Returns the lifecycle state; a cancelled flag wins over completed.
    #[must_use]
    pub fn status(&self) -> AppointmentStatus {
        if self.cancel {
            AppointmentStatus::Cancelled
        } else if self.completed {
            AppointmentStatus::Completed
        } else {
            AppointmentStatus::Scheduled
        }
    }

    /// Only scheduled appointments can be cancelled.
    #[must_use]
    pub fn is_cancellable(&self) -> bool {
        self.status() == AppointmentStatus::Scheduled
    }

    /// Completed appointments without a review yet can be reviewed.
    #[must_use]
    pub fn awaits_feedback(&self) -> bool {
        self.status() == AppointmentStatus::Completed && !self.feedback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appointment(cancel: bool, completed: bool) -> Appointment {
        serde_json::from_value(serde_json::json!({
            "aptid": "apt-1",
            "docname": "Dr. Jane Doe",
            "date": "2024-05-01",
            "time": "9:00 AM",
            "cancel": cancel,
            "completed": completed
        }))
        .unwrap()
    }

    #[test]
    fn test_status() {
        assert_eq!(appointment(false, false).status(), AppointmentStatus::Scheduled);
        assert_eq!(appointment(false, true).status(), AppointmentStatus::Completed);
        assert_eq!(appointment(true, false).status(), AppointmentStatus::Cancelled);
        assert_eq!(appointment(true, true).status(), AppointmentStatus::Cancelled);
    }

    #[test]
    fn test_is_cancellable() {
        assert!(appointment(false, false).is_cancellable());
        assert!(!appointment(false, true).is_cancellable());
        assert!(!appointment(true, false).is_cancellable());
    }

    #[test]
    fn test_awaits_feedback() {
        assert!(appointment(false, true).awaits_feedback());
        assert!(!appointment(false, false).awaits_feedback());
        assert!(!appointment(true, true).awaits_feedback());

        let reviewed = Appointment {
            feedback: true,
            review: Some("Very thorough".into()),
            rating: Some(5),
            ..appointment(false, true)
        };
        assert!(!reviewed.awaits_feedback());
    }

    #[test]
    fn test_numeric_ids_and_string_fee() {
        let appointment: Appointment = serde_json::from_value(serde_json::json!({
            "aptid": 101,
            "patid": 7,
            "docid": "doc-3",
            "fee": "800"
        }))
        .unwrap();

        assert_eq!(appointment.aptid, "101");
        assert_eq!(appointment.patid.as_deref(), Some("7"));
        assert_eq!(appointment.docid.as_deref(), Some("doc-3"));
        assert_eq!(appointment.fee, Some(800));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(AppointmentStatus::Cancelled.to_string(), "cancelled");
    }
}
