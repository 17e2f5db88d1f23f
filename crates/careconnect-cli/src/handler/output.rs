//! Rendering command results to stdout.

use std::io::{self, Write};

use careconnect_core::Session;
use careconnect_core::availability::TimeSlot;
use careconnect_core::types::{Appointment, Prescription, Provider, UserProfile};
use serde::Serialize;

/// Writes results as text or JSON.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Prints `value` as JSON, or the lines produced by `text`.
    pub fn emit<T>(&self, value: &T, text: impl FnOnce() -> Vec<String>) -> anyhow::Result<()>
    where
        T: Serialize + ?Sized,
    {
        let mut stdout = io::stdout().lock();
        if self.json {
            serde_json::to_writer(&mut stdout, value)?;
            writeln!(stdout)?;
        } else {
            for line in text() {
                writeln!(stdout, "{line}")?;
            }
        }
        Ok(())
    }

    /// Prints a status message, as `{"message": ...}` in JSON mode.
    pub fn message(&self, message: &str) -> anyhow::Result<()> {
        #[derive(Serialize)]
        struct Message<'a> {
            message: &'a str,
        }

        self.emit(&Message { message }, || vec![message.to_owned()])
    }
}

pub fn session_line(session: Session, profile: Option<&UserProfile>) -> String {
    match (session, profile) {
        (Session::Unauthenticated, _) => "Not signed in".to_owned(),
        (Session::Authenticated(role), Some(profile)) => {
            format!("Signed in as {} ({role})", profile.display_name())
        }
        (Session::Authenticated(role), None) => format!("Signed in ({role})"),
    }
}

pub fn slot_lines(slots: &[TimeSlot]) -> Vec<String> {
    slots.iter().map(ToString::to_string).collect()
}

pub fn provider_lines(providers: &[Provider]) -> Vec<String> {
    if providers.is_empty() {
        return vec!["No doctors available".to_owned()];
    }

    providers
        .iter()
        .map(|provider| {
            format!(
                "{:<8} {:<28} {:<20} fee {}",
                provider.id,
                provider.display_name(),
                provider.speciality.as_deref().unwrap_or("-"),
                provider.fee_or_default()
            )
        })
        .collect()
}

pub fn appointment_lines(appointments: &[Appointment]) -> Vec<String> {
    if appointments.is_empty() {
        return vec!["No appointments".to_owned()];
    }

    appointments
        .iter()
        .map(|appointment| {
            let line = format!(
                "{:<10} {:<12} {:<10} {:<28} {}",
                appointment.aptid,
                appointment.date.as_deref().unwrap_or("-"),
                appointment.time.as_deref().unwrap_or("-"),
                appointment.docname.as_deref().unwrap_or("-"),
                appointment.status()
            );

            match appointment.rating.filter(|_| appointment.feedback) {
                Some(rating) => format!("{line} ({rating}/5)"),
                None => line,
            }
        })
        .collect()
}

pub fn prescription_lines(prescriptions: &[Prescription]) -> Vec<String> {
    if prescriptions.is_empty() {
        return vec!["No prescriptions".to_owned()];
    }

    prescriptions
        .iter()
        .map(|prescription| {
            format!(
                "{:<12} {:<28} {}",
                prescription.pdate.as_deref().unwrap_or("-"),
                prescription.docname.as_deref().unwrap_or("-"),
                prescription.download_url().unwrap_or("pending")
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use careconnect_core::availability::time_slots;
    use careconnect_core::types::{Role, WorkDay};

    use super::*;

    #[test]
    fn test_session_line() {
        assert_eq!(session_line(Session::Unauthenticated, None), "Not signed in");
        assert_eq!(
            session_line(Session::Authenticated(Role::Doctor), None),
            "Signed in (Doctor)"
        );

        let profile = UserProfile::new("u1").with_name("Ada", "Lovelace");
        assert_eq!(
            session_line(Session::Authenticated(Role::Patient), Some(&profile)),
            "Signed in as Ada Lovelace (Patient)"
        );
    }

    #[test]
    fn test_slot_lines() {
        let lines = slot_lines(&time_slots());
        assert_eq!(lines.len(), 16);
        assert_eq!(lines[0], "9:00 AM");
        assert_eq!(lines[15], "4:30 PM");
    }

    #[test]
    fn test_provider_lines() {
        assert_eq!(provider_lines(&[]), ["No doctors available"]);

        let provider = Provider::new("7")
            .with_name("Jane", "Doe")
            .with_work_days([WorkDay::Wed]);
        let lines = provider_lines(&[provider]);
        assert!(lines[0].starts_with("7 "));
        assert!(lines[0].contains("Dr. Jane Doe"));
        assert!(lines[0].ends_with("fee 500"));
    }

    #[test]
    fn test_appointment_lines() {
        let appointment = Appointment {
            aptid: "apt-1".to_owned(),
            patid: None,
            docid: None,
            patname: None,
            docname: Some("Dr. Jane Doe".to_owned()),
            speciality: None,
            date: Some("2024-05-01".to_owned()),
            time: Some("9:30 AM".to_owned()),
            fee: Some(500),
            cancel: true,
            ..Appointment::default()
        };

        let lines = appointment_lines(&[appointment]);
        assert!(lines[0].starts_with("apt-1"));
        assert!(lines[0].ends_with("cancelled"));

        let reviewed = Appointment {
            aptid: "apt-2".to_owned(),
            completed: true,
            feedback: true,
            rating: Some(4),
            ..Appointment::default()
        };
        assert!(appointment_lines(&[reviewed])[0].ends_with("completed (4/5)"));
    }

    #[test]
    fn test_prescription_lines() {
        assert_eq!(prescription_lines(&[]), ["No prescriptions"]);

        let ready = Prescription {
            docname: Some("Dr. Jane Doe".to_owned()),
            pdate: Some("2024-05-01".to_owned()),
            prescribed: true,
            file: Some("https://files.example.com/rx/1.pdf".to_owned()),
            ..Prescription::default()
        };
        let pending = Prescription {
            docname: Some("Dr. John Roe".to_owned()),
            ..Prescription::default()
        };

        let lines = prescription_lines(&[ready, pending]);
        assert!(lines[0].starts_with("2024-05-01"));
        assert!(lines[0].ends_with("https://files.example.com/rx/1.pdf"));
        assert!(lines[1].ends_with("pending"));
    }
}
