//! Prescriptions uploaded by doctors.

use serde::{Deserialize, Serialize};

use super::wire::deserialize_optional_id;

/// A prescription attached to an appointment.
///
/// Until the doctor uploads the document `prescribed` is `false` and
/// `file` is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prescription {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub aptid: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub patid: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub docid: Option<String>,
    #[serde(default)]
    pub patname: Option<String>,
    #[serde(default)]
    pub docname: Option<String>,
    /// Date the prescription was written, as stored by the backend.
    #[serde(default)]
    pub pdate: Option<String>,
    #[serde(default)]
    pub prescribed: bool,
    /// Download location of the document.
    #[serde(default)]
    pub file: Option<String>,
}

impl Prescription {
    /// Returns the download location once the document is available.
    #[must_use]
    pub fn download_url(&self) -> Option<&str> {
        self.file
            .as_deref()
            .filter(|file| self.prescribed && !file.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_prescription() {
        let prescription: Prescription = serde_json::from_value(serde_json::json!({
            "_id": "66f0",
            "aptid": 12,
            "docname": "Dr. Jane Doe",
            "pdate": "2024-05-01",
            "prescribed": true,
            "file": "https://files.example.com/rx/12.pdf"
        }))
        .unwrap();

        assert_eq!(prescription.aptid.as_deref(), Some("12"));
        assert_eq!(
            prescription.download_url(),
            Some("https://files.example.com/rx/12.pdf")
        );
    }

    #[test]
    fn test_pending_prescription_has_no_download() {
        let pending = Prescription {
            file: Some("https://files.example.com/rx/13.pdf".into()),
            ..Prescription::default()
        };
        assert_eq!(pending.download_url(), None);

        let empty = Prescription {
            prescribed: true,
            file: Some(" ".into()),
            ..Prescription::default()
        };
        assert_eq!(empty.download_url(), None);
    }
}
