//! Signed-in user profile.

use serde::{Deserialize, Serialize};

use super::wire::deserialize_id;

/// Profile of the signed-in user, cached for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(deserialize_with = "deserialize_id")]
    pub uid: String,
    #[serde(default)]
    pub fname: Option<String>,
    #[serde(default)]
    pub lname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserProfile {
    /// Creates a profile with only an identifier.
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            fname: None,
            lname: None,
            email: None,
        }
    }

    /// Sets first and last name.
    #[must_use]
    pub fn with_name(mut self, fname: impl Into<String>, lname: impl Into<String>) -> Self {
        self.fname = Some(fname.into());
        self.lname = Some(lname.into());
        self
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Full name, or the email when no name is known.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full_name = format!(
            "{} {}",
            self.fname.as_deref().unwrap_or_default(),
            self.lname.as_deref().unwrap_or_default()
        );

        match full_name.trim() {
            "" => self.email.clone().unwrap_or_default(),
            name => name.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let profile = UserProfile::new("p-1").with_name("Ada", "Lovelace");
        assert_eq!(profile.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let profile = UserProfile::new("p-1").with_email("ada@example.com");
        assert_eq!(profile.display_name(), "ada@example.com");
    }

    #[test]
    fn test_numeric_uid() {
        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "uid": 42,
            "fname": "Ada",
            "email": "ada@example.com"
        }))
        .unwrap();
        assert_eq!(profile.uid, "42");
        assert_eq!(profile.display_name(), "Ada");
    }

    #[test]
    fn test_partial_name() {
        let profile = UserProfile {
            fname: Some("Ada".into()),
            ..UserProfile::new("p-1")
        };
        assert_eq!(profile.display_name(), "Ada");
    }
}
