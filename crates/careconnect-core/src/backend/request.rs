//! Request and response bodies exchanged with the backend.

use serde::{Deserialize, Serialize};

use crate::types::Role;

/// Per-call data attached to authenticated requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallContext {
    /// Bearer credential, if a session exists.
    pub credential: Option<String>,
}

impl CallContext {
    /// Context for a call made with `credential`.
    pub fn with_credential(credential: impl Into<String>) -> Self {
        Self {
            credential: Some(credential.into()),
        }
    }

    /// Context for an anonymous call.
    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Login form.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for SignInRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl SignInRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Login response.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub access_token: String,
}

impl std::fmt::Debug for SignInResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInResponse").finish_non_exhaustive()
    }
}

/// Registration form.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub fname: String,
    pub lname: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "userType")]
    pub user_type: Role,
}

impl std::fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("email", &self.email)
            .field("user_type", &self.user_type)
            .finish_non_exhaustive()
    }
}

/// Password change form.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub email: String,
    pub current_password: String,
    pub new_password: String,
}

impl std::fmt::Debug for ChangePasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangePasswordRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Review of a completed appointment, or its withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub aptid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    /// `false` withdraws an earlier review.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<bool>,
}

impl FeedbackRequest {
    /// Submits a review with a rating.
    pub fn submit(aptid: impl Into<String>, review: impl Into<String>, rating: u8) -> Self {
        Self {
            aptid: aptid.into(),
            review: Some(review.into()),
            rating: Some(rating),
            feedback: None,
        }
    }

    /// Withdraws the review left on an appointment.
    pub fn withdraw(aptid: impl Into<String>) -> Self {
        Self {
            aptid: aptid.into(),
            review: None,
            rating: None,
            feedback: Some(false),
        }
    }

    /// Returns `true` if this request withdraws a review.
    #[must_use]
    pub fn is_withdrawal(&self) -> bool {
        self.feedback == Some(false)
    }
}
