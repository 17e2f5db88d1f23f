//! Backend `{ error, msg }` envelopes.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Outcome envelope returned by mutating backend endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiOutcome {
    #[serde(default)]
    pub error: bool,
    #[serde(default, alias = "message")]
    pub msg: Option<String>,
}

impl ApiOutcome {
    /// Successful outcome with an optional message.
    pub fn success(msg: Option<String>) -> Self {
        Self { error: false, msg }
    }

    /// Failed outcome with a message.
    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            error: true,
            msg: Some(msg.into()),
        }
    }

    /// Maps `error: true` to [`ErrorKind::Rejected`](crate::ErrorKind::Rejected).
    pub fn into_result(self) -> Result<Option<String>> {
        if self.error {
            let message = self
                .msg
                .unwrap_or_else(|| "Request rejected by backend".to_owned());
            return Err(Error::rejected().with_message(message));
        }
        Ok(self.msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_message_alias() {
        let outcome: ApiOutcome =
            serde_json::from_str(r#"{"error":true,"message":"Slot taken"}"#).unwrap();
        assert!(outcome.error);
        assert_eq!(outcome.msg.as_deref(), Some("Slot taken"));
    }

    #[test]
    fn test_into_result() {
        let ok = ApiOutcome::success(Some("Booked".into())).into_result().unwrap();
        assert_eq!(ok.as_deref(), Some("Booked"));

        let err = ApiOutcome::failure("Slot taken").into_result().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Rejected);
        assert_eq!(err.message.as_deref(), Some("Slot taken"));
    }

    #[test]
    fn test_empty_body_is_success() {
        let outcome: ApiOutcome = serde_json::from_str("{}").unwrap();
        assert!(outcome.into_result().is_ok());
    }
}
