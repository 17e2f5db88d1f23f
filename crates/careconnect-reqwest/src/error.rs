//! Error types for the reqwest backend client.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for reqwest operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type for reqwest operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Malformed endpoint URL.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
    /// The configured base URL cannot carry paths.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
    /// The backend refused the credential.
    #[error("Unauthorized")]
    Unauthorized,
    /// The backend answered with a non-success status.
    #[error("Unexpected status {status}")]
    Status {
        status: StatusCode,
        message: Option<String>,
    },
}

impl From<Error> for careconnect_core::Error {
    fn from(err: Error) -> Self {
        use careconnect_core::Error as CoreError;

        match err {
            Error::Reqwest(e) => {
                if e.is_timeout() {
                    CoreError::fetch()
                        .with_message("Request timed out")
                        .with_source(e)
                } else if e.is_connect() {
                    CoreError::fetch()
                        .with_message("Connection failed")
                        .with_source(e)
                } else if e.is_decode() {
                    CoreError::serialization()
                        .with_message(e.to_string())
                        .with_source(e)
                } else {
                    CoreError::fetch().with_message(e.to_string()).with_source(e)
                }
            }
            Error::Serde(e) => CoreError::serialization()
                .with_message(e.to_string())
                .with_source(e),
            Error::Url(e) => CoreError::configuration()
                .with_message(e.to_string())
                .with_source(e),
            Error::InvalidBaseUrl(url) => {
                CoreError::configuration().with_message(format!("Invalid base URL: {url}"))
            }
            Error::Unauthorized => {
                CoreError::authorization_denied().with_message("Backend rejected the credential")
            }
            Error::Status { status, message } => CoreError::fetch()
                .with_message(message.unwrap_or_else(|| format!("Backend responded with {status}")))
                .with_context(status.as_str().to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use careconnect_core::ErrorKind;

    use super::*;

    #[test]
    fn test_unauthorized_maps_to_authorization_denied() {
        let error = careconnect_core::Error::from(Error::Unauthorized);
        assert_eq!(error.kind, ErrorKind::AuthorizationDenied);
        assert!(error.is_session_fatal());
    }

    #[test]
    fn test_status_maps_to_fetch() {
        let error = careconnect_core::Error::from(Error::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        });
        assert_eq!(error.kind, ErrorKind::Fetch);
        assert_eq!(error.context.as_deref(), Some("500"));
        assert!(error.message.unwrap().contains("500"));
    }

    #[test]
    fn test_status_keeps_backend_message() {
        let error = careconnect_core::Error::from(Error::Status {
            status: StatusCode::BAD_REQUEST,
            message: Some("Email already registered".to_owned()),
        });
        assert_eq!(error.message.as_deref(), Some("Email already registered"));
    }

    #[test]
    fn test_url_maps_to_configuration() {
        let parse_error = url::Url::parse("::").unwrap_err();
        let error = careconnect_core::Error::from(Error::from(parse_error));
        assert_eq!(error.kind, ErrorKind::Configuration);
    }
}
