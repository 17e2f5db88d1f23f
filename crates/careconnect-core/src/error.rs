//! Structured error handling for session and booking operations.

use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur in careconnect operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The stored credential could not be decoded.
    Decode,
    /// The credential decoded but its expiry has passed.
    ExpiredCredential,
    /// The backend refused the credential (401).
    AuthorizationDenied,
    /// Required input was missing or malformed.
    Validation,
    /// Transport failure or non-success HTTP status.
    Fetch,
    /// The backend answered with `{ error: true }`.
    Rejected,
    /// Serialization/deserialization error.
    Serialization,
    /// Credential storage failed.
    Storage,
    /// Configuration error.
    Configuration,
    /// Unknown error occurred.
    #[default]
    Unknown,
}

impl ErrorKind {
    /// Returns `true` when this kind must end the current session.
    #[must_use]
    pub const fn is_session_fatal(&self) -> bool {
        matches!(
            self,
            Self::Decode | Self::ExpiredCredential | Self::AuthorizationDenied
        )
    }
}

/// Structured error type with classification and context tracking.
#[must_use]
#[derive(Debug, Error)]
#[error("[{kind}]{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Primary error message.
    pub message: Option<String>,
    /// Underlying source error, if any.
    #[source]
    pub source: Option<BoxedError>,
    /// Additional context information.
    pub context: Option<String>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
            context: None,
        }
    }

    /// Creates a new error from a source error.
    pub fn from_source(kind: ErrorKind, source: impl Into<BoxedError>) -> Self {
        Self {
            kind,
            message: None,
            source: Some(source.into()),
            context: None,
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the source of the error.
    pub fn with_source(mut self, source: impl Into<BoxedError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds context to the error.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Creates a new decode error.
    pub fn decode() -> Self {
        Self::new(ErrorKind::Decode)
    }

    /// Creates a new expired credential error.
    pub fn expired_credential() -> Self {
        Self::new(ErrorKind::ExpiredCredential)
    }

    /// Creates a new authorization denied error.
    pub fn authorization_denied() -> Self {
        Self::new(ErrorKind::AuthorizationDenied)
    }

    /// Creates a new validation error.
    pub fn validation() -> Self {
        Self::new(ErrorKind::Validation)
    }

    /// Creates a new fetch error.
    pub fn fetch() -> Self {
        Self::new(ErrorKind::Fetch)
    }

    /// Creates a new rejected error.
    pub fn rejected() -> Self {
        Self::new(ErrorKind::Rejected)
    }

    /// Creates a new serialization error.
    pub fn serialization() -> Self {
        Self::new(ErrorKind::Serialization)
    }

    /// Creates a new storage error.
    pub fn storage() -> Self {
        Self::new(ErrorKind::Storage)
    }

    /// Creates a new configuration error.
    pub fn configuration() -> Self {
        Self::new(ErrorKind::Configuration)
    }

    /// Check if this error must end the current session.
    #[must_use]
    pub const fn is_session_fatal(&self) -> bool {
        self.kind.is_session_fatal()
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::from_source(ErrorKind::Serialization, error).with_message("Invalid JSON payload")
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::from_source(ErrorKind::Storage, error).with_message("I/O operation failed")
    }
}
