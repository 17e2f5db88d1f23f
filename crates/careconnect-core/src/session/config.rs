//! Session gate configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use super::JwtDecoder;

/// Default interval between passive session re-checks: 60 seconds.
pub const DEFAULT_RECHECK_INTERVAL_SECS: u64 = 60;

/// Configuration for the session gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct SessionConfig {
    /// Interval between passive session re-checks, in seconds
    #[cfg_attr(
        feature = "config",
        arg(
            long = "session-recheck-secs",
            env = "SESSION_RECHECK_SECS",
            default_value = "60"
        )
    )]
    #[serde(default = "default_recheck_interval_secs")]
    pub recheck_interval_secs: u64,

    /// Shared secret for verifying HS256 credential signatures
    #[cfg_attr(
        feature = "config",
        arg(long = "token-secret", env = "TOKEN_SECRET", hide_env_values = true)
    )]
    #[serde(default, skip_serializing)]
    pub token_secret: Option<String>,
}

fn default_recheck_interval_secs() -> u64 {
    DEFAULT_RECHECK_INTERVAL_SECS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            recheck_interval_secs: default_recheck_interval_secs(),
            token_secret: None,
        }
    }
}

impl SessionConfig {
    /// Returns the effective re-check interval, using default if zero.
    pub fn recheck_interval(&self) -> Duration {
        if self.recheck_interval_secs == 0 {
            Duration::from_secs(DEFAULT_RECHECK_INTERVAL_SECS)
        } else {
            Duration::from_secs(self.recheck_interval_secs)
        }
    }

    /// Builds the credential decoder this configuration asks for.
    pub fn decoder(&self) -> JwtDecoder {
        match self.token_secret.as_deref() {
            Some(secret) if !secret.is_empty() => JwtDecoder::with_secret(secret),
            _ => JwtDecoder::unverified(),
        }
    }

    /// Set the re-check interval in seconds.
    #[must_use]
    pub fn with_recheck_interval(mut self, secs: u64) -> Self {
        self.recheck_interval_secs = secs;
        self
    }

    /// Set the token verification secret.
    #[must_use]
    pub fn with_token_secret(mut self, secret: impl Into<String>) -> Self {
        self.token_secret = Some(secret.into());
        self
    }
}
