use std::fmt;
use std::str::FromStr;

use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use crate::types::Role;
use crate::types::wire::deserialize_optional_id;
use crate::{Error, Result};

/// Claims the session gate needs from a decoded credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialClaims {
    /// Backend user identifier (`uid`, or `sub` as a fallback).
    pub subject_id: String,
    /// Role from the `userType` claim.
    pub role: Role,
    /// Expiration time (`exp`).
    pub expires_at: Timestamp,
}

impl CredentialClaims {
    /// Returns `true` once `now` has reached the expiry.
    #[inline]
    #[must_use]
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }

    /// Remaining lifetime, or zero if already expired.
    #[must_use]
    pub fn remaining_lifetime(&self, now: Timestamp) -> SignedDuration {
        let remaining = self.expires_at.duration_since(now);
        if remaining.is_positive() {
            remaining
        } else {
            SignedDuration::ZERO
        }
    }

    /// Returns `true` if the credential expires within `threshold`.
    #[must_use]
    pub fn expires_soon(&self, now: Timestamp, threshold: SignedDuration) -> bool {
        self.remaining_lifetime(now) < threshold
    }
}

/// Turns an opaque credential into [`CredentialClaims`].
///
/// Expiry is not checked here; the gate compares it with its clock.
pub trait CredentialDecoder: Send + Sync {
    /// Decodes the credential or fails with [`ErrorKind::Decode`].
    ///
    /// [`ErrorKind::Decode`]: crate::ErrorKind::Decode
    fn decode(&self, token: &str) -> Result<CredentialClaims>;
}

/// Claims as they appear in the backend's tokens.
#[derive(Debug, Deserialize)]
struct TokenClaims {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    uid: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    sub: Option<String>,
    #[serde(default, rename = "userType")]
    user_type: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    exp: Option<i64>,
}

impl TryFrom<TokenClaims> for CredentialClaims {
    type Error = Error;

    fn try_from(claims: TokenClaims) -> Result<Self> {
        let subject_id = claims
            .uid
            .or(claims.sub)
            .filter(|subject| !subject.is_empty())
            .ok_or_else(|| Error::decode().with_message("Credential has no subject"))?;

        let label = claims
            .user_type
            .or(claims.role)
            .ok_or_else(|| Error::decode().with_message("Credential has no role"))?;
        let role = Role::from_str(&label).map_err(|e| {
            Error::from_source(crate::ErrorKind::Decode, e)
                .with_message(format!("Unknown role '{label}'"))
        })?;

        let exp = claims
            .exp
            .ok_or_else(|| Error::decode().with_message("Credential has no expiry"))?;
        let expires_at = Timestamp::from_second(exp).map_err(|e| {
            Error::from_source(crate::ErrorKind::Decode, e)
                .with_message("Credential expiry is out of range")
        })?;

        Ok(Self {
            subject_id,
            role,
            expires_at,
        })
    }
}

/// JWT-backed [`CredentialDecoder`].
///
/// By default the signature is not checked: the backend remains the
/// authority and rejects forged tokens with a 401. Configure a shared
/// secret to verify HS256 signatures locally as well.
#[derive(Clone)]
pub struct JwtDecoder {
    key: DecodingKey,
    validation: Validation,
    verified: bool,
}

impl fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("verified", &self.verified)
            .finish_non_exhaustive()
    }
}

impl JwtDecoder {
    /// Decodes claims without verifying the signature.
    pub fn unverified() -> Self {
        let mut validation = Self::base_validation(Algorithm::HS256);
        validation.insecure_disable_signature_validation();

        Self {
            key: DecodingKey::from_secret(&[]),
            validation,
            verified: false,
        }
    }

    /// Verifies HS256 signatures with the given shared secret.
    pub fn with_secret(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation: Self::base_validation(Algorithm::HS256),
            verified: true,
        }
    }

    /// Returns `true` if signatures are verified.
    #[inline]
    pub fn is_verified(&self) -> bool {
        self.verified
    }

    fn base_validation(algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();
        validation
    }
}

impl Default for JwtDecoder {
    fn default() -> Self {
        Self::unverified()
    }
}

impl CredentialDecoder for JwtDecoder {
    fn decode(&self, token: &str) -> Result<CredentialClaims> {
        let token_data = decode::<TokenClaims>(token.trim(), &self.key, &self.validation)
            .map_err(|e| {
                Error::from_source(crate::ErrorKind::Decode, e)
                    .with_message("Malformed credential")
            })?;

        CredentialClaims::try_from(token_data.claims)
    }
}
