//! Process-wide authentication state derived from a single credential.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;

use super::{
    ACCESS_TOKEN_KEY, Clock, CredentialClaims, CredentialDecoder, CredentialStore, JwtDecoder,
    SessionConfig, SessionMonitor, SystemClock, TRACING_TARGET, USER_STORAGE_KEY,
};
use crate::types::{Role, UserProfile};
use crate::{Error, ErrorKind, Result};

/// Authentication state as seen by the rest of the application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "state", content = "role", rename_all = "camelCase")]
pub enum Session {
    #[default]
    Unauthenticated,
    Authenticated(Role),
}

impl Session {
    #[inline]
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Returns the role of an authenticated session.
    #[inline]
    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        match self {
            Self::Authenticated(role) => Some(*role),
            Self::Unauthenticated => None,
        }
    }
}

struct SessionGateInner {
    store: Arc<dyn CredentialStore>,
    decoder: Arc<dyn CredentialDecoder>,
    clock: Arc<dyn Clock>,
    credential: RwLock<Option<String>>,
    profile: RwLock<Option<UserProfile>>,
    session: watch::Sender<Session>,
}

/// Single source of truth for "who is signed in, and as what".
///
/// The raw credential is held in memory and written through to a
/// [`CredentialStore`]. The derived [`Session`] is recomputed on
/// [`login`](Self::login), [`logout`](Self::logout) and
/// [`check_auth`](Self::check_auth); observers get changes through
/// [`subscribe`](Self::subscribe).
///
/// Malformed, missing or expired credentials never fail: they resolve to
/// [`Session::Unauthenticated`] and the stored credential is cleared.
///
/// Cloning is cheap; clones share state.
#[derive(Clone)]
pub struct SessionGate {
    inner: Arc<SessionGateInner>,
}

impl fmt::Debug for SessionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionGate")
            .field("session", &self.session())
            .finish_non_exhaustive()
    }
}

/// Builder for [`SessionGate`].
pub struct SessionGateBuilder {
    store: Arc<dyn CredentialStore>,
    decoder: Arc<dyn CredentialDecoder>,
    clock: Arc<dyn Clock>,
}

impl SessionGateBuilder {
    /// Replaces the credential decoder.
    #[must_use]
    pub fn with_decoder(mut self, decoder: impl CredentialDecoder + 'static) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }

    /// Replaces the clock used for expiry checks.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Loads the stored credential and profile, then runs the initial
    /// [`check_auth`](SessionGate::check_auth).
    pub fn build(self) -> SessionGate {
        let credential = read_slot(self.store.as_ref(), ACCESS_TOKEN_KEY);
        let profile = read_slot(self.store.as_ref(), USER_STORAGE_KEY).and_then(|json| {
            serde_json::from_str::<UserProfile>(&json)
                .inspect_err(|error| {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        error = %error,
                        "Discarding unreadable cached profile"
                    );
                })
                .ok()
        });

        let (session, _) = watch::channel(Session::Unauthenticated);
        let gate = SessionGate {
            inner: Arc::new(SessionGateInner {
                store: self.store,
                decoder: self.decoder,
                clock: self.clock,
                credential: RwLock::new(credential),
                profile: RwLock::new(profile),
                session,
            }),
        };

        let session = gate.check_auth();
        tracing::debug!(
            target: TRACING_TARGET,
            authenticated = session.is_authenticated(),
            role = ?session.role(),
            "Session gate initialized"
        );

        gate
    }
}

impl SessionGate {
    /// Starts building a gate over `store` with an unverified JWT decoder
    /// and the system clock.
    pub fn builder(store: impl CredentialStore + 'static) -> SessionGateBuilder {
        SessionGateBuilder {
            store: Arc::new(store),
            decoder: Arc::new(JwtDecoder::unverified()),
            clock: Arc::new(SystemClock),
        }
    }

    /// Creates a gate over `store` with default collaborators.
    pub fn new(store: impl CredentialStore + 'static) -> Self {
        Self::builder(store).build()
    }

    /// Creates a gate over `store` using the decoder from `config`.
    pub fn from_config(config: &SessionConfig, store: impl CredentialStore + 'static) -> Self {
        Self::builder(store).with_decoder(config.decoder()).build()
    }

    /// Stores `token` as the credential and re-derives the session.
    ///
    /// An undecodable or expired token is discarded and yields
    /// [`Session::Unauthenticated`].
    pub fn login(&self, token: impl Into<String>) -> Session {
        let token = token.into();

        if let Err(error) = self.inner.store.set(ACCESS_TOKEN_KEY, &token) {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %error,
                "Failed to persist credential, keeping it in memory only"
            );
        }
        *write(&self.inner.credential) = Some(token);
        self.clear_profile();

        self.check_auth()
    }

    /// Clears the credential and all session-scoped data.
    ///
    /// Safe to call repeatedly.
    pub fn logout(&self) {
        let had_credential = write(&self.inner.credential).take().is_some();
        self.clear_profile();

        for key in [ACCESS_TOKEN_KEY, USER_STORAGE_KEY] {
            if let Err(error) = self.inner.store.remove(key) {
                tracing::warn!(
                    target: TRACING_TARGET,
                    key,
                    error = %error,
                    "Failed to clear storage slot"
                );
            }
        }

        if self.publish(Session::Unauthenticated) || had_credential {
            tracing::info!(target: TRACING_TARGET, "Session ended");
        }
    }

    /// Decodes the current credential and returns the resulting session.
    ///
    /// Missing, malformed or expired credentials trigger an implicit
    /// [`logout`](Self::logout).
    pub fn check_auth(&self) -> Session {
        let credential = read(&self.inner.credential).clone();

        match self.validate(credential.as_deref()) {
            Ok(claims) => {
                let session = Session::Authenticated(claims.role);
                if self.publish(session) {
                    tracing::info!(
                        target: TRACING_TARGET,
                        subject_id = %claims.subject_id,
                        role = %claims.role,
                        expires_at = %claims.expires_at,
                        "Session authenticated"
                    );
                }
                session
            }
            Err(error) => {
                if credential.is_some() {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        kind = %error.kind,
                        error = %error,
                        "Credential rejected, ending session"
                    );
                }
                self.invalidate(credential.as_deref());
                self.session()
            }
        }
    }

    /// Reacts to a 401 from the backend by ending the session.
    ///
    /// The request that received the 401 must not be retried with the same
    /// credential.
    pub fn handle_authorization_denied(&self) {
        tracing::warn!(
            target: TRACING_TARGET,
            role = ?self.session().role(),
            "Backend denied authorization, ending session"
        );
        self.logout();
    }

    /// Returns the current session without re-checking the credential.
    #[inline]
    pub fn session(&self) -> Session {
        *self.inner.session.borrow()
    }

    /// Subscribes to session changes.
    ///
    /// The receiver starts with the current session and is notified only
    /// when the value changes.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.session.subscribe()
    }

    /// Returns the raw credential, for attaching to outbound requests.
    pub fn credential(&self) -> Option<String> {
        read(&self.inner.credential).clone()
    }

    /// Decodes the current credential without changing the session.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::Decode`] when there is no usable credential
    /// and [`ErrorKind::ExpiredCredential`] when it has expired.
    pub fn claims(&self) -> Result<CredentialClaims> {
        let credential = self.credential();
        self.validate(credential.as_deref())
    }

    /// Returns the cached profile of the signed-in user.
    pub fn profile(&self) -> Option<UserProfile> {
        read(&self.inner.profile).clone()
    }

    /// Caches `profile` for the current session.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::AuthorizationDenied`] when nobody is signed in
    /// and [`ErrorKind::Serialization`] if the profile cannot be persisted.
    pub fn set_profile(&self, profile: UserProfile) -> Result<()> {
        if !self.session().is_authenticated() {
            return Err(Error::authorization_denied()
                .with_message("Cannot cache a profile without a session"));
        }

        let json = serde_json::to_string(&profile)?;
        if let Err(error) = self.inner.store.set(USER_STORAGE_KEY, &json) {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %error,
                "Failed to persist profile, keeping it in memory only"
            );
        }
        *write(&self.inner.profile) = Some(profile);
        Ok(())
    }

    /// Spawns a task re-running [`check_auth`](Self::check_auth) every
    /// `period`, so expiry is noticed without user interaction.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_monitor(&self, period: Duration) -> SessionMonitor {
        SessionMonitor::spawn(self.clone(), period)
    }

    fn validate(&self, credential: Option<&str>) -> Result<CredentialClaims> {
        let token = credential.ok_or_else(|| Error::decode().with_message("No credential"))?;
        let claims = self.inner.decoder.decode(token)?;

        if claims.is_expired_at(self.inner.clock.now()) {
            return Err(Error::expired_credential()
                .with_message(format!("Credential expired at {}", claims.expires_at)));
        }

        Ok(claims)
    }

    /// Logs out unless another credential was stored in the meantime.
    fn invalidate(&self, seen: Option<&str>) {
        let current = read(&self.inner.credential).clone();
        if current.as_deref() == seen {
            self.logout();
        }
    }

    fn clear_profile(&self) {
        write(&self.inner.profile).take();
    }

    /// Publishes `session`, returning `true` if it changed.
    fn publish(&self, session: Session) -> bool {
        self.inner.session.send_if_modified(|current| {
            if *current == session {
                false
            } else {
                *current = session;
                true
            }
        })
    }
}

fn read_slot(store: &dyn CredentialStore, key: &str) -> Option<String> {
    store
        .get(key)
        .inspect_err(|error| {
            tracing::warn!(
                target: TRACING_TARGET,
                key,
                error = %error,
                "Failed to read storage slot, treating it as empty"
            );
        })
        .ok()
        .flatten()
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
