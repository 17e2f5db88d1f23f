//! Session gate: credential storage, decoding and the derived session.
//!
//! ```text
//! login(token) ──► store ──► check_auth ──► Session::Authenticated(role)
//!                                  │
//!      decode error / expired ─────┴──► logout ──► Session::Unauthenticated
//! ```
//!
//! [`check_auth`](SessionGate::check_auth) runs once when the gate is built,
//! on every [`login`](SessionGate::login), on each tick of a
//! [`SessionMonitor`], and a backend 401 goes through
//! [`handle_authorization_denied`](SessionGate::handle_authorization_denied).

mod clock;
mod config;
mod credential;
mod gate;
mod monitor;
mod store;

pub use clock::{Clock, SystemClock};
pub use config::{DEFAULT_RECHECK_INTERVAL_SECS, SessionConfig};
pub use credential::{CredentialClaims, CredentialDecoder, JwtDecoder};
pub use gate::{Session, SessionGate, SessionGateBuilder};
pub use monitor::SessionMonitor;
pub use store::{ACCESS_TOKEN_KEY, CredentialStore, MemoryStore, USER_STORAGE_KEY};

/// Tracing target for session operations.
pub const TRACING_TARGET: &str = "careconnect_core::session";
