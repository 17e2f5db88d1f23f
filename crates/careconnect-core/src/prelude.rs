//! Commonly used items from careconnect-core.
//!
//! ```rust,ignore
//! use careconnect_core::prelude::*;
//! ```

// Availability resolution
pub use crate::availability::{
    AvailabilityQuery, BookableSlot, TimeSlot, available_providers, bookable_slots,
    build_booking_record, time_slots,
};
// Backend contracts
pub use crate::backend::{
    BackendProvider, BackendService, CallContext, ChangePasswordRequest, FeedbackRequest,
    SignInRequest, SignInResponse, SignUpRequest,
};
// Test stand-ins (test-utils feature)
#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub use crate::mock::{FixedClock, MockBackend};
// Session gate
pub use crate::session::{
    Clock, CredentialClaims, CredentialDecoder, CredentialStore, JwtDecoder, MemoryStore,
    Session, SessionConfig, SessionGate, SessionMonitor, SystemClock,
};
// Domain types
pub use crate::types::{
    ApiOutcome, Appointment, AppointmentStatus, BookingRecord, Prescription, Provider, Role,
    UserProfile, WorkDay,
};
pub use crate::{BoxedError, Error, ErrorKind, Result};
