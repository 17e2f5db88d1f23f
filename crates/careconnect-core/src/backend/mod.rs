//! Contract for the remote Care Connect REST backend.
//!
//! Implement [`BackendProvider`] for a transport; wrap it in a
//! [`BackendService`] to get credential attachment, logging and the
//! logout-on-401 rule.

mod request;
mod service;

pub use request::{
    CallContext, ChangePasswordRequest, FeedbackRequest, SignInRequest, SignInResponse,
    SignUpRequest,
};
pub use service::BackendService;

use crate::Result;
use crate::types::{
    ApiOutcome, Appointment, BookingRecord, Prescription, Provider, UserProfile,
};

/// Tracing target for backend operations.
pub const TRACING_TARGET: &str = "careconnect_core::backend";

/// Shortest password accepted by [`BackendService::change_password`].
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Core trait for backend operations.
///
/// A 401 must be reported as
/// [`ErrorKind::AuthorizationDenied`](crate::ErrorKind::AuthorizationDenied);
/// transport failures and other non-success statuses as
/// [`ErrorKind::Fetch`](crate::ErrorKind::Fetch).
#[async_trait::async_trait]
pub trait BackendProvider: Send + Sync {
    /// Exchanges email and password for an access token.
    async fn sign_in(&self, request: &SignInRequest) -> Result<SignInResponse>;

    /// Registers a new account.
    async fn sign_up(&self, request: &SignUpRequest) -> Result<ApiOutcome>;

    /// Fetches a user's profile.
    async fn find_user(&self, context: &CallContext, uid: &str) -> Result<UserProfile>;

    /// Fetches the doctor roster.
    async fn list_doctors(&self, context: &CallContext) -> Result<Vec<Provider>>;

    /// Persists an appointment.
    async fn book_appointment(
        &self,
        context: &CallContext,
        record: &BookingRecord,
    ) -> Result<ApiOutcome>;

    /// Lists a patient's appointments.
    async fn my_appointments(&self, context: &CallContext, patid: &str)
    -> Result<Vec<Appointment>>;

    /// Cancels an appointment.
    async fn cancel_appointment(&self, context: &CallContext, aptid: &str) -> Result<ApiOutcome>;

    /// Submits or withdraws a review of a completed appointment.
    async fn write_feedback(
        &self,
        context: &CallContext,
        request: &FeedbackRequest,
    ) -> Result<ApiOutcome>;

    /// Lists a patient's prescriptions.
    async fn prescriptions(&self, context: &CallContext, patid: &str)
    -> Result<Vec<Prescription>>;

    /// Replaces the account password.
    async fn change_password(
        &self,
        context: &CallContext,
        request: &ChangePasswordRequest,
    ) -> Result<ApiOutcome>;
}
