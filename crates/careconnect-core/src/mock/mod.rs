//! In-memory stand-ins for testing.
//!
//! Provides a [`MockBackend`] implementing [`BackendProvider`], a
//! [`FixedClock`] that only moves when told to, and helpers for minting
//! signed credentials.
//!
//! # Feature Flag
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! careconnect-core = { version = "...", features = ["test-utils"] }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::json;

use crate::backend::{
    BackendProvider, CallContext, ChangePasswordRequest, FeedbackRequest, SignInRequest,
    SignInResponse, SignUpRequest,
};
use crate::session::Clock;
use crate::types::{
    ApiOutcome, Appointment, BookingRecord, Prescription, Provider, Role, UserProfile,
};
use crate::{Error, Result};

/// Secret used by [`mint_token`] and [`mint_token_with`].
pub const TEST_TOKEN_SECRET: &str = "careconnect-test-secret";

/// Mints an HS256 credential for `subject` with the given role and expiry.
pub fn mint_token(subject: &str, role: Role, expires_at: Timestamp) -> String {
    mint_token_with(json!({
        "uid": subject,
        "userType": role.as_ref(),
        "exp": expires_at.as_second(),
    }))
}

/// Mints an HS256 credential carrying arbitrary `claims`.
///
/// # Panics
///
/// Panics if `claims` cannot be encoded.
pub fn mint_token_with(claims: serde_json::Value) -> String {
    let key = EncodingKey::from_secret(TEST_TOKEN_SECRET.as_bytes());
    encode(&Header::default(), &claims, &key).expect("test claims should encode")
}

/// Clock frozen at a settable instant. Clones share the instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<Timestamp>>,
}

impl FixedClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: Timestamp) {
        *lock(&self.now) = now;
    }

    /// Moves the clock forward by `duration`.
    pub fn advance(&self, duration: SignedDuration) {
        let mut now = lock(&self.now);
        *now = *now + duration;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *lock(&self.now)
    }
}

#[derive(Debug, Default)]
struct MockState {
    token: Option<String>,
    profile: Option<UserProfile>,
    roster: Vec<Provider>,
    outcome: Option<ApiOutcome>,
    appointments: Vec<Appointment>,
    prescriptions: Vec<Prescription>,
    password: Option<String>,
    booked: Vec<BookingRecord>,
    deny_next: bool,
    calls: HashMap<&'static str, usize>,
}

/// In-memory backend with a scripted roster and call accounting.
///
/// Bookings are kept and listed back as scheduled appointments; cancelling
/// flips their `cancel` flag and reviews are stored on the appointment.
/// Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the token returned by sign-in.
    #[must_use]
    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.state().token = Some(token.into());
        self
    }

    /// Sets the profile returned by user lookups.
    ///
    /// Without one, lookups return a bare profile for the requested id.
    #[must_use]
    pub fn with_profile(self, profile: UserProfile) -> Self {
        self.state().profile = Some(profile);
        self
    }

    /// Sets the doctor roster.
    #[must_use]
    pub fn with_roster(self, roster: Vec<Provider>) -> Self {
        self.state().roster = roster;
        self
    }

    /// Sets the outcome returned by booking.
    #[must_use]
    pub fn with_outcome(self, outcome: ApiOutcome) -> Self {
        self.state().outcome = Some(outcome);
        self
    }

    /// Seeds the appointment list.
    #[must_use]
    pub fn with_appointments(self, appointments: Vec<Appointment>) -> Self {
        self.state().appointments = appointments;
        self
    }

    /// Sets the prescriptions returned by prescription lookups.
    #[must_use]
    pub fn with_prescriptions(self, prescriptions: Vec<Prescription>) -> Self {
        self.state().prescriptions = prescriptions;
        self
    }

    /// Sets the password a password change must present.
    ///
    /// Without one, any current password is accepted.
    #[must_use]
    pub fn with_password(self, password: impl Into<String>) -> Self {
        self.state().password = Some(password.into());
        self
    }

    /// Makes the next authenticated call fail with a 401.
    pub fn deny_next(&self) {
        self.state().deny_next = true;
    }

    /// Number of times `operation` reached the backend.
    pub fn calls(&self, operation: &str) -> usize {
        self.state().calls.get(operation).copied().unwrap_or_default()
    }

    /// Records accepted by the booking endpoint.
    pub fn booked(&self) -> Vec<BookingRecord> {
        self.state().booked.clone()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        lock(&self.state)
    }

    /// Counts the call and checks the credential.
    fn enter(&self, operation: &'static str, context: &CallContext) -> Result<MutexGuard<'_, MockState>> {
        let mut state = self.state();
        *state.calls.entry(operation).or_default() += 1;

        if context.credential.is_none() || std::mem::take(&mut state.deny_next) {
            return Err(Error::authorization_denied()
                .with_message("401 Unauthorized")
                .with_context(operation));
        }

        Ok(state)
    }
}

#[async_trait::async_trait]
impl BackendProvider for MockBackend {
    async fn sign_in(&self, request: &SignInRequest) -> Result<SignInResponse> {
        let mut state = self.state();
        *state.calls.entry("sign_in").or_default() += 1;

        match (&state.token, request.password.is_empty()) {
            (Some(token), false) => Ok(SignInResponse {
                access_token: token.clone(),
            }),
            _ => Err(Error::authorization_denied().with_message("Invalid credentials")),
        }
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<ApiOutcome> {
        let mut state = self.state();
        *state.calls.entry("sign_up").or_default() += 1;

        if request.email.is_empty() {
            return Ok(ApiOutcome::failure("Email is required"));
        }
        Ok(ApiOutcome::success(Some("Account created".to_owned())))
    }

    async fn find_user(&self, context: &CallContext, uid: &str) -> Result<UserProfile> {
        let state = self.enter("find_user", context)?;
        Ok(state
            .profile
            .clone()
            .unwrap_or_else(|| UserProfile::new(uid).with_email(format!("{uid}@example.com"))))
    }

    async fn list_doctors(&self, context: &CallContext) -> Result<Vec<Provider>> {
        let state = self.enter("list_doctors", context)?;
        Ok(state.roster.clone())
    }

    async fn book_appointment(
        &self,
        context: &CallContext,
        record: &BookingRecord,
    ) -> Result<ApiOutcome> {
        let mut state = self.enter("book_appointment", context)?;

        if let Some(outcome) = state.outcome.clone()
            && outcome.error
        {
            return Ok(outcome);
        }

        let appointment = Appointment {
            aptid: format!("apt-{}", state.appointments.len() + 1),
            patid: Some(record.patid.clone()),
            docid: Some(record.docid.clone()),
            patname: Some(record.patname.clone()),
            docname: Some(record.docname.clone()),
            speciality: record.speciality.clone(),
            date: Some(record.date.to_string()),
            time: Some(record.time.to_string()),
            fee: Some(record.fee),
            ..Appointment::default()
        };
        state.appointments.push(appointment);
        state.booked.push(record.clone());

        Ok(state
            .outcome
            .clone()
            .unwrap_or_else(|| ApiOutcome::success(Some("Appointment booked".to_owned()))))
    }

    async fn my_appointments(
        &self,
        context: &CallContext,
        patid: &str,
    ) -> Result<Vec<Appointment>> {
        let state = self.enter("my_appointments", context)?;
        Ok(state
            .appointments
            .iter()
            .filter(|appointment| appointment.patid.as_deref() == Some(patid))
            .cloned()
            .collect())
    }

    async fn cancel_appointment(&self, context: &CallContext, aptid: &str) -> Result<ApiOutcome> {
        let mut state = self.enter("cancel_appointment", context)?;

        match state
            .appointments
            .iter_mut()
            .find(|appointment| appointment.aptid == aptid)
        {
            Some(appointment) if appointment.is_cancellable() => {
                appointment.cancel = true;
                Ok(ApiOutcome::success(Some("Appointment cancelled".to_owned())))
            }
            Some(_) => Ok(ApiOutcome::failure("Appointment can no longer be cancelled")),
            None => Ok(ApiOutcome::failure("Appointment not found")),
        }
    }

    async fn write_feedback(
        &self,
        context: &CallContext,
        request: &FeedbackRequest,
    ) -> Result<ApiOutcome> {
        let mut state = self.enter("write_feedback", context)?;

        let Some(appointment) = state
            .appointments
            .iter_mut()
            .find(|appointment| appointment.aptid == request.aptid)
        else {
            return Ok(ApiOutcome::failure("Appointment not found"));
        };

        if request.is_withdrawal() {
            appointment.feedback = false;
            appointment.review = None;
            appointment.rating = None;
            return Ok(ApiOutcome::success(Some("Feedback deleted".to_owned())));
        }

        if appointment.cancel || !appointment.completed {
            return Ok(ApiOutcome::failure(
                "Feedback is only accepted for completed appointments",
            ));
        }

        appointment.feedback = true;
        appointment.review = request.review.clone();
        appointment.rating = request.rating;
        Ok(ApiOutcome::success(Some("Feedback submitted".to_owned())))
    }

    async fn prescriptions(
        &self,
        context: &CallContext,
        patid: &str,
    ) -> Result<Vec<Prescription>> {
        let state = self.enter("prescriptions", context)?;
        Ok(state
            .prescriptions
            .iter()
            .filter(|prescription| prescription.patid.as_deref() == Some(patid))
            .cloned()
            .collect())
    }

    async fn change_password(
        &self,
        context: &CallContext,
        request: &ChangePasswordRequest,
    ) -> Result<ApiOutcome> {
        let mut state = self.enter("change_password", context)?;

        if state
            .password
            .as_ref()
            .is_some_and(|password| *password != request.current_password)
        {
            return Ok(ApiOutcome::failure("Current password is incorrect"));
        }

        state.password = Some(request.new_password.clone());
        Ok(ApiOutcome::success(Some("Password changed".to_owned())))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
