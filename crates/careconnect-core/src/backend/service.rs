//! Backend service wrapper with session handling and observability.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use jiff::civil::Date;

use super::{
    BackendProvider, CallContext, ChangePasswordRequest, FeedbackRequest, MIN_PASSWORD_LENGTH,
    SignInRequest, SignUpRequest, TRACING_TARGET,
};
use crate::availability::{AvailabilityQuery, TimeSlot, available_providers, build_booking_record};
use crate::session::{Session, SessionGate};
use crate::types::{Appointment, AppointmentStatus, Prescription, Provider, UserProfile};
use crate::{Error, ErrorKind, Result};

/// Backend wrapper tying a [`BackendProvider`] to a [`SessionGate`].
///
/// Every authenticated call carries the gate's current credential. A 401
/// logs the session out once and is returned to the caller as
/// [`ErrorKind::AuthorizationDenied`]; the request is never retried.
/// Cloning is cheap; clones share the provider and the gate.
#[derive(Clone)]
pub struct BackendService {
    inner: Arc<dyn BackendProvider>,
    gate: SessionGate,
}

impl fmt::Debug for BackendService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendService")
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

impl BackendService {
    /// Creates a new backend service wrapper.
    pub fn new<P>(provider: P, gate: SessionGate) -> Self
    where
        P: BackendProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
            gate,
        }
    }

    /// Returns the session gate this service reports to.
    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    /// Signs in, stores the issued credential and caches the user profile.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::Decode`] if the backend issues a credential
    /// the gate cannot use, and with [`ErrorKind::AuthorizationDenied`] if
    /// the backend refuses the new credential on the profile fetch. Other
    /// profile fetch failures are logged and leave the session in place.
    pub async fn sign_in(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Session> {
        let request = SignInRequest::new(email, password);
        let response = self
            .observe("sign_in", self.inner.sign_in(&request))
            .await?;

        let session = self.gate.login(response.access_token);
        if !session.is_authenticated() {
            return Err(Error::decode()
                .with_message("Backend issued an unusable credential")
                .with_context("sign_in"));
        }

        if let Err(error) = self.refresh_profile().await {
            if error.kind == ErrorKind::AuthorizationDenied {
                return Err(error);
            }

            tracing::warn!(
                target: TRACING_TARGET,
                error = %error,
                "Signed in but could not load the user profile"
            );
        }

        Ok(self.gate.session())
    }

    /// Registers a new account.
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<Option<String>> {
        self.observe("sign_up", self.inner.sign_up(request))
            .await?
            .into_result()
    }

    /// Ends the current session.
    pub fn logout(&self) {
        self.gate.logout();
    }

    /// Fetches the signed-in user's profile and caches it on the gate.
    pub async fn refresh_profile(&self) -> Result<UserProfile> {
        let context = self.context()?;
        let claims = self.gate.claims()?;
        let profile = self
            .guard(
                "find_user",
                self.inner.find_user(&context, &claims.subject_id),
            )
            .await?;

        self.gate.set_profile(profile.clone())?;
        Ok(profile)
    }

    /// Returns the cached profile, fetching it if needed.
    pub async fn profile(&self) -> Result<UserProfile> {
        match self.gate.profile() {
            Some(profile) => Ok(profile),
            None => self.refresh_profile().await,
        }
    }

    /// Fetches the full doctor roster.
    pub async fn list_doctors(&self) -> Result<Vec<Provider>> {
        let context = self.context()?;
        self.guard("list_doctors", self.inner.list_doctors(&context))
            .await
    }

    /// Fetches the roster and keeps the doctors working on the query date.
    ///
    /// An unset date yields nothing without contacting the backend.
    pub async fn available_doctors(&self, query: AvailabilityQuery) -> Result<Vec<Provider>> {
        if query.date.is_none() {
            return Ok(Vec::new());
        }

        let roster = self.list_doctors().await?;
        Ok(available_providers(&roster, query.date)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Books an appointment for the signed-in user.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::Validation`] when a field is missing or the
    /// signed-in role cannot book, and [`ErrorKind::Rejected`] when the
    /// backend refuses the booking.
    pub async fn book(
        &self,
        provider: &Provider,
        date: Option<Date>,
        time: Option<TimeSlot>,
    ) -> Result<Option<String>> {
        self.ensure_can_book()?;
        let patient = self.profile().await?;

        self.book_for(Some(&patient), Some(provider), date, time)
            .await
    }

    /// Books an appointment on behalf of `patient` (front-desk flow).
    pub async fn book_for(
        &self,
        patient: Option<&UserProfile>,
        provider: Option<&Provider>,
        date: Option<Date>,
        time: Option<TimeSlot>,
    ) -> Result<Option<String>> {
        self.ensure_can_book()?;
        let record = build_booking_record(patient, provider, date, time)?;
        let context = self.context()?;

        self.guard(
            "book_appointment",
            self.inner.book_appointment(&context, &record),
        )
        .await?
        .into_result()
    }

    /// Lists the signed-in patient's appointments.
    pub async fn my_appointments(&self) -> Result<Vec<Appointment>> {
        let context = self.context()?;
        let profile = self.profile().await?;
        self.guard(
            "my_appointments",
            self.inner.my_appointments(&context, &profile.uid),
        )
        .await
    }

    /// Cancels an appointment.
    pub async fn cancel_appointment(&self, aptid: &str) -> Result<Option<String>> {
        let context = self.context()?;
        self.guard(
            "cancel_appointment",
            self.inner.cancel_appointment(&context, aptid),
        )
        .await?
        .into_result()
    }

    /// Lists the signed-in patient's completed appointments, the ones
    /// feedback can be left on.
    pub async fn completed_appointments(&self) -> Result<Vec<Appointment>> {
        let mut appointments = self.my_appointments().await?;
        appointments.retain(|appointment| appointment.status() == AppointmentStatus::Completed);
        Ok(appointments)
    }

    /// Reviews a completed appointment.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::Validation`] for an empty review or a rating
    /// outside 1 to 5, and [`ErrorKind::Rejected`] when the backend refuses.
    pub async fn give_feedback(
        &self,
        aptid: &str,
        review: &str,
        rating: u8,
    ) -> Result<Option<String>> {
        let review = review.trim();
        if review.is_empty() {
            return Err(Error::validation().with_message("Please write a review"));
        }
        if !(1..=5).contains(&rating) {
            return Err(Error::validation().with_message("Rating must be between 1 and 5"));
        }

        self.write_feedback(&FeedbackRequest::submit(aptid, review, rating))
            .await
    }

    /// Withdraws the review left on an appointment.
    pub async fn withdraw_feedback(&self, aptid: &str) -> Result<Option<String>> {
        self.write_feedback(&FeedbackRequest::withdraw(aptid))
            .await
    }

    /// Lists the signed-in patient's prescriptions.
    pub async fn my_prescriptions(&self) -> Result<Vec<Prescription>> {
        let context = self.context()?;
        let profile = self.profile().await?;
        self.guard(
            "prescriptions",
            self.inner.prescriptions(&context, &profile.uid),
        )
        .await
    }

    /// Changes the signed-in user's password and ends the session.
    ///
    /// The credential issued for the old password is discarded once the
    /// backend accepts the change; sign in again with the new password.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::Validation`] for a new password shorter than
    /// [`MIN_PASSWORD_LENGTH`] or a profile without an email, and
    /// [`ErrorKind::Rejected`] when the backend refuses the change.
    pub async fn change_password(
        &self,
        current_password: impl Into<String>,
        new_password: impl Into<String>,
    ) -> Result<Option<String>> {
        let context = self.context()?;

        let new_password = new_password.into();
        if new_password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(Error::validation().with_message(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let email = self
            .profile()
            .await?
            .email
            .filter(|email| !email.trim().is_empty())
            .ok_or_else(|| Error::validation().with_message("Profile has no email address"))?;

        let request = ChangePasswordRequest {
            email,
            current_password: current_password.into(),
            new_password,
        };

        let message = self
            .guard(
                "change_password",
                self.inner.change_password(&context, &request),
            )
            .await?
            .into_result()?;

        tracing::info!(target: TRACING_TARGET, "Password changed, signing out");
        self.gate.logout();
        Ok(message)
    }

    async fn write_feedback(&self, request: &FeedbackRequest) -> Result<Option<String>> {
        let context = self.context()?;
        self.guard("write_feedback", self.inner.write_feedback(&context, request))
            .await?
            .into_result()
    }

    fn ensure_can_book(&self) -> Result<()> {
        match self.gate.session().role() {
            None => Err(Error::authorization_denied().with_message("Not signed in")),
            Some(role) if role.can_book() => Ok(()),
            Some(role) => Err(Error::validation()
                .with_message(format!("{role} accounts cannot book appointments"))),
        }
    }

    fn context(&self) -> Result<CallContext> {
        if !self.gate.session().is_authenticated() {
            return Err(Error::authorization_denied().with_message("Not signed in"));
        }

        self.gate
            .credential()
            .map(CallContext::with_credential)
            .ok_or_else(|| Error::authorization_denied().with_message("Not signed in"))
    }

    /// Runs an authenticated call, ending the session on a 401.
    async fn guard<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let result = self.observe(operation, call).await;

        if let Err(error) = &result
            && error.kind == ErrorKind::AuthorizationDenied
        {
            self.gate.handle_authorization_denied();
        }

        result
    }

    async fn observe<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let started_at = Instant::now();
        tracing::debug!(target: TRACING_TARGET, operation, "Calling backend");

        let result = call.await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(_) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    operation,
                    elapsed_ms = elapsed.as_millis(),
                    "Backend call succeeded"
                );
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    operation,
                    kind = %error.kind,
                    error = %error,
                    elapsed_ms = elapsed.as_millis(),
                    "Backend call failed"
                );
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use jiff::{SignedDuration, Timestamp};

    use super::*;
    use crate::mock::{MockBackend, mint_token};
    use crate::session::MemoryStore;
    use crate::types::{ApiOutcome, Role, WorkDay};

    fn token(role: Role) -> String {
        mint_token("pat-1", role, Timestamp::now() + SignedDuration::from_hours(1))
    }

    fn roster() -> Vec<Provider> {
        vec![
            Provider::new("1").with_name("Jane", "Doe").with_work_days([WorkDay::Mon, WorkDay::Wed]),
            Provider::new("2").with_name("John", "Roe").with_work_days([WorkDay::Tue]),
        ]
    }

    fn service(backend: &MockBackend) -> BackendService {
        BackendService::new(backend.clone(), SessionGate::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_sign_in_stores_session_and_profile() {
        let backend = MockBackend::new()
            .with_token(token(Role::Patient))
            .with_profile(UserProfile::new("pat-1").with_name("Ada", "Lovelace"));
        let service = service(&backend);

        let session = service.sign_in("ada@example.com", "pw").await.unwrap();
        assert_eq!(session, Session::Authenticated(Role::Patient));
        assert_eq!(service.gate().profile().unwrap().uid, "pat-1");
    }

    #[tokio::test]
    async fn test_sign_in_ends_when_profile_fetch_is_denied() {
        let backend = MockBackend::new().with_token(token(Role::Patient));
        let service = service(&backend);

        backend.deny_next();
        let error = service.sign_in("a@b.c", "pw").await.unwrap_err();

        assert_eq!(error.kind, ErrorKind::AuthorizationDenied);
        assert_eq!(backend.calls("find_user"), 1);
        assert_eq!(service.gate().session(), Session::Unauthenticated);
        assert_eq!(service.gate().credential(), None);
        assert!(service.gate().profile().is_none());
    }

    #[tokio::test]
    async fn test_sign_in_with_unusable_token() {
        let backend = MockBackend::new().with_token("garbage");
        let service = service(&backend);

        let error = service.sign_in("a@b.c", "pw").await.unwrap_err();
        assert_eq!(error.kind, ErrorKind::Decode);
        assert_eq!(service.gate().session(), Session::Unauthenticated);
    }

    #[tokio::test]
    async fn test_calls_require_session() {
        let backend = MockBackend::new().with_roster(roster());
        let service = service(&backend);

        let error = service.list_doctors().await.unwrap_err();
        assert_eq!(error.kind, ErrorKind::AuthorizationDenied);
        assert_eq!(backend.calls("list_doctors"), 0);
    }

    #[tokio::test]
    async fn test_available_doctors_on_wednesday() {
        let backend = MockBackend::new()
            .with_token(token(Role::Patient))
            .with_roster(roster());
        let service = service(&backend);
        service.sign_in("a@b.c", "pw").await.unwrap();

        let doctors = service
            .available_doctors(AvailabilityQuery::new(date(2024, 5, 1)))
            .await
            .unwrap();
        let ids: Vec<&str> = doctors.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["1"]);
    }

    #[tokio::test]
    async fn test_available_doctors_without_date_skips_fetch() {
        let backend = MockBackend::new()
            .with_token(token(Role::Patient))
            .with_roster(roster());
        let service = service(&backend);
        service.sign_in("a@b.c", "pw").await.unwrap();

        let doctors = service
            .available_doctors(AvailabilityQuery::parse("not a date"))
            .await
            .unwrap();
        assert!(doctors.is_empty());
        assert_eq!(backend.calls("list_doctors"), 0);
    }

    #[tokio::test]
    async fn test_unauthorized_logs_out_once_without_retry() {
        let backend = MockBackend::new()
            .with_token(token(Role::Patient))
            .with_roster(roster());
        let service = service(&backend);
        service.sign_in("a@b.c", "pw").await.unwrap();
        let mut receiver = service.gate().subscribe();

        backend.deny_next();
        let error = service.list_doctors().await.unwrap_err();

        assert_eq!(error.kind, ErrorKind::AuthorizationDenied);
        assert_eq!(backend.calls("list_doctors"), 1);
        assert_eq!(service.gate().session(), Session::Unauthenticated);
        assert_eq!(service.gate().credential(), None);
        assert!(receiver.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_book_sends_record_with_default_fee() {
        let backend = MockBackend::new()
            .with_token(token(Role::Patient))
            .with_profile(UserProfile::new("pat-1").with_name("Ada", "Lovelace"));
        let service = service(&backend);
        service.sign_in("a@b.c", "pw").await.unwrap();

        let provider = Provider::new("7").with_work_days([WorkDay::Wed]);
        service
            .book(&provider, Some(date(2024, 5, 1)), Some("9:00 AM".parse().unwrap()))
            .await
            .unwrap();

        let booked = backend.booked();
        assert_eq!(booked.len(), 1);
        assert_eq!(booked[0].fee, 500);
        assert_eq!(booked[0].patid, "pat-1");
        assert_eq!(booked[0].patname, "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_book_without_date_is_validation_error() {
        let backend = MockBackend::new().with_token(token(Role::Patient));
        let service = service(&backend);
        service.sign_in("a@b.c", "pw").await.unwrap();

        let error = service
            .book(&Provider::new("7"), None, Some("9:00 AM".parse().unwrap()))
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::Validation);
        assert!(backend.booked().is_empty());
    }

    #[tokio::test]
    async fn test_book_rejected_by_backend() {
        let backend = MockBackend::new()
            .with_token(token(Role::Patient))
            .with_outcome(ApiOutcome::failure("Slot already taken"));
        let service = service(&backend);
        service.sign_in("a@b.c", "pw").await.unwrap();

        let error = service
            .book(
                &Provider::new("7"),
                Some(date(2024, 5, 1)),
                Some("9:00 AM".parse().unwrap()),
            )
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::Rejected);
        assert_eq!(error.message.as_deref(), Some("Slot already taken"));
        assert!(service.gate().session().is_authenticated());
    }

    #[tokio::test]
    async fn test_book_for_without_patient() {
        let backend = MockBackend::new().with_token(token(Role::Staff));
        let service = service(&backend);
        service.sign_in("a@b.c", "pw").await.unwrap();

        let error = service
            .book_for(
                None,
                Some(&Provider::new("7")),
                Some(date(2024, 5, 1)),
                Some("9:00 AM".parse().unwrap()),
            )
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_my_appointments_and_cancel() {
        let backend = MockBackend::new().with_token(token(Role::Patient));
        let service = service(&backend);
        service.sign_in("a@b.c", "pw").await.unwrap();

        service
            .book(
                &Provider::new("7"),
                Some(date(2024, 5, 1)),
                Some("10:30 AM".parse().unwrap()),
            )
            .await
            .unwrap();

        let appointments = service.my_appointments().await.unwrap();
        assert_eq!(appointments.len(), 1);
        assert!(appointments[0].is_cancellable());

        service
            .cancel_appointment(&appointments[0].aptid)
            .await
            .unwrap();
        let appointments = service.my_appointments().await.unwrap();
        assert!(!appointments[0].is_cancellable());
    }

    #[tokio::test]
    async fn test_logout_clears_profile() {
        let backend = MockBackend::new().with_token(token(Role::Patient));
        let service = service(&backend);
        service.sign_in("a@b.c", "pw").await.unwrap();
        assert!(service.gate().profile().is_some());

        service.logout();
        assert!(service.gate().profile().is_none());
        assert_eq!(
            service.my_appointments().await.unwrap_err().kind,
            ErrorKind::AuthorizationDenied
        );
        assert_eq!(
            service.refresh_profile().await.unwrap_err().kind,
            ErrorKind::AuthorizationDenied
        );
        assert_eq!(backend.calls("find_user"), 1);
        assert_eq!(backend.calls("my_appointments"), 0);
    }

    #[tokio::test]
    async fn test_only_patients_and_staff_book() {
        for role in [Role::Doctor, Role::Admin] {
            let backend = MockBackend::new().with_token(token(role));
            let service = service(&backend);
            service.sign_in("a@b.c", "pw").await.unwrap();

            let error = service
                .book(
                    &Provider::new("7"),
                    Some(date(2024, 5, 1)),
                    Some("9:00 AM".parse().unwrap()),
                )
                .await
                .unwrap_err();

            assert_eq!(error.kind, ErrorKind::Validation);
            assert_eq!(backend.calls("book_appointment"), 0);
            assert!(service.gate().session().is_authenticated());
        }
    }

    #[tokio::test]
    async fn test_book_requires_session() {
        let backend = MockBackend::new();
        let service = service(&backend);

        let error = service
            .book(
                &Provider::new("7"),
                Some(date(2024, 5, 1)),
                Some("9:00 AM".parse().unwrap()),
            )
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::AuthorizationDenied);
        assert_eq!(backend.calls("find_user"), 0);
    }

    fn finished_visit(aptid: &str) -> Appointment {
        Appointment {
            aptid: aptid.to_owned(),
            patid: Some("pat-1".to_owned()),
            docname: Some("Dr. Jane Doe".to_owned()),
            completed: true,
            ..Appointment::default()
        }
    }

    #[tokio::test]
    async fn test_feedback_on_completed_appointment() {
        let backend = MockBackend::new()
            .with_token(token(Role::Patient))
            .with_appointments(vec![
                finished_visit("apt-1"),
                Appointment {
                    aptid: "apt-2".to_owned(),
                    patid: Some("pat-1".to_owned()),
                    ..Appointment::default()
                },
            ]);
        let service = service(&backend);
        service.sign_in("a@b.c", "pw").await.unwrap();

        let completed = service.completed_appointments().await.unwrap();
        assert_eq!(completed.len(), 1);
        assert!(completed[0].awaits_feedback());

        service
            .give_feedback("apt-1", "Very thorough", 5)
            .await
            .unwrap();
        let completed = service.completed_appointments().await.unwrap();
        assert!(completed[0].feedback);
        assert_eq!(completed[0].rating, Some(5));

        service.withdraw_feedback("apt-1").await.unwrap();
        let completed = service.completed_appointments().await.unwrap();
        assert!(completed[0].awaits_feedback());

        let error = service
            .give_feedback("apt-2", "Too early", 4)
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::Rejected);
    }

    #[tokio::test]
    async fn test_feedback_validation() {
        let backend = MockBackend::new().with_token(token(Role::Patient));
        let service = service(&backend);
        service.sign_in("a@b.c", "pw").await.unwrap();

        for (review, rating) in [("  ", 4), ("Fine", 0), ("Fine", 6)] {
            let error = service
                .give_feedback("apt-1", review, rating)
                .await
                .unwrap_err();
            assert_eq!(error.kind, ErrorKind::Validation);
        }
        assert_eq!(backend.calls("write_feedback"), 0);
    }

    #[tokio::test]
    async fn test_my_prescriptions() {
        let backend = MockBackend::new()
            .with_token(token(Role::Patient))
            .with_prescriptions(vec![
                Prescription {
                    patid: Some("pat-1".to_owned()),
                    docname: Some("Dr. Jane Doe".to_owned()),
                    prescribed: true,
                    file: Some("https://files.example.com/rx/1.pdf".to_owned()),
                    ..Prescription::default()
                },
                Prescription {
                    patid: Some("pat-2".to_owned()),
                    ..Prescription::default()
                },
            ]);
        let service = service(&backend);

        let error = service.my_prescriptions().await.unwrap_err();
        assert_eq!(error.kind, ErrorKind::AuthorizationDenied);

        service.sign_in("a@b.c", "pw").await.unwrap();
        let prescriptions = service.my_prescriptions().await.unwrap();
        assert_eq!(prescriptions.len(), 1);
        assert!(prescriptions[0].download_url().is_some());
    }

    #[tokio::test]
    async fn test_change_password_signs_out() {
        let backend = MockBackend::new()
            .with_token(token(Role::Patient))
            .with_password("old-secret");
        let service = service(&backend);
        service.sign_in("a@b.c", "pw").await.unwrap();

        let error = service
            .change_password("old-secret", "short")
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::Validation);
        assert_eq!(backend.calls("change_password"), 0);

        let error = service
            .change_password("wrong", "new-secret")
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::Rejected);
        assert!(service.gate().session().is_authenticated());

        service
            .change_password("old-secret", "new-secret")
            .await
            .unwrap();
        assert_eq!(service.gate().session(), Session::Unauthenticated);
        assert_eq!(service.gate().credential(), None);
    }
}
