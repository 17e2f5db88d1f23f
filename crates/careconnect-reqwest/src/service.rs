//! [`BackendProvider`] implementation over the REST endpoints.

use careconnect_core::backend::{
    BackendProvider, CallContext, ChangePasswordRequest, FeedbackRequest, SignInRequest,
    SignInResponse, SignUpRequest,
};
use careconnect_core::types::{
    ApiOutcome, Appointment, BookingRecord, Prescription, Provider, UserProfile,
};
use reqwest::Method;
use serde::Serialize;

use crate::ReqwestClient;

const SIGN_IN: &str = "api/auth/signin";
const SIGN_UP: &str = "api/auth/signup";
const FIND_USER: &str = "api/user/find";
const LIST_DOCTORS: &str = "api/doctor/all";
const BOOK_APPOINTMENT: &str = "api/appointment/book";
const PATIENT_APPOINTMENTS: &str = "api/appointment/patient";
const CANCEL_APPOINTMENT: &str = "api/appointment/cancel";
const WRITE_FEEDBACK: &str = "api/appointment/feedback";
const PATIENT_PRESCRIPTIONS: &str = "api/prescription/patient";
const CHANGE_PASSWORD: &str = "api/auth/changepassword";

/// The booking endpoint expects the record wrapped in a `FormData` field.
#[derive(Serialize)]
struct BookingEnvelope<'a> {
    #[serde(rename = "FormData")]
    form_data: &'a BookingRecord,
}

#[derive(Serialize)]
struct UserLookup<'a> {
    uid: &'a str,
}

#[derive(Serialize)]
struct PatientLookup<'a> {
    patid: &'a str,
}

#[derive(Serialize)]
struct AppointmentRef<'a> {
    aptid: &'a str,
}

impl ReqwestClient {
    async fn post<B, T>(&self, path: &str, context: &CallContext, body: &B) -> crate::Result<T>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        self.send_json(Method::POST, path, context, Some(body)).await
    }

    async fn get<T>(&self, path: &str, context: &CallContext) -> crate::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.send_json::<(), T>(Method::GET, path, context, None)
            .await
    }
}

#[async_trait::async_trait]
impl BackendProvider for ReqwestClient {
    async fn sign_in(&self, request: &SignInRequest) -> careconnect_core::Result<SignInResponse> {
        Ok(self
            .post(SIGN_IN, &CallContext::anonymous(), request)
            .await?)
    }

    async fn sign_up(&self, request: &SignUpRequest) -> careconnect_core::Result<ApiOutcome> {
        Ok(self
            .post(SIGN_UP, &CallContext::anonymous(), request)
            .await?)
    }

    async fn find_user(
        &self,
        context: &CallContext,
        uid: &str,
    ) -> careconnect_core::Result<UserProfile> {
        Ok(self.post(FIND_USER, context, &UserLookup { uid }).await?)
    }

    async fn list_doctors(&self, context: &CallContext) -> careconnect_core::Result<Vec<Provider>> {
        Ok(self.get(LIST_DOCTORS, context).await?)
    }

    async fn book_appointment(
        &self,
        context: &CallContext,
        record: &BookingRecord,
    ) -> careconnect_core::Result<ApiOutcome> {
        let envelope = BookingEnvelope { form_data: record };
        Ok(self.post(BOOK_APPOINTMENT, context, &envelope).await?)
    }

    async fn my_appointments(
        &self,
        context: &CallContext,
        patid: &str,
    ) -> careconnect_core::Result<Vec<Appointment>> {
        Ok(self
            .post(PATIENT_APPOINTMENTS, context, &PatientLookup { patid })
            .await?)
    }

    async fn cancel_appointment(
        &self,
        context: &CallContext,
        aptid: &str,
    ) -> careconnect_core::Result<ApiOutcome> {
        Ok(self
            .post(CANCEL_APPOINTMENT, context, &AppointmentRef { aptid })
            .await?)
    }

    async fn write_feedback(
        &self,
        context: &CallContext,
        request: &FeedbackRequest,
    ) -> careconnect_core::Result<ApiOutcome> {
        Ok(self.post(WRITE_FEEDBACK, context, request).await?)
    }

    async fn prescriptions(
        &self,
        context: &CallContext,
        patid: &str,
    ) -> careconnect_core::Result<Vec<Prescription>> {
        Ok(self
            .post(PATIENT_PRESCRIPTIONS, context, &PatientLookup { patid })
            .await?)
    }

    async fn change_password(
        &self,
        context: &CallContext,
        request: &ChangePasswordRequest,
    ) -> careconnect_core::Result<ApiOutcome> {
        Ok(self.post(CHANGE_PASSWORD, context, request).await?)
    }
}
