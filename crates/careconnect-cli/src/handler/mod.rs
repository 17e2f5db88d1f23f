//! Command execution.

mod output;

use std::time::Duration;

use anyhow::{Context, bail};
use careconnect_core::availability::{AvailabilityQuery, TimeSlot, time_slots};
use careconnect_core::{BackendService, Session, SessionGate};
use careconnect_reqwest::ReqwestClient;
use jiff::civil::Date;
use serde::Serialize;
use tokio::signal::ctrl_c;

use self::output::{
    Output, appointment_lines, prescription_lines, provider_lines, session_line, slot_lines,
};
use crate::TRACING_TARGET_COMMAND;
use crate::config::{Cli, Command};
use crate::store::FileStore;

/// Everything a command needs.
struct Handler {
    service: BackendService,
    output: Output,
    recheck_interval: Duration,
}

/// Builds the session gate and backend client, then runs the command.
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    let store = FileStore::new(&cli.session_file);
    tracing::debug!(
        target: TRACING_TARGET_COMMAND,
        path = %store.path().display(),
        "Using session file"
    );

    let gate = SessionGate::from_config(&cli.session, store);
    let client = ReqwestClient::new(cli.reqwest.clone())
        .map_err(careconnect_core::Error::from)
        .context("invalid backend configuration")?;

    let handler = Handler {
        service: client.into_service(gate),
        output: Output::new(cli.json),
        recheck_interval: cli.session.recheck_interval(),
    };

    tracing::debug!(
        target: TRACING_TARGET_COMMAND,
        command = cli.command.name(),
        "Running command"
    );

    match cli.command {
        Command::Login { email, password } => handler.login(email, password).await,
        Command::Logout => handler.logout(),
        Command::Status { watch: false } => handler.status(),
        Command::Status { watch: true } => handler.watch().await,
        Command::Slots => handler.slots(),
        Command::Doctors { date } => handler.doctors(&date).await,
        Command::Book { doctor, date, time } => handler.book(&doctor, date, time).await,
        Command::Appointments { completed } => handler.appointments(completed).await,
        Command::Cancel { id } => handler.cancel(&id).await,
        Command::Feedback {
            id,
            review,
            rating,
            withdraw,
        } => handler.feedback(&id, review, rating, withdraw).await,
        Command::Prescriptions => handler.prescriptions().await,
        Command::Password {
            current,
            new_password,
        } => handler.change_password(current, new_password).await,
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport {
    session: Session,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<String>,
}

impl Handler {
    fn gate(&self) -> &SessionGate {
        self.service.gate()
    }

    async fn login(&self, email: String, password: String) -> anyhow::Result<()> {
        let session = self
            .service
            .sign_in(email, password)
            .await
            .context("sign-in failed")?;

        self.report(session)
    }

    fn logout(&self) -> anyhow::Result<()> {
        self.service.logout();
        self.output.message("Signed out")
    }

    fn status(&self) -> anyhow::Result<()> {
        self.report(self.gate().check_auth())
    }

    /// Reports session changes until Ctrl+C or the session ends.
    async fn watch(&self) -> anyhow::Result<()> {
        let mut changes = self.gate().subscribe();
        let session = *changes.borrow_and_update();
        self.report(session)?;

        if !session.is_authenticated() {
            return Ok(());
        }

        let monitor = self.gate().spawn_monitor(self.recheck_interval);
        tracing::info!(
            target: TRACING_TARGET_COMMAND,
            recheck_secs = self.recheck_interval.as_secs(),
            "Watching session, press Ctrl+C to stop"
        );

        let result = loop {
            tokio::select! {
                signal = ctrl_c() => {
                    break signal.context("failed to listen for Ctrl+C");
                }
                changed = changes.changed() => {
                    if changed.is_err() {
                        break Ok(());
                    }

                    let session = *changes.borrow_and_update();
                    self.report(session)?;
                    if !session.is_authenticated() {
                        break Ok(());
                    }
                }
            }
        };

        monitor.shutdown().await;
        result
    }

    fn slots(&self) -> anyhow::Result<()> {
        let slots = time_slots();
        self.output.emit(&slots, || slot_lines(&slots))
    }

    async fn doctors(&self, date: &str) -> anyhow::Result<()> {
        let query = AvailabilityQuery::parse(date);
        if query.date.is_none() {
            bail!("invalid date {date:?}, expected YYYY-MM-DD");
        }

        let doctors = self
            .service
            .available_doctors(query)
            .await
            .context("failed to load doctors")?;

        self.output.emit(&doctors, || provider_lines(&doctors))
    }

    async fn book(&self, doctor: &str, date: Date, time: TimeSlot) -> anyhow::Result<()> {
        if !time.is_offered() {
            bail!("{time} is not a bookable slot, see `careconnect slots`");
        }

        let doctors = self
            .service
            .available_doctors(AvailabilityQuery::new(date))
            .await
            .context("failed to load doctors")?;

        let Some(provider) = doctors.iter().find(|provider| provider.id == doctor) else {
            bail!("doctor {doctor} is not available on {date}");
        };

        let message = self
            .service
            .book(provider, Some(date), Some(time))
            .await
            .context("booking failed")?;

        self.output.message(
            message
                .as_deref()
                .unwrap_or("Appointment booked. Please proceed to staff for payment."),
        )
    }

    async fn appointments(&self, completed: bool) -> anyhow::Result<()> {
        let appointments = if completed {
            self.service.completed_appointments().await
        } else {
            self.service.my_appointments().await
        }
        .context("failed to load appointments")?;

        self.output
            .emit(&appointments, || appointment_lines(&appointments))
    }

    async fn cancel(&self, aptid: &str) -> anyhow::Result<()> {
        let message = self
            .service
            .cancel_appointment(aptid)
            .await
            .context("cancellation failed")?;

        self.output
            .message(message.as_deref().unwrap_or("Appointment cancelled"))
    }

    async fn feedback(
        &self,
        aptid: &str,
        review: Option<String>,
        rating: Option<u8>,
        withdraw: bool,
    ) -> anyhow::Result<()> {
        let result = match (withdraw, review, rating) {
            (true, ..) => self.service.withdraw_feedback(aptid).await,
            (false, Some(review), Some(rating)) => {
                self.service.give_feedback(aptid, &review, rating).await
            }
            (false, ..) => bail!("provide both --review and --rating, or --withdraw"),
        };

        let message = result.context("feedback failed")?;
        self.output
            .message(message.as_deref().unwrap_or("Feedback submitted"))
    }

    async fn prescriptions(&self) -> anyhow::Result<()> {
        let prescriptions = self
            .service
            .my_prescriptions()
            .await
            .context("failed to load prescriptions")?;

        self.output
            .emit(&prescriptions, || prescription_lines(&prescriptions))
    }

    async fn change_password(&self, current: String, new_password: String) -> anyhow::Result<()> {
        let message = self
            .service
            .change_password(current, new_password)
            .await
            .context("password change failed")?;

        self.output.message(
            message
                .as_deref()
                .unwrap_or("Password changed. Please sign in again with your new password."),
        )
    }

    fn report(&self, session: Session) -> anyhow::Result<()> {
        let profile = self.gate().profile().filter(|_| session.is_authenticated());
        let claims = self.gate().claims().ok().filter(|_| session.is_authenticated());

        let report = StatusReport {
            session,
            user_id: claims.as_ref().map(|claims| claims.subject_id.clone()),
            name: profile.as_ref().map(|profile| profile.display_name()),
            expires_at: claims.as_ref().map(|claims| claims.expires_at.to_string()),
        };

        self.output.emit(&report, || {
            let mut lines = vec![session_line(session, profile.as_ref())];
            if let Some(expires_at) = &report.expires_at {
                lines.push(format!("Session expires at {expires_at}"));
            }
            lines
        })
    }
}
