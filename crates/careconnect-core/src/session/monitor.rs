//! Timer-driven session re-checks.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::{SessionGate, TRACING_TARGET};

/// Handle to a task that periodically re-runs
/// [`SessionGate::check_auth`].
///
/// The task stops when the handle is dropped or
/// [`shutdown`](Self::shutdown) is awaited.
#[derive(Debug)]
pub struct SessionMonitor {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl SessionMonitor {
    pub(crate) fn spawn(gate: SessionGate, period: Duration) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tracing::debug!(
            target: TRACING_TARGET,
            period_secs = period.as_secs(),
            "Starting session monitor"
        );

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let session = gate.check_auth();
                        tracing::trace!(
                            target: TRACING_TARGET,
                            authenticated = session.is_authenticated(),
                            "Periodic session re-check"
                        );
                    }
                }
            }

            tracing::debug!(target: TRACING_TARGET, "Session monitor stopped");
        });

        Self { cancel, handle }
    }

    /// Returns `true` while the re-check task is alive.
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stops the task and waits for it to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Err(error) = (&mut self.handle).await {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %error,
                "Session monitor task failed"
            );
        }
    }
}

impl Drop for SessionMonitor {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use jiff::{SignedDuration, Timestamp};

    use super::*;
    use crate::mock::{FixedClock, mint_token};
    use crate::session::{Clock, MemoryStore, Session};
    use crate::types::Role;

    fn gate(clock: &FixedClock) -> SessionGate {
        let expires_at = clock.now() + SignedDuration::from_mins(2);
        let token = mint_token("user-1", Role::Patient, expires_at);
        SessionGate::builder(MemoryStore::with_credential(token))
            .with_clock(clock.clone())
            .build()
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_detected_without_interaction() {
        let clock = FixedClock::new(Timestamp::from_second(1_714_550_400).unwrap());
        let gate = gate(&clock);
        let mut receiver = gate.subscribe();
        assert!(gate.session().is_authenticated());

        let monitor = gate.spawn_monitor(Duration::from_secs(60));
        clock.advance(SignedDuration::from_mins(5));

        tokio::time::timeout(Duration::from_secs(120), receiver.changed())
            .await
            .expect("monitor should re-check within two periods")
            .unwrap();
        assert_eq!(*receiver.borrow(), Session::Unauthenticated);

        monitor.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_valid_session_is_kept() {
        let clock = FixedClock::new(Timestamp::from_second(1_714_550_400).unwrap());
        let gate = gate(&clock);

        let monitor = gate.spawn_monitor(Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(181)).await;

        assert_eq!(gate.session(), Session::Authenticated(Role::Patient));
        assert!(monitor.is_running());
        monitor.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_task() {
        let clock = FixedClock::new(Timestamp::from_second(1_714_550_400).unwrap());
        let gate = gate(&clock);

        let monitor = gate.spawn_monitor(Duration::from_secs(60));
        monitor.shutdown().await;

        clock.advance(SignedDuration::from_mins(5));
        tokio::time::sleep(Duration::from_secs(300)).await;
        assert!(gate.session().is_authenticated());
    }
}
