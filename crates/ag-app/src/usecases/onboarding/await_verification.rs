use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use ag_core::ports::UserProfilePort;
use ag_core::user::UserRecord;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Admin decision observed while polling.
#[derive(Debug, Clone, PartialEq)]
pub enum VerificationOutcome {
    Approved(UserRecord),
    Rejected(UserRecord),
}

/// Polls `GET /users/me` until an admin has decided.
///
/// Fetch failures are logged and polling continues.
pub struct AwaitVerification {
    profile: Arc<dyn UserProfilePort>,
    interval: Duration,
}

impl AwaitVerification {
    pub fn new(profile: Arc<dyn UserProfilePort>) -> Self {
        Self {
            profile,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Returns `None` when cancelled before a decision was seen.
    pub async fn execute(&self, cancel: CancellationToken) -> Option<VerificationOutcome> {
        let span = info_span!("usecase.await_verification.execute", interval = ?self.interval);
        async move {
            let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("verification poll cancelled");
                        return None;
                    }
                    _ = ticker.tick() => {}
                }

                match self.profile.current_user().await {
                    Ok(record) if record.is_approved() => {
                        info!("verification approved");
                        return Some(VerificationOutcome::Approved(record));
                    }
                    Ok(record) if record.is_rejected() => {
                        info!(
                            reason = record.verification_rejected_reason.as_deref().unwrap_or(""),
                            "verification rejected"
                        );
                        return Some(VerificationOutcome::Rejected(record));
                    }
                    Ok(_) => debug!("verification still pending"),
                    Err(err) => warn!(error = %err, "verification poll failed, retrying"),
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ag_core::ids::UserId;
    use ag_core::marketplace::UserSummary;
    use ag_core::ports::ApiError;
    use ag_core::user::{ProfileUpdate, VerificationStatus};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct Scripted(Mutex<VecDeque<Result<UserRecord, ApiError>>>);

    #[async_trait]
    impl UserProfilePort for Scripted {
        async fn current_user(&self) -> Result<UserRecord, ApiError> {
            self.0
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Network("exhausted".into())))
        }
        async fn update_current_user(&self, _: &ProfileUpdate) -> Result<UserRecord, ApiError> {
            unimplemented!()
        }
        async fn user(&self, _: &UserId) -> Result<UserSummary, ApiError> {
            unimplemented!()
        }
    }

    fn pending() -> UserRecord {
        UserRecord::default()
    }

    fn approved() -> UserRecord {
        UserRecord {
            is_verified: true,
            verification_status: VerificationStatus::Approved,
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn keeps_polling_through_failures_until_approved() {
        let profile = Arc::new(Scripted(Mutex::new(VecDeque::from(vec![
            Ok(pending()),
            Err(ApiError::Network("reset".into())),
            Ok(approved()),
        ]))));
        let poll = AwaitVerification::new(profile.clone());

        let started = Instant::now();
        let outcome = poll.execute(CancellationToken::new()).await;

        assert_eq!(outcome, Some(VerificationOutcome::Approved(approved())));
        assert_eq!(started.elapsed(), Duration::from_secs(15));
        assert!(profile.0.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn rejection_stops_the_poll() {
        let rejected = UserRecord {
            verification_status: VerificationStatus::Rejected,
            verification_rejected_reason: Some("blurry ID".into()),
            ..Default::default()
        };
        let profile = Arc::new(Scripted(Mutex::new(VecDeque::from(vec![Ok(
            rejected.clone()
        )]))));

        let outcome = AwaitVerification::new(profile)
            .execute(CancellationToken::new())
            .await;

        assert_eq!(outcome, Some(VerificationOutcome::Rejected(rejected)));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_returns_none() {
        let profile = Arc::new(Scripted(Mutex::new(VecDeque::new())));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = AwaitVerification::new(profile).execute(cancel).await;

        assert_eq!(outcome, None);
    }
}
