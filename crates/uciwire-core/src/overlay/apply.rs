// ── Apply/confirm protocol ──
//
// `uci apply` with rollback arms a timer on the router: unless `uci confirm`
// arrives before it fires, the previous configuration is restored. The
// overlay applies, waits briefly, then polls confirm until it succeeds or
// the deadline passes. It never issues a rollback itself.

use std::collections::BTreeMap;
use std::time::Duration;

use strum::Display;
use tokio::sync::watch;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use super::Overlay;
use crate::error::CoreError;
use crate::model::Change;
use crate::remote::ConfigService;

/// Progress of the most recent [`Overlay::apply`], observable through
/// [`Overlay::apply_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ApplyState {
    Idle,
    Applying,
    AwaitingConfirmation,
    Confirmed,
    /// Gave up confirming; the remote is expected to roll back on its own.
    RolledBack,
}

impl<S: ConfigService> Overlay<S> {
    pub fn apply_state(&self) -> watch::Receiver<ApplyState> {
        self.inner.apply_state.subscribe()
    }

    fn publish(&self, state: ApplyState) {
        debug!(%state, "apply state");
        self.inner.apply_state.send_replace(state);
    }

    /// Activate saved changes with a rollback window of `timeout` (default
    /// 10s; anything under a second falls back to the default) and confirm
    /// them before the window closes.
    pub async fn apply(&self, timeout: Option<Duration>) -> Result<(), CoreError> {
        let settings = self.inner.apply_settings;
        let timeout = settings.effective_timeout(timeout);

        self.publish(ApplyState::Applying);
        let status = match self.inner.service.apply(timeout.as_secs(), true).await {
            Ok(status) => status,
            Err(e) => {
                self.publish(ApplyState::Idle);
                return Err(e);
            }
        };
        if !status.is_ok() {
            self.publish(ApplyState::Idle);
            return Err(CoreError::ApplyRejected { status });
        }

        let deadline = Instant::now() + timeout;
        self.publish(ApplyState::AwaitingConfirmation);
        sleep(settings.confirm_delay).await;

        loop {
            let status = match self.inner.service.confirm().await {
                Ok(status) => status,
                Err(e) => {
                    warn!(error = %e, "confirm failed, remote will roll back");
                    self.publish(ApplyState::RolledBack);
                    return Err(e);
                }
            };

            if status.is_ok() {
                info!("configuration changes confirmed");
                self.publish(ApplyState::Confirmed);
                return Ok(());
            }
            if Instant::now() >= deadline {
                warn!(%status, "confirm deadline passed, remote will roll back");
                self.publish(ApplyState::RolledBack);
                return Err(CoreError::ConfirmTimeout { status });
            }

            sleep(settings.confirm_interval).await;
        }
    }

    /// Saved but uncommitted changes as the remote reports them.
    pub async fn changes(&self) -> Result<BTreeMap<String, Vec<Change>>, CoreError> {
        self.inner.service.changes().await
    }
}
