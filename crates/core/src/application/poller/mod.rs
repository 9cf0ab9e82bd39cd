// Change Set Poller - upload then poll until terminal status or timeout

mod cancel;
pub mod config;
pub mod constants;

pub use cancel::{cancel_channel, CancelSender, CancelToken};
pub use config::PollConfig;

use crate::application::backoff::{BackoffPolicy, BackoffState};
use crate::domain::{ChangeRecord, ChangeSetHandle, ChangeSetStatus, DomainError};
use crate::error::{AppError, Result};
use crate::port::{ChangeSetService, ContentTransfer, JitterSource, TimeProvider};
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Why the poll loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollExit {
    /// Handle was not awaiting upload; nothing was uploaded or polled
    NotAwaitingUpload,
    /// Service reported a terminal status
    Terminal,
    /// Budget exhausted while the status was still in flight
    TimedOut,
    /// Caller cancelled the poll
    Cancelled,
}

/// Outcome of one `run_to_completion` call
#[derive(Debug, Clone)]
pub struct PollReport {
    /// Last observed snapshot (status is whatever the service last reported)
    pub handle: ChangeSetHandle,
    pub exit: PollExit,
    pub status_checks: u32,
    pub elapsed_ms: i64,
}

impl PollReport {
    /// Terminal with status Done (results and errors may be fetched)
    pub fn is_done(&self) -> bool {
        self.exit == PollExit::Terminal && self.handle.status == ChangeSetStatus::Done
    }

    pub fn timed_out(&self) -> bool {
        self.exit == PollExit::TimedOut
    }
}

/// Drives an uploaded change set to a terminal status
///
/// One poller may serve many change sets concurrently: the backoff state lives
/// on the stack of each `run_to_completion` call.
pub struct ChangeSetPoller {
    service: Arc<dyn ChangeSetService>,
    transfer: Arc<dyn ContentTransfer>,
    time_provider: Arc<dyn TimeProvider>,
    backoff: BackoffPolicy,
    config: PollConfig,
}

impl ChangeSetPoller {
    /// Create a new poller
    ///
    /// # Errors
    /// - AppError::Config if `config` does not validate
    pub fn new(
        service: Arc<dyn ChangeSetService>,
        transfer: Arc<dyn ContentTransfer>,
        time_provider: Arc<dyn TimeProvider>,
        jitter: Arc<dyn JitterSource>,
        config: PollConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            service,
            transfer,
            time_provider,
            backoff: BackoffPolicy::new(&config, jitter),
            config,
        })
    }

    /// Upload `records` and poll the change set until it leaves the in-flight set
    ///
    /// Returns the handle unchanged (exit `NotAwaitingUpload`) if it is not
    /// awaiting upload. A timeout is a normal return (exit `TimedOut`), not an
    /// error.
    ///
    /// # Errors
    /// - AppError::Domain if the handle awaits upload but has no upload URL
    /// - AppError::Upload if the upload fails (no status check is made)
    /// - AppError::StatusCheck once more than `max_status_errors` consecutive
    ///   status checks fail
    pub async fn run_to_completion(
        &self,
        handle: ChangeSetHandle,
        records: &[ChangeRecord],
        mut cancel: Option<CancelToken>,
    ) -> Result<PollReport> {
        if handle.status != ChangeSetStatus::AwaitingUpload {
            debug!(
                change_set_id = %handle.id,
                status = %handle.status,
                "Change set not awaiting upload, skipping"
            );
            return Ok(PollReport {
                handle,
                exit: PollExit::NotAwaitingUpload,
                status_checks: 0,
                elapsed_ms: 0,
            });
        }

        let upload_url = handle
            .upload_url
            .clone()
            .ok_or_else(|| DomainError::MissingUrl {
                id: handle.id.clone(),
                field: "upload_url",
            })?;

        info!(
            change_set_id = %handle.id,
            records = records.len(),
            "Uploading change set contents"
        );
        self.transfer
            .upload_ndjson(&upload_url, records)
            .await
            .map_err(AppError::Upload)?;

        // Budget covers polling only
        let started_at = self.time_provider.now_millis();

        let id = handle.id.clone();
        let mut current = handle;
        let mut state = self.backoff.start();
        let mut status_checks = 0u32;
        let mut consecutive_errors = 0u32;

        loop {
            let elapsed_ms = self.time_provider.now_millis() - started_at;

            if cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
                info!(change_set_id = %id, "Change set poll cancelled");
                return Ok(Self::report(current, PollExit::Cancelled, status_checks, elapsed_ms));
            }

            debug!(
                change_set_id = %id,
                wait_ms = state.interval_ms(),
                "Waiting before status check"
            );
            if !Self::wait(&state, cancel.as_mut()).await {
                let elapsed_ms = self.time_provider.now_millis() - started_at;
                info!(change_set_id = %id, "Change set poll cancelled while waiting");
                return Ok(Self::report(current, PollExit::Cancelled, status_checks, elapsed_ms));
            }

            status_checks += 1;
            match self.service.get_change_set_status(&id).await {
                Ok(snapshot) => {
                    consecutive_errors = 0;
                    info!(
                        change_set_id = %id,
                        status = %snapshot.status,
                        check = status_checks,
                        "Change set status"
                    );
                    current = snapshot;
                }
                Err(e) => {
                    consecutive_errors += 1;
                    if consecutive_errors > self.config.max_status_errors {
                        return Err(AppError::StatusCheck(e));
                    }
                    warn!(
                        change_set_id = %id,
                        error = %e,
                        consecutive_errors = consecutive_errors,
                        max_status_errors = self.config.max_status_errors,
                        "Status check failed, retrying on backoff schedule"
                    );
                }
            }

            self.backoff.advance(&mut state);

            let elapsed_ms = self.time_provider.now_millis() - started_at;
            if current.status.is_terminal() {
                return Ok(Self::report(current, PollExit::Terminal, status_checks, elapsed_ms));
            }
            // Inclusive: a check that ends exactly on the budget still loops
            if elapsed_ms.max(0) as u64 > self.config.timeout_ms {
                warn!(
                    change_set_id = %id,
                    status = %current.status,
                    elapsed_ms = elapsed_ms,
                    timeout_ms = self.config.timeout_ms,
                    "Change set did not finish within timeout"
                );
                return Ok(Self::report(current, PollExit::TimedOut, status_checks, elapsed_ms));
            }
        }
    }

    /// Sleep for the current interval; false if cancelled first
    async fn wait(state: &BackoffState, cancel: Option<&mut CancelToken>) -> bool {
        match cancel {
            Some(token) => {
                tokio::select! {
                    _ = sleep(state.interval()) => true,
                    _ = token.cancelled() => false,
                }
            }
            None => {
                sleep(state.interval()).await;
                true
            }
        }
    }

    fn report(
        handle: ChangeSetHandle,
        exit: PollExit,
        status_checks: u32,
        elapsed_ms: i64,
    ) -> PollReport {
        PollReport {
            handle,
            exit,
            status_checks,
            elapsed_ms,
        }
    }
}
