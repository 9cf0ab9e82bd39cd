// Change Set Workflow - create, upload, poll, fetch

pub mod records;

pub use records::{demo_nodes, demo_psets};

use crate::application::fetch::ResultFetcher;
use crate::application::poller::{CancelToken, ChangeSetPoller, PollConfig, PollReport};
use crate::domain::{
    ChangeRecord, ChangeSetHandle, ChangeSetRequest, ChangeSetStatus, ErrorRecord, ResultRecord,
};
use crate::error::{AppError, Result};
use crate::port::{ChangeSetService, ContentTransfer, JitterSource, TimeProvider};
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of one bulk operation
#[derive(Debug, Clone)]
pub struct WorkflowSummary {
    /// Handle as returned by `create_change_set`
    pub created: ChangeSetHandle,
    pub report: PollReport,
    /// Empty unless the change set finished `Done` with a results URL
    pub results: Vec<ResultRecord>,
    /// Empty unless the change set finished `Done` with an errors URL
    pub errors: Vec<ErrorRecord>,
}

/// Change set workflow (one service, many bulk operations)
pub struct ChangeSetWorkflow {
    service: Arc<dyn ChangeSetService>,
    poller: ChangeSetPoller,
    fetcher: ResultFetcher,
}

impl ChangeSetWorkflow {
    pub fn new(
        service: Arc<dyn ChangeSetService>,
        transfer: Arc<dyn ContentTransfer>,
        time_provider: Arc<dyn TimeProvider>,
        jitter: Arc<dyn JitterSource>,
        config: PollConfig,
    ) -> Result<Self> {
        let poller = ChangeSetPoller::new(
            service.clone(),
            transfer.clone(),
            time_provider,
            jitter,
            config,
        )?;
        Ok(Self {
            service,
            poller,
            fetcher: ResultFetcher::new(transfer),
        })
    }

    /// Run one bulk operation end to end
    ///
    /// # Errors
    /// - AppError::Domain if the request is invalid
    /// - AppError::Submission if the service rejects the change set
    /// - any error of `ChangeSetPoller::run_to_completion`
    /// - AppError::Fetch if a results or errors document cannot be read
    pub async fn run(
        &self,
        request: &ChangeSetRequest,
        records: &[ChangeRecord],
        cancel: Option<CancelToken>,
    ) -> Result<WorkflowSummary> {
        request.validate()?;

        let created = self
            .service
            .create_change_set(request)
            .await
            .map_err(AppError::Submission)?;

        info!(
            service = request.service_name(),
            change_set_id = %created.id,
            status = %created.status,
            "Change set created"
        );

        if created.status != ChangeSetStatus::AwaitingUpload {
            warn!(
                change_set_id = %created.id,
                status = %created.status,
                "Change set is not awaiting upload, nothing to do"
            );
        }

        let report = self
            .poller
            .run_to_completion(created.clone(), records, cancel)
            .await?;

        let mut results = Vec::new();
        let mut errors = Vec::new();
        if report.is_done() {
            if let Some(url) = &report.handle.results_url {
                results = self.fetcher.collect_results(url).await?;
            }
            if let Some(url) = &report.handle.errors_url {
                errors = self.fetcher.collect_errors(url).await?;
            }
        }

        info!(
            change_set_id = %report.handle.id,
            status = %report.handle.status,
            exit = ?report.exit,
            status_checks = report.status_checks,
            elapsed_ms = report.elapsed_ms,
            results = results.len(),
            errors = errors.len(),
            "Change set workflow finished"
        );

        Ok(WorkflowSummary {
            created,
            report,
            results,
            errors,
        })
    }
}
