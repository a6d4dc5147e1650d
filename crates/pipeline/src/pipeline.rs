use runlog_core::{
    format_log_content, normalize, BalanceSnapshot, PerRegion, Region, RegionExecution, ReportId,
    ReportStatus,
};
use runlog_llm::ModelClient;
use runlog_storage::{LogStore, RawExecution, ReportStore, StorageError};
use tracing::{error, info, warn};

use crate::error::PipelineError;
use crate::outcome::ReportOutcome;

/// Fetch the latest execution of every region, in [`Region::ALL`] order.
pub async fn fetch_latest_executions(
    logs: &dyn LogStore,
) -> Result<PerRegion<Option<RawExecution>>, StorageError> {
    let mut raw = PerRegion::<Option<RawExecution>>::default();
    for region in Region::ALL {
        let exec = logs.fetch_latest(region).await?;
        match &exec {
            Some(exec) => info!(
                region = %region,
                execution_id = %exec.execution_id,
                rows = exec.rows.len(),
                "Fetched latest execution"
            ),
            None => warn!(region = %region, "No execution logs found"),
        }
        raw[region] = exec;
    }
    Ok(raw)
}

/// Normalize every present execution.
pub fn normalize_executions(
    raw: &PerRegion<Option<RawExecution>>,
) -> PerRegion<Option<RegionExecution>> {
    raw.as_ref().map(|_, exec| {
        exec.as_ref()
            .map(|exec| normalize(&exec.execution_id, &exec.rows))
    })
}

/// One report-generation run over a log store, a report store and a model.
///
/// Runs are strictly sequential: each gateway call is awaited before the
/// next one starts.
pub struct ReportPipeline<'a> {
    logs: &'a dyn LogStore,
    reports: &'a dyn ReportStore,
    model: &'a dyn ModelClient,
}

impl<'a> ReportPipeline<'a> {
    pub fn new(
        logs: &'a dyn LogStore,
        reports: &'a dyn ReportStore,
        model: &'a dyn ModelClient,
    ) -> Self {
        Self {
            logs,
            reports,
            model,
        }
    }

    /// Run the pipeline once.
    ///
    /// Failures before a placeholder exists return without touching the
    /// report table. Failures after it finalize the placeholder as
    /// `failed` with the error text.
    pub async fn run(&self) -> ReportOutcome {
        info!("Starting report generation");

        let raw = match fetch_latest_executions(self.logs).await {
            Ok(raw) => raw,
            Err(e) => return self.abort(PerRegion::default(), e.into()),
        };
        let execution_ids = raw
            .as_ref()
            .map(|_, exec| exec.as_ref().map(|e| e.execution_id.clone()));

        let missing = raw.missing();
        let Some(raw) = raw.transpose() else {
            return self.abort(execution_ids, PipelineError::MissingData(missing));
        };

        let balance = self.balance().await;

        let ids = raw.as_ref().map(|_, exec| exec.execution_id.clone());
        let report_id = match self.reports.create_placeholder(&ids, &balance).await {
            Ok(Some(id)) => id,
            Ok(None) => return self.abort(execution_ids, PipelineError::Persistence),
            Err(e) => return self.abort(execution_ids, e.into()),
        };
        info!(report_id = %report_id, "Created placeholder report");

        match self.generate(&raw).await {
            Ok(content) => {
                self.finalize(report_id, &content, ReportStatus::Completed)
                    .await;
                ReportOutcome::completed(report_id, execution_ids, content)
            }
            Err(e) => {
                error!(report_id = %report_id, "Report generation failed: {}", e);
                self.finalize(report_id, &e.to_string(), ReportStatus::Failed)
                    .await;
                ReportOutcome::failed(Some(report_id), execution_ids, &e)
            }
        }
    }

    fn abort(
        &self,
        execution_ids: PerRegion<Option<String>>,
        error: PipelineError,
    ) -> ReportOutcome {
        error!("Report generation aborted: {}", error);
        ReportOutcome::failed(None, execution_ids, &error)
    }

    /// Balance lookup never aborts the run.
    async fn balance(&self) -> BalanceSnapshot {
        match self.model.check_balance().await {
            Ok(balance) => {
                info!(
                    available = balance.available,
                    currency = %balance.currency,
                    total = %balance.total,
                    "Checked balance"
                );
                balance
            }
            Err(e) => {
                warn!("Balance check failed, recording an empty snapshot: {}", e);
                BalanceSnapshot::default()
            }
        }
    }

    async fn generate(&self, raw: &PerRegion<RawExecution>) -> Result<String, PipelineError> {
        let executions = raw
            .as_ref()
            .map(|_, exec| Some(normalize(&exec.execution_id, &exec.rows)));
        for (region, exec) in executions.iter() {
            if let Some(exec) = exec {
                info!(region = %region, lines = exec.lines.len(), "Normalized execution");
            }
        }

        let log_content = format_log_content(&executions);
        let prompt = self.model.templates().render_user(&log_content);
        Ok(self.model.generate_report(&prompt).await?)
    }

    async fn finalize(&self, report_id: ReportId, content: &str, status: ReportStatus) {
        match self.reports.finalize(report_id, content, status).await {
            Ok(true) => info!(report_id = %report_id, status = %status, "Report finalized"),
            Ok(false) => warn!(
                report_id = %report_id,
                status = %status,
                "Finalize did not update the report record"
            ),
            Err(e) => error!(
                report_id = %report_id,
                status = %status,
                "Failed to finalize report: {}",
                e
            ),
        }
    }
}
