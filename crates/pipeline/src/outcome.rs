use runlog_core::{PerRegion, ReportId, ReportStatus};
use serde::Serialize;

use crate::error::PipelineError;

/// Result of one pipeline run.
///
/// On failure `content` holds the error text. `report_id` is present once
/// a placeholder record exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportOutcome {
    pub success: bool,
    pub report_id: Option<ReportId>,
    pub content: String,
    pub status: ReportStatus,
    pub execution_ids: PerRegion<Option<String>>,
}

impl ReportOutcome {
    pub(crate) fn completed(
        report_id: ReportId,
        execution_ids: PerRegion<Option<String>>,
        content: String,
    ) -> Self {
        Self {
            success: true,
            report_id: Some(report_id),
            content,
            status: ReportStatus::Completed,
            execution_ids,
        }
    }

    pub(crate) fn failed(
        report_id: Option<ReportId>,
        execution_ids: PerRegion<Option<String>>,
        error: &PipelineError,
    ) -> Self {
        Self {
            success: false,
            report_id,
            content: error.to_string(),
            status: ReportStatus::Failed,
            execution_ids,
        }
    }
}
