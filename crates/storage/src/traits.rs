use async_trait::async_trait;
use runlog_core::{BalanceSnapshot, PerRegion, Region, ReportId, ReportStatus};

use crate::error::StorageError;
use crate::record::{RawExecution, ReportRecord};

/// Read-only access to the per-region automation log tables.
///
/// ## Latest-execution semantics
///
/// `fetch_latest` picks the execution id whose greatest log timestamp is
/// the greatest in the region, then returns every row of that execution id
/// in ascending timestamp order. Rows of two execution ids are never mixed.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync` so they can be shared across
/// async task boundaries.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Fetch the latest execution of `region`, or `None` if the region has
    /// no rows at all.
    async fn fetch_latest(&self, region: Region) -> Result<Option<RawExecution>, StorageError>;
}

/// Write access to the report table.
///
/// ## Record lifecycle
///
/// 1. `create_placeholder` -- always inserts a new `generating` row with
///    empty content, even when identical execution ids were reported before
/// 2. `finalize` -- moves that row to `completed` or `failed` exactly once
///
/// Records are never deleted through this trait.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Insert a placeholder record.
    ///
    /// Returns `Ok(None)` if the backend accepted the insert but produced no
    /// identifier.
    async fn create_placeholder(
        &self,
        execution_ids: &PerRegion<String>,
        balance: &BalanceSnapshot,
    ) -> Result<Option<ReportId>, StorageError>;

    /// Set the content and terminal status of a `generating` record.
    ///
    /// Returns whether exactly one row was updated. Returns
    /// `Err(StorageError::InvalidTransition)` if `status` is not terminal.
    async fn finalize(
        &self,
        report_id: ReportId,
        content: &str,
        status: ReportStatus,
    ) -> Result<bool, StorageError>;

    /// Read a report record by id.
    async fn get_report(&self, report_id: ReportId) -> Result<Option<ReportRecord>, StorageError>;
}

/// Reject finalize requests that would not move a record to a terminal status.
pub(crate) fn check_terminal(report_id: ReportId, status: ReportStatus) -> Result<(), StorageError> {
    if status.is_terminal() {
        Ok(())
    } else {
        Err(StorageError::InvalidTransition { report_id, status })
    }
}
