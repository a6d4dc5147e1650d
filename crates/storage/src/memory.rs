//! In-process backend holding log rows and report records in memory.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use runlog_core::{BalanceSnapshot, LogRow, PerRegion, Region, ReportId, ReportStatus};

use crate::error::StorageError;
use crate::record::{RawExecution, ReportRecord, SeedRow};
use crate::traits::{check_terminal, LogStore, ReportStore};

/// A finalize call as observed by the store, successful or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeCall {
    pub report_id: ReportId,
    pub content: String,
    pub status: ReportStatus,
}

#[derive(Default)]
struct Inner {
    logs: PerRegion<Vec<(String, LogRow)>>,
    reports: Vec<ReportRecord>,
    finalize_calls: Vec<FinalizeCall>,
    next_id: u64,
}

/// Backend that keeps everything in a mutex-guarded `Vec`.
///
/// Report ids start at 1 and increase by one per placeholder.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-loaded with log rows.
    pub fn with_rows(rows: impl IntoIterator<Item = SeedRow>) -> Self {
        let store = Self::new();
        for row in rows {
            store.push_log(
                row.region,
                &row.execution_id,
                LogRow::new(row.timestamp, row.message),
            );
        }
        store
    }

    /// Append a log row for `region` under `execution_id`.
    pub fn push_log(&self, region: Region, execution_id: &str, row: LogRow) {
        self.lock().logs[region].push((execution_id.to_string(), row));
    }

    /// All report records, in insertion order.
    pub fn reports(&self) -> Vec<ReportRecord> {
        self.lock().reports.clone()
    }

    /// Every finalize call received so far, in call order.
    pub fn finalize_calls(&self) -> Vec<FinalizeCall> {
        self.lock().finalize_calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl LogStore for MemoryStore {
    async fn fetch_latest(&self, region: Region) -> Result<Option<RawExecution>, StorageError> {
        let inner = self.lock();
        let logs = &inner.logs[region];

        let Some((latest_id, _)) = logs.iter().max_by_key(|(_, row)| row.timestamp) else {
            return Ok(None);
        };

        let mut rows: Vec<LogRow> = logs
            .iter()
            .filter(|(id, _)| id == latest_id)
            .map(|(_, row)| row.clone())
            .collect();
        rows.sort_by_key(|row| row.timestamp);

        Ok(Some(RawExecution {
            execution_id: latest_id.clone(),
            rows,
        }))
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn create_placeholder(
        &self,
        execution_ids: &PerRegion<String>,
        balance: &BalanceSnapshot,
    ) -> Result<Option<ReportId>, StorageError> {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = ReportId(inner.next_id);
        inner.reports.push(ReportRecord {
            id,
            execution_ids: execution_ids.clone(),
            content: String::new(),
            status: ReportStatus::Generating,
            balance: balance.clone(),
        });
        Ok(Some(id))
    }

    async fn finalize(
        &self,
        report_id: ReportId,
        content: &str,
        status: ReportStatus,
    ) -> Result<bool, StorageError> {
        let mut inner = self.lock();
        inner.finalize_calls.push(FinalizeCall {
            report_id,
            content: content.to_string(),
            status,
        });
        check_terminal(report_id, status)?;

        let record = inner
            .reports
            .iter_mut()
            .find(|r| r.id == report_id && r.status == ReportStatus::Generating);
        match record {
            Some(r) => {
                r.content = content.to_string();
                r.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_report(&self, report_id: ReportId) -> Result<Option<ReportRecord>, StorageError> {
        Ok(self
            .lock()
            .reports
            .iter()
            .find(|r| r.id == report_id)
            .cloned())
    }
}
