use runlog_core::{BalanceSnapshot, LogRow, PerRegion, Region, ReportId, ReportStatus};
use serde::Serialize;
use time::PrimitiveDateTime;

/// The rows of one region's latest execution, ascending by timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawExecution {
    pub execution_id: String,
    pub rows: Vec<LogRow>,
}

/// A stored report row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRecord {
    pub id: ReportId,
    pub execution_ids: PerRegion<String>,
    pub content: String,
    pub status: ReportStatus,
    pub balance: BalanceSnapshot,
}

/// A log row tagged with its region and execution, used to seed a backend
/// before running the conformance suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedRow {
    pub region: Region,
    pub execution_id: String,
    pub timestamp: PrimitiveDateTime,
    pub message: String,
}

impl SeedRow {
    pub fn new(
        region: Region,
        execution_id: &str,
        timestamp: PrimitiveDateTime,
        message: &str,
    ) -> Self {
        Self {
            region,
            execution_id: execution_id.to_string(),
            timestamp,
            message: message.to_string(),
        }
    }
}
