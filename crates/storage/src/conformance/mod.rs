//! Conformance test suite for log and report store implementations.
//!
//! This module provides a backend-agnostic test suite that any backend
//! implementing both [`LogStore`] and [`ReportStore`] can run to verify
//! the gateway contract. The suite covers:
//!
//! - **Latest execution**: selection by maximum timestamp, ascending order,
//!   no mixing of execution ids, region independence
//! - **Placeholders**: always-insert semantics, initial status and content,
//!   balance snapshot persistence
//! - **Finalize**: terminal transitions, single transition per record,
//!   unknown ids, rejected non-terminal statuses
//!
//! # Usage
//!
//! Backend crates call [`run_conformance_suite`] with a factory that builds
//! a fresh store seeded with the given log rows for each test:
//!
//! ```ignore
//! use runlog_storage::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn mysql_conformance() {
//!     let report = run_conformance_suite(|rows| async move {
//!         create_seeded_mysql_store(rows).await
//!     }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod logs;
mod reports;

use std::fmt;
use std::future::Future;

use runlog_core::{BalanceSnapshot, PerRegion};
use rust_decimal::Decimal;
use time::macros::datetime;
use time::{Duration, PrimitiveDateTime};

use crate::record::SeedRow;
use crate::{LogStore, ReportStore};

/// Outcome of one check, keyed by `group/name`.
#[derive(Debug, Clone)]
pub struct TestResult {
    pub group: String,
    pub name: String,
    pub passed: bool,
    pub message: Option<String>,
}

impl TestResult {
    fn from_result(group: &str, name: &str, result: Result<(), String>) -> Self {
        let (passed, message) = match result {
            Ok(()) => (true, None),
            Err(msg) => (false, Some(msg)),
        };
        Self {
            group: group.to_string(),
            name: name.to_string(),
            passed,
            message,
        }
    }
}

/// Every check from one run; `Display` lists only the failures.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} of {} store checks failed", self.failed, self.total)?;
        for r in self.results.iter().filter(|r| !r.passed) {
            writeln!(
                f,
                "  {}/{}: {}",
                r.group,
                r.name,
                r.message.as_deref().unwrap_or("no detail")
            )?;
        }
        Ok(())
    }
}

/// Run the full conformance suite against a storage backend.
///
/// The `factory` is called once per test with the rows that test needs,
/// and must return a fresh store containing exactly those rows and no
/// report records.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: LogStore + ReportStore,
    F: Fn(Vec<SeedRow>) -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(logs::run_log_tests(&factory).await);
    results.extend(reports::run_report_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// `base + secs` seconds, on a fixed day.
fn at(secs: i64) -> PrimitiveDateTime {
    datetime!(2025-01-01 04:00:00) + Duration::seconds(secs)
}

fn execution_ids(cn: &str, jp: &str) -> PerRegion<String> {
    PerRegion::new(cn.to_string(), jp.to_string())
}

fn sample_balance() -> BalanceSnapshot {
    BalanceSnapshot {
        available: true,
        currency: "CNY".to_string(),
        total: Decimal::new(1250, 2),
        granted: Decimal::new(250, 2),
        topped_up: Decimal::new(1000, 2),
    }
}
