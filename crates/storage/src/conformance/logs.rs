use std::future::Future;

use runlog_core::Region;

use super::{at, TestResult};
use crate::record::SeedRow;
use crate::{LogStore, ReportStore};

pub(super) async fn run_log_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: LogStore + ReportStore,
    F: Fn(Vec<SeedRow>) -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "logs",
            "empty_region_returns_none",
            empty_region_returns_none(factory).await,
        ),
        TestResult::from_result(
            "logs",
            "latest_execution_by_max_timestamp",
            latest_execution_by_max_timestamp(factory).await,
        ),
        TestResult::from_result(
            "logs",
            "rows_are_ascending",
            rows_are_ascending(factory).await,
        ),
        TestResult::from_result(
            "logs",
            "execution_ids_never_mixed",
            execution_ids_never_mixed(factory).await,
        ),
        TestResult::from_result(
            "logs",
            "regions_are_independent",
            regions_are_independent(factory).await,
        ),
    ]
}

// ── Test implementations ──────────────────────────────────────────────────────

/// A region with no rows yields `None`, not an empty execution.
async fn empty_region_returns_none<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: LogStore + ReportStore,
    F: Fn(Vec<SeedRow>) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(vec![SeedRow::new(Region::Cn, "cn-1", at(0), "hello")]).await;
    let jp = s
        .fetch_latest(Region::Jp)
        .await
        .map_err(|e| e.to_string())?;
    if jp.is_some() {
        return Err(format!("expected None for empty region, got {:?}", jp));
    }
    Ok(())
}

/// The execution whose latest row is newest wins, even if another execution
/// started later.
async fn latest_execution_by_max_timestamp<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: LogStore + ReportStore,
    F: Fn(Vec<SeedRow>) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(vec![
        SeedRow::new(Region::Cn, "older", at(0), "a"),
        SeedRow::new(Region::Cn, "older", at(50), "b"),
        SeedRow::new(Region::Cn, "newer-start", at(10), "c"),
        SeedRow::new(Region::Cn, "newer-start", at(40), "d"),
    ])
    .await;
    let exec = s
        .fetch_latest(Region::Cn)
        .await
        .map_err(|e| e.to_string())?
        .ok_or("expected an execution")?;
    if exec.execution_id != "older" {
        return Err(format!(
            "expected execution \"older\" (max timestamp), got \"{}\"",
            exec.execution_id
        ));
    }
    Ok(())
}

/// Rows come back ascending by timestamp regardless of insertion order.
async fn rows_are_ascending<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: LogStore + ReportStore,
    F: Fn(Vec<SeedRow>) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(vec![
        SeedRow::new(Region::Jp, "jp-1", at(30), "third"),
        SeedRow::new(Region::Jp, "jp-1", at(10), "first"),
        SeedRow::new(Region::Jp, "jp-1", at(20), "second"),
    ])
    .await;
    let exec = s
        .fetch_latest(Region::Jp)
        .await
        .map_err(|e| e.to_string())?
        .ok_or("expected an execution")?;
    let messages: Vec<&str> = exec.rows.iter().map(|r| r.message.as_str()).collect();
    if messages != ["first", "second", "third"] {
        return Err(format!("expected ascending rows, got {:?}", messages));
    }
    Ok(())
}

/// Only rows of the selected execution id are returned.
async fn execution_ids_never_mixed<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: LogStore + ReportStore,
    F: Fn(Vec<SeedRow>) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(vec![
        SeedRow::new(Region::Cn, "run-a", at(0), "a0"),
        SeedRow::new(Region::Cn, "run-b", at(5), "b0"),
        SeedRow::new(Region::Cn, "run-a", at(10), "a1"),
        SeedRow::new(Region::Cn, "run-b", at(15), "b1"),
    ])
    .await;
    let exec = s
        .fetch_latest(Region::Cn)
        .await
        .map_err(|e| e.to_string())?
        .ok_or("expected an execution")?;
    if exec.execution_id != "run-b" {
        return Err(format!("expected run-b, got {}", exec.execution_id));
    }
    if exec.rows.iter().any(|r| r.message.starts_with('a')) {
        return Err("rows from run-a leaked into run-b".to_string());
    }
    if exec.rows.len() != 2 {
        return Err(format!("expected 2 rows, got {}", exec.rows.len()));
    }
    Ok(())
}

/// Each region resolves its own latest execution.
async fn regions_are_independent<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: LogStore + ReportStore,
    F: Fn(Vec<SeedRow>) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(vec![
        SeedRow::new(Region::Cn, "cn-7", at(0), "cn"),
        SeedRow::new(Region::Jp, "jp-3", at(100), "jp"),
    ])
    .await;
    let cn = s
        .fetch_latest(Region::Cn)
        .await
        .map_err(|e| e.to_string())?
        .ok_or("expected a cn execution")?;
    let jp = s
        .fetch_latest(Region::Jp)
        .await
        .map_err(|e| e.to_string())?
        .ok_or("expected a jp execution")?;
    if cn.execution_id != "cn-7" || jp.execution_id != "jp-3" {
        return Err(format!(
            "expected cn-7/jp-3, got {}/{}",
            cn.execution_id, jp.execution_id
        ));
    }
    Ok(())
}
