use std::future::Future;

use runlog_core::{BalanceSnapshot, ReportId, ReportStatus};

use super::{execution_ids, sample_balance, TestResult};
use crate::record::SeedRow;
use crate::{LogStore, ReportStore, StorageError};

pub(super) async fn run_report_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: LogStore + ReportStore,
    F: Fn(Vec<SeedRow>) -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "reports",
            "placeholder_starts_generating_and_empty",
            placeholder_starts_generating_and_empty(factory).await,
        ),
        TestResult::from_result(
            "reports",
            "placeholder_always_inserts",
            placeholder_always_inserts(factory).await,
        ),
        TestResult::from_result(
            "reports",
            "placeholder_stores_balance",
            placeholder_stores_balance(factory).await,
        ),
        TestResult::from_result(
            "reports",
            "finalize_completed_sets_content",
            finalize_sets_content(factory, ReportStatus::Completed).await,
        ),
        TestResult::from_result(
            "reports",
            "finalize_failed_sets_content",
            finalize_sets_content(factory, ReportStatus::Failed).await,
        ),
        TestResult::from_result(
            "reports",
            "finalize_unknown_id_returns_false",
            finalize_unknown_id_returns_false(factory).await,
        ),
        TestResult::from_result(
            "reports",
            "finalize_twice_returns_false",
            finalize_twice_returns_false(factory).await,
        ),
        TestResult::from_result(
            "reports",
            "finalize_generating_rejected",
            finalize_generating_rejected(factory).await,
        ),
        TestResult::from_result(
            "reports",
            "get_unknown_report_is_none",
            get_unknown_report_is_none(factory).await,
        ),
    ]
}

async fn placeholder<S: ReportStore>(s: &S, balance: &BalanceSnapshot) -> Result<ReportId, String> {
    s.create_placeholder(&execution_ids("cn-1", "jp-1"), balance)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| "placeholder produced no id".to_string())
}

// ── Test implementations ──────────────────────────────────────────────────────

/// A fresh placeholder is `generating` with empty content and the given ids.
async fn placeholder_starts_generating_and_empty<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: LogStore + ReportStore,
    F: Fn(Vec<SeedRow>) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(vec![]).await;
    let id = placeholder(&s, &BalanceSnapshot::default()).await?;
    let rec = s
        .get_report(id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or("placeholder not readable")?;
    if rec.status != ReportStatus::Generating {
        return Err(format!("expected generating, got {}", rec.status));
    }
    if !rec.content.is_empty() {
        return Err(format!("expected empty content, got {:?}", rec.content));
    }
    if rec.execution_ids != execution_ids("cn-1", "jp-1") {
        return Err(format!("unexpected execution ids {:?}", rec.execution_ids));
    }
    Ok(())
}

/// The same execution ids twice produce two distinct records.
async fn placeholder_always_inserts<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: LogStore + ReportStore,
    F: Fn(Vec<SeedRow>) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(vec![]).await;
    let first = placeholder(&s, &BalanceSnapshot::default()).await?;
    let second = placeholder(&s, &BalanceSnapshot::default()).await?;
    if first == second {
        return Err(format!("expected distinct ids, both were {}", first));
    }
    Ok(())
}

/// Balance fields survive the round trip through the store.
async fn placeholder_stores_balance<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: LogStore + ReportStore,
    F: Fn(Vec<SeedRow>) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(vec![]).await;
    let balance = sample_balance();
    let id = placeholder(&s, &balance).await?;
    let rec = s
        .get_report(id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or("placeholder not readable")?;
    if rec.balance != balance {
        return Err(format!("expected {:?}, got {:?}", balance, rec.balance));
    }
    Ok(())
}

/// Finalizing sets both content and status and reports one affected row.
async fn finalize_sets_content<S, F, Fut>(factory: &F, status: ReportStatus) -> Result<(), String>
where
    S: LogStore + ReportStore,
    F: Fn(Vec<SeedRow>) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(vec![]).await;
    let id = placeholder(&s, &BalanceSnapshot::default()).await?;
    let updated = s
        .finalize(id, "final text", status)
        .await
        .map_err(|e| e.to_string())?;
    if !updated {
        return Err("finalize reported no affected row".to_string());
    }
    let rec = s
        .get_report(id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or("record vanished")?;
    if rec.status != status || rec.content != "final text" {
        return Err(format!(
            "expected {}/\"final text\", got {}/{:?}",
            status, rec.status, rec.content
        ));
    }
    Ok(())
}

async fn finalize_unknown_id_returns_false<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: LogStore + ReportStore,
    F: Fn(Vec<SeedRow>) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(vec![]).await;
    let updated = s
        .finalize(ReportId(987_654), "x", ReportStatus::Completed)
        .await
        .map_err(|e| e.to_string())?;
    if updated {
        return Err("finalize of unknown id reported an update".to_string());
    }
    Ok(())
}

/// A record transitions out of `generating` exactly once.
async fn finalize_twice_returns_false<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: LogStore + ReportStore,
    F: Fn(Vec<SeedRow>) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(vec![]).await;
    let id = placeholder(&s, &BalanceSnapshot::default()).await?;
    s.finalize(id, "report", ReportStatus::Completed)
        .await
        .map_err(|e| e.to_string())?;
    let again = s
        .finalize(id, "overwrite", ReportStatus::Failed)
        .await
        .map_err(|e| e.to_string())?;
    if again {
        return Err("second finalize reported an update".to_string());
    }
    let rec = s
        .get_report(id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or("record vanished")?;
    if rec.content != "report" || rec.status != ReportStatus::Completed {
        return Err(format!("record changed by second finalize: {:?}", rec));
    }
    Ok(())
}

async fn finalize_generating_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: LogStore + ReportStore,
    F: Fn(Vec<SeedRow>) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(vec![]).await;
    let id = placeholder(&s, &BalanceSnapshot::default()).await?;
    match s.finalize(id, "x", ReportStatus::Generating).await {
        Err(StorageError::InvalidTransition { report_id, .. }) if report_id == id => Ok(()),
        other => Err(format!("expected InvalidTransition, got {:?}", other)),
    }
}

async fn get_unknown_report_is_none<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: LogStore + ReportStore,
    F: Fn(Vec<SeedRow>) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(vec![]).await;
    let rec = s
        .get_report(ReportId(424_242))
        .await
        .map_err(|e| e.to_string())?;
    if rec.is_some() {
        return Err(format!("expected None, got {:?}", rec));
    }
    Ok(())
}
