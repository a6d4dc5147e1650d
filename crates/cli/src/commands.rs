use std::path::Path;

use runlog_core::{format_log_content, ReportId};
use runlog_llm::{DeepSeekClient, LlmError, ModelClient};
use runlog_pipeline::{fetch_latest_executions, normalize_executions, ReportPipeline};
use runlog_storage::{mask_connection_string, MySqlStore, ReportStore, StorageError};
use serde_json::json;
use tracing::debug;

use crate::config::{self, ConfigError};
use crate::{OutputFormat, EXIT_FAILURE, EXIT_SUCCESS};

/// Errors that stop a command before it can report an outcome.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Model(#[from] LlmError),

    #[error("failed to serialize output: {0}")]
    Output(#[from] serde_json::Error),
}

fn mysql_store() -> Result<MySqlStore, CliError> {
    let config = config::database_config(config::process_env)?;
    debug!(
        database = %mask_connection_string(&config.url),
        connect_timeout_secs = config.connect_timeout_secs,
        "Database configured"
    );
    Ok(MySqlStore::new(config))
}

// ── run ──────────────────────────────────────────────────────────────────────

pub(crate) struct RunOptions<'a> {
    pub stream: bool,
    pub prompts: Option<&'a Path>,
    pub output: OutputFormat,
    pub quiet: bool,
}

pub(crate) async fn cmd_run(opts: RunOptions<'_>) -> Result<i32, CliError> {
    let templates = config::prompt_templates(opts.prompts)?;
    let store = mysql_store()?;

    let echo = opts.stream && !opts.quiet && opts.output == OutputFormat::Text;
    let mut model_config = config::model_config(config::process_env)?;
    model_config.stream = opts.stream;
    model_config.echo = echo;
    let model = DeepSeekClient::new(model_config).with_templates(templates);

    let outcome = ReportPipeline::new(&store, &store, &model).run().await;

    match opts.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Text => {
            if echo && outcome.report_id.is_some() {
                println!();
            }
            if !outcome.success {
                eprintln!("Report generation failed: {}", outcome.content);
            } else if !echo {
                println!("{}", outcome.content);
            }
            match outcome.report_id {
                Some(id) if !opts.quiet => {
                    eprintln!("Report {} saved as {}", id, outcome.status)
                }
                _ => {}
            }
        }
    }

    Ok(if outcome.success {
        EXIT_SUCCESS
    } else {
        EXIT_FAILURE
    })
}

// ── balance ──────────────────────────────────────────────────────────────────

pub(crate) async fn cmd_balance(output: OutputFormat) -> Result<i32, CliError> {
    let client = DeepSeekClient::new(config::model_config(config::process_env)?);
    let balance = client.check_balance().await?;

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&balance)?),
        OutputFormat::Text => {
            println!("Available:  {}", if balance.available { "yes" } else { "no" });
            println!("Currency:   {}", balance.currency);
            println!("Total:      {}", balance.total);
            println!("Granted:    {}", balance.granted);
            println!("Topped up:  {}", balance.topped_up);
        }
    }
    Ok(EXIT_SUCCESS)
}

// ── preview ──────────────────────────────────────────────────────────────────

/// Print what the model would be sent, without calling it or writing a
/// report. Exits with failure if a region has no execution.
pub(crate) async fn cmd_preview(
    prompts: Option<&Path>,
    render: bool,
    output: OutputFormat,
) -> Result<i32, CliError> {
    let templates = config::prompt_templates(prompts)?;
    let store = mysql_store()?;

    let raw = fetch_latest_executions(&store).await?;
    let missing = raw.missing();
    let executions = normalize_executions(&raw);

    let log_content = format_log_content(&executions);
    let content = if render {
        templates.render_user(&log_content)
    } else {
        log_content
    };

    match output {
        OutputFormat::Json => {
            let execution_ids = executions
                .as_ref()
                .map(|_, exec| exec.as_ref().map(|e| e.execution_id.clone()));
            let body = json!({
                "execution_ids": execution_ids,
                "missing": missing.iter().map(|r| r.label()).collect::<Vec<_>>(),
                "content": content,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Text => {
            println!("{}", content);
            for region in &missing {
                eprintln!("No execution logs found for {}", region);
            }
        }
    }

    Ok(if missing.is_empty() {
        EXIT_SUCCESS
    } else {
        EXIT_FAILURE
    })
}

// ── show ─────────────────────────────────────────────────────────────────────

pub(crate) async fn cmd_show(id: u64, output: OutputFormat) -> Result<i32, CliError> {
    let store = mysql_store()?;

    let Some(record) = store.get_report(ReportId(id)).await? else {
        eprintln!("Report {} not found", id);
        return Ok(EXIT_FAILURE);
    };

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
        OutputFormat::Text => {
            println!("Report {}", record.id);
            println!("Status: {}", record.status);
            for (region, execution_id) in record.execution_ids.iter() {
                println!("{} execution: {}", region, execution_id);
            }
            println!(
                "Balance: {} {} (available: {})",
                record.balance.total, record.balance.currency, record.balance.available
            );
            println!();
            println!("{}", record.content);
        }
    }
    Ok(EXIT_SUCCESS)
}
