//! Prompt assembly: the immutable template pair handed to the model client,
//! and the text block that renders both regions' executions.

use std::path::Path;

use serde::Deserialize;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::PrimitiveDateTime;

use crate::normalize::RegionExecution;
use crate::region::PerRegion;

/// Placeholder in the user template replaced by the formatted log block.
pub const LOG_CONTENT_PLACEHOLDER: &str = "{log_content}";

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a log analysis expert who reviews the execution logs of unattended automation scripts.
Your job is to tell the reader how the run went and to point out problems; do not offer advice.
The logs come from two regions, arkcn and arkjp. Keep their ranges apart: arkcn runs two MAA instances (159 and 177) one after the other, arkjp runs two MAA instances (cn and jp) one after the other, four MAA executions in total.
Judge success strictly and answer directly, without lengthy reasoning."#;

const DEFAULT_USER_TEMPLATE: &str = r#"Analyze the following automation logs and write a concise execution report.

## Requirements
1. Keep the arkcn and arkjp regions and their four MAA instances apart: arkcn has MAA 159 and MAA 177, arkjp has MAA cn and MAA jp.
2. Classify each region as succeeded, failed or partially succeeded.
3. Be strict: an incomplete log means that region failed.
4. Analyze every MAA instance on its own; compare the four to decide whether each one ran to completion.
5. For failures, explain the cause.
6. For successes, list the main tasks completed.
7. Finish with a short summary.

## Format
Markdown, containing:
- An executive summary: overall status, and when arkcn and arkjp started and ended (date and hour) and whether they finished.
- Per-region details with a short note for every MAA instance.
- Ignore drop-recognition errors (UnknownStage) and "task may not have completed normally" warnings.
- Log completeness: check that each region contains the exact line "script status updated to completed". Only mention completeness if a region is incomplete.
- Base shifts, friend visits and reward collection only need mentioning when they failed.
- For auto-recruitment, only report 6-star results.
- Otherwise report which stages were farmed and how much sanity was spent.

## Execution logs
{log_content}

Write the report:"#;

/// Errors produced while loading prompt templates.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("failed to read prompt file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse prompt file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("user template does not contain the {{log_content}} placeholder")]
    MissingPlaceholder,
}

/// The system instruction and user template sent to the model.
///
/// Values are immutable once built; replacing the prompts means building a
/// new `PromptTemplates` and handing it to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplates {
    system: String,
    user: String,
}

#[derive(Deserialize)]
struct TemplateFile {
    system: Option<String>,
    user: Option<String>,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            system: DEFAULT_SYSTEM_PROMPT.to_string(),
            user: DEFAULT_USER_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplates {
    /// Build templates from explicit text. The user template must contain
    /// [`LOG_CONTENT_PLACEHOLDER`].
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Result<Self, TemplateError> {
        let user = user.into();
        if !user.contains(LOG_CONTENT_PLACEHOLDER) {
            return Err(TemplateError::MissingPlaceholder);
        }
        Ok(Self {
            system: system.into(),
            user,
        })
    }

    /// Parse a TOML document with optional `system` and `user` keys.
    /// Missing keys keep the built-in defaults.
    pub fn from_toml_str(src: &str) -> Result<Self, TemplateError> {
        let file: TemplateFile = toml::from_str(src)?;
        let defaults = Self::default();
        Self::new(
            file.system.unwrap_or(defaults.system),
            file.user.unwrap_or(defaults.user),
        )
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, TemplateError> {
        let src = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&src)
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn user_template(&self) -> &str {
        &self.user
    }

    /// Substitute the formatted log block into the user template verbatim.
    pub fn render_user(&self, log_content: &str) -> String {
        self.user.replace(LOG_CONTENT_PLACEHOLDER, log_content)
    }
}

/// `YYYY-MM-DD HH:MM:SS`, or `-` when the time is unknown.
pub fn format_timestamp(ts: Option<PrimitiveDateTime>) -> String {
    ts.and_then(|t| t.format(TIMESTAMP_FORMAT).ok())
        .unwrap_or_else(|| "-".to_string())
}

/// Render every present region's execution as one text block.
pub fn format_log_content(executions: &PerRegion<Option<RegionExecution>>) -> String {
    let mut lines: Vec<String> = Vec::new();

    for (region, exec) in executions.iter() {
        let Some(exec) = exec else { continue };
        lines.push(format!("[{}]", region.label()));
        lines.push(format!("Execution ID: {}", exec.execution_id));
        lines.push(format!("Start time: {}", format_timestamp(exec.start_time)));
        lines.push(format!("End time: {}", format_timestamp(exec.end_time)));
        lines.push(format!("Line count: {}", exec.lines.len()));
        lines.push(String::new());
        lines.push("Execution log:".to_string());
        lines.extend(exec.lines.iter().cloned());
        lines.push(String::new());
    }

    lines.join("\n")
}
