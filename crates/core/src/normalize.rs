//! Log normalization: derive an execution's time range and strip the
//! clock-time token that the automation prefixes to every message.

use std::sync::LazyLock;

use regex::Regex;
use time::PrimitiveDateTime;

/// `[HH:MM:SS]` at position zero plus any whitespace after it.
static LEADING_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[[0-9]{2}:[0-9]{2}:[0-9]{2}\]\s*").expect("leading timestamp pattern is valid")
});

/// A single log line as stored upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRow {
    pub timestamp: PrimitiveDateTime,
    pub message: String,
}

impl LogRow {
    pub fn new(timestamp: PrimitiveDateTime, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            message: message.into(),
        }
    }
}

/// One region's latest execution, ready to be placed in a prompt.
///
/// `start_time` and `end_time` are `None` exactly when `lines` is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionExecution {
    pub execution_id: String,
    pub start_time: Option<PrimitiveDateTime>,
    pub end_time: Option<PrimitiveDateTime>,
    pub lines: Vec<String>,
}

/// Remove one leading `[HH:MM:SS]` token (and the whitespace after it).
///
/// Messages that do not start with the token are returned unchanged. Only
/// the first of two back-to-back tokens is removed, so callers apply this
/// exactly once per message.
pub fn strip_leading_timestamp(message: &str) -> &str {
    match LEADING_TIMESTAMP.find(message) {
        Some(m) => &message[m.end()..],
        None => message,
    }
}

/// Normalize one execution's rows, which must already be in ascending
/// timestamp order.
pub fn normalize(execution_id: impl Into<String>, rows: &[LogRow]) -> RegionExecution {
    RegionExecution {
        execution_id: execution_id.into(),
        start_time: rows.first().map(|r| r.timestamp),
        end_time: rows.last().map(|r| r.timestamp),
        lines: rows
            .iter()
            .map(|r| strip_leading_timestamp(&r.message).to_string())
            .collect(),
    }
}
