//! runlog-core: pure domain logic for execution report generation.
//!
//! Nothing in this crate talks to the database or the network. It provides:
//!
//! - [`Region`] and [`PerRegion`] -- the two independently logged regions
//!   and a fixed-size mapping keyed by them
//! - [`normalize()`] -- turn one execution's raw log rows into a
//!   [`RegionExecution`] with leading clock-time tokens stripped
//! - [`BalanceSnapshot`] -- billing snapshot selected from a provider
//!   balance response
//! - [`PromptTemplates`] and [`format_log_content()`] -- prompt assembly
//! - [`ReportId`] and [`ReportStatus`] -- report record identity and lifecycle

pub mod balance;
pub mod normalize;
pub mod prompt;
pub mod region;
pub mod report;

pub use balance::{BalanceEntry, BalanceResponse, BalanceSnapshot, REFERENCE_CURRENCY};
pub use normalize::{normalize, strip_leading_timestamp, LogRow, RegionExecution};
pub use prompt::{format_log_content, format_timestamp, PromptTemplates, TemplateError};
pub use region::{PerRegion, Region};
pub use report::{ReportId, ReportStatus};
