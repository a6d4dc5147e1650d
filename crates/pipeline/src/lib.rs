//! runlog-pipeline: the report-generation run.
//!
//! ```text
//! Start -> LogsFetched -> BalanceChecked -> PlaceholderCreated
//!       -> ReportGenerated -> Finalized(completed)
//!                          \-> Finalized(failed)
//! ```
//!
//! [`ReportPipeline::run`] drives one pass over the gateways and returns a
//! [`ReportOutcome`]. [`fetch_latest_executions`] and
//! [`normalize_executions`] are exposed separately for read-only previews.

mod error;
mod outcome;
mod pipeline;

pub use error::PipelineError;
pub use outcome::ReportOutcome;
pub use pipeline::{fetch_latest_executions, normalize_executions, ReportPipeline};
