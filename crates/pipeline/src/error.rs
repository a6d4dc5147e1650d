use runlog_core::Region;
use runlog_llm::LlmError;
use runlog_storage::StorageError;

/// Why a pipeline run did not produce a report.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// One or both regions have no execution logs.
    #[error("no execution logs found for {}", region_list(.0))]
    MissingData(Vec<Region>),

    /// No provider credential is configured.
    #[error("authentication error: {0}")]
    Authentication(String),

    /// Transport failure talking to the provider.
    #[error("network error: {0}")]
    Network(String),

    /// The provider returned a non-success status.
    #[error("provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    /// The placeholder insert did not yield a report id.
    #[error("report placeholder was created without an id")]
    Persistence,

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The provider's payload could not be read.
    #[error("parse error: {0}")]
    Parse(String),
}

fn region_list(regions: &[Region]) -> String {
    regions
        .iter()
        .map(|r| r.label())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<LlmError> for PipelineError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Authentication(msg) => PipelineError::Authentication(msg),
            LlmError::Network(msg) => PipelineError::Network(msg),
            LlmError::Provider { status, message } => PipelineError::Provider { status, message },
            LlmError::Parse(msg) => PipelineError::Parse(msg),
        }
    }
}
