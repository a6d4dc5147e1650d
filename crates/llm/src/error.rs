/// Errors returned by a model client.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// No credential is configured for the provider.
    #[error("authentication error: {0}")]
    Authentication(String),

    /// Transport failure: connect, timeout, or a read error mid-stream.
    #[error("network error: {0}")]
    Network(String),

    /// The provider answered with a non-success HTTP status.
    #[error("provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    /// The provider's payload could not be read.
    #[error("parse error: {0}")]
    Parse(String),
}
