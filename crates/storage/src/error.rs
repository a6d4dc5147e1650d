use runlog_core::{ReportId, ReportStatus};

/// All errors that can be returned by a log or report store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backend could not be reached or refused the connection.
    #[error("database connection failed: {0}")]
    Connection(String),

    /// A finalize call asked for a status a record cannot be finalized into.
    #[error("report {report_id} cannot be finalized as '{status}'")]
    InvalidTransition {
        report_id: ReportId,
        status: ReportStatus,
    },

    /// A stored value could not be decoded into its record type.
    #[error("malformed {column} in stored row: {message}")]
    Decode { column: String, message: String },

    /// A backend-specific storage error (query failure, constraint violation, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}
