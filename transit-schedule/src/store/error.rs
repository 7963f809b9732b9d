//! Schedule store error types.

/// Errors from a schedule store fetch.
///
/// The resolver and matcher propagate these unchanged; they never turn a
/// failed fetch into an empty result.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not be reached or refused the query
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Reading schedule data from disk failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Schedule data was not valid JSON for the expected shape
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// A row violates the schedule's structure (bad time, dangling reference)
    #[error("invalid {table} row: {message}")]
    InvalidRow {
        table: &'static str,
        message: String,
    },
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Json {
            message: err.to_string(),
        }
    }
}
