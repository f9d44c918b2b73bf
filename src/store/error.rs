use thiserror::Error;

#[derive(Debug, Clone, Error)]
/// Errors returned by cache store backends.
pub enum StoreError {
    /// The store could not be reached (connection, pool checkout, injected outage).
    #[error("cache unavailable: {message}")]
    Unavailable {
        /// Error message.
        message: String,
    },

    /// The store was reached but rejected the command.
    #[error("cache {operation} failed for key '{key}': {message}")]
    Command {
        /// `GET`, `SET` or `PING`.
        operation: &'static str,
        /// Key the command addressed.
        key: String,
        /// Error message.
        message: String,
    },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Convenience result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
