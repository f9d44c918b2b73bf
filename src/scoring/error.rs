use thiserror::Error;

use crate::model::ResponseInvariantError;

/// Ways a scoring reply can be unusable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolError {
    /// Body did not parse into the response shape.
    #[error("malformed response body: {reason}")]
    Malformed { reason: String },

    /// Body parsed but broke a response invariant.
    #[error(transparent)]
    Invariant(#[from] ResponseInvariantError),
}

#[derive(Debug, Clone, Error)]
pub enum ScoringError {
    /// Network-level failure (connection refused, timeout, reset). Safe to retry.
    #[error("transport error contacting scoring service: {message}")]
    Transport { message: String },

    /// Service answered with a non-2xx status.
    #[error("scoring service rejected request with status {status}: {body}")]
    RemoteRejected { status: u16, body: String },

    /// Reply was malformed or semantically invalid. Not retried.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Request body could not be serialized.
    #[error("failed to encode scoring request: {reason}")]
    Encode { reason: String },

    /// HTTP client could not be built.
    #[error("invalid scoring client configuration: {reason}")]
    Configuration { reason: String },
}

impl ScoringError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Returns `true` for failures a caller may reasonably retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ScoringError::Transport { .. })
    }
}

impl From<ResponseInvariantError> for ScoringError {
    fn from(e: ResponseInvariantError) -> Self {
        ScoringError::Protocol(ProtocolError::Invariant(e))
    }
}

/// Convenience result type for scoring calls.
pub type ScoringResult<T> = Result<T, ScoringError>;
