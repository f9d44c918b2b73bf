use thiserror::Error;

use crate::payload::PayloadError;
use crate::scoring::{ProtocolError, ScoringError};

/// Error taxonomy surfaced by [`CacheAsideGateway`](super::CacheAsideGateway).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DataUnavailable,
    TransportError,
    ProtocolError,
    RemoteRejected,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("payload assembly failed: {0}")]
    Payload(#[from] PayloadError),

    #[error("scoring failed: {0}")]
    Scoring(#[from] ScoringError),
}

impl GatewayError {
    /// Classifies the error.
    ///
    /// A failing data source counts as a transport failure; malformed subject data
    /// counts as a protocol error from the data collaborator.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Payload(PayloadError::DataUnavailable { .. }) => {
                ErrorKind::DataUnavailable
            }
            GatewayError::Payload(PayloadError::Source { .. }) => ErrorKind::TransportError,
            GatewayError::Payload(_) => ErrorKind::ProtocolError,
            GatewayError::Scoring(ScoringError::Transport { .. })
            | GatewayError::Scoring(ScoringError::Configuration { .. }) => {
                ErrorKind::TransportError
            }
            GatewayError::Scoring(ScoringError::RemoteRejected { .. }) => {
                ErrorKind::RemoteRejected
            }
            GatewayError::Scoring(ScoringError::Protocol(_))
            | GatewayError::Scoring(ScoringError::Encode { .. }) => ErrorKind::ProtocolError,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::TransportError
    }
}

impl From<ProtocolError> for GatewayError {
    fn from(e: ProtocolError) -> Self {
        GatewayError::Scoring(ScoringError::Protocol(e))
    }
}

/// Convenience result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
