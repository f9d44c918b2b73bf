use thiserror::Error;

/// A scoring response that parsed but breaks a response invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResponseInvariantError {
    /// `err` was NaN or infinite.
    #[error("fit error is not finite: {value}")]
    NonFiniteFitError { value: f64 },

    /// `err` was below zero.
    #[error("fit error is negative: {value}")]
    NegativeFitError { value: f64 },

    /// Subject has an ability estimate and is also listed as rejected.
    #[error("subject '{subject_id}' is both estimated and rejected")]
    RejectedSubjectEstimated { subject_id: String },

    /// Task has a difficulty estimate and is also listed as rejected.
    #[error("task '{task_id}' is both estimated and rejected")]
    RejectedTaskEstimated { task_id: String },
}

/// Errors converting between a [`ScoringResponse`](super::ScoringResponse) and its
/// cached byte form.
#[derive(Debug, Error)]
pub enum EntryError {
    #[error("failed to encode cache entry: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode cache entry: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("cached response is invalid: {0}")]
    Invariant(#[from] ResponseInvariantError),
}
