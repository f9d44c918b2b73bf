use std::path::PathBuf;
use thiserror::Error;

use crate::key::TestId;

/// Errors assembling a scoring request.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The data source has no subject records for this test.
    #[error("no subject data available for test '{test_id}'")]
    DataUnavailable { test_id: TestId },

    /// A record carried an empty subject id.
    #[error("test '{test_id}' has a record with an empty subject id")]
    InvalidSubject { test_id: TestId },

    /// The same subject id appeared twice.
    #[error("test '{test_id}' lists subject '{subject_id}' more than once")]
    DuplicateSubject { test_id: TestId, subject_id: String },

    /// The backing data source failed.
    #[error("subject data source failed: {message}")]
    Source { message: String },

    /// Seed file could not be read.
    #[error("failed to read subject data from {path}: {source}")]
    SeedIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Seed file is not valid subject data.
    #[error("failed to parse subject data from {path}: {source}")]
    SeedParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Seed file names a test id that does not canonicalize.
    #[error("invalid test id '{raw}' in subject data: {reason}")]
    SeedTestId { raw: String, reason: String },
}

/// Convenience result type for payload assembly.
pub type PayloadResult<T> = Result<T, PayloadError>;
