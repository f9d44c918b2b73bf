//! Scoring request assembly.
//!
//! [`PayloadBuilder`] pulls per-subject records for a test from a [`SubjectSource`]
//! and turns them into a [`ScoringRequest`].
//!
//! "No data" and "empty data" are different outcomes: a source returning `None` fails
//! the build with [`PayloadError::DataUnavailable`], while a source returning an empty
//! record list yields an empty (degenerate but valid) request.

pub mod error;
pub mod source;


pub use error::{PayloadError, PayloadResult};
pub use source::InMemorySubjectSource;

use std::collections::btree_map::Entry;

use tracing::{debug, instrument};

use crate::key::TestId;
use crate::model::{ScoringRequest, SubjectRecord};

/// Where per-subject task-performance data comes from.
pub trait SubjectSource: Send + Sync {
    /// Returns the records for `test_id`, or `None` if the source knows nothing about it.
    fn fetch(
        &self,
        test_id: &TestId,
    ) -> impl std::future::Future<Output = PayloadResult<Option<Vec<(String, SubjectRecord)>>>> + Send;
}

/// Builds scoring requests from a subject source.
#[derive(Debug)]
pub struct PayloadBuilder<D: SubjectSource> {
    source: D,
}

impl<D: SubjectSource> PayloadBuilder<D> {
    pub fn new(source: D) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &D {
        &self.source
    }

    #[instrument(skip(self), fields(test_id = %test_id))]
    pub async fn build(&self, test_id: &TestId) -> PayloadResult<ScoringRequest> {
        let records = self
            .source
            .fetch(test_id)
            .await?
            .ok_or_else(|| PayloadError::DataUnavailable {
                test_id: test_id.clone(),
            })?;

        let mut request = ScoringRequest::new();
        for (subject_id, record) in records {
            if subject_id.trim().is_empty() {
                return Err(PayloadError::InvalidSubject {
                    test_id: test_id.clone(),
                });
            }
            match request.subjects.entry(subject_id) {
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
                Entry::Occupied(slot) => {
                    return Err(PayloadError::DuplicateSubject {
                        test_id: test_id.clone(),
                        subject_id: slot.key().clone(),
                    });
                }
            }
        }

        debug!(subjects = request.len(), "built scoring request");
        Ok(request)
    }
}
